// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AccessToken, Claims, RegisterUserPayload, TokenPair, TokenType, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        jwt_secret: String,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    pub async fn register_user<'e, E>(&self, executor: E, payload: &RegisterUserPayload) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Hashing fora do runtime assíncrono
        let password_clone = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = self
            .user_repo
            .create_user(
                executor,
                payload.username.trim(),
                payload.email.trim(),
                &payload.first_name,
                &payload.last_name,
                &hashed_password,
            )
            .await?;

        tracing::info!("👤 Profissional registrado: {}", user.username);
        Ok(user)
    }

    /// Troca usuário/senha pelo par access + refresh.
    pub async fn login_user<'e, E>(&self, executor: E, username: &str, password: &str) -> Result<TokenPair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = self
            .user_repo
            .find_by_username(executor, username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(TokenPair {
            access: self.create_token(user.id, TokenType::Access)?,
            refresh: self.create_token(user.id, TokenType::Refresh)?,
        })
    }

    /// Novo access token a partir de um refresh válido.
    pub async fn refresh<'e, E>(&self, executor: E, refresh_token: &str) -> Result<AccessToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claims = self.decode_token(refresh_token, TokenType::Refresh)?;

        // O profissional pode ter sido removido depois de emitido o refresh
        let user = self
            .user_repo
            .find_by_id(executor, claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(AccessToken { access: self.create_token(user.id, TokenType::Access)? })
    }

    pub async fn validate_token<'e, E>(&self, executor: E, token: &str) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claims = self.decode_token(token, TokenType::Access)?;

        self.user_repo
            .find_by_id(executor, claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn decode_token(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        if token_data.claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }
        Ok(token_data.claims)
    }

    fn create_token(&self, user_id: Uuid, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(UserRepository::new(), "segredo-de-teste".into(), 60, 7)
    }

    #[test]
    fn token_round_trips_with_its_type() {
        let svc = service();
        let id = Uuid::new_v4();

        let access = svc.create_token(id, TokenType::Access).unwrap();
        let claims = svc.decode_token(&access, TokenType::Access).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access() {
        let svc = service();
        let refresh = svc.create_token(Uuid::new_v4(), TokenType::Refresh).unwrap();
        assert!(matches!(
            svc.decode_token(&refresh, TokenType::Access),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = AuthService::new(UserRepository::new(), "outro".into(), 60, 7);
        let token = other.create_token(Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(service().decode_token(&token, TokenType::Access).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // TTL negativo além da tolerância padrão (60s) do jsonwebtoken
        let svc = AuthService::new(UserRepository::new(), "segredo-de-teste".into(), -10, 7);
        let token = svc.create_token(Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(svc.decode_token(&token, TokenType::Access).is_err());
    }
}
