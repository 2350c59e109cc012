// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CatalogRepository, ClientRepository, DashboardRepository, PaymentRepository, UserRepository,
        WorkOrderRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, client_service::ClientService,
        dashboard_service::DashboardService, payment_service::PaymentService,
        work_order_service::WorkOrderService,
    },
};

/// Configuração lida do ambiente (.env em desenvolvimento).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub database_max_connections: u32,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// Fuso usado para "mês corrente" e para as datas nas mensagens
    pub local_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET não pode ser vazio"));
        }

        let offset_hours: i32 = parse_or(&lookup, "LOCAL_UTC_OFFSET_HOURS", -3)?;
        let local_offset = FixedOffset::east_opt(offset_hours * 3600)
            .with_context(|| format!("LOCAL_UTC_OFFSET_HOURS fora do intervalo: {offset_hours}"))?;

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            access_token_ttl_minutes: parse_or(&lookup, "ACCESS_TOKEN_TTL_MINUTES", 60)?,
            refresh_token_ttl_days: parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 7)?,
            local_offset,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("valor inválido para {key}: {raw:?}")),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub catalog_service: CatalogService,
    pub work_order_service: WorkOrderService,
    pub payment_service: PaymentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: AppConfig) -> Self {
        let config = Arc::new(config);

        let work_order_service = WorkOrderService::new(
            WorkOrderRepository::new(),
            ClientRepository::new(),
            CatalogRepository::new(),
            PaymentRepository::new(),
            config.local_offset,
        );

        Self {
            auth_service: AuthService::new(
                UserRepository::new(),
                config.jwt_secret.clone(),
                config.access_token_ttl_minutes,
                config.refresh_token_ttl_days,
            ),
            client_service: ClientService::new(ClientRepository::new()),
            catalog_service: CatalogService::new(CatalogRepository::new(), work_order_service.clone()),
            payment_service: PaymentService::new(PaymentRepository::new(), WorkOrderRepository::new()),
            dashboard_service: DashboardService::new(
                DashboardRepository::new(),
                ClientRepository::new(),
                CatalogRepository::new(),
                config.local_offset,
            ),
            work_order_service,
            db_pool,
            config,
        }
    }
}
