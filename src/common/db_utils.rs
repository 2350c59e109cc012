use crate::common::error::{AppError, Resource};

// ---
// Helpers de tradução de erros do Postgres
// ---

/// Exclusão barrada por FOREIGN KEY (RESTRICT) vira erro de negócio, nunca erro cru do banco.
pub(crate) fn map_delete_error(resource: Resource, id: i64) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::ResourceInUse(resource, id);
            }
        }
        e.into()
    }
}

/// Gravação que aponta para um id inexistente (FOREIGN KEY) vira referência inválida.
pub(crate) fn map_reference_error(resource: Resource, id: i64) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::InvalidReference(resource, id);
            }
        }
        e.into()
    }
}
