use crate::utils::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

// Proyección de la tabla contracts - solo lo que necesita el detector de conflictos
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContractRow {
    pub id: Uuid,
    pub contract_number: String,
    pub client_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Contratos que ocupan el calendario de un vehículo.
    ///
    /// Cualquier contrato no cancelado cuenta como ocupación. Acepta un
    /// executor explícito para poder ejecutarse dentro de la transacción
    /// de aprobación.
    pub async fn find_occupying_for_vehicle<'e, E>(
        &self,
        executor: E,
        vehicle_id: Uuid,
    ) -> Result<Vec<ContractRow>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let contracts = sqlx::query_as::<_, ContractRow>(
            r#"
            SELECT id, contract_number, client_name, start_date, end_date, status, created_at
            FROM contracts
            WHERE vehicle_id = $1 AND status <> 'cancelled'
            ORDER BY start_date ASC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(executor)
        .await?;

        Ok(contracts)
    }
}
