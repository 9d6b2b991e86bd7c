use crate::dto::rent_request_dto::RentRequestFilters;
use crate::models::rent_request::{RentRequest, RentRequestStatus, StatusHistoryEntry};
use crate::utils::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

/// Datos para insertar una solicitud nueva - los calcula el servicio
#[derive(Debug, Clone)]
pub struct NewRentRequest {
    pub request_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub message: Option<String>,
    pub is_approvable: bool,
}

// Proyección slim para el agregador de estadísticas
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatisticsRow {
    pub id: Uuid,
    pub request_id: String,
    pub client_name: String,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RentRequestStatus,
    pub created_at: DateTime<Utc>,
}

pub struct RentRequestRepository {
    pool: PgPool,
}

impl RentRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar la solicitud junto con su entrada inicial del historial
    /// (NULL -> pending) en una sola transacción.
    pub async fn create(&self, data: NewRentRequest) -> Result<RentRequest, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let request = sqlx::query_as::<_, RentRequest>(
            r#"
            INSERT INTO rent_requests
                (id, request_id, client_name, client_email, client_phone, vehicle_id,
                 start_date, end_date, message, status, is_approvable, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.request_id)
        .bind(&data.client_name)
        .bind(&data.client_email)
        .bind(&data.client_phone)
        .bind(data.vehicle_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.message)
        .bind(RentRequestStatus::Pending)
        .bind(data.is_approvable)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO rent_request_status_history
                (id, rent_request_id, previous_status, new_status, changed_by, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.id)
        .bind(Option::<RentRequestStatus>::None)
        .bind(RentRequestStatus::Pending)
        .bind(Option::<Uuid>::None)
        .bind(Option::<String>::None)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RentRequest>, AppError> {
        let request = sqlx::query_as::<_, RentRequest>("SELECT * FROM rent_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    pub async fn request_id_exists(&self, request_id: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM rent_requests WHERE request_id = $1)")
                .bind(request_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// Listado con filtros, orden y paginación para el back-office
    pub async fn list(&self, filters: &RentRequestFilters) -> Result<Vec<RentRequest>, AppError> {
        let mut qb =
            sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM rent_requests WHERE 1=1");

        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(email) = &filters.client_email {
            qb.push(" AND client_email = ").push_bind(email.clone());
        }
        if let Some(vehicle_id) = filters.vehicle_id {
            qb.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(from) = filters.start_date_from {
            qb.push(" AND start_date >= ").push_bind(from);
        }
        if let Some(to) = filters.end_date_to {
            qb.push(" AND end_date <= ").push_bind(to);
        }

        // Columna y dirección salen de una whitelist, nunca del input directo
        qb.push(" ORDER BY ")
            .push(filters.sort_column())
            .push(" ")
            .push(filters.sort_direction());

        qb.push(" LIMIT ")
            .push_bind(filters.limit_or_default())
            .push(" OFFSET ")
            .push_bind(filters.offset_or_default());

        let requests = qb
            .build_query_as::<RentRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Solicitudes que ocupan el calendario de un vehículo (todo salvo rejected).
    ///
    /// `exclude_request_id` permite que un update no colisione con su propia fila.
    pub async fn find_occupying_for_vehicle<'e, E>(
        &self,
        executor: E,
        vehicle_id: Uuid,
        exclude_request_id: Option<Uuid>,
    ) -> Result<Vec<RentRequest>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let requests = sqlx::query_as::<_, RentRequest>(
            r#"
            SELECT * FROM rent_requests
            WHERE vehicle_id = $1
              AND status <> 'rejected'
              AND ($2::uuid IS NULL OR id <> $2)
            ORDER BY start_date ASC
            "#,
        )
        .bind(vehicle_id)
        .bind(exclude_request_id)
        .fetch_all(executor)
        .await?;

        Ok(requests)
    }

    /// Solicitudes abiertas del mismo cliente para el mismo vehículo dentro
    /// de la ventana anti-duplicados.
    pub async fn find_recent_open_by_client(
        &self,
        client_email: &str,
        vehicle_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<RentRequest>, AppError> {
        let requests = sqlx::query_as::<_, RentRequest>(
            r#"
            SELECT * FROM rent_requests
            WHERE client_email = $1
              AND vehicle_id = $2
              AND status <> 'rejected'
              AND created_at >= $3
            "#,
        )
        .bind(client_email)
        .bind(vehicle_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Aplicar una transición de estado ya validada.
    ///
    /// Los cuatro efectos (status, reviewed_at, reviewed_by, historial) van
    /// juntos sobre la conexión de la transacción del llamador: o se aplican
    /// todos o ninguno. El UPDATE exige que el estado siga siendo el que se
    /// validó; si otra operación se adelantó, la transición falla.
    pub async fn apply_transition(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        previous_status: RentRequestStatus,
        new_status: RentRequestStatus,
        actor: Option<Uuid>,
        notes: Option<String>,
    ) -> Result<RentRequest, AppError> {
        let now = Utc::now();

        let updated = sqlx::query_as::<_, RentRequest>(
            r#"
            UPDATE rent_requests
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = $4,
                admin_notes = COALESCE($5, admin_notes),
                updated_at = $4
            WHERE id = $1 AND status = $6
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_status)
        .bind(actor)
        .bind(now)
        .bind(&notes)
        .bind(previous_status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::InvalidTransition {
            from: previous_status,
            to: new_status,
        })?;

        sqlx::query(
            r#"
            INSERT INTO rent_request_status_history
                (id, rent_request_id, previous_status, new_status, changed_by, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(previous_status)
        .bind(new_status)
        .bind(actor)
        .bind(&notes)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(updated)
    }

    /// Actualizar solo las notas de administración, sin tocar el estado
    pub async fn update_admin_notes(
        &self,
        id: Uuid,
        admin_notes: &str,
    ) -> Result<RentRequest, AppError> {
        let updated = sqlx::query_as::<_, RentRequest>(
            r#"
            UPDATE rent_requests
            SET admin_notes = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(admin_notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        // El historial cae en cascada: no existe historial sin su solicitud
        sqlx::query("DELETE FROM rent_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn history_for(&self, id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            SELECT * FROM rent_request_status_history
            WHERE rent_request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Corpus completo (proyección slim) para el agregador de estadísticas
    pub async fn fetch_statistics_rows(&self) -> Result<Vec<StatisticsRow>, AppError> {
        let rows = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT id, request_id, client_name, vehicle_id, start_date, end_date, status, created_at
            FROM rent_requests
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
