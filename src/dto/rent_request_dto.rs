use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::rent_request::{RentRequest, RentRequestStatus, StatusHistoryEntry};
use crate::utils::errors::AppError;
use crate::utils::validation;

// Request público para crear una solicitud de alquiler
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRentRequestRequest {
    #[validate(length(min = 2, max = 120))]
    pub client_name: String,

    #[validate(email)]
    pub client_email: String,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub client_phone: String,

    pub vehicle_id: Uuid,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

// Request de administración para actualizar una solicitud
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRentRequestRequest {
    pub status: Option<RentRequestStatus>,

    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

/// Response de solicitud para la API
#[derive(Debug, Serialize)]
pub struct RentRequestResponse {
    pub id: Uuid,
    pub request_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub message: Option<String>,
    pub status: RentRequestStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub is_approvable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RentRequest> for RentRequestResponse {
    fn from(request: RentRequest) -> Self {
        Self {
            id: request.id,
            request_id: request.request_id,
            client_name: request.client_name,
            client_email: request.client_email,
            client_phone: request.client_phone,
            vehicle_id: request.vehicle_id,
            start_date: request.start_date,
            end_date: request.end_date,
            message: request.message,
            status: request.status,
            admin_notes: request.admin_notes,
            reviewed_by: request.reviewed_by,
            reviewed_at: request.reviewed_at,
            is_approvable: request.is_approvable,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Response de detalle: la solicitud más su historial de estados
#[derive(Debug, Serialize)]
pub struct RentRequestDetailResponse {
    pub request: RentRequestResponse,
    pub history: Vec<StatusHistoryEntry>,
}

/// Filtros para el listado de solicitudes
#[derive(Debug, Default, Deserialize)]
pub struct RentRequestFilters {
    pub status: Option<RentRequestStatus>,
    pub client_email: Option<String>,
    pub vehicle_id: Option<Uuid>,
    pub start_date_from: Option<NaiveDate>,
    pub end_date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORT_COLUMNS: [&str; 4] = ["created_at", "updated_at", "start_date", "end_date"];

impl RentRequestFilters {
    /// Rechazar filtros malformados antes de tocar la base de datos
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(sort_by) = self.sort_by.as_deref() {
            if !SORT_COLUMNS.contains(&sort_by) {
                return Err(AppError::Validation(format!(
                    "sort_by inválido '{}': debe ser uno de {:?}",
                    sort_by, SORT_COLUMNS
                )));
            }
        }
        if let Some(sort_order) = self.sort_order.as_deref() {
            if sort_order != "asc" && sort_order != "desc" {
                return Err(AppError::Validation(format!(
                    "sort_order inválido '{}': debe ser 'asc' o 'desc'",
                    sort_order
                )));
            }
        }
        if let Some(limit) = self.limit {
            validation::validate_positive(limit)
                .map_err(|_| AppError::Validation("limit debe ser positivo".to_string()))?;
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(AppError::Validation("offset no puede ser negativo".to_string()));
            }
        }
        Ok(())
    }

    /// Columna de orden, siempre de la whitelist
    pub fn sort_column(&self) -> &'static str {
        match self.sort_by.as_deref() {
            Some("updated_at") => "updated_at",
            Some("start_date") => "start_date",
            Some("end_date") => "end_date",
            _ => "created_at",
        }
    }

    pub fn sort_direction(&self) -> &'static str {
        match self.sort_order.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        }
    }

    pub fn limit_or_default(&self) -> i64 {
        self.limit.unwrap_or(50).min(200)
    }

    pub fn offset_or_default(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_sort_whitelist() {
        let filters = RentRequestFilters {
            sort_by: Some("start_date".to_string()),
            sort_order: Some("asc".to_string()),
            ..Default::default()
        };
        assert!(filters.validate().is_ok());
        assert_eq!(filters.sort_column(), "start_date");
        assert_eq!(filters.sort_direction(), "ASC");

        let bad = RentRequestFilters {
            sort_by: Some("client_email; DROP TABLE rent_requests".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        // Incluso sin validar, la columna sale de la whitelist
        assert_eq!(bad.sort_column(), "created_at");
    }

    #[test]
    fn test_filters_pagination_defaults() {
        let filters = RentRequestFilters::default();
        assert!(filters.validate().is_ok());
        assert_eq!(filters.limit_or_default(), 50);
        assert_eq!(filters.offset_or_default(), 0);

        let capped = RentRequestFilters {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(capped.limit_or_default(), 200);

        let negative = RentRequestFilters {
            limit: Some(-5),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }
}
