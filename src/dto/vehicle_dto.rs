use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::vehicle::Vehicle;

/// Response de vehículo para el catálogo público
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub license_plate: String,
    pub price_per_day: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            name: vehicle.name,
            brand: vehicle.brand,
            model: vehicle.model,
            license_plate: vehicle.license_plate,
            price_per_day: vehicle.price_per_day,
            is_active: vehicle.is_active,
            created_at: vehicle.created_at,
        }
    }
}

/// Query params de la consulta de disponibilidad
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Excluir una solicitud concreta del escaneo (para re-chequeos de update)
    pub exclude_request_id: Option<Uuid>,
}
