//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle de la flota de alquiler.
//! El catálogo es de solo lectura desde este servicio: las altas y bajas
//! de vehículos se gestionan en el back-office.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub license_plate: String,
    /// Tarifa diaria ya conocida - este servicio no calcula precios
    pub price_per_day: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
