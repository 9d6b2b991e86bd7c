//! Modelos de estadísticas del dashboard
//!
//! Valores calculados sobre el historial de solicitudes; nunca se persisten.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::rent_request::RentRequestStatus;

/// Contadores por estado - la suma de los seis debe igualar el total
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub reviewed: u64,
    pub approved: u64,
    pub rejected: u64,
    pub contacted: u64,
    pub confirmed: u64,
}

impl StatusCounts {
    pub fn increment(&mut self, status: RentRequestStatus) {
        match status {
            RentRequestStatus::Pending => self.pending += 1,
            RentRequestStatus::Reviewed => self.reviewed += 1,
            RentRequestStatus::Approved => self.approved += 1,
            RentRequestStatus::Rejected => self.rejected += 1,
            RentRequestStatus::Contacted => self.contacted += 1,
            RentRequestStatus::Confirmed => self.confirmed += 1,
        }
    }

    pub fn sum(&self) -> u64 {
        self.pending + self.reviewed + self.approved + self.rejected + self.contacted + self.confirmed
    }
}

/// Solicitudes agrupadas por (año, mes) de creación
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Vehículos rankeados por número de solicitudes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRequestCount {
    pub vehicle_id: Uuid,
    pub count: u64,
}

/// Resumen de una solicitud para el listado "recientes" del dashboard
#[derive(Debug, Clone, Serialize)]
pub struct RecentRequest {
    pub id: Uuid,
    pub request_id: String,
    pub client_name: String,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RentRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Estadísticas completas para el dashboard de administración
#[derive(Debug, Clone, Serialize)]
pub struct RentRequestStatistics {
    pub total: u64,
    pub by_status: StatusCounts,
    /// Serie mensual en orden cronológico
    pub monthly: Vec<MonthlyCount>,
    /// Orden descendente por número de solicitudes, empates por vehicle_id
    pub top_vehicles: Vec<VehicleRequestCount>,
    /// Más recientes primero, acotado por configuración
    pub recent: Vec<RecentRequest>,
}
