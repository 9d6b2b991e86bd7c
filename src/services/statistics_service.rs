//! Agregador de estadísticas del dashboard
//!
//! Deriva contadores y rankings del historial de solicitudes sin mutarlo.
//! La agregación es una función pura sobre las filas ya cargadas, para que
//! la propiedad de reconciliación (suma por estado == total) quede cubierta
//! por tests sin base de datos.

use chrono::Datelike;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::statistics::{
    MonthlyCount, RecentRequest, RentRequestStatistics, StatusCounts, VehicleRequestCount,
};
use crate::repositories::rent_request_repository::{RentRequestRepository, StatisticsRow};
use crate::utils::errors::AppError;

pub struct StatisticsService {
    rent_requests: RentRequestRepository,
    recent_limit: usize,
}

impl StatisticsService {
    pub fn new(pool: PgPool, recent_limit: usize) -> Self {
        Self {
            rent_requests: RentRequestRepository::new(pool),
            recent_limit,
        }
    }

    pub async fn get_statistics(&self) -> Result<RentRequestStatistics, AppError> {
        let rows = self.rent_requests.fetch_statistics_rows().await?;
        Ok(aggregate(&rows, self.recent_limit))
    }
}

/// Agregar el corpus completo de solicitudes en las métricas del dashboard
pub fn aggregate(rows: &[StatisticsRow], recent_limit: usize) -> RentRequestStatistics {
    let mut by_status = StatusCounts::default();
    let mut monthly_map: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    let mut per_vehicle: HashMap<Uuid, u64> = HashMap::new();

    for row in rows {
        by_status.increment(row.status);
        *monthly_map
            .entry((row.created_at.year(), row.created_at.month()))
            .or_insert(0) += 1;
        *per_vehicle.entry(row.vehicle_id).or_insert(0) += 1;
    }

    // El BTreeMap ya entrega los meses en orden cronológico
    let monthly = monthly_map
        .into_iter()
        .map(|((year, month), count)| MonthlyCount { year, month, count })
        .collect();

    let mut top_vehicles: Vec<VehicleRequestCount> = per_vehicle
        .into_iter()
        .map(|(vehicle_id, count)| VehicleRequestCount { vehicle_id, count })
        .collect();
    // Descendente por count, empates por vehicle_id para que el ranking sea determinista
    top_vehicles.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
    });

    let mut recent_rows: Vec<&StatisticsRow> = rows.iter().collect();
    recent_rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent = recent_rows
        .into_iter()
        .take(recent_limit)
        .map(|row| RecentRequest {
            id: row.id,
            request_id: row.request_id.clone(),
            client_name: row.client_name.clone(),
            vehicle_id: row.vehicle_id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status,
            created_at: row.created_at,
        })
        .collect();

    RentRequestStatistics {
        total: rows.len() as u64,
        by_status,
        monthly,
        top_vehicles,
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rent_request::RentRequestStatus;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn row(
        status: RentRequestStatus,
        vehicle: u128,
        year: i32,
        month: u32,
        day: u32,
    ) -> StatisticsRow {
        StatisticsRow {
            id: Uuid::new_v4(),
            request_id: format!("RR-{:04}{:02}{:02}-TEST00", year, month, day),
            client_name: "Cliente".to_string(),
            vehicle_id: Uuid::from_u128(vehicle),
            start_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            end_date: NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .succ_opt()
                .unwrap(),
            status,
            created_at: Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn counts_reconcile() {
        use RentRequestStatus::*;
        let rows = vec![
            row(Pending, 1, 2025, 5, 1),
            row(Pending, 1, 2025, 5, 2),
            row(Reviewed, 2, 2025, 5, 3),
            row(Approved, 2, 2025, 6, 1),
            row(Rejected, 3, 2025, 6, 2),
            row(Contacted, 3, 2025, 6, 3),
            row(Confirmed, 3, 2025, 7, 1),
        ];

        let stats = aggregate(&rows, 10);

        assert_eq!(stats.total, 7);
        assert_eq!(stats.by_status.sum(), stats.total);
        assert_eq!(stats.by_status.pending, 2);
        assert_eq!(stats.by_status.confirmed, 1);

        // La serie mensual también debe sumar el total
        let monthly_sum: u64 = stats.monthly.iter().map(|m| m.count).sum();
        assert_eq!(monthly_sum, stats.total);

        // Y el ranking de vehículos igualmente
        let vehicle_sum: u64 = stats.top_vehicles.iter().map(|v| v.count).sum();
        assert_eq!(vehicle_sum, stats.total);
    }

    #[test]
    fn monthly_series_is_chronological() {
        use RentRequestStatus::*;
        let rows = vec![
            row(Pending, 1, 2025, 7, 1),
            row(Pending, 1, 2024, 12, 1),
            row(Pending, 1, 2025, 1, 15),
            row(Pending, 1, 2025, 1, 20),
        ];

        let stats = aggregate(&rows, 10);

        let keys: Vec<(i32, u32)> = stats.monthly.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2024, 12), (2025, 1), (2025, 7)]);
        assert_eq!(stats.monthly[1].count, 2);
    }

    #[test]
    fn top_vehicles_breaks_ties_deterministically() {
        use RentRequestStatus::*;
        let rows = vec![
            row(Pending, 7, 2025, 5, 1),
            row(Pending, 3, 2025, 5, 2),
            row(Pending, 3, 2025, 5, 3),
            row(Pending, 9, 2025, 5, 4),
            row(Pending, 9, 2025, 5, 5),
        ];

        let stats = aggregate(&rows, 10);

        // Vehículos 3 y 9 empatan a 2; gana el id menor
        assert_eq!(stats.top_vehicles[0].vehicle_id, Uuid::from_u128(3));
        assert_eq!(stats.top_vehicles[1].vehicle_id, Uuid::from_u128(9));
        assert_eq!(stats.top_vehicles[2].vehicle_id, Uuid::from_u128(7));
        assert_eq!(stats.top_vehicles[2].count, 1);
    }

    #[test]
    fn recent_is_bounded_and_most_recent_first() {
        use RentRequestStatus::*;
        let rows: Vec<StatisticsRow> = (1..=5)
            .map(|day| row(Pending, 1, 2025, 6, day))
            .collect();

        let stats = aggregate(&rows, 3);

        assert_eq!(stats.recent.len(), 3);
        assert_eq!(stats.recent[0].created_at.day(), 5);
        assert_eq!(stats.recent[1].created_at.day(), 4);
        assert_eq!(stats.recent[2].created_at.day(), 3);
    }

    #[test]
    fn empty_corpus_reconciles_to_zero() {
        let stats = aggregate(&[], 10);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_status.sum(), 0);
        assert!(stats.monthly.is_empty());
        assert!(stats.top_vehicles.is_empty());
        assert!(stats.recent.is_empty());
    }
}
