//! Detector de conflictos de calendario
//!
//! Dado un vehículo y un rango de fechas, escanea todas las bookings que
//! ocupan su calendario (contratos no cancelados y solicitudes no
//! rechazadas) y devuelve cada conflicto con detalle suficiente para que
//! un administrador pueda resolverlo a mano. Lectura pura, sin efectos.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::booking::{dates_overlap, Booking, VehicleAvailabilityResult};
use crate::repositories::contract_repository::ContractRepository;
use crate::repositories::rent_request_repository::RentRequestRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, AppError};

pub struct AvailabilityService {
    pool: PgPool,
    vehicles: VehicleRepository,
    contracts: ContractRepository,
    rent_requests: RentRequestRepository,
}

impl AvailabilityService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            contracts: ContractRepository::new(pool.clone()),
            rent_requests: RentRequestRepository::new(pool.clone()),
            pool,
        }
    }

    /// Consulta de disponibilidad de un vehículo para un rango `[start, end)`.
    ///
    /// `exclude_request_id` excluye del escaneo la propia fila de una
    /// solicitud que está siendo re-chequeada antes de aprobarse.
    pub async fn check_availability(
        &self,
        vehicle_id: Uuid,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        exclude_request_id: Option<Uuid>,
    ) -> Result<VehicleAvailabilityResult, AppError> {
        if start_date >= end_date {
            return Err(AppError::Validation(
                "start_date debe ser anterior a end_date".to_string(),
            ));
        }

        if !self.vehicles.exists(vehicle_id).await? {
            return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
        }

        let mut conn = self.pool.acquire().await?;
        let conflicts = self
            .collect_conflicts(&mut conn, vehicle_id, start_date, end_date, exclude_request_id)
            .await?;

        Ok(VehicleAvailabilityResult::from_conflicts(conflicts))
    }

    /// Escaneo de conflictos sobre una conexión concreta.
    ///
    /// Recibe la conexión explícitamente para poder ejecutarse también
    /// dentro de la transacción de aprobación, detrás del candado por
    /// vehículo.
    pub(crate) async fn collect_conflicts(
        &self,
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        exclude_request_id: Option<Uuid>,
    ) -> Result<Vec<Booking>, AppError> {
        let mut conflicts = Vec::new();

        for contract in self
            .contracts
            .find_occupying_for_vehicle(&mut *conn, vehicle_id)
            .await?
        {
            if dates_overlap(contract.start_date, contract.end_date, start_date, end_date) {
                conflicts.push(Booking::Contract {
                    id: contract.id,
                    reference: contract.contract_number,
                    start_date: contract.start_date,
                    end_date: contract.end_date,
                    status: contract.status,
                    client_name: contract.client_name,
                });
            }
        }

        for request in self
            .rent_requests
            .find_occupying_for_vehicle(&mut *conn, vehicle_id, exclude_request_id)
            .await?
        {
            if dates_overlap(request.start_date, request.end_date, start_date, end_date) {
                conflicts.push(Booking::RentRequest {
                    id: request.id,
                    reference: request.request_id,
                    start_date: request.start_date,
                    end_date: request.end_date,
                    status: request.status,
                    client_name: request.client_name,
                });
            }
        }

        Ok(conflicts)
    }
}
