use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehicle_dto::{AvailabilityQuery, VehicleResponse};
use crate::models::booking::VehicleAvailabilityResult;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::availability_service::AvailabilityService;
use crate::utils::errors::{not_found_error, AppError};

pub struct VehicleController {
    repository: VehicleRepository,
    availability: AvailabilityService,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            availability: AvailabilityService::new(pool),
        }
    }

    pub async fn list(&self) -> Result<Vec<VehicleResponse>, AppError> {
        let vehicles = self.repository.list_active().await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(vehicle.into())
    }

    pub async fn check_availability(
        &self,
        vehicle_id: Uuid,
        query: AvailabilityQuery,
    ) -> Result<VehicleAvailabilityResult, AppError> {
        self.availability
            .check_availability(
                vehicle_id,
                query.start_date,
                query.end_date,
                query.exclude_request_id,
            )
            .await
    }
}
