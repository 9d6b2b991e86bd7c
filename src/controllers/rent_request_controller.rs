use uuid::Uuid;

use crate::dto::common_dto::ApiResponse;
use crate::dto::rent_request_dto::{
    CreateRentRequestRequest, RentRequestDetailResponse, RentRequestFilters, RentRequestResponse,
    UpdateRentRequestRequest,
};
use crate::models::statistics::RentRequestStatistics;
use crate::services::rent_request_service::RentRequestService;
use crate::services::statistics_service::StatisticsService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct RentRequestController {
    service: RentRequestService,
    statistics: StatisticsService,
}

impl RentRequestController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: RentRequestService::new(
                state.pool.clone(),
                state.notifier.clone(),
                state.config.rental.clone(),
            ),
            statistics: StatisticsService::new(
                state.pool.clone(),
                state.config.rental.recent_requests_limit,
            ),
        }
    }

    pub async fn create(
        &self,
        request: CreateRentRequestRequest,
    ) -> Result<ApiResponse<RentRequestResponse>, AppError> {
        let created = self.service.create(request).await?;

        Ok(ApiResponse::success_with_message(
            created.into(),
            "Solicitud de alquiler registrada exitosamente".to_string(),
        ))
    }

    pub async fn list(
        &self,
        filters: RentRequestFilters,
    ) -> Result<Vec<RentRequestResponse>, AppError> {
        let requests = self.service.list(&filters).await?;

        Ok(requests.into_iter().map(RentRequestResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<RentRequestDetailResponse, AppError> {
        let (request, history) = self.service.get_by_id(id).await?;

        Ok(RentRequestDetailResponse {
            request: request.into(),
            history,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateRentRequestRequest,
        actor: Uuid,
    ) -> Result<ApiResponse<RentRequestResponse>, AppError> {
        let updated = self.service.update(id, request, actor).await?;

        Ok(ApiResponse::success_with_message(
            updated.into(),
            "Solicitud actualizada exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.service.delete(id).await
    }

    pub async fn statistics(&self) -> Result<RentRequestStatistics, AppError> {
        self.statistics.get_statistics().await
    }
}
