use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::rent_request_controller::RentRequestController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::rent_request_dto::{
    CreateRentRequestRequest, RentRequestDetailResponse, RentRequestFilters, RentRequestResponse,
    UpdateRentRequestRequest,
};
use crate::middleware::auth::{admin_auth_middleware, AdminContext};
use crate::models::statistics::RentRequestStatistics;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rent_request_router(state: AppState) -> Router<AppState> {
    // Las rutas de revisión y estadísticas requieren un administrador
    let admin_routes = Router::new()
        .route("/", get(list_rent_requests))
        .route("/statistics", get(get_statistics))
        .route("/:id", get(get_rent_request))
        .route("/:id", put(update_rent_request))
        .route("/:id", delete(delete_rent_request))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware));

    // La creación es pública: cualquier cliente puede enviar una solicitud
    Router::new()
        .route("/", post(create_rent_request))
        .merge(admin_routes)
}

async fn create_rent_request(
    State(state): State<AppState>,
    Json(request): Json<CreateRentRequestRequest>,
) -> Result<Json<ApiResponse<RentRequestResponse>>, AppError> {
    let controller = RentRequestController::new(&state);
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_rent_requests(
    State(state): State<AppState>,
    Query(filters): Query<RentRequestFilters>,
) -> Result<Json<Vec<RentRequestResponse>>, AppError> {
    let controller = RentRequestController::new(&state);
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<RentRequestStatistics>, AppError> {
    let controller = RentRequestController::new(&state);
    let response = controller.statistics().await?;
    Ok(Json(response))
}

async fn get_rent_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RentRequestDetailResponse>, AppError> {
    let controller = RentRequestController::new(&state);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_rent_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(actor): Extension<AdminContext>,
    Json(request): Json<UpdateRentRequestRequest>,
) -> Result<Json<ApiResponse<RentRequestResponse>>, AppError> {
    let controller = RentRequestController::new(&state);
    let response = controller.update(id, request, actor.admin_id).await?;
    Ok(Json(response))
}

async fn delete_rent_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = RentRequestController::new(&state);
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Solicitud eliminada exitosamente"
    })))
}
