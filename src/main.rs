mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{error_handling::HandleErrorLayer, http::StatusCode, response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::create_pool;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use services::notification_service::{
    LogNotificationService, NotificationService, SmtpNotificationService,
};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Vehicle Rental - API de solicitudes de alquiler");
    info!("==================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Seleccionar el canal de notificaciones
    let notifier: Arc<dyn NotificationService> = match &config.smtp {
        Some(smtp) => {
            info!("✉️ Notificaciones por SMTP via {}", smtp.server);
            Arc::new(SmtpNotificationService::new(smtp))
        }
        None => {
            info!("✉️ SMTP no configurado: las notificaciones se escriben en el log");
            Arc::new(LogNotificationService)
        }
    };

    // En producción el CORS se restringe a los orígenes configurados
    let cors = if config.is_production() && !config.cors_origins.is_empty() {
        cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app_state = AppState::new(pool, config, notifier);

    // Crear router de la API
    let app = Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/vehicle", routes::vehicle_routes::create_vehicle_router())
        .nest(
            "/api/rent-request",
            routes::rent_request_routes::create_rent_request_router(app_state.clone()),
        )
        // Toda operación queda acotada por un deadline
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🚙 Endpoints - Vehicle:");
    info!("   GET  /api/vehicle - Listar vehículos activos");
    info!("   GET  /api/vehicle/:id - Obtener vehículo");
    info!("   GET  /api/vehicle/:id/availability - Consultar disponibilidad");
    info!("📋 Endpoints - Rent Request:");
    info!("   POST /api/rent-request - Crear solicitud (público)");
    info!("   GET  /api/rent-request - Listar solicitudes (admin)");
    info!("   GET  /api/rent-request/statistics - Estadísticas (admin)");
    info!("   GET  /api/rent-request/:id - Obtener solicitud (admin)");
    info!("   PUT  /api/rent-request/:id - Actualizar solicitud (admin)");
    info!("   DELETE /api/rent-request/:id - Eliminar solicitud (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "API de solicitudes de alquiler funcionando correctamente",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "vehicle_rental"
    }))
}

/// Convertir un deadline vencido en una respuesta HTTP en vez de un 500 opaco
async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({
                "error": "Request Timeout",
                "message": "La operación excedió el tiempo máximo permitido"
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal Server Error",
                "message": format!("Unhandled error: {}", err)
            })),
        )
    }
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
