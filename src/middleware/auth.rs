//! Middleware de autenticación de administradores
//!
//! Valida el token Bearer y deja la identidad del administrador como
//! extension del request. Este servicio no emite tokens ni autentica
//! usuarios: solo registra la identidad que le entrega el token.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Identidad del administrador autenticado - el `actor` de las transiciones
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub email: String,
}

/// Middleware para las rutas de administración
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Falta el header Authorization".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &JwtConfig::from(&state.config))?;

    let admin_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Token con identidad inválida".to_string()))?;

    request.extensions_mut().insert(AdminContext {
        admin_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
