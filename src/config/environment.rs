//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y las políticas de
//! negocio parametrizables del ciclo de vida de solicitudes.

use std::env;

/// Política de alquiler - valores con nombre, nunca literales en los algoritmos
#[derive(Debug, Clone)]
pub struct RentalPolicy {
    /// Antelación mínima de la fecha de inicio respecto a ahora
    pub min_lead_time_hours: i64,
    /// Duración máxima de un alquiler
    pub max_rental_days: i64,
    /// Ventana de supresión de dobles envíos del mismo cliente
    pub duplicate_window_minutes: i64,
    /// Tamaño del listado "recientes" del dashboard
    pub recent_requests_limit: usize,
}

impl Default for RentalPolicy {
    fn default() -> Self {
        Self {
            min_lead_time_hours: 24,
            max_rental_days: 90,
            duplicate_window_minutes: 60,
            recent_requests_limit: 10,
        }
    }
}

impl RentalPolicy {
    /// Leer la política del entorno, con los defaults de producto
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_lead_time_hours: env_or("RENTAL_MIN_LEAD_TIME_HOURS", defaults.min_lead_time_hours),
            max_rental_days: env_or("RENTAL_MAX_DURATION_DAYS", defaults.max_rental_days),
            duplicate_window_minutes: env_or(
                "RENTAL_DUPLICATE_WINDOW_MINUTES",
                defaults.duplicate_window_minutes,
            ),
            recent_requests_limit: env_or("STATISTICS_RECENT_LIMIT", defaults.recent_requests_limit),
        }
    }
}

/// Configuración SMTP - si falta, las notificaciones van al log
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub admin_email: String,
}

impl SmtpConfig {
    /// Construir la configuración SMTP si el entorno la define completa
    pub fn from_env() -> Option<Self> {
        let server = env::var("SMTP_SERVER").ok()?;
        Some(Self {
            server,
            port: env_or("SMTP_PORT", 587),
            username: env::var("SMTP_USERNAME").ok()?,
            password: env::var("SMTP_PASSWORD").ok()?,
            from_email: env::var("SMTP_FROM_EMAIL").ok()?,
            from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Alquiler de Vehículos".to_string()),
            admin_email: env::var("ADMIN_NOTIFICATION_EMAIL").ok()?,
        })
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rental: RentalPolicy,
    pub smtp: Option<SmtpConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env_or("PORT", 3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiration: env_or("JWT_EXPIRATION", 86400),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rental: RentalPolicy::from_env(),
            smtp: SmtpConfig::from_env(),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
