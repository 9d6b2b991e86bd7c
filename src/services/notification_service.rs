//! Servicio de notificaciones por email
//!
//! Colaborador externo del ciclo de vida: confirma la recepción al cliente,
//! avisa al equipo de administración y comunica cambios de estado. Los
//! envíos son fire-and-forget; un fallo aquí nunca hace fallar la mutación
//! que lo disparó.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::environment::SmtpConfig;
use crate::models::rent_request::RentRequest;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppError;

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Confirmación al cliente tras crear su solicitud
    async fn send_client_confirmation(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError>;

    /// Aviso al equipo de administración de que entró una solicitud nueva
    async fn send_admin_notification(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError>;

    /// Aviso al cliente de un cambio de estado de su solicitud
    async fn send_status_update(&self, request: &RentRequest) -> Result<(), AppError>;
}

/// Implementación SMTP real, para producción
pub struct SmtpNotificationService {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
    admin_email: String,
}

impl SmtpNotificationService {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            smtp_server: config.server.clone(),
            smtp_port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport, AppError> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| AppError::Notification(format!("SMTP relay error: {}", e)))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| AppError::Notification(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Notification(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))?;

        let mailer = self.build_transport()?;

        // SmtpTransport es síncrono: el envío va a un worker bloqueante
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| AppError::Notification(format!("Email task failed: {}", e)))?
        .map(|_| ())
    }
}

#[async_trait]
impl NotificationService for SmtpNotificationService {
    async fn send_client_confirmation(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError> {
        let body = format!(
            "Hola {},\n\n\
             Hemos recibido tu solicitud de alquiler {} para el vehículo {} \
             del {} al {}.\n\n\
             Nuestro equipo la revisará y te contactará en breve.\n\n\
             Gracias por confiar en nosotros.",
            request.client_name,
            request.request_id,
            vehicle.name,
            request.start_date,
            request.end_date,
        );

        self.send(
            &request.client_email,
            &format!("Solicitud de alquiler recibida - {}", request.request_id),
            body,
        )
        .await
    }

    async fn send_admin_notification(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError> {
        let body = format!(
            "Nueva solicitud de alquiler {}.\n\n\
             Cliente: {} <{}> ({})\n\
             Vehículo: {} ({})\n\
             Fechas: {} -> {}\n\
             Aprobable ahora mismo: {}\n\n\
             Mensaje del cliente:\n{}",
            request.request_id,
            request.client_name,
            request.client_email,
            request.client_phone,
            vehicle.name,
            vehicle.license_plate,
            request.start_date,
            request.end_date,
            if request.is_approvable { "sí" } else { "no (hay conflictos)" },
            request.message.as_deref().unwrap_or("(sin mensaje)"),
        );

        self.send(
            &self.admin_email,
            &format!("Nueva solicitud de alquiler - {}", request.request_id),
            body,
        )
        .await
    }

    async fn send_status_update(&self, request: &RentRequest) -> Result<(), AppError> {
        let body = format!(
            "Hola {},\n\n\
             Tu solicitud de alquiler {} ha cambiado de estado: ahora está '{}'.\n\n\
             Si tienes dudas responde a este correo.",
            request.client_name, request.request_id, request.status,
        );

        self.send(
            &request.client_email,
            &format!("Actualización de tu solicitud - {}", request.request_id),
            body,
        )
        .await
    }
}

/// Implementación que solo escribe en el log - para desarrollo y tests
pub struct LogNotificationService;

#[async_trait]
impl NotificationService for LogNotificationService {
    async fn send_client_confirmation(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError> {
        tracing::info!(
            "📧 [dev] Confirmación para {} - solicitud {} ({})",
            request.client_email,
            request.request_id,
            vehicle.name
        );
        Ok(())
    }

    async fn send_admin_notification(
        &self,
        request: &RentRequest,
        vehicle: &Vehicle,
    ) -> Result<(), AppError> {
        tracing::info!(
            "📧 [dev] Aviso a administración - solicitud {} para {}",
            request.request_id,
            vehicle.name
        );
        Ok(())
    }

    async fn send_status_update(&self, request: &RentRequest) -> Result<(), AppError> {
        tracing::info!(
            "📧 [dev] Estado de {} para {}: {}",
            request.request_id,
            request.client_email,
            request.status
        );
        Ok(())
    }
}
