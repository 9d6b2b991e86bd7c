//! Ciclo de vida de las solicitudes de alquiler
//!
//! Orquesta la creación (anti-duplicados + chequeo informativo de
//! conflictos), la actualización (transición validada + re-chequeo antes de
//! aprobar) y el borrado (solo en estados tempranos). Compone el detector
//! de conflictos y la tabla de transiciones del modelo.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::RentalPolicy;
use crate::dto::rent_request_dto::{CreateRentRequestRequest, RentRequestFilters, UpdateRentRequestRequest};
use crate::models::booking::dates_overlap;
use crate::models::rent_request::{RentRequest, RentRequestStatus, StatusHistoryEntry};
use crate::models::vehicle::Vehicle;
use crate::repositories::rent_request_repository::{NewRentRequest, RentRequestRepository};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::availability_service::AvailabilityService;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};

/// Validar las reglas de política sobre el rango de fechas pedido.
///
/// Separada del servicio para poder testearla con un `now` fijo.
pub fn validate_rental_window(
    policy: &RentalPolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if start_date >= end_date {
        return Err(AppError::Validation(
            "start_date debe ser anterior a end_date".to_string(),
        ));
    }

    let earliest_start = (now + Duration::hours(policy.min_lead_time_hours)).date_naive();
    if start_date < earliest_start {
        return Err(AppError::Validation(format!(
            "la fecha de inicio debe tener al menos {} horas de antelación",
            policy.min_lead_time_hours
        )));
    }

    let days = (end_date - start_date).num_days();
    if days > policy.max_rental_days {
        return Err(AppError::Validation(format!(
            "la duración máxima de un alquiler es de {} días",
            policy.max_rental_days
        )));
    }

    Ok(())
}

pub struct RentRequestService {
    pool: PgPool,
    rent_requests: RentRequestRepository,
    vehicles: VehicleRepository,
    availability: AvailabilityService,
    notifier: Arc<dyn NotificationService>,
    policy: RentalPolicy,
}

impl RentRequestService {
    pub fn new(pool: PgPool, notifier: Arc<dyn NotificationService>, policy: RentalPolicy) -> Self {
        Self {
            rent_requests: RentRequestRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            availability: AvailabilityService::new(pool.clone()),
            pool,
            notifier,
            policy,
        }
    }

    /// Crear una solicitud nueva (endpoint público).
    ///
    /// Un conflicto de calendario NO bloquea la creación: la solicitud nace
    /// en pending con `is_approvable` reflejando la disponibilidad actual,
    /// y el equipo resuelve los conflictos al aprobar.
    pub async fn create(&self, data: CreateRentRequestRequest) -> Result<RentRequest, AppError> {
        data.validate()?;

        let now = Utc::now();
        validate_rental_window(&self.policy, data.start_date, data.end_date, now)?;

        let vehicle = self
            .vehicles
            .find_by_id(data.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &data.vehicle_id.to_string()))?;

        if !vehicle.is_active {
            return Err(AppError::Validation(
                "El vehículo no está disponible para alquiler".to_string(),
            ));
        }

        // Supresión de dobles envíos: mismo cliente, mismo vehículo, fechas
        // solapadas, dentro de la ventana reciente
        let since = now - Duration::minutes(self.policy.duplicate_window_minutes);
        let recent = self
            .rent_requests
            .find_recent_open_by_client(&data.client_email, data.vehicle_id, since)
            .await?;
        if recent
            .iter()
            .any(|r| dates_overlap(r.start_date, r.end_date, data.start_date, data.end_date))
        {
            return Err(AppError::Validation(
                "Ya existe una solicitud reciente tuya para este vehículo y fechas; \
                 el equipo la está revisando"
                    .to_string(),
            ));
        }

        // Chequeo informativo: no bloquea, solo marca la solicitud
        let availability = self
            .availability
            .check_availability(data.vehicle_id, data.start_date, data.end_date, None)
            .await?;

        let request_id = self.generate_request_id(now).await?;

        let request = self
            .rent_requests
            .create(NewRentRequest {
                request_id,
                client_name: data.client_name,
                client_email: data.client_email,
                client_phone: data.client_phone,
                vehicle_id: data.vehicle_id,
                start_date: data.start_date,
                end_date: data.end_date,
                message: data.message,
                is_approvable: availability.is_available,
            })
            .await?;

        info!(
            "📩 Nueva solicitud {} para vehículo {} ({} -> {})",
            request.request_id, vehicle.name, request.start_date, request.end_date
        );

        self.dispatch_creation_emails(request.clone(), vehicle);

        Ok(request)
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
    ) -> Result<(RentRequest, Vec<StatusHistoryEntry>), AppError> {
        let request = self
            .rent_requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Rent request", &id.to_string()))?;

        let history = self.rent_requests.history_for(id).await?;

        Ok((request, history))
    }

    pub async fn list(&self, filters: &RentRequestFilters) -> Result<Vec<RentRequest>, AppError> {
        filters.validate()?;
        self.rent_requests.list(filters).await
    }

    /// Actualizar una solicitud (endpoint de administración).
    ///
    /// Si hay cambio de estado hacia approved/confirmed, el re-chequeo de
    /// conflictos y la transición se ejecutan dentro de una transacción con
    /// la fila del vehículo bloqueada: dos aprobaciones concurrentes del
    /// mismo vehículo no pueden colarse las dos.
    pub async fn update(
        &self,
        id: Uuid,
        data: UpdateRentRequestRequest,
        actor: Uuid,
    ) -> Result<RentRequest, AppError> {
        data.validate()?;

        let current = self
            .rent_requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Rent request", &id.to_string()))?;

        let Some(new_status) = data.status else {
            // Solo campos sin estado
            let Some(admin_notes) = data.admin_notes else {
                return Err(AppError::Validation("Nada que actualizar".to_string()));
            };
            if current.status.is_terminal() {
                return Err(forbidden_error(
                    "update request",
                    "a confirmed request is immutable",
                ));
            }
            return self.rent_requests.update_admin_notes(id, &admin_notes).await;
        };

        // Cubre también las transiciones re-entrantes y el estado terminal
        if !current.status.can_transition_to(new_status) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: new_status,
            });
        }

        let mut tx = self.pool.begin().await?;

        if matches!(
            new_status,
            RentRequestStatus::Approved | RentRequestStatus::Confirmed
        ) {
            // Candado por vehículo: serializa el re-chequeo + transición
            self.vehicles
                .lock_for_update(&mut tx, current.vehicle_id)
                .await?;

            let conflicts = self
                .availability
                .collect_conflicts(
                    &mut tx,
                    current.vehicle_id,
                    current.start_date,
                    current.end_date,
                    Some(current.id),
                )
                .await?;

            if !conflicts.is_empty() {
                // La transacción se descarta sin commit: nada queda aplicado
                return Err(AppError::Conflict {
                    message: format!(
                        "No se puede pasar {} a '{}': el vehículo ya está reservado en esas fechas",
                        current.request_id, new_status
                    ),
                    conflicts,
                });
            }
        }

        let updated = self
            .rent_requests
            .apply_transition(
                &mut tx,
                id,
                current.status,
                new_status,
                Some(actor),
                data.admin_notes,
            )
            .await?;

        tx.commit().await?;

        info!(
            "Solicitud {} cambió de '{}' a '{}' por {}",
            updated.request_id, current.status, updated.status, actor
        );

        if matches!(
            new_status,
            RentRequestStatus::Approved | RentRequestStatus::Rejected | RentRequestStatus::Contacted
        ) {
            self.dispatch_status_email(updated.clone());
        }

        Ok(updated)
    }

    /// Borrar una solicitud - solo mientras sigue en pending.
    ///
    /// Una solicitud ya revisada se conserva para auditoría y estadísticas.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let current = self
            .rent_requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Rent request", &id.to_string()))?;

        if current.status != RentRequestStatus::Pending {
            return Err(forbidden_error(
                "delete request",
                "only requests in an early state may be deleted",
            ));
        }

        self.rent_requests.delete(id).await
    }

    /// Generar el identificador human-facing `RR-YYYYMMDD-XXXXXX`.
    ///
    /// Reintenta ante la improbable colisión del sufijo aleatorio.
    async fn generate_request_id(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        for _ in 0..3 {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(6)
                .map(char::from)
                .collect::<String>()
                .to_uppercase();
            let candidate = format!("RR-{}-{}", now.format("%Y%m%d"), suffix);

            if !self.rent_requests.request_id_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal(
            "No se pudo generar un request_id único".to_string(),
        ))
    }

    // Los emails nunca bloquean ni hacen fallar la mutación: se despachan
    // en background y los errores quedan en el log
    fn dispatch_creation_emails(&self, request: RentRequest, vehicle: Vehicle) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_client_confirmation(&request, &vehicle).await {
                warn!(
                    "No se pudo enviar la confirmación a {}: {}",
                    request.client_email, e
                );
            }
            if let Err(e) = notifier.send_admin_notification(&request, &vehicle).await {
                warn!(
                    "No se pudo notificar a administración sobre {}: {}",
                    request.request_id, e
                );
            }
        });
    }

    fn dispatch_status_email(&self, request: RentRequest) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_status_update(&request).await {
                warn!(
                    "No se pudo enviar la actualización de estado de {}: {}",
                    request.request_id, e
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy() -> RentalPolicy {
        RentalPolicy {
            min_lead_time_hours: 24,
            max_rental_days: 90,
            duplicate_window_minutes: 60,
            recent_requests_limit: 10,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_rejects_inverted_dates() {
        let err = validate_rental_window(&policy(), d("2025-06-10"), d("2025-06-05"), now());
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn window_rejects_equal_dates() {
        let err = validate_rental_window(&policy(), d("2025-06-10"), d("2025-06-10"), now());
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn window_enforces_lead_time() {
        // Pedir para hoy mismo viola las 24h de antelación
        let err = validate_rental_window(&policy(), d("2025-06-01"), d("2025-06-05"), now());
        assert!(matches!(err, Err(AppError::Validation(_))));

        // A partir de mañana ya es válido
        assert!(validate_rental_window(&policy(), d("2025-06-02"), d("2025-06-05"), now()).is_ok());
    }

    #[test]
    fn window_enforces_max_duration() {
        let err = validate_rental_window(&policy(), d("2025-06-02"), d("2025-09-15"), now());
        assert!(matches!(err, Err(AppError::Validation(_))));

        // Exactamente 90 días está permitido
        assert!(validate_rental_window(&policy(), d("2025-06-02"), d("2025-08-31"), now()).is_ok());
    }

    #[test]
    fn window_respects_policy_overrides() {
        let relaxed = RentalPolicy {
            min_lead_time_hours: 0,
            max_rental_days: 365,
            duplicate_window_minutes: 60,
            recent_requests_limit: 10,
        };
        assert!(
            validate_rental_window(&relaxed, d("2025-06-01"), d("2026-05-01"), now()).is_ok()
        );
    }
}
