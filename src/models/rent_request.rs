//! Modelo de RentRequest
//!
//! Este módulo contiene el struct RentRequest, el enum de estados con su
//! tabla de transiciones y las entradas del historial de estados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de una solicitud de alquiler - mapea al ENUM rent_request_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "rent_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentRequestStatus {
    Pending,
    Reviewed,
    Approved,
    Rejected,
    Contacted,
    Confirmed,
}

/// Todos los estados, en el orden del enum
pub const ALL_STATUSES: [RentRequestStatus; 6] = [
    RentRequestStatus::Pending,
    RentRequestStatus::Reviewed,
    RentRequestStatus::Approved,
    RentRequestStatus::Rejected,
    RentRequestStatus::Contacted,
    RentRequestStatus::Confirmed,
];

impl RentRequestStatus {
    /// Estados destino permitidos desde este estado.
    ///
    /// El match es exhaustivo sobre el enum: agregar un estado nuevo obliga
    /// a decidir sus transiciones aquí.
    pub fn allowed_transitions(self) -> &'static [RentRequestStatus] {
        use RentRequestStatus::*;
        match self {
            Pending => &[Reviewed, Approved, Rejected, Contacted],
            Reviewed => &[Pending, Approved, Rejected, Contacted],
            Approved => &[Confirmed, Contacted, Rejected],
            Rejected => &[Pending, Reviewed],
            Contacted => &[Confirmed, Approved, Rejected],
            Confirmed => &[],
        }
    }

    /// Verificar si la transición hacia `next` está permitida.
    /// Las transiciones re-entrantes (mismo estado) no están permitidas.
    pub fn can_transition_to(self, next: RentRequestStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Un estado terminal no admite ninguna transición saliente
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Un request "ocupa" el calendario del vehículo salvo que esté rechazado
    pub fn occupies_calendar(self) -> bool {
        !matches!(self, RentRequestStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RentRequestStatus::Pending => "pending",
            RentRequestStatus::Reviewed => "reviewed",
            RentRequestStatus::Approved => "approved",
            RentRequestStatus::Rejected => "rejected",
            RentRequestStatus::Contacted => "contacted",
            RentRequestStatus::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for RentRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RentRequest principal - mapea exactamente a la tabla rent_requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RentRequest {
    pub id: Uuid,
    /// Identificador human-facing, estable, usado en la comunicación con el cliente
    pub request_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub message: Option<String>,
    pub status: RentRequestStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Flag calculado en la creación: true si no había conflictos en ese momento
    pub is_approvable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entrada del historial de estados - append-only, nunca se modifica
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub rent_request_id: Uuid,
    /// NULL para la entrada inicial de creación
    pub previous_status: Option<RentRequestStatus>,
    pub new_status: RentRequestStatus,
    /// NULL para cambios disparados por el sistema
    pub changed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use RentRequestStatus::*;

    // La tabla de transiciones como pares explícitos, para verificar el cierre
    const ALLOWED_PAIRS: [(RentRequestStatus, RentRequestStatus); 16] = [
        (Pending, Reviewed),
        (Pending, Approved),
        (Pending, Rejected),
        (Pending, Contacted),
        (Reviewed, Pending),
        (Reviewed, Approved),
        (Reviewed, Rejected),
        (Reviewed, Contacted),
        (Approved, Confirmed),
        (Approved, Contacted),
        (Approved, Rejected),
        (Rejected, Pending),
        (Rejected, Reviewed),
        (Contacted, Confirmed),
        (Contacted, Approved),
        (Contacted, Rejected),
    ];

    #[test]
    fn transition_table_closure() {
        // Todo par (from, to) permitido pasa; todo par no listado falla
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                let expected = ALLOWED_PAIRS.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transición {} -> {} debería ser {}",
                    from,
                    to,
                    expected
                );
            }
        }
    }

    #[test]
    fn reentrant_transitions_rejected() {
        for status in ALL_STATUSES {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn confirmed_is_terminal() {
        assert!(Confirmed.is_terminal());
        assert!(Confirmed.allowed_transitions().is_empty());
        for to in ALL_STATUSES {
            assert!(!Confirmed.can_transition_to(to));
        }
    }

    #[test]
    fn only_confirmed_is_terminal() {
        for status in ALL_STATUSES {
            assert_eq!(status.is_terminal(), status == Confirmed);
        }
    }

    #[test]
    fn rejected_frees_the_calendar() {
        assert!(!Rejected.occupies_calendar());
        for status in [Pending, Reviewed, Approved, Contacted, Confirmed] {
            assert!(status.occupies_calendar());
        }
    }
}
