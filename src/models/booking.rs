//! Modelo de Booking
//!
//! Una "booking" es cualquier ocupación del calendario de un vehículo:
//! un contrato confirmado o una solicitud de alquiler en curso. El detector
//! de conflictos las trata de forma uniforme a través de este enum.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::rent_request::RentRequestStatus;

/// Regla de solapamiento de rangos semiabiertos `[s, e)`.
///
/// Dos rangos entran en conflicto si y solo si `s1 < e2 && s2 < e1`.
/// Una devolución el mismo día que empieza otro alquiler NO es conflicto.
pub fn dates_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 < e2 && s2 < e1
}

/// Ocupación del calendario de un vehículo, con su origen
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Booking {
    /// Contrato de alquiler ya firmado
    Contract {
        id: Uuid,
        reference: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: String,
        client_name: String,
    },
    /// Solicitud de alquiler en curso (todavía ocupa el slot de forma provisional)
    RentRequest {
        id: Uuid,
        reference: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: RentRequestStatus,
        client_name: String,
    },
}

impl Booking {
    pub fn id(&self) -> Uuid {
        match self {
            Booking::Contract { id, .. } | Booking::RentRequest { id, .. } => *id,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            Booking::Contract { start_date, .. } | Booking::RentRequest { start_date, .. } => {
                *start_date
            }
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        match self {
            Booking::Contract { end_date, .. } | Booking::RentRequest { end_date, .. } => *end_date,
        }
    }

    /// Verificar si esta booking se solapa con el rango pedido
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        dates_overlap(self.start_date(), self.end_date(), start_date, end_date)
    }
}

/// Resultado calculado de una consulta de disponibilidad - no se persiste
#[derive(Debug, Clone, Serialize)]
pub struct VehicleAvailabilityResult {
    pub is_available: bool,
    /// Todas las bookings en conflicto, ordenadas por fecha de inicio
    pub conflicts: Vec<Booking>,
}

impl VehicleAvailabilityResult {
    pub fn from_conflicts(mut conflicts: Vec<Booking>) -> Self {
        // Orden determinista: fecha de inicio, luego id
        conflicts.sort_by(|a, b| {
            a.start_date()
                .cmp(&b.start_date())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Self {
            is_available: conflicts.is_empty(),
            conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            ("2025-06-01", "2025-06-05", "2025-06-04", "2025-06-08"),
            ("2025-06-01", "2025-06-05", "2025-06-05", "2025-06-08"),
            ("2025-06-01", "2025-06-30", "2025-06-10", "2025-06-12"),
            ("2025-06-01", "2025-06-02", "2025-07-01", "2025-07-02"),
        ];
        for (a, b, c, e) in cases {
            assert_eq!(
                dates_overlap(d(a), d(b), d(c), d(e)),
                dates_overlap(d(c), d(e), d(a), d(b)),
                "simetría rota para [{}, {}) vs [{}, {})",
                a,
                b,
                c,
                e
            );
        }
    }

    #[test]
    fn adjacent_ranges_do_not_conflict() {
        // [A, B) y [B, C): la devolución coincide con el inicio del siguiente
        assert!(!dates_overlap(
            d("2025-06-01"),
            d("2025-06-05"),
            d("2025-06-05"),
            d("2025-06-08")
        ));
        assert!(!dates_overlap(
            d("2025-06-05"),
            d("2025-06-08"),
            d("2025-06-01"),
            d("2025-06-05")
        ));
    }

    #[test]
    fn partial_overlap_conflicts() {
        assert!(dates_overlap(
            d("2025-06-01"),
            d("2025-06-05"),
            d("2025-06-04"),
            d("2025-06-08")
        ));
    }

    #[test]
    fn containment_conflicts() {
        assert!(dates_overlap(
            d("2025-06-01"),
            d("2025-06-30"),
            d("2025-06-10"),
            d("2025-06-12")
        ));
    }

    #[test]
    fn availability_result_sorts_conflicts() {
        let later = Booking::Contract {
            id: Uuid::new_v4(),
            reference: "CT-2025-002".to_string(),
            start_date: d("2025-06-10"),
            end_date: d("2025-06-12"),
            status: "active".to_string(),
            client_name: "Marie".to_string(),
        };
        let earlier = Booking::RentRequest {
            id: Uuid::new_v4(),
            reference: "RR-20250601-A1B2C3".to_string(),
            start_date: d("2025-06-02"),
            end_date: d("2025-06-04"),
            status: crate::models::rent_request::RentRequestStatus::Pending,
            client_name: "Jean".to_string(),
        };

        let result = VehicleAvailabilityResult::from_conflicts(vec![later, earlier]);
        assert!(!result.is_available);
        assert_eq!(result.conflicts.len(), 2);
        assert_eq!(result.conflicts[0].start_date(), d("2025-06-02"));
        assert_eq!(result.conflicts[1].start_date(), d("2025-06-10"));
    }

    #[test]
    fn empty_conflicts_means_available() {
        let result = VehicleAvailabilityResult::from_conflicts(vec![]);
        assert!(result.is_available);
        assert!(result.conflicts.is_empty());
    }
}
