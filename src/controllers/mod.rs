//! Controladores de la API
//!
//! Orquestan los servicios detrás de cada handler HTTP. No contienen
//! lógica de negocio propia: validan, delegan y convierten a DTOs.

pub mod rent_request_controller;
pub mod vehicle_controller;
