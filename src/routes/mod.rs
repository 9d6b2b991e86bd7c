//! Routers de la API

pub mod rent_request_routes;
pub mod vehicle_routes;
