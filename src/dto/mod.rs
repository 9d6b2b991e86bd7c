//! DTOs de la API

pub mod common_dto;
pub mod rent_request_dto;
pub mod vehicle_dto;
