//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula las queries SQL de un agregado y es dueño
//! de un pool de conexiones. Las operaciones que deben ser atómicas
//! aceptan una conexión de una transacción abierta por el servicio.

pub mod contract_repository;
pub mod rent_request_repository;
pub mod vehicle_repository;
