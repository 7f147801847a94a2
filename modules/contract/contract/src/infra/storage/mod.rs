//! Contract storage backends.
//!
//! - `memory` - process-local store, the default
//! - `entity`, `mapper`, `migrations`, `sea_orm_repo` - SQL store via `SeaORM`
//!
//! All SeaORM-specific code stays inside this module; the domain only sees
//! `ContractRepository`.

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod sea_orm_repo;

pub use memory::InMemoryContractRepository;
pub use sea_orm_repo::SeaOrmContractRepository;
