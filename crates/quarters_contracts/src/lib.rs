#![forbid(unsafe_code)]

pub mod audit;
pub mod common;
pub mod occupancy;
pub mod resident;
pub mod unit;

pub use common::{ContractViolation, ReasonCodeId, SchemaVersion, UnixTimeMs, Validate};
