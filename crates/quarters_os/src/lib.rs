#![forbid(unsafe_code)]

pub mod allocation;
pub mod occupancy_sync;
