#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use quarters_contracts::occupancy::{OccupancyRecord, OccupancyWriteInput};
use quarters_contracts::resident::{ResidentId, ResidentProfile, ResidentProfileUpdate};
use quarters_contracts::unit::UnitId;

use crate::store::StorageError;

/// Typed repository interface for the occupancy index table.
///
/// There is deliberately no delete operation: a vacated unit is written back
/// with `occupied = false`, never removed, so the `updated_at` history of the
/// row survives.
pub trait OccupancyIndexRepo {
    /// All units currently marked occupied, in canonical-id order.
    fn read_occupied_unit_ids(&self) -> Result<Vec<UnitId>, StorageError>;

    /// Merge-write: refreshes `occupied`, `resident_id` and `updated_at`,
    /// preserves `first_assigned_at`. Creates the row lazily on first write.
    /// Idempotent for a repeated identical payload.
    fn upsert_occupancy_record(&mut self, input: OccupancyWriteInput) -> Result<(), StorageError>;

    fn occupancy_record(&self, unit_id: &UnitId) -> Option<&OccupancyRecord>;
    fn occupancy_rows(&self) -> &BTreeMap<UnitId, OccupancyRecord>;
}

/// Typed repository interface for the resident directory table.
pub trait ResidentDirectoryRepo {
    fn insert_resident_row(&mut self, profile: ResidentProfile) -> Result<(), StorageError>;
    fn read_resident_by_id(&self, id: &ResidentId) -> Result<&ResidentProfile, StorageError>;
    fn write_resident(
        &mut self,
        id: &ResidentId,
        update: &ResidentProfileUpdate,
    ) -> Result<ResidentProfile, StorageError>;
    fn delete_resident_row(&mut self, id: &ResidentId) -> Result<ResidentProfile, StorageError>;
    fn resident_rows(&self) -> &BTreeMap<ResidentId, ResidentProfile>;
    fn resident_by_unit(&self, unit_id: &UnitId) -> Option<&ResidentProfile>;
}
