#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::resident::ResidentId;
use crate::unit::UnitId;
use crate::{ContractViolation, SchemaVersion, UnixTimeMs, Validate};

pub const OCCUPANCY_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// One row of the occupancy index.
///
/// Rows are created lazily on the first write for a unit and are never
/// physically deleted: a vacated unit keeps its row with `occupied = false`,
/// preserving `first_assigned_at` and the `updated_at` history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub schema_version: SchemaVersion,
    pub unit_id: UnitId,
    pub occupied: bool,
    pub resident_id: Option<ResidentId>,
    pub first_assigned_at: UnixTimeMs,
    pub updated_at: UnixTimeMs,
}

impl OccupancyRecord {
    pub fn v1(
        unit_id: UnitId,
        occupied: bool,
        resident_id: Option<ResidentId>,
        first_assigned_at: UnixTimeMs,
        updated_at: UnixTimeMs,
    ) -> Result<Self, ContractViolation> {
        let record = Self {
            schema_version: OCCUPANCY_CONTRACT_VERSION,
            unit_id,
            occupied,
            resident_id,
            first_assigned_at,
            updated_at,
        };
        record.validate()?;
        Ok(record)
    }
}

impl Validate for OccupancyRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != OCCUPANCY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_record.schema_version",
                reason: "must match OCCUPANCY_CONTRACT_VERSION",
            });
        }
        self.unit_id.validate()?;
        if self.occupied != self.resident_id.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_record.resident_id",
                reason: "must be Some(...) iff occupied",
            });
        }
        if self.updated_at.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_record.updated_at",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Merge-write payload for the occupancy index (`setOccupancy` in the portal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyWriteInput {
    pub schema_version: SchemaVersion,
    pub unit_id: UnitId,
    pub occupied: bool,
    pub resident_id: Option<ResidentId>,
    pub at: UnixTimeMs,
}

impl OccupancyWriteInput {
    pub fn v1(
        unit_id: UnitId,
        occupied: bool,
        resident_id: Option<ResidentId>,
        at: UnixTimeMs,
    ) -> Result<Self, ContractViolation> {
        let input = Self {
            schema_version: OCCUPANCY_CONTRACT_VERSION,
            unit_id,
            occupied,
            resident_id,
            at,
        };
        input.validate()?;
        Ok(input)
    }
}

impl Validate for OccupancyWriteInput {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != OCCUPANCY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_write_input.schema_version",
                reason: "must match OCCUPANCY_CONTRACT_VERSION",
            });
        }
        self.unit_id.validate()?;
        if self.occupied != self.resident_id.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_write_input.resident_id",
                reason: "must be Some(...) iff occupied",
            });
        }
        if self.at.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_write_input.at",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}
