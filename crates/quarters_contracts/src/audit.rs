#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::resident::ResidentId;
use crate::unit::UnitId;
use crate::{ContractViolation, ReasonCodeId, SchemaVersion, UnixTimeMs, Validate};

pub const AUDIT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OccupancyAuditEventId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupancyAuditKind {
    ResidentRegistered,
    ResidentMoved,
    ResidentDeleted,
    OccupancyWriteFailed,
    OccupancyReadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyAuditEventInput {
    pub schema_version: SchemaVersion,
    pub at: UnixTimeMs,
    pub kind: OccupancyAuditKind,
    pub resident_id: Option<ResidentId>,
    pub unit_id: Option<UnitId>,
    pub prior_unit_id: Option<UnitId>,
    pub reason_code: ReasonCodeId,
    pub detail: Option<String>,
}

impl OccupancyAuditEventInput {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        at: UnixTimeMs,
        kind: OccupancyAuditKind,
        resident_id: Option<ResidentId>,
        unit_id: Option<UnitId>,
        prior_unit_id: Option<UnitId>,
        reason_code: ReasonCodeId,
        detail: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let input = Self {
            schema_version: AUDIT_CONTRACT_VERSION,
            at,
            kind,
            resident_id,
            unit_id,
            prior_unit_id,
            reason_code,
            detail,
        };
        input.validate()?;
        Ok(input)
    }
}

impl Validate for OccupancyAuditEventInput {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != AUDIT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_audit_event_input.schema_version",
                reason: "must match AUDIT_CONTRACT_VERSION",
            });
        }
        if self.at.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_audit_event_input.at",
                reason: "must be > 0",
            });
        }
        if self.reason_code.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_audit_event_input.reason_code",
                reason: "must be > 0",
            });
        }
        match self.kind {
            OccupancyAuditKind::ResidentMoved => {
                if self.prior_unit_id.is_none() || self.unit_id.is_none() {
                    return Err(ContractViolation::InvalidValue {
                        field: "occupancy_audit_event_input.prior_unit_id",
                        reason: "moved events must carry both prior and new unit ids",
                    });
                }
            }
            OccupancyAuditKind::OccupancyWriteFailed => {
                if self.unit_id.is_none() {
                    return Err(ContractViolation::InvalidValue {
                        field: "occupancy_audit_event_input.unit_id",
                        reason: "write-failure events must carry the unit id",
                    });
                }
            }
            OccupancyAuditKind::OccupancyReadFailed => {
                if self.unit_id.is_some() || self.prior_unit_id.is_some() {
                    return Err(ContractViolation::InvalidValue {
                        field: "occupancy_audit_event_input.unit_id",
                        reason: "read-failure events are not unit-scoped",
                    });
                }
            }
            OccupancyAuditKind::ResidentRegistered | OccupancyAuditKind::ResidentDeleted => {}
        }
        if let Some(unit_id) = &self.unit_id {
            unit_id.validate()?;
        }
        if let Some(prior_unit_id) = &self.prior_unit_id {
            prior_unit_id.validate()?;
        }
        if let Some(detail) = &self.detail {
            if detail.is_empty() || detail.len() > 256 {
                return Err(ContractViolation::InvalidValue {
                    field: "occupancy_audit_event_input.detail",
                    reason: "must be 1..=256 chars",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyAuditEvent {
    pub schema_version: SchemaVersion,
    pub event_id: OccupancyAuditEventId,
    pub at: UnixTimeMs,
    pub kind: OccupancyAuditKind,
    pub resident_id: Option<ResidentId>,
    pub unit_id: Option<UnitId>,
    pub prior_unit_id: Option<UnitId>,
    pub reason_code: ReasonCodeId,
    pub detail: Option<String>,
}

impl OccupancyAuditEvent {
    pub fn from_input_v1(
        event_id: OccupancyAuditEventId,
        input: OccupancyAuditEventInput,
    ) -> Result<Self, ContractViolation> {
        input.validate()?;
        Ok(Self {
            schema_version: AUDIT_CONTRACT_VERSION,
            event_id,
            at: input.at,
            kind: input.kind,
            resident_id: input.resident_id,
            unit_id: input.unit_id,
            prior_unit_id: input.prior_unit_id,
            reason_code: input.reason_code,
            detail: input.detail,
        })
    }
}
