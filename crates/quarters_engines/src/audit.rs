#![forbid(unsafe_code)]

use quarters_contracts::audit::{
    OccupancyAuditEvent, OccupancyAuditEventId, OccupancyAuditEventInput,
};
use quarters_contracts::resident::ResidentId;
use quarters_contracts::unit::UnitId;
use quarters_contracts::{ContractViolation, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyAuditConfig {
    pub max_events: usize,
}

impl OccupancyAuditConfig {
    pub fn mvp_v1() -> Self {
        Self {
            max_events: 100_000,
        }
    }
}

/// Append-only ledger of occupancy lifecycle events. This is the subsystem's
/// observability surface: every sync mutation and every degraded read leaves
/// a row here with a deterministic reason code.
#[derive(Debug, Clone)]
pub struct OccupancyAuditRuntime {
    config: OccupancyAuditConfig,
    events: Vec<OccupancyAuditEvent>,
    next_event_id: u64,
}

impl OccupancyAuditRuntime {
    pub fn new(config: OccupancyAuditConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            next_event_id: 1,
        }
    }

    pub fn append_audit_row(
        &mut self,
        input: OccupancyAuditEventInput,
    ) -> Result<OccupancyAuditEventId, ContractViolation> {
        input.validate()?;

        if self.events.len() >= self.config.max_events {
            return Err(ContractViolation::InvalidValue {
                field: "occupancy_audit_runtime.events",
                reason: "max_events exceeded",
            });
        }

        let event_id = OccupancyAuditEventId(self.next_event_id);
        self.next_event_id = self.next_event_id.saturating_add(1);
        let event = OccupancyAuditEvent::from_input_v1(event_id, input)?;
        self.events.push(event);
        Ok(event_id)
    }

    pub fn audit_rows(&self) -> &[OccupancyAuditEvent] {
        &self.events
    }

    pub fn audit_rows_by_resident(&self, resident_id: &ResidentId) -> Vec<&OccupancyAuditEvent> {
        self.events
            .iter()
            .filter(|e| e.resident_id.as_ref() == Some(resident_id))
            .collect()
    }

    pub fn audit_rows_by_unit(&self, unit_id: &UnitId) -> Vec<&OccupancyAuditEvent> {
        self.events
            .iter()
            .filter(|e| {
                e.unit_id.as_ref() == Some(unit_id) || e.prior_unit_id.as_ref() == Some(unit_id)
            })
            .collect()
    }
}
