#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use quarters_contracts::audit::{OccupancyAuditEventInput, OccupancyAuditKind};
use quarters_contracts::unit::{HouseDetails, UnitId};
use quarters_contracts::{ContractViolation, UnixTimeMs};
use quarters_engines::audit::OccupancyAuditRuntime;
use quarters_engines::catalog::UnitCatalog;
use quarters_engines::selector::{SelectorError, UnitSelector};
use quarters_storage::repo::OccupancyIndexRepo;

pub mod reason_codes {
    use quarters_contracts::ReasonCodeId;

    // Allocation-session reason-code namespace.
    pub const ALLOC_OCCUPIED_READ_FAILED: ReasonCodeId = ReasonCodeId(0x414C_00F1);
}

/// One registration/edit form session around the unit selector.
///
/// The occupied-set snapshot is taken exactly once when the session opens and
/// never refreshed. Abandoning the session mutates nothing; only a submitted
/// triple handed to the sync service produces writes.
#[derive(Debug, Clone)]
pub struct AllocationSession {
    selector: UnitSelector,
    fail_open: bool,
}

impl AllocationSession {
    /// Opens a session against the occupancy index. If the occupied-set read
    /// fails, the session FAILS OPEN: it proceeds with an empty filter (every
    /// unit selectable) and audits the degraded read, rather than blocking
    /// registration on a transient error. The sync layer and the consistency
    /// scan catch the rare resulting collision.
    pub fn open<S>(
        store: &S,
        catalog: UnitCatalog,
        self_unit: Option<UnitId>,
        audit: &mut OccupancyAuditRuntime,
        now: UnixTimeMs,
    ) -> Result<Self, ContractViolation>
    where
        S: OccupancyIndexRepo,
    {
        let (occupied, fail_open) = match store.read_occupied_unit_ids() {
            Ok(unit_ids) => (unit_ids.into_iter().collect(), false),
            Err(e) => {
                let mut detail = format!("{e:?}");
                detail.truncate(256);
                audit.append_audit_row(OccupancyAuditEventInput::v1(
                    now,
                    OccupancyAuditKind::OccupancyReadFailed,
                    None,
                    None,
                    None,
                    reason_codes::ALLOC_OCCUPIED_READ_FAILED,
                    Some(detail),
                )?)?;
                (BTreeSet::new(), true)
            }
        };
        Ok(Self {
            selector: UnitSelector::new(catalog, occupied, self_unit),
            fail_open,
        })
    }

    /// True when the occupied-set read failed and the empty-filter fallback
    /// is in effect.
    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    pub fn selector(&self) -> &UnitSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut UnitSelector {
        &mut self.selector
    }

    /// Final-state validation; see `UnitSelector::submit`. An occupied
    /// (non-self) triple errors here and never reaches the sync write.
    pub fn submit(&self) -> Result<HouseDetails, SelectorError> {
        self.selector.submit()
    }
}
