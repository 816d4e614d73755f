#![forbid(unsafe_code)]

use quarters_contracts::audit::{OccupancyAuditEvent, OccupancyAuditEventInput, OccupancyAuditKind};
use quarters_contracts::occupancy::OccupancyWriteInput;
use quarters_contracts::resident::{ResidentId, ResidentProfile, ResidentProfileUpdate};
use quarters_contracts::unit::{HouseDetails, UnitId};
use quarters_contracts::{ContractViolation, UnixTimeMs, Validate};
use quarters_engines::audit::{OccupancyAuditConfig, OccupancyAuditRuntime};
use quarters_engines::catalog::{InvalidUnitError, UnitCatalog};
use quarters_storage::repo::{OccupancyIndexRepo, ResidentDirectoryRepo};
use quarters_storage::StorageError;

pub mod reason_codes {
    use quarters_contracts::ReasonCodeId;

    // Occupancy-sync reason-code namespace.
    pub const OCC_RESIDENT_REGISTERED: ReasonCodeId = ReasonCodeId(0x4F43_0001);
    pub const OCC_RESIDENT_MOVED: ReasonCodeId = ReasonCodeId(0x4F43_0002);
    pub const OCC_RESIDENT_DELETED: ReasonCodeId = ReasonCodeId(0x4F43_0003);
    pub const OCC_SYNC_WRITE_FAILED: ReasonCodeId = ReasonCodeId(0x4F43_00F1);
}

/// Hard failure: the lifecycle operation itself could not proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    Contract(ContractViolation),
    InvalidUnit(InvalidUnitError),
    Storage(StorageError),
}

impl From<ContractViolation> for SyncError {
    fn from(e: ContractViolation) -> Self {
        SyncError::Contract(e)
    }
}

impl From<InvalidUnitError> for SyncError {
    fn from(e: InvalidUnitError) -> Self {
        SyncError::InvalidUnit(e)
    }
}

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        SyncError::Storage(e)
    }
}

/// Soft failure: an occupancy-index write failed after the directory write
/// already succeeded. Surfaced to the caller instead of rolling anything
/// back; the inconsistency window is a documented failure mode.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySyncError {
    pub unit_id: UnitId,
    pub storage: StorageError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOutcome {
    pub resident_id: ResidentId,
    pub unit_id: Option<UnitId>,
    pub sync_errors: Vec<OccupancySyncError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub profile: ResidentProfile,
    /// True when the canonical unit actually changed (a pure profile edit or
    /// a re-selection of the same unit mutates no occupancy state).
    pub occupancy_changed: bool,
    pub sync_errors: Vec<OccupancySyncError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub profile: ResidentProfile,
    pub vacated_unit: Option<UnitId>,
    pub sync_errors: Vec<OccupancySyncError>,
}

/// Translates resident lifecycle events into occupancy-index mutations.
///
/// This service is the only writer permitted to touch both the resident
/// directory and the occupancy index for a single logical event. The two
/// writes are independent and non-transactional: a failed index write never
/// aborts or rolls back the directory write (stopping a resident from fixing
/// their own profile over an index hiccup would be worse than the
/// inconsistency, which the consistency scan surfaces later).
#[derive(Debug, Clone)]
pub struct OccupancySyncService {
    catalog: UnitCatalog,
    audit: OccupancyAuditRuntime,
}

impl OccupancySyncService {
    pub fn new(catalog: UnitCatalog, audit_config: OccupancyAuditConfig) -> Self {
        Self {
            catalog,
            audit: OccupancyAuditRuntime::new(audit_config),
        }
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn audit_rows(&self) -> &[OccupancyAuditEvent] {
        self.audit.audit_rows()
    }

    fn checked_unit(&self, house: &HouseDetails) -> Result<UnitId, SyncError> {
        Ok(self.catalog.canonicalize(
            house.block.as_str(),
            house.floor.as_str(),
            house.unit_no.0,
        )?)
    }

    fn record_write_failure(
        &mut self,
        sync_errors: &mut Vec<OccupancySyncError>,
        resident_id: &ResidentId,
        unit_id: &UnitId,
        storage: StorageError,
        now: UnixTimeMs,
    ) -> Result<(), SyncError> {
        let mut detail = format!("{storage:?}");
        detail.truncate(256);
        self.audit.append_audit_row(OccupancyAuditEventInput::v1(
            now,
            OccupancyAuditKind::OccupancyWriteFailed,
            Some(resident_id.clone()),
            Some(unit_id.clone()),
            None,
            reason_codes::OCC_SYNC_WRITE_FAILED,
            Some(detail),
        )?)?;
        sync_errors.push(OccupancySyncError {
            unit_id: unit_id.clone(),
            storage,
        });
        Ok(())
    }

    /// On resident creation with a unit: insert the profile, then mark the
    /// unit occupied. No prior-occupancy check happens here; the selector is
    /// expected to have filtered the choice already, and a concurrent claim
    /// resolves as last-writer-wins (accepted check-then-act window).
    pub fn register_resident<S>(
        &mut self,
        store: &mut S,
        profile: ResidentProfile,
        now: UnixTimeMs,
    ) -> Result<RegisterOutcome, SyncError>
    where
        S: OccupancyIndexRepo + ResidentDirectoryRepo,
    {
        profile.validate()?;
        let unit_id = match &profile.house_number {
            Some(house) => Some(self.checked_unit(house)?),
            None => None,
        };

        store.insert_resident_row(profile.clone())?;

        let mut sync_errors = Vec::new();
        if let Some(unit_id) = &unit_id {
            let write =
                OccupancyWriteInput::v1(unit_id.clone(), true, Some(profile.id.clone()), now)?;
            match store.upsert_occupancy_record(write) {
                Ok(()) => {
                    self.audit.append_audit_row(OccupancyAuditEventInput::v1(
                        now,
                        OccupancyAuditKind::ResidentRegistered,
                        Some(profile.id.clone()),
                        Some(unit_id.clone()),
                        None,
                        reason_codes::OCC_RESIDENT_REGISTERED,
                        None,
                    )?)?;
                }
                Err(e) => {
                    self.record_write_failure(&mut sync_errors, &profile.id, unit_id, e, now)?;
                }
            }
        }

        Ok(RegisterOutcome {
            resident_id: profile.id,
            unit_id,
            sync_errors,
        })
    }

    /// On profile update: write the profile, then reconcile the index when
    /// the canonical unit changed — vacate the old unit, then occupy the new
    /// one. The two index writes are independent; a failed vacate is recorded
    /// and the occupy still runs (best-effort, ordering kept for audit).
    pub fn update_resident<S>(
        &mut self,
        store: &mut S,
        id: &ResidentId,
        update: &ResidentProfileUpdate,
        now: UnixTimeMs,
    ) -> Result<UpdateOutcome, SyncError>
    where
        S: OccupancyIndexRepo + ResidentDirectoryRepo,
    {
        update.validate()?;
        let old_unit = store
            .read_resident_by_id(id)?
            .house_number
            .as_ref()
            .map(|house| house.unit_id());
        let new_unit = match &update.house_number {
            Some(house) => Some(self.checked_unit(house)?),
            None => None,
        };

        let profile = store.write_resident(id, update)?;

        let mut sync_errors = Vec::new();
        let mut occupancy_changed = false;
        if let Some(new_unit) = &new_unit {
            // Canonical-string comparison is the only equality test; equal
            // strings mean a pure profile edit with no index mutation.
            if old_unit.as_ref() != Some(new_unit) {
                occupancy_changed = true;
                if let Some(old_unit) = &old_unit {
                    let vacate = OccupancyWriteInput::v1(old_unit.clone(), false, None, now)?;
                    if let Err(e) = store.upsert_occupancy_record(vacate) {
                        self.record_write_failure(&mut sync_errors, id, old_unit, e, now)?;
                    }
                }
                let occupy =
                    OccupancyWriteInput::v1(new_unit.clone(), true, Some(id.clone()), now)?;
                match store.upsert_occupancy_record(occupy) {
                    Ok(()) => {
                        let (kind, prior, reason_code) = match &old_unit {
                            Some(old_unit) => (
                                OccupancyAuditKind::ResidentMoved,
                                Some(old_unit.clone()),
                                reason_codes::OCC_RESIDENT_MOVED,
                            ),
                            None => (
                                OccupancyAuditKind::ResidentRegistered,
                                None,
                                reason_codes::OCC_RESIDENT_REGISTERED,
                            ),
                        };
                        self.audit.append_audit_row(OccupancyAuditEventInput::v1(
                            now,
                            kind,
                            Some(id.clone()),
                            Some(new_unit.clone()),
                            prior,
                            reason_code,
                            None,
                        )?)?;
                    }
                    Err(e) => {
                        self.record_write_failure(&mut sync_errors, id, new_unit, e, now)?;
                    }
                }
            }
        }

        Ok(UpdateOutcome {
            profile,
            occupancy_changed,
            sync_errors,
        })
    }

    /// On deletion: vacate the resident's unit if they hold one, then remove
    /// the profile row. A profile without a unit (tolerated even though the
    /// invariant says it should not happen for residents) skips the vacate.
    pub fn delete_resident<S>(
        &mut self,
        store: &mut S,
        id: &ResidentId,
        now: UnixTimeMs,
    ) -> Result<DeleteOutcome, SyncError>
    where
        S: OccupancyIndexRepo + ResidentDirectoryRepo,
    {
        // No catalog re-validation here: a stored assignment must remain
        // deletable even if the inventory constants changed underneath it.
        let vacated_unit = store
            .read_resident_by_id(id)?
            .house_number
            .as_ref()
            .map(|house| house.unit_id());

        let mut sync_errors = Vec::new();
        if let Some(unit_id) = &vacated_unit {
            let vacate = OccupancyWriteInput::v1(unit_id.clone(), false, None, now)?;
            if let Err(e) = store.upsert_occupancy_record(vacate) {
                self.record_write_failure(&mut sync_errors, id, unit_id, e, now)?;
            }
        }

        let profile = store.delete_resident_row(id)?;
        self.audit.append_audit_row(OccupancyAuditEventInput::v1(
            now,
            OccupancyAuditKind::ResidentDeleted,
            Some(id.clone()),
            vacated_unit.clone(),
            None,
            reason_codes::OCC_RESIDENT_DELETED,
            None,
        )?)?;

        Ok(DeleteOutcome {
            profile,
            vacated_unit,
            sync_errors,
        })
    }
}
