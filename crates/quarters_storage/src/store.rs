#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use quarters_contracts::occupancy::{OccupancyRecord, OccupancyWriteInput};
use quarters_contracts::resident::{ResidentId, ResidentProfile, ResidentProfileUpdate};
use quarters_contracts::unit::UnitId;
use quarters_contracts::{ContractViolation, Validate};

use crate::repo::{OccupancyIndexRepo, ResidentDirectoryRepo};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    NotFound {
        table: &'static str,
        key: String,
    },
    DuplicateKey {
        table: &'static str,
        key: String,
    },
    /// The backing collaborator could not be reached. The in-memory store
    /// never produces this; fakes use it to model a failed network write.
    Unavailable {
        table: &'static str,
    },
    ContractViolation(ContractViolation),
}

impl From<ContractViolation> for StorageError {
    fn from(v: ContractViolation) -> Self {
        StorageError::ContractViolation(v)
    }
}

/// A bidirectional-invariant breach between the resident directory and the
/// occupancy index. The invariant is maintained by convention (the sync
/// service is the only writer of both tables), so breaches are detected by
/// scan, not prevented by constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyFault {
    /// A profile claims a unit the index does not show as theirs.
    ResidentUnitNotOccupied {
        resident_id: ResidentId,
        unit_id: UnitId,
    },
    /// The index names a different occupant than the directory does.
    OccupantMismatch {
        unit_id: UnitId,
        index_resident_id: ResidentId,
        directory_resident_id: ResidentId,
    },
    /// An occupied index row with no directory profile on that unit.
    OccupiedUnitWithoutResident { unit_id: UnitId },
    /// Two or more profiles canonicalize to the same unit (the lost race).
    DuplicateOccupants {
        unit_id: UnitId,
        resident_ids: Vec<ResidentId>,
    },
}

/// In-memory reference implementation of both repo traits: the `units` table
/// (occupancy index) and the `users` table (resident directory) of the
/// surrounding portal.
#[derive(Debug, Clone, Default)]
pub struct DirectoryStore {
    units: BTreeMap<UnitId, OccupancyRecord>,
    residents: BTreeMap<ResidentId, ResidentProfile>,
}

impl DirectoryStore {
    pub fn new_in_memory() -> Self {
        Self::default()
    }

    /// Scans both tables for breaches of the bidirectional occupancy
    /// invariant. Faults are reported in directory order, then index order.
    pub fn verify_directory_consistency(&self) -> Vec<ConsistencyFault> {
        let mut faults = Vec::new();

        let mut occupants_by_unit: BTreeMap<UnitId, Vec<ResidentId>> = BTreeMap::new();
        for (resident_id, profile) in &self.residents {
            if let Some(house) = &profile.house_number {
                occupants_by_unit
                    .entry(house.unit_id())
                    .or_default()
                    .push(resident_id.clone());
            }
        }

        for (unit_id, resident_ids) in &occupants_by_unit {
            if resident_ids.len() > 1 {
                faults.push(ConsistencyFault::DuplicateOccupants {
                    unit_id: unit_id.clone(),
                    resident_ids: resident_ids.clone(),
                });
            }
        }

        for (resident_id, profile) in &self.residents {
            let Some(house) = &profile.house_number else {
                continue;
            };
            let unit_id = house.unit_id();
            match self.units.get(&unit_id) {
                Some(record) if record.occupied => {
                    let index_resident = record
                        .resident_id
                        .as_ref()
                        .expect("occupied record must name a resident");
                    if index_resident != resident_id {
                        faults.push(ConsistencyFault::OccupantMismatch {
                            unit_id,
                            index_resident_id: index_resident.clone(),
                            directory_resident_id: resident_id.clone(),
                        });
                    }
                }
                _ => {
                    faults.push(ConsistencyFault::ResidentUnitNotOccupied {
                        resident_id: resident_id.clone(),
                        unit_id,
                    });
                }
            }
        }

        for (unit_id, record) in &self.units {
            if record.occupied && !occupants_by_unit.contains_key(unit_id) {
                faults.push(ConsistencyFault::OccupiedUnitWithoutResident {
                    unit_id: unit_id.clone(),
                });
            }
        }

        faults
    }
}

impl OccupancyIndexRepo for DirectoryStore {
    fn read_occupied_unit_ids(&self) -> Result<Vec<UnitId>, StorageError> {
        Ok(self
            .units
            .iter()
            .filter(|(_, record)| record.occupied)
            .map(|(unit_id, _)| unit_id.clone())
            .collect())
    }

    fn upsert_occupancy_record(&mut self, input: OccupancyWriteInput) -> Result<(), StorageError> {
        input.validate()?;
        match self.units.get_mut(&input.unit_id) {
            Some(record) => {
                record.occupied = input.occupied;
                record.resident_id = input.resident_id;
                record.updated_at = input.at;
            }
            None => {
                let record = OccupancyRecord::v1(
                    input.unit_id.clone(),
                    input.occupied,
                    input.resident_id,
                    input.at,
                    input.at,
                )?;
                self.units.insert(input.unit_id, record);
            }
        }
        Ok(())
    }

    fn occupancy_record(&self, unit_id: &UnitId) -> Option<&OccupancyRecord> {
        self.units.get(unit_id)
    }

    fn occupancy_rows(&self) -> &BTreeMap<UnitId, OccupancyRecord> {
        &self.units
    }
}

impl ResidentDirectoryRepo for DirectoryStore {
    fn insert_resident_row(&mut self, profile: ResidentProfile) -> Result<(), StorageError> {
        profile.validate()?;
        if self.residents.contains_key(&profile.id) {
            return Err(StorageError::DuplicateKey {
                table: "users",
                key: profile.id.as_str().to_string(),
            });
        }
        self.residents.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn read_resident_by_id(&self, id: &ResidentId) -> Result<&ResidentProfile, StorageError> {
        self.residents.get(id).ok_or_else(|| StorageError::NotFound {
            table: "users",
            key: id.as_str().to_string(),
        })
    }

    fn write_resident(
        &mut self,
        id: &ResidentId,
        update: &ResidentProfileUpdate,
    ) -> Result<ResidentProfile, StorageError> {
        update.validate()?;
        let current = self.residents.get(id).ok_or_else(|| StorageError::NotFound {
            table: "users",
            key: id.as_str().to_string(),
        })?;
        let mut next = current.clone();
        update.apply_to(&mut next);
        next.validate()?;
        self.residents.insert(id.clone(), next.clone());
        Ok(next)
    }

    fn delete_resident_row(&mut self, id: &ResidentId) -> Result<ResidentProfile, StorageError> {
        self.residents.remove(id).ok_or_else(|| StorageError::NotFound {
            table: "users",
            key: id.as_str().to_string(),
        })
    }

    fn resident_rows(&self) -> &BTreeMap<ResidentId, ResidentProfile> {
        &self.residents
    }

    fn resident_by_unit(&self, unit_id: &UnitId) -> Option<&ResidentProfile> {
        self.residents.values().find(|profile| {
            profile
                .house_number
                .as_ref()
                .is_some_and(|house| &house.unit_id() == unit_id)
        })
    }
}
