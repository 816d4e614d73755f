#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use quarters_contracts::unit::{BlockCode, FloorCode, HouseDetails, UnitId, UnitNo};
use quarters_contracts::ContractViolation;

use crate::catalog::{InvalidUnitError, UnitCatalog};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorError {
    /// A floor or unit was chosen before its upstream selection.
    NoBlockSelected,
    NoFloorSelected,
    /// The unit is held by another resident. Surfaced to the user as an
    /// actionable conflict; selection state is left unchanged.
    UnitOccupied { unit_id: UnitId },
    IncompleteSelection,
    InvalidUnit(InvalidUnitError),
    Contract(ContractViolation),
}

impl From<InvalidUnitError> for SelectorError {
    fn from(e: InvalidUnitError) -> Self {
        SelectorError::InvalidUnit(e)
    }
}

impl From<ContractViolation> for SelectorError {
    fn from(e: ContractViolation) -> Self {
        SelectorError::Contract(e)
    }
}

/// The occupied-minus-self predicate. `self_unit` is threaded explicitly so a
/// resident editing their own profile is never blocked by their current unit;
/// it is never implicit global state.
pub fn is_unit_occupied(
    unit_id: &UnitId,
    occupied: &BTreeSet<UnitId>,
    self_unit: Option<&UnitId>,
) -> bool {
    occupied.contains(unit_id) && self_unit != Some(unit_id)
}

/// One row of the unit dropdown: occupied units stay visible but disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOption {
    pub unit_no: UnitNo,
    pub unit_id: UnitId,
    pub occupied_by_other: bool,
}

/// Cascading block -> floor -> unit allocation state machine.
///
/// Works against a one-shot occupancy snapshot taken when the form session
/// opened; the snapshot is not a live subscription, so a stale-read collision
/// is possible and accepted (last index writer wins downstream).
#[derive(Debug, Clone)]
pub struct UnitSelector {
    catalog: UnitCatalog,
    occupied: BTreeSet<UnitId>,
    self_unit: Option<UnitId>,
    selected_block: Option<BlockCode>,
    selected_floor: Option<FloorCode>,
    selected_unit: Option<UnitNo>,
}

impl UnitSelector {
    pub fn new(catalog: UnitCatalog, occupied: BTreeSet<UnitId>, self_unit: Option<UnitId>) -> Self {
        Self {
            catalog,
            occupied,
            self_unit,
            selected_block: None,
            selected_floor: None,
            selected_unit: None,
        }
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn occupied(&self) -> &BTreeSet<UnitId> {
        &self.occupied
    }

    pub fn self_unit(&self) -> Option<&UnitId> {
        self.self_unit.as_ref()
    }

    pub fn selected_block(&self) -> Option<&BlockCode> {
        self.selected_block.as_ref()
    }

    pub fn selected_floor(&self) -> Option<&FloorCode> {
        self.selected_floor.as_ref()
    }

    pub fn selected_unit(&self) -> Option<UnitNo> {
        self.selected_unit
    }

    /// A new block invalidates downstream choices.
    pub fn select_block(&mut self, block: &str) -> Result<(), SelectorError> {
        let block = self.catalog.block(block)?;
        self.selected_block = Some(block);
        self.selected_floor = None;
        self.selected_unit = None;
        Ok(())
    }

    /// Sets the floor and auto-picks the first unit not occupied by someone
    /// else, scanning unit numbers in ascending order. A full floor leaves the
    /// unit unset rather than blocking the floor choice; the user moves on to
    /// another floor.
    pub fn select_floor(&mut self, floor: &str) -> Result<Option<UnitNo>, SelectorError> {
        let Some(block) = self.selected_block.clone() else {
            return Err(SelectorError::NoBlockSelected);
        };
        let floor = self.catalog.floor(floor)?;
        let mut pick = None;
        for n in 1..=self.catalog.units_per_floor() {
            let unit_id = self
                .catalog
                .canonicalize(block.as_str(), floor.as_str(), n)?;
            if !is_unit_occupied(&unit_id, &self.occupied, self.self_unit.as_ref()) {
                pick = Some(UnitNo(n));
                break;
            }
        }
        self.selected_floor = Some(floor);
        self.selected_unit = pick;
        Ok(pick)
    }

    /// Direct unit choice. Occupied-by-other is rejected without touching the
    /// current selection.
    pub fn select_unit(&mut self, unit_no: u8) -> Result<(), SelectorError> {
        let Some(block) = self.selected_block.clone() else {
            return Err(SelectorError::NoBlockSelected);
        };
        let Some(floor) = self.selected_floor.clone() else {
            return Err(SelectorError::NoFloorSelected);
        };
        let unit_id = self
            .catalog
            .canonicalize(block.as_str(), floor.as_str(), unit_no)?;
        if is_unit_occupied(&unit_id, &self.occupied, self.self_unit.as_ref()) {
            return Err(SelectorError::UnitOccupied { unit_id });
        }
        self.selected_unit = Some(UnitNo(unit_no));
        Ok(())
    }

    /// Every unit number on the selected floor, occupied ones flagged but
    /// still enumerated.
    pub fn unit_options(&self) -> Result<Vec<UnitOption>, SelectorError> {
        let Some(block) = &self.selected_block else {
            return Err(SelectorError::NoBlockSelected);
        };
        let Some(floor) = &self.selected_floor else {
            return Err(SelectorError::NoFloorSelected);
        };
        let mut options = Vec::with_capacity(self.catalog.units_per_floor() as usize);
        for n in 1..=self.catalog.units_per_floor() {
            let unit_id = self
                .catalog
                .canonicalize(block.as_str(), floor.as_str(), n)?;
            let occupied_by_other =
                is_unit_occupied(&unit_id, &self.occupied, self.self_unit.as_ref());
            options.push(UnitOption {
                unit_no: UnitNo(n),
                unit_id,
                occupied_by_other,
            });
        }
        Ok(options)
    }

    /// The complete triple, only once all three levels are set.
    pub fn selection(&self) -> Option<HouseDetails> {
        let block = self.selected_block.clone()?;
        let floor = self.selected_floor.clone()?;
        let unit_no = self.selected_unit?;
        Some(HouseDetails {
            block,
            floor,
            unit_no,
        })
    }

    /// Final-state validation: revalidates the complete triple against the
    /// snapshot. An occupied (non-self) triple never leaves the selector.
    pub fn submit(&self) -> Result<HouseDetails, SelectorError> {
        let Some(house) = self.selection() else {
            return Err(SelectorError::IncompleteSelection);
        };
        let unit_id = self.catalog.canonicalize(
            house.block.as_str(),
            house.floor.as_str(),
            house.unit_no.0,
        )?;
        if is_unit_occupied(&unit_id, &self.occupied, self.self_unit.as_ref()) {
            return Err(SelectorError::UnitOccupied { unit_id });
        }
        Ok(HouseDetails::v1(house.block, house.floor, house.unit_no)?)
    }
}
