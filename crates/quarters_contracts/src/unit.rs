#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, SchemaVersion, Validate};

pub const UNIT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

fn validate_code(field: &'static str, value: &str) -> Result<(), ContractViolation> {
    if value.is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be non-empty",
        });
    }
    if value.len() > 8 {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be <= 8 chars",
        });
    }
    if value.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must contain ASCII alphanumerics only",
        });
    }
    Ok(())
}

/// Block code, canonicalized to uppercase at construction (`"a1"` -> `"A1"`).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockCode(String);

impl BlockCode {
    pub fn new(value: &str) -> Result<Self, ContractViolation> {
        let canonical = value.trim().to_ascii_uppercase();
        validate_code("block_code", &canonical)?;
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Floor code, canonicalized to uppercase at construction. The basement level
/// is the single-letter code `B`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FloorCode(String);

impl FloorCode {
    pub fn new(value: &str) -> Result<Self, ContractViolation> {
        let canonical = value.trim().to_ascii_uppercase();
        validate_code("floor_code", &canonical)?;
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 1-based unit number within a floor. Zero-padded to two digits in the
/// canonical unit id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitNo(pub u8);

impl Validate for UnitNo {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 || self.0 > 99 {
            return Err(ContractViolation::InvalidRange {
                field: "unit_no",
                min: 1,
                max: 99,
                got: self.0 as i64,
            });
        }
        Ok(())
    }
}

/// Canonical unit identifier string, `BLOCK-FLOOR-NN`.
///
/// This string is the only equality/lookup key for units anywhere in the
/// system. Triples are never compared field-by-field after formatting, so
/// case or padding mismatches cannot split one unit into two keys.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitId(String);

impl UnitId {
    pub fn from_parts(block: &BlockCode, floor: &FloorCode, unit_no: UnitNo) -> Self {
        Self(format!(
            "{}-{}-{:02}",
            block.as_str(),
            floor.as_str(),
            unit_no.0
        ))
    }

    /// Parses a unit id string, re-canonicalizing each segment. Parsing the
    /// output of `from_parts` yields an identical id.
    pub fn parse(value: &str) -> Result<Self, ContractViolation> {
        let mut segments = value.split('-');
        let (Some(block), Some(floor), Some(unit), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ContractViolation::InvalidValue {
                field: "unit_id",
                reason: "must have exactly three '-' separated segments",
            });
        };
        let block = BlockCode::new(block)?;
        let floor = FloorCode::new(floor)?;
        let unit_no: u8 = unit.parse().map_err(|_| ContractViolation::InvalidValue {
            field: "unit_id.unit_no",
            reason: "must be a decimal number",
        })?;
        let unit_no = UnitNo(unit_no);
        unit_no.validate()?;
        Ok(Self::from_parts(&block, &floor, unit_no))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for UnitId {
    fn validate(&self) -> Result<(), ContractViolation> {
        let reparsed = Self::parse(&self.0)?;
        if reparsed != *self {
            return Err(ContractViolation::InvalidValue {
                field: "unit_id",
                reason: "must be in canonical form",
            });
        }
        Ok(())
    }
}

/// The block/floor/unit triple carried denormalized on a resident profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseDetails {
    pub block: BlockCode,
    pub floor: FloorCode,
    pub unit_no: UnitNo,
}

impl HouseDetails {
    pub fn v1(
        block: BlockCode,
        floor: FloorCode,
        unit_no: UnitNo,
    ) -> Result<Self, ContractViolation> {
        let house = Self {
            block,
            floor,
            unit_no,
        };
        house.validate()?;
        Ok(house)
    }

    pub fn unit_id(&self) -> UnitId {
        UnitId::from_parts(&self.block, &self.floor, self.unit_no)
    }
}

impl Validate for HouseDetails {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.unit_no.validate()
    }
}
