#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use quarters_contracts::unit::{BlockCode, FloorCode, UnitId, UnitNo};
use quarters_contracts::ContractViolation;

/// Block, floor or unit number outside the configured enumeration. Caller's
/// bug; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidUnitError {
    UnknownBlock { got: String },
    UnknownFloor { got: String },
    UnitNoOutOfRange { got: u8, max: u8 },
}

/// Deployment-time inventory constants. Changing these is a redeploy, not a
/// runtime operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub blocks: Vec<BlockCode>,
    pub floors: Vec<FloorCode>,
    pub units_per_floor: u8,
}

impl CatalogConfig {
    /// The reference deployment: 16 blocks x 5 floors (incl. basement B) x
    /// 8 units = 640 units.
    pub fn reference_v1() -> Self {
        let blocks = [
            "A1", "A2", "B1", "B2", "C1", "C2", "D1", "D2", "E1", "E2", "F1", "F2", "G1", "G2",
            "H1", "H2",
        ];
        let floors = ["B", "1", "2", "3", "4"];
        Self {
            blocks: blocks
                .iter()
                .map(|b| BlockCode::new(b).expect("reference block code must be constructible"))
                .collect(),
            floors: floors
                .iter()
                .map(|f| FloorCode::new(f).expect("reference floor code must be constructible"))
                .collect(),
            units_per_floor: 8,
        }
    }
}

/// The full set of valid units, memoized once at construction and immutable
/// afterwards. Pure lookups, no I/O.
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    config: CatalogConfig,
    ordered: Vec<UnitId>,
    index: BTreeSet<UnitId>,
}

impl UnitCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, ContractViolation> {
        if config.blocks.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "catalog_config.blocks",
                reason: "must be non-empty",
            });
        }
        if config.floors.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "catalog_config.floors",
                reason: "must be non-empty",
            });
        }
        if config.units_per_floor == 0 || config.units_per_floor > 99 {
            return Err(ContractViolation::InvalidRange {
                field: "catalog_config.units_per_floor",
                min: 1,
                max: 99,
                got: config.units_per_floor as i64,
            });
        }
        let distinct_blocks: BTreeSet<&str> =
            config.blocks.iter().map(|b| b.as_str()).collect();
        if distinct_blocks.len() != config.blocks.len() {
            return Err(ContractViolation::InvalidValue {
                field: "catalog_config.blocks",
                reason: "must not contain duplicates",
            });
        }
        let distinct_floors: BTreeSet<&str> =
            config.floors.iter().map(|f| f.as_str()).collect();
        if distinct_floors.len() != config.floors.len() {
            return Err(ContractViolation::InvalidValue {
                field: "catalog_config.floors",
                reason: "must not contain duplicates",
            });
        }

        // Generation order is block -> floor -> unit number, matching the
        // configured list order.
        let mut ordered = Vec::new();
        for block in &config.blocks {
            for floor in &config.floors {
                for n in 1..=config.units_per_floor {
                    ordered.push(UnitId::from_parts(block, floor, UnitNo(n)));
                }
            }
        }
        let index = ordered.iter().cloned().collect();
        Ok(Self {
            config,
            ordered,
            index,
        })
    }

    pub fn units_per_floor(&self) -> u8 {
        self.config.units_per_floor
    }

    pub fn blocks(&self) -> &[BlockCode] {
        &self.config.blocks
    }

    pub fn floors(&self) -> &[FloorCode] {
        &self.config.floors
    }

    /// Resolves a raw block string against the configured enumeration.
    pub fn block(&self, value: &str) -> Result<BlockCode, InvalidUnitError> {
        let code = BlockCode::new(value).map_err(|_| InvalidUnitError::UnknownBlock {
            got: value.to_string(),
        })?;
        if !self.config.blocks.contains(&code) {
            return Err(InvalidUnitError::UnknownBlock {
                got: value.to_string(),
            });
        }
        Ok(code)
    }

    /// Resolves a raw floor string against the configured enumeration.
    pub fn floor(&self, value: &str) -> Result<FloorCode, InvalidUnitError> {
        let code = FloorCode::new(value).map_err(|_| InvalidUnitError::UnknownFloor {
            got: value.to_string(),
        })?;
        if !self.config.floors.contains(&code) {
            return Err(InvalidUnitError::UnknownFloor {
                got: value.to_string(),
            });
        }
        Ok(code)
    }

    /// Canonical unit id for a triple, or `InvalidUnitError` if any part is
    /// outside the configured ranges.
    pub fn canonicalize(
        &self,
        block: &str,
        floor: &str,
        unit_no: u8,
    ) -> Result<UnitId, InvalidUnitError> {
        let block = self.block(block)?;
        let floor = self.floor(floor)?;
        if unit_no == 0 || unit_no > self.config.units_per_floor {
            return Err(InvalidUnitError::UnitNoOutOfRange {
                got: unit_no,
                max: self.config.units_per_floor,
            });
        }
        Ok(UnitId::from_parts(&block, &floor, UnitNo(unit_no)))
    }

    pub fn contains(&self, unit_id: &UnitId) -> bool {
        self.index.contains(unit_id)
    }

    /// All units in deterministic block -> floor -> unit-number order.
    pub fn list_units(&self) -> &[UnitId] {
        &self.ordered
    }

    pub fn unit_count(&self) -> usize {
        self.ordered.len()
    }

    pub fn units_on_floor(
        &self,
        block: &str,
        floor: &str,
    ) -> Result<Vec<UnitId>, InvalidUnitError> {
        let block = self.block(block)?;
        let floor = self.floor(floor)?;
        Ok((1..=self.config.units_per_floor)
            .map(|n| UnitId::from_parts(&block, &floor, UnitNo(n)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_cat_01_reference_inventory_is_640_units() {
        let catalog = UnitCatalog::new(CatalogConfig::reference_v1()).unwrap();
        assert_eq!(catalog.unit_count(), 640);
        assert_eq!(catalog.list_units().first().unwrap().as_str(), "A1-B-01");
        assert_eq!(catalog.list_units().last().unwrap().as_str(), "H2-4-08");
    }

    #[test]
    fn at_cat_02_canonicalize_normalizes_case_and_padding() {
        let catalog = UnitCatalog::new(CatalogConfig::reference_v1()).unwrap();
        let id = catalog.canonicalize("a1", "b", 8).unwrap();
        assert_eq!(id.as_str(), "A1-B-08");
        assert!(catalog.contains(&id));
    }

    #[test]
    fn at_cat_03_canonical_strings_match_expected_shape() {
        let catalog = UnitCatalog::new(CatalogConfig::reference_v1()).unwrap();
        for id in catalog.list_units() {
            let segments: Vec<&str> = id.as_str().split('-').collect();
            assert_eq!(segments.len(), 3);
            assert!(segments[0].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(segments[1].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert_eq!(segments[2].len(), 2);
            assert!(segments[2].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn at_cat_04_out_of_range_inputs_are_rejected() {
        let catalog = UnitCatalog::new(CatalogConfig::reference_v1()).unwrap();
        assert!(matches!(
            catalog.canonicalize("Z9", "1", 1),
            Err(InvalidUnitError::UnknownBlock { .. })
        ));
        assert!(matches!(
            catalog.canonicalize("A1", "5", 1),
            Err(InvalidUnitError::UnknownFloor { .. })
        ));
        assert!(matches!(
            catalog.canonicalize("A1", "1", 0),
            Err(InvalidUnitError::UnitNoOutOfRange { got: 0, max: 8 })
        ));
        assert!(matches!(
            catalog.canonicalize("A1", "1", 9),
            Err(InvalidUnitError::UnitNoOutOfRange { got: 9, max: 8 })
        ));
    }

    #[test]
    fn at_cat_05_config_rejects_duplicates_and_empty_lists() {
        let mut config = CatalogConfig::reference_v1();
        config.blocks.push(BlockCode::new("A1").unwrap());
        assert!(UnitCatalog::new(config).is_err());

        let mut config = CatalogConfig::reference_v1();
        config.floors.clear();
        assert!(UnitCatalog::new(config).is_err());
    }

    #[test]
    fn at_cat_06_units_on_floor_enumerates_in_order() {
        let catalog = UnitCatalog::new(CatalogConfig::reference_v1()).unwrap();
        let units = catalog.units_on_floor("c2", "3").unwrap();
        assert_eq!(units.len(), 8);
        assert_eq!(units[0].as_str(), "C2-3-01");
        assert_eq!(units[7].as_str(), "C2-3-08");
    }
}
