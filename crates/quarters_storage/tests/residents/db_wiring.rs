#![forbid(unsafe_code)]

use quarters_contracts::occupancy::OccupancyWriteInput;
use quarters_contracts::resident::{
    ResidentId, ResidentProfile, ResidentProfileUpdate, ResidentRole,
};
use quarters_contracts::unit::{BlockCode, FloorCode, HouseDetails, UnitId, UnitNo};
use quarters_contracts::UnixTimeMs;
use quarters_storage::repo::{OccupancyIndexRepo, ResidentDirectoryRepo};
use quarters_storage::{ConsistencyFault, DirectoryStore, StorageError};

fn resident_id(id: &str) -> ResidentId {
    ResidentId::new(id).unwrap()
}

fn house(block: &str, floor: &str, unit_no: u8) -> HouseDetails {
    HouseDetails::v1(
        BlockCode::new(block).unwrap(),
        FloorCode::new(floor).unwrap(),
        UnitNo(unit_no),
    )
    .unwrap()
}

fn profile(id: &str, house_number: Option<HouseDetails>) -> ResidentProfile {
    ResidentProfile::v1(
        resident_id(id),
        "Aiman Rahim".to_string(),
        "PDRM-10234".to_string(),
        "Sergeant".to_string(),
        "0123456789".to_string(),
        "aiman@example.com".to_string(),
        ResidentRole::Resident,
        house_number,
        None,
        None,
        vec![],
    )
    .unwrap()
}

fn occupy(s: &mut DirectoryStore, unit: &HouseDetails, id: &str, t: u64) {
    s.upsert_occupancy_record(
        OccupancyWriteInput::v1(unit.unit_id(), true, Some(resident_id(id)), UnixTimeMs(t))
            .unwrap(),
    )
    .unwrap();
}

#[test]
fn at_res_db_01_duplicate_insert_is_rejected() {
    let mut s = DirectoryStore::new_in_memory();
    s.insert_resident_row(profile("res_1", None)).unwrap();
    assert!(matches!(
        s.insert_resident_row(profile("res_1", None)),
        Err(StorageError::DuplicateKey { table: "users", .. })
    ));
}

#[test]
fn at_res_db_02_partial_write_updates_only_named_fields() {
    let mut s = DirectoryStore::new_in_memory();
    s.insert_resident_row(profile("res_1", Some(house("A1", "1", 1)))).unwrap();

    let update = ResidentProfileUpdate {
        contact_number: Some("0198765432".to_string()),
        ..Default::default()
    };
    let updated = s.write_resident(&resident_id("res_1"), &update).unwrap();
    assert_eq!(updated.contact_number, "0198765432");
    assert_eq!(updated.full_name, "Aiman Rahim");
    assert_eq!(
        updated.house_number.unwrap().unit_id().as_str(),
        "A1-1-01"
    );
}

#[test]
fn at_res_db_03_write_to_missing_resident_is_not_found() {
    let mut s = DirectoryStore::new_in_memory();
    let out = s.write_resident(&resident_id("ghost"), &ResidentProfileUpdate::default());
    assert!(matches!(
        out,
        Err(StorageError::NotFound { table: "users", .. })
    ));
}

#[test]
fn at_res_db_04_delete_returns_the_removed_profile() {
    let mut s = DirectoryStore::new_in_memory();
    s.insert_resident_row(profile("res_1", Some(house("A1", "1", 1)))).unwrap();
    let removed = s.delete_resident_row(&resident_id("res_1")).unwrap();
    assert_eq!(removed.id.as_str(), "res_1");
    assert!(s.read_resident_by_id(&resident_id("res_1")).is_err());
}

#[test]
fn at_res_db_05_resident_lookup_by_unit_uses_the_canonical_key() {
    let mut s = DirectoryStore::new_in_memory();
    s.insert_resident_row(profile("res_1", Some(house("a1", "b", 3)))).unwrap();

    let found = s.resident_by_unit(&UnitId::parse("A1-B-03").unwrap()).unwrap();
    assert_eq!(found.id.as_str(), "res_1");
    assert!(s.resident_by_unit(&UnitId::parse("A1-B-04").unwrap()).is_none());
}

#[test]
fn at_res_db_06_consistent_directory_reports_no_faults() {
    let mut s = DirectoryStore::new_in_memory();
    let home = house("A1", "1", 1);
    s.insert_resident_row(profile("res_1", Some(home.clone()))).unwrap();
    occupy(&mut s, &home, "res_1", 10);

    assert!(s.verify_directory_consistency().is_empty());
}

#[test]
fn at_res_db_07_unindexed_resident_unit_is_a_fault() {
    let mut s = DirectoryStore::new_in_memory();
    s.insert_resident_row(profile("res_1", Some(house("A1", "1", 1)))).unwrap();

    let faults = s.verify_directory_consistency();
    assert_eq!(faults.len(), 1);
    assert!(matches!(
        &faults[0],
        ConsistencyFault::ResidentUnitNotOccupied { resident_id, .. }
            if resident_id.as_str() == "res_1"
    ));
}

#[test]
fn at_res_db_08_occupant_mismatch_is_reported_from_both_sides() {
    let mut s = DirectoryStore::new_in_memory();
    let home = house("A1", "1", 1);
    s.insert_resident_row(profile("res_1", Some(home.clone()))).unwrap();
    // Index claims someone else holds the unit (the lost-race shape).
    occupy(&mut s, &home, "res_2", 10);

    let faults = s.verify_directory_consistency();
    assert!(faults.iter().any(|f| matches!(
        f,
        ConsistencyFault::OccupantMismatch { index_resident_id, directory_resident_id, .. }
            if index_resident_id.as_str() == "res_2"
                && directory_resident_id.as_str() == "res_1"
    )));
}

#[test]
fn at_res_db_09_orphaned_occupied_row_is_a_fault() {
    let mut s = DirectoryStore::new_in_memory();
    occupy(&mut s, &house("A1", "1", 1), "res_9", 10);

    let faults = s.verify_directory_consistency();
    assert_eq!(faults.len(), 1);
    assert!(matches!(
        &faults[0],
        ConsistencyFault::OccupiedUnitWithoutResident { unit_id }
            if unit_id.as_str() == "A1-1-01"
    ));
}

#[test]
fn at_res_db_10_duplicate_occupants_are_detected() {
    let mut s = DirectoryStore::new_in_memory();
    let home = house("A1", "1", 1);
    s.insert_resident_row(profile("res_1", Some(home.clone()))).unwrap();
    s.insert_resident_row(profile("res_2", Some(home.clone()))).unwrap();
    occupy(&mut s, &home, "res_1", 10);

    let faults = s.verify_directory_consistency();
    assert!(faults.iter().any(|f| matches!(
        f,
        ConsistencyFault::DuplicateOccupants { resident_ids, .. } if resident_ids.len() == 2
    )));
}
