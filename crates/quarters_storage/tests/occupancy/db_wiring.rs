#![forbid(unsafe_code)]

use quarters_contracts::occupancy::OccupancyWriteInput;
use quarters_contracts::resident::ResidentId;
use quarters_contracts::unit::UnitId;
use quarters_contracts::UnixTimeMs;
use quarters_storage::repo::OccupancyIndexRepo;
use quarters_storage::DirectoryStore;

fn unit(id: &str) -> UnitId {
    UnitId::parse(id).unwrap()
}

fn resident(id: &str) -> ResidentId {
    ResidentId::new(id).unwrap()
}

fn occupy(unit_id: &str, resident_id: &str, t: u64) -> OccupancyWriteInput {
    OccupancyWriteInput::v1(
        unit(unit_id),
        true,
        Some(resident(resident_id)),
        UnixTimeMs(t),
    )
    .unwrap()
}

fn vacate(unit_id: &str, t: u64) -> OccupancyWriteInput {
    OccupancyWriteInput::v1(unit(unit_id), false, None, UnixTimeMs(t)).unwrap()
}

#[test]
fn at_occ_db_01_rows_are_created_lazily_on_first_write() {
    let mut s = DirectoryStore::new_in_memory();
    assert!(s.occupancy_record(&unit("A1-1-01")).is_none());

    s.upsert_occupancy_record(occupy("A1-1-01", "res_1", 10)).unwrap();

    let record = s.occupancy_record(&unit("A1-1-01")).unwrap();
    assert!(record.occupied);
    assert_eq!(record.resident_id.as_ref().unwrap().as_str(), "res_1");
    assert_eq!(record.first_assigned_at, UnixTimeMs(10));
    assert_eq!(record.updated_at, UnixTimeMs(10));
}

#[test]
fn at_occ_db_02_merge_preserves_first_assigned_at() {
    let mut s = DirectoryStore::new_in_memory();
    s.upsert_occupancy_record(occupy("A1-1-01", "res_1", 10)).unwrap();
    s.upsert_occupancy_record(vacate("A1-1-01", 20)).unwrap();
    s.upsert_occupancy_record(occupy("A1-1-01", "res_2", 30)).unwrap();

    let record = s.occupancy_record(&unit("A1-1-01")).unwrap();
    assert_eq!(record.first_assigned_at, UnixTimeMs(10));
    assert_eq!(record.updated_at, UnixTimeMs(30));
    assert_eq!(record.resident_id.as_ref().unwrap().as_str(), "res_2");
}

#[test]
fn at_occ_db_03_upsert_is_idempotent_for_identical_payloads() {
    let mut s = DirectoryStore::new_in_memory();
    s.upsert_occupancy_record(occupy("A1-1-01", "res_1", 10)).unwrap();
    let before = s.occupancy_record(&unit("A1-1-01")).unwrap().clone();

    s.upsert_occupancy_record(occupy("A1-1-01", "res_1", 10)).unwrap();
    let after = s.occupancy_record(&unit("A1-1-01")).unwrap();
    assert_eq!(&before, after);
}

#[test]
fn at_occ_db_04_vacate_marks_the_row_instead_of_deleting_it() {
    let mut s = DirectoryStore::new_in_memory();
    s.upsert_occupancy_record(occupy("A1-1-01", "res_1", 10)).unwrap();
    s.upsert_occupancy_record(vacate("A1-1-01", 20)).unwrap();

    let record = s.occupancy_record(&unit("A1-1-01")).unwrap();
    assert!(!record.occupied);
    assert!(record.resident_id.is_none());
    assert_eq!(record.updated_at, UnixTimeMs(20));
    assert_eq!(s.occupancy_rows().len(), 1);
}

#[test]
fn at_occ_db_05_read_occupied_returns_only_occupied_in_canonical_order() {
    let mut s = DirectoryStore::new_in_memory();
    s.upsert_occupancy_record(occupy("H2-4-08", "res_3", 10)).unwrap();
    s.upsert_occupancy_record(occupy("A1-B-01", "res_1", 11)).unwrap();
    s.upsert_occupancy_record(occupy("C1-2-05", "res_2", 12)).unwrap();
    s.upsert_occupancy_record(vacate("C1-2-05", 13)).unwrap();

    let occupied = s.read_occupied_unit_ids().unwrap();
    let occupied: Vec<&str> = occupied.iter().map(|u| u.as_str()).collect();
    assert_eq!(occupied, vec!["A1-B-01", "H2-4-08"]);
}

#[test]
fn at_occ_db_06_contract_violations_are_rejected_before_any_write() {
    let mut s = DirectoryStore::new_in_memory();
    // occupied without a resident id breaks the record pairing invariant
    let bad = OccupancyWriteInput {
        occupied: true,
        ..vacate("A1-1-01", 10)
    };
    assert!(s.upsert_occupancy_record(bad).is_err());
    assert!(s.occupancy_record(&unit("A1-1-01")).is_none());
}
