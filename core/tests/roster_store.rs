//! Roster persistence against an in-memory SQLite database.

use chrono::NaiveDate;
use planner_core::{
    error::PlanError,
    member::{HolidayKind, HolidayPeriod, Role, TeamMember},
    store::RosterStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store() -> RosterStore {
    let store = RosterStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn alice() -> TeamMember {
    TeamMember::new("Alice", 2.0)
        .with_role(Role::Sse)
        .with_tenure(30, 14)
        .with_holiday(
            HolidayPeriod::new(date(2024, 2, 12), date(2024, 2, 16), HolidayKind::PlannedLeave)
                .with_description("ski trip"),
        )
        .with_holiday(HolidayPeriod::new(
            date(2024, 1, 1),
            date(2024, 1, 1),
            HolidayKind::CompanyHoliday,
        ))
}

/// A stored member reads back field for field, holidays in insertion order.
#[test]
fn add_then_get_returns_same_record() {
    let store = store();
    let member = alice();
    store.add_member(&member).unwrap();

    let loaded = store.get_member(&member.id).unwrap();
    assert_eq!(loaded, member);
    assert_eq!(loaded.holidays[0].description, "ski trip");
    assert_eq!(loaded.holidays[1].kind, HolidayKind::CompanyHoliday);
}

/// Listing keeps the order members were added in.
#[test]
fn list_preserves_insertion_order() {
    let store = store();
    let names = ["Zed", "Amy", "Moe"];
    for name in names {
        store.add_member(&TeamMember::new(name, 2.0)).unwrap();
    }
    let listed: Vec<_> = store.list_members().unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(listed, names);
    assert_eq!(store.member_count().unwrap(), 3);
}

/// Adding the same id twice is rejected and leaves one copy.
#[test]
fn duplicate_id_is_rejected() {
    let store = store();
    let member = alice();
    store.add_member(&member).unwrap();
    let err = store.add_member(&member).unwrap_err();
    assert!(matches!(err, PlanError::InvalidMember { .. }), "{err}");
    assert_eq!(store.member_count().unwrap(), 1);
}

/// A holiday that ends before it starts never reaches the database.
#[test]
fn malformed_holiday_is_rejected() {
    let store = store();
    let member = TeamMember::new("Bob", 2.0).with_holiday(HolidayPeriod::new(
        date(2024, 3, 10),
        date(2024, 3, 1),
        HolidayKind::SickLeave,
    ));
    let err = store.add_member(&member).unwrap_err();
    assert!(matches!(err, PlanError::MalformedPeriod { .. }), "{err}");
    assert!(store.list_members().unwrap().is_empty());
}

/// Negative base capacity is rejected.
#[test]
fn negative_capacity_is_rejected() {
    let store = store();
    let member = TeamMember::new("Neg", 2.0).with_base_capacity(-1.0);
    assert!(matches!(
        store.add_member(&member),
        Err(PlanError::InvalidMember { .. })
    ));
}

/// Update replaces scalar fields and the whole holiday list, in place.
#[test]
fn update_replaces_member_and_holidays() {
    let store = store();
    let first = TeamMember::new("First", 2.0);
    let mut member = alice();
    store.add_member(&first).unwrap();
    store.add_member(&member).unwrap();

    member.name = "Alice B.".into();
    member.role = Role::El;
    member.is_upskilling = true;
    member.holidays.truncate(1);
    store.update_member(&member.id, &member).unwrap();

    let listed = store.list_members().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1], member);
}

/// Updating an unknown id, or with a mismatched record, fails.
#[test]
fn update_checks_identity() {
    let store = store();
    let member = alice();

    let err = store.update_member(&member.id, &member).unwrap_err();
    assert!(matches!(err, PlanError::MemberNotFound { .. }), "{err}");

    store.add_member(&member).unwrap();
    let err = store.update_member("someone-else", &member).unwrap_err();
    assert!(matches!(err, PlanError::InvalidMember { .. }), "{err}");
}

/// Deleting a member takes their holidays along; a second delete fails.
#[test]
fn delete_cascades_and_reports_missing() {
    let store = store();
    let member = alice();
    store.add_member(&member).unwrap();
    store.delete_member(&member.id).unwrap();

    assert!(store.list_members().unwrap().is_empty());
    assert!(matches!(
        store.get_member(&member.id),
        Err(PlanError::MemberNotFound { .. })
    ));
    assert!(matches!(
        store.delete_member(&member.id),
        Err(PlanError::MemberNotFound { .. })
    ));

    // Re-adding under the same id works, so no orphan holiday rows remain.
    store.add_member(&member).unwrap();
    assert_eq!(store.get_member(&member.id).unwrap().holidays.len(), 2);
}

/// Bulk replace swaps the roster atomically; an invalid record aborts it.
#[test]
fn replace_members_is_all_or_nothing() {
    let store = store();
    store.add_member(&alice()).unwrap();

    let team = vec![TeamMember::new("X", 2.0), TeamMember::new("Y", 1.0)];
    store.replace_members(&team).unwrap();
    assert_eq!(store.list_members().unwrap(), team);

    let bad = vec![TeamMember::new("ok", 2.0), TeamMember::new("bad", 2.0).with_base_capacity(f64::NAN)];
    assert!(store.replace_members(&bad).is_err());
    assert_eq!(store.list_members().unwrap(), team);
}

/// Migrations can run more than once.
#[test]
fn migrate_is_idempotent() {
    let store = store();
    store.add_member(&alice()).unwrap();
    store.migrate().unwrap();
    assert_eq!(store.member_count().unwrap(), 1);
}
