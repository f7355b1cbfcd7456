//! Application-log replay and catalog reconciliation.
//!
//! The log is folded in collaborator order into one state per version: the
//! last event of a version wins, a forward run marks it applied with that
//! run's timestamp and a reverse run returns it to pending. The fold is then
//! matched against the catalog; versions the catalog no longer defines are
//! reported as missing.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::migration::{Description, Direction, LogEntry, State, Status, ValidationResult, Version};

/// Replays `entries` in the given order and keeps the last state per version.
///
/// Entries are never reordered by `applied_at`; a clock that went backwards
/// does not change which event is last.
pub fn fold_log(entries: &[LogEntry]) -> HashMap<Version, State> {
    let mut states = HashMap::with_capacity(entries.len());
    for entry in entries {
        let (status, applied_at) = match entry.direction {
            Direction::Up => (Status::Applied, Some(entry.applied_at)),
            Direction::Down => (Status::Pending, None),
        };

        states.insert(
            entry.version(),
            State::new(
                Description::new(entry.migration.clone(), false),
                status,
                applied_at,
            ),
        );
    }
    states
}

/// Reconciles a version-sorted catalog against the application log.
///
/// Catalog versions take their status from the fold, or stay pending when
/// never logged, and keep the catalog's `can_undo`. Logged versions absent
/// from the catalog are always [`Status::Missing`] with `can_undo` cleared,
/// whatever their last event was.
pub fn reconcile(catalog: &[Description], log: &[LogEntry]) -> ValidationResult {
    let folded = fold_log(log);
    let mut result = ValidationResult::default();

    let mut states = Vec::with_capacity(catalog.len());
    for description in catalog {
        let (status, applied_at) = match folded.get(&description.version()) {
            Some(state) => (state.status, state.applied_at),
            None => (Status::Pending, None),
        };

        if status == Status::Pending {
            result.pending_count += 1;
        } else {
            result.applied_count += 1;
        }

        states.push(State::new(description.clone(), status, applied_at));
    }

    let defined: HashSet<Version> = catalog.iter().map(Description::version).collect();
    for (version, state) in folded {
        if defined.contains(&version) {
            continue;
        }

        log::warn!(
            "Migration {} is recorded in the log but no longer defined",
            state.description.migration
        );
        let mut description = state.description;
        description.can_undo = false;
        states.push(State::new(description, Status::Missing, state.applied_at));
        result.missing_count += 1;
    }

    result.migrations = states.into_iter().sorted_by_key(State::version).collect();

    log::debug!(
        "Reconciled {} migrations: {} applied, {} pending, {} missing",
        result.migrations.len(),
        result.applied_count,
        result.pending_count,
        result.missing_count
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::Migration;
    use chrono::{DateTime, TimeZone, Utc};

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn migration(version: Version, name: &str) -> Migration {
        Migration::new(version, name)
    }

    fn description(version: Version, name: &str, can_undo: bool) -> Description {
        Description::new(migration(version, name), can_undo)
    }

    fn up(version: Version, name: &str, secs: i64) -> LogEntry {
        LogEntry::new(migration(version, name), Direction::Up, at(secs))
    }

    fn down(version: Version, name: &str, secs: i64) -> LogEntry {
        LogEntry::new(migration(version, name), Direction::Down, at(secs))
    }

    fn catalog() -> Vec<Description> {
        vec![
            description(20210124131258, "initial_structure", true),
            description(20210124132201, "indexes", true),
            description(20210608080143, "sessions_table", true),
            description(20210608080148, "sessions_table_indexes", false),
        ]
    }

    #[test]
    fn test_empty_catalog_and_log() {
        let result = reconcile(&[], &[]);
        assert_eq!(result, ValidationResult::default());
        assert!(result.migrations.is_empty());
    }

    #[test]
    fn test_unlogged_migrations_are_pending() {
        let catalog = catalog();
        let result = reconcile(&catalog[..2], &[]);

        assert_eq!(
            result.migrations,
            vec![
                State::new(catalog[0].clone(), Status::Pending, None),
                State::new(catalog[1].clone(), Status::Pending, None),
            ]
        );
        assert_eq!(result.pending_count, 2);
        assert_eq!(result.applied_count, 0);
        assert_eq!(result.missing_count, 0);
    }

    #[test]
    fn test_last_event_wins_over_earlier_ones() {
        let log = vec![
            up(20210124131258, "initial_structure", 100),
            down(20210124131258, "initial_structure", 200),
            up(20210124131258, "initial_structure", 300),
        ];
        let folded = fold_log(&log);
        let state = &folded[&20210124131258];
        assert_eq!(state.status, Status::Applied);
        assert_eq!(state.applied_at, Some(at(300)));
    }

    #[test]
    fn test_revert_clears_timestamp() {
        let log = vec![
            up(20210124131258, "initial_structure", 100),
            down(20210124131258, "initial_structure", 200),
        ];
        let result = reconcile(&catalog()[..1], &log);
        assert_eq!(result.migrations[0].status, Status::Pending);
        assert_eq!(result.migrations[0].applied_at, None);
        assert_eq!(result.pending_count, 1);
    }

    #[test]
    fn test_replay_follows_log_order_not_timestamps() {
        // the revert was recorded last even though its clock reads earlier
        let log = vec![
            up(20210124131258, "initial_structure", 500),
            down(20210124131258, "initial_structure", 100),
        ];
        let folded = fold_log(&log);
        assert_eq!(folded[&20210124131258].status, Status::Pending);
    }

    #[test]
    fn test_fold_clears_can_undo() {
        let folded = fold_log(&[up(1, "a", 1)]);
        assert!(!folded[&1].description.can_undo);
    }

    #[test]
    fn test_catalog_can_undo_is_kept_for_applied() {
        let log = vec![up(20210124131258, "initial_structure", 100)];
        let result = reconcile(&catalog()[..1], &log);
        assert!(result.migrations[0].description.can_undo);
        assert_eq!(result.applied_count, 1);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let catalog = vec![description(1, "first", true), description(2, "second", false)];
        let log = vec![up(1, "first", 100), up(3, "third", 200)];

        let result = reconcile(&catalog, &log);

        assert_eq!(
            result.migrations,
            vec![
                State::new(catalog[0].clone(), Status::Applied, Some(at(100))),
                State::new(catalog[1].clone(), Status::Pending, None),
                State::new(description(3, "third", false), Status::Missing, Some(at(200))),
            ]
        );
        assert_eq!(result.applied_count, 1);
        assert_eq!(result.pending_count, 1);
        assert_eq!(result.missing_count, 1);
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_orphan_reverted_last_is_still_missing() {
        let log = vec![up(7, "gone", 100), down(7, "gone", 200)];
        let result = reconcile(&[], &log);

        assert_eq!(
            result.migrations,
            vec![State::new(description(7, "gone", false), Status::Missing, None)]
        );
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.pending_count, 0);
        assert_eq!(result.applied_count, 0);
    }

    #[test]
    fn test_orphans_are_interleaved_by_version() {
        let catalog = vec![description(20, "b", false), description(40, "d", false)];
        let log = vec![
            up(50, "e", 5),
            up(10, "a", 1),
            up(40, "d", 4),
            up(30, "c", 3),
        ];

        let result = reconcile(&catalog, &log);
        let versions: Vec<(Version, Status)> = result
            .migrations
            .iter()
            .map(|s| (s.version(), s.status))
            .collect();
        assert_eq!(
            versions,
            vec![
                (10, Status::Missing),
                (20, Status::Pending),
                (30, Status::Missing),
                (40, Status::Applied),
                (50, Status::Missing),
            ]
        );
        assert_eq!(result.missing_count, 3);
    }

    #[test]
    fn test_orphan_keeps_logged_name() {
        let log = vec![up(20211224091800, "add_users_table", 1)];
        let result = reconcile(&[], &log);
        assert_eq!(result.migrations[0].description.name(), "add_users_table");
    }

    #[test]
    fn test_full_history_over_catalog() {
        let catalog = catalog();
        let log = vec![
            up(20210124131258, "initial_structure", 100),
            up(20210124132201, "indexes", 110),
            up(20210608080143, "sessions_table", 120),
            down(20210608080143, "sessions_table", 130),
            up(20200101000000, "legacy", 50),
        ];

        let result = reconcile(&catalog, &log);

        assert_eq!(result.migrations.len(), 5);
        assert_eq!(result.applied_count, 2);
        assert_eq!(result.pending_count, 2);
        assert_eq!(result.missing_count, 1);
        assert_eq!(result.migrations[0].version(), 20200101000000);
        assert_eq!(result.migrations[0].status, Status::Missing);
        assert_eq!(
            result.get(20210608080143).map(|s| s.status),
            Some(Status::Pending)
        );
        assert_eq!(
            result.get(20210124132201).and_then(|s| s.applied_at),
            Some(at(110))
        );
    }
}
