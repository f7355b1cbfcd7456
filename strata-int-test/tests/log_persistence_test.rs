use chrono::{TimeZone, Utc};
use strata::migration::{Direction, LogEntry, Migration, Status};
use strata::migration_log::MigrationLogProvider;
use strata::strata::Strata;
use strata_int_test::test_util::{cleanup, create_test_context, open_log, run_test};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn entry(version: u64, name: &str, direction: Direction, secs: i64) -> LogEntry {
    LogEntry::new(
        Migration::new(version, name),
        direction,
        Utc.timestamp_opt(secs, 0).unwrap(),
    )
}

#[test]
fn test_history_survives_reopen() {
    run_test(
        || {
            let ctx = create_test_context()?;
            ctx.write_script("V20211224081255_initial.up.hmf", "")?;
            ctx.write_script("V20211224091800_add_users_table.up.hmf", "")?;
            Ok(ctx)
        },
        |ctx| {
            let side_path = ctx.log_path().with_extension("side");
            {
                let log = open_log(&side_path)?;
                log.append(entry(20211224081255, "initial", Direction::Up, 100))?;
                log.append(entry(20211224091800, "add_users_table", Direction::Up, 200))?;
            }

            let reopened = open_log(&side_path)?;
            assert_eq!(reopened.len()?, 2);

            let result = Strata::builder()
                .migrations_dir(ctx.migrations_dir())
                .migration_log(reopened.clone())
                .open()?
                .validate()?;
            assert_eq!(result.applied_count, 2);
            assert!(result.migrations.iter().all(|s| s.status == Status::Applied));

            drop(reopened);
            std::fs::remove_dir_all(&side_path)?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replay_uses_append_order() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.write_script("V20211224081255_initial.up.hmf", "")?;
            ctx.write_script("V20211224081255_initial.down.hmf", "")?;

            // the revert was appended last although its clock reads earlier
            let log = ctx.log();
            log.append(entry(20211224081255, "initial", Direction::Up, 500))?;
            log.append(entry(20211224081255, "initial", Direction::Down, 100))?;

            let result = ctx.strata()?.validate()?;
            assert_eq!(result.migrations[0].status, Status::Pending);
            assert_eq!(result.pending_count, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_orphan_reverted_last_stays_missing() {
    run_test(
        create_test_context,
        |ctx| {
            let log = ctx.log();
            log.append(entry(20200101000000, "legacy", Direction::Up, 100))?;
            log.append(entry(20200101000000, "legacy", Direction::Down, 200))?;

            let result = ctx.strata()?.validate()?;
            assert_eq!(result.migrations.len(), 1);
            assert_eq!(result.migrations[0].status, Status::Missing);
            assert_eq!(result.migrations[0].applied_at, None);
            assert_eq!(result.missing_count, 1);
            assert_eq!(result.pending_count, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_appends_keep_every_entry() {
    run_test(
        create_test_context,
        |ctx| {
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let log = ctx.log();
                    std::thread::spawn(move || {
                        for i in 0..25u64 {
                            log.append(entry(t * 100 + i, "m", Direction::Up, i as i64))
                                .unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let entries = ctx.log().list_log()?;
            assert_eq!(entries.len(), 100);
            let result = ctx.strata()?.validate()?;
            assert_eq!(result.missing_count, 100);
            Ok(())
        },
        cleanup,
    )
}
