use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::{env, fs};

use strata::errors::StrataResult;
use strata::strata::Strata;
use strata_fjall_adapter::{FjallLogModule, FjallMigrationLog};

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test fails or panics; the failure is then
/// re-raised.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: FnOnce(TestContext) -> StrataResult<()>,
    B: FnOnce() -> StrataResult<TestContext>,
    A: FnOnce(TestContext) -> StrataResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_ctx = ctx.clone();
    let result = panic::catch_unwind(AssertUnwindSafe(move || test(test_ctx)));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(payload) => panic::resume_unwind(payload),
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A scratch migrations directory and the path of a fjall log next to it.
#[derive(Clone)]
pub struct TestContext {
    root: PathBuf,
    log: FjallMigrationLog,
}

impl TestContext {
    pub fn migrations_dir(&self) -> PathBuf {
        self.root.join("migrations")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("log")
    }

    pub fn log(&self) -> FjallMigrationLog {
        self.log.clone()
    }

    /// Writes a script into the migrations directory.
    pub fn write_script(&self, file_name: &str, content: &str) -> StrataResult<()> {
        fs::write(self.migrations_dir().join(file_name), content)?;
        Ok(())
    }

    pub fn remove_script(&self, file_name: &str) -> StrataResult<()> {
        fs::remove_file(self.migrations_dir().join(file_name))?;
        Ok(())
    }

    /// Opens a [`Strata`] over the OS file system and the context's log.
    pub fn strata(&self) -> StrataResult<Strata> {
        Strata::builder()
            .migrations_dir(self.migrations_dir())
            .migration_log(self.log())
            .open()
    }
}

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(id.to_string())
}

pub fn open_log(path: &Path) -> StrataResult<FjallMigrationLog> {
    FjallLogModule::with_config()
        .db_path(&path.to_string_lossy())
        .build()
        .open()
}

pub fn create_test_context() -> StrataResult<TestContext> {
    let root = random_path();
    fs::create_dir_all(root.join("migrations"))?;
    let log = open_log(&root.join("log"))?;
    Ok(TestContext { root, log })
}

pub fn cleanup(ctx: TestContext) -> StrataResult<()> {
    let root = ctx.root.clone();
    drop(ctx);
    if root.exists() {
        fs::remove_dir_all(&root)?;
    }
    Ok(())
}
