use std::sync::Arc;

use instance_sync::adapter::outbound::sqlite::database::connection::{
    create_pool, enable_wal, run_migrations, DbPool,
};
use instance_sync::adapter::outbound::sqlite::SqliteInstanceStore;
use tempfile::TempDir;

/// Temporary SQLite database for integration tests.
///
/// The file lives in its own directory, removed on drop.
pub struct TempDb {
    _dir: TempDir,
    path: String,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("instance-sync-{name}-"))
            .tempdir()
            .expect("create temp dir");
        let path = dir.path().join("instances.db").display().to_string();

        let pool = create_pool(&path).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        enable_wal(&pool).expect("enable WAL mode");

        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn store(&self) -> Arc<SqliteInstanceStore> {
        Arc::new(SqliteInstanceStore::new(self.pool.clone()))
    }
}
