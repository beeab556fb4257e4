//! SQLite instance store implementation.
//!
//! Provides persistent storage for instance records using SQLite and Diesel
//! ORM. Annotations are stored in their legacy comma-joined form and
//! timestamps as fixed-width RFC 3339 text, so lexical order is time order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{InstanceRow, InstanceWrite};
use crate::adapter::outbound::sqlite::database::schema::instances;
use crate::domain::{Annotations, ContainerId, InstanceId, InstanceRecord, TaskId};
use crate::error::{Error, Result};
use crate::port::outbound::store::InstanceStore;

/// SQLite-backed instance store.
///
/// Each operation runs on its own pooled connection and is atomic on its
/// own; SQLite's write lock serializes a concurrent GC delete against an
/// in-flight update.
#[derive(Clone)]
pub struct SqliteInstanceStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteInstanceStore {
    /// Create a new SQLite instance store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn to_write(record: &InstanceRecord, updated_at: DateTime<Utc>) -> InstanceWrite {
        InstanceWrite {
            container_id: record.container_id.as_str().to_string(),
            task_id: record.task_id.as_str().to_string(),
            cluster: record.cluster.clone(),
            host_ip: record.host_ip.clone(),
            container_ip: record.container_ip.clone(),
            image: record.image.clone(),
            cpu_limit: record.cpu_limit,
            mem_limit: record.mem_limit,
            exit_code: record.exit_code,
            phase: record.phase.as_str().to_string(),
            meta: record.meta.to_legacy(),
            service_type: record.service_type.as_str().to_string(),
            org_id: record.org_id.clone(),
            project_id: record.project_id.clone(),
            project_name: record.project_name.clone(),
            application_id: record.application_id.clone(),
            application_name: record.application_name.clone(),
            runtime_id: record.runtime_id.clone(),
            runtime_name: record.runtime_name.clone(),
            service_name: record.service_name.clone(),
            workspace: record.workspace.clone(),
            addon_id: record.addon_id.clone(),
            started_at: record.started_at.map(format_timestamp),
            finished_at: record.finished_at.map(format_timestamp),
            updated_at: format_timestamp(updated_at),
        }
    }

    fn from_row(row: InstanceRow) -> Result<InstanceRecord> {
        Ok(InstanceRecord {
            id: InstanceId::new(row.id),
            container_id: ContainerId::from(row.container_id),
            task_id: TaskId::from(row.task_id),
            cluster: row.cluster,
            host_ip: row.host_ip,
            container_ip: row.container_ip,
            image: row.image,
            cpu_limit: row.cpu_limit,
            mem_limit: row.mem_limit,
            exit_code: row.exit_code,
            started_at: row.started_at.as_deref().map(parse_timestamp).transpose()?,
            finished_at: row.finished_at.as_deref().map(parse_timestamp).transpose()?,
            phase: row.phase.parse()?,
            meta: Annotations::parse_legacy(&row.meta),
            service_type: row.service_type.parse()?,
            org_id: row.org_id,
            project_id: row.project_id,
            project_name: row.project_name,
            application_id: row.application_id,
            application_name: row.application_name,
            runtime_id: row.runtime_id,
            runtime_name: row.runtime_name,
            service_name: row.service_name,
            workspace: row.workspace,
            addon_id: row.addon_id,
        })
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}

impl InstanceStore for SqliteInstanceStore {
    async fn find_by_task(&self, task_id: &TaskId) -> Result<Vec<InstanceRecord>> {
        let mut conn = self.connection()?;

        let rows: Vec<InstanceRow> = instances::table
            .filter(instances::task_id.eq(task_id.as_str()))
            .order(instances::id.asc())
            .select(InstanceRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn find_by_container(
        &self,
        namespace: &TaskId,
        container_id: &ContainerId,
    ) -> Result<Vec<InstanceRecord>> {
        let mut conn = self.connection()?;

        let rows: Vec<InstanceRow> = instances::table
            .filter(instances::task_id.eq(namespace.as_str()))
            .filter(instances::container_id.eq(container_id.as_str()))
            .order(instances::id.asc())
            .select(InstanceRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn get(&self, id: InstanceId) -> Result<Option<InstanceRecord>> {
        let mut conn = self.connection()?;

        let row: Option<InstanceRow> = instances::table
            .find(id.get())
            .select(InstanceRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Self::from_row).transpose()
    }

    async fn create(&self, record: &InstanceRecord) -> Result<InstanceRecord> {
        let write = Self::to_write(record, Utc::now());
        let mut conn = self.connection()?;

        let id = conn
            .immediate_transaction::<i64, diesel::result::Error, _>(|conn| {
                diesel::insert_into(instances::table)
                    .values(&write)
                    .execute(conn)?;
                instances::table
                    .select(instances::id)
                    .order(instances::id.desc())
                    .first(conn)
            })?;

        let mut created = record.clone();
        created.id = InstanceId::new(id);
        Ok(created)
    }

    async fn update(&self, record: &InstanceRecord) -> Result<bool> {
        let write = Self::to_write(record, Utc::now());
        let mut conn = self.connection()?;

        let updated = diesel::update(instances::table.find(record.id.get()))
            .set(&write)
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn delete(&self, ids: &[InstanceId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.connection()?;

        let deleted = diesel::delete(instances::table.filter(instances::id.eq_any(raw)))
            .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn prune_stale(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.connection()?;

        let cutoff = format_timestamp(cutoff);
        let deleted = diesel::delete(instances::table.filter(instances::updated_at.lt(&cutoff)))
            .execute(&mut conn)?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::{ContainerEvent, Phase, ServiceType};

    fn setup_store() -> SqliteInstanceStore {
        let pool = create_pool(":memory:").expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        SqliteInstanceStore::new(pool)
    }

    fn sample(container: &str, task: &str) -> InstanceRecord {
        let mut event = ContainerEvent::new(container, task, "Starting");
        event.cluster = "terminus".into();
        event.cpu_limit = 0.25;
        event.mem_limit = 256;
        event.started_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap());
        event.annotations.insert("dice_component", "ui");
        event.classification.service_type = ServiceType::Addon;
        event.classification.org_id = Some("7".into());
        InstanceRecord::observe(&event)
    }

    #[tokio::test]
    async fn create_assigns_ascending_ids() {
        let store = setup_store();

        let first = store.create(&sample("c1", "t1")).await.unwrap();
        let second = store.create(&sample("c2", "t1")).await.unwrap();

        assert!(first.id.is_assigned());
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn sqlite_instance_roundtrip() {
        let store = setup_store();
        let created = store.create(&sample("c1", "t1")).await.unwrap();

        let loaded = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(loaded, created);
        assert_eq!(loaded.meta.get("dice_component"), Some("ui"));
        assert_eq!(loaded.service_type, ServiceType::Addon);
    }

    #[tokio::test]
    async fn meta_values_with_separators_roundtrip() {
        let store = setup_store();
        let mut record = sample("c1", "t1");
        record.meta.insert("edas_app_name", "shop, east");
        record.meta.insert("selector", " tier=web ");
        let created = store.create(&record).await.unwrap();

        let loaded = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(loaded.meta, record.meta);
        assert_eq!(loaded.meta.get("edas_app_name"), Some("shop, east"));
        assert_eq!(loaded.meta.get("selector"), Some(" tier=web "));
    }

    #[tokio::test]
    async fn query_failure_surfaces_as_database_error() {
        let store = setup_store();
        let mut conn = store.connection().unwrap();
        diesel::sql_query("DROP TABLE instances").execute(&mut conn).unwrap();
        drop(conn);

        let err = store.find_by_task(&TaskId::new("t1")).await.unwrap_err();
        assert!(matches!(err, Error::Database(msg) if msg.contains("instances")));
        assert!(matches!(store.create(&sample("c1", "t1")).await, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn find_by_task_orders_by_id() {
        let store = setup_store();
        store.create(&sample("c1", "t1")).await.unwrap();
        store.create(&sample("c2", "t2")).await.unwrap();
        store.create(&sample("c3", "t1")).await.unwrap();

        let found = store.find_by_task(&TaskId::new("t1")).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].id < found[1].id);
        assert_eq!(found[0].container_id.as_str(), "c1");
    }

    #[tokio::test]
    async fn find_by_container_is_scoped_to_namespace() {
        let store = setup_store();
        store.create(&sample("c1", "K8S")).await.unwrap();
        store.create(&sample("c1", "t1")).await.unwrap();

        let k8s = store
            .find_by_container(&TaskId::new("K8S"), &ContainerId::new("c1"))
            .await
            .unwrap();
        assert_eq!(k8s.len(), 1);
        assert_eq!(k8s[0].task_id.as_str(), "K8S");

        let none = store
            .find_by_container(&TaskId::new("K8S"), &ContainerId::new("c9"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_and_reports_missing_rows() {
        let store = setup_store();
        let mut record = store.create(&sample("c1", "t1")).await.unwrap();

        record.phase = Phase::Dead;
        record.finished_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        assert!(store.update(&record).await.unwrap());
        assert_eq!(store.get(record.id).await.unwrap().unwrap(), record);

        store.delete(&[record.id]).await.unwrap();
        assert!(!store.update(&record).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_only_given_ids() {
        let store = setup_store();
        let a = store.create(&sample("c1", "t1")).await.unwrap();
        let b = store.create(&sample("c1", "t1")).await.unwrap();
        let c = store.create(&sample("c1", "t1")).await.unwrap();

        assert_eq!(store.delete(&[b.id, c.id]).await.unwrap(), 2);
        assert_eq!(store.delete(&[]).await.unwrap(), 0);

        let remaining = store.find_by_task(&TaskId::new("t1")).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, a.id);
    }

    #[tokio::test]
    async fn prune_stale_uses_last_update_time() {
        let store = setup_store();
        store.create(&sample("c1", "t1")).await.unwrap();
        store.create(&sample("c2", "t2")).await.unwrap();

        let nothing = store.prune_stale(Utc::now() - Duration::hours(4)).await.unwrap();
        assert_eq!(nothing, 0);

        let everything = store.prune_stale(Utc::now() + Duration::seconds(1)).await.unwrap();
        assert_eq!(everything, 2);
    }

    #[tokio::test]
    async fn corrupt_phase_surfaces_as_parse_error() {
        let store = setup_store();
        let created = store.create(&sample("c1", "t1")).await.unwrap();

        let mut conn = store.connection().unwrap();
        diesel::update(instances::table.find(created.id.get()))
            .set(instances::phase.eq("Zombie"))
            .execute(&mut conn)
            .unwrap();
        drop(conn);

        let result = store.get(created.id).await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
