//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::instances;

/// Database row for an instance (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = instances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstanceRow {
    pub id: i64,
    pub container_id: String,
    pub task_id: String,
    pub cluster: String,
    pub host_ip: String,
    pub container_ip: String,
    pub image: String,
    pub cpu_limit: f64,
    pub mem_limit: i64,
    pub exit_code: i32,
    pub phase: String,
    pub meta: String,
    pub service_type: String,
    pub org_id: String,
    pub project_id: String,
    pub project_name: String,
    pub application_id: String,
    pub application_name: String,
    pub runtime_id: String,
    pub runtime_name: String,
    pub service_name: String,
    pub workspace: String,
    pub addon_id: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub updated_at: String,
}

/// Column values written on insert and update.
///
/// `id` is never part of the write set; SQLite assigns it on insert.
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = instances)]
#[diesel(treat_none_as_null = true)]
pub struct InstanceWrite {
    pub container_id: String,
    pub task_id: String,
    pub cluster: String,
    pub host_ip: String,
    pub container_ip: String,
    pub image: String,
    pub cpu_limit: f64,
    pub mem_limit: i64,
    pub exit_code: i32,
    pub phase: String,
    pub meta: String,
    pub service_type: String,
    pub org_id: String,
    pub project_id: String,
    pub project_name: String,
    pub application_id: String,
    pub application_name: String,
    pub runtime_id: String,
    pub runtime_name: String,
    pub service_name: String,
    pub workspace: String,
    pub addon_id: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub updated_at: String,
}
