//! The canonical instance record and how a state report is folded into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotations::Annotations;
use super::event::{ContainerEvent, ServiceType};
use super::id::{ContainerId, InstanceId, TaskId};
use super::phase::Phase;

/// A tracked execution of a container for a scheduled task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Store-assigned identity; [`InstanceId::UNASSIGNED`] until persisted.
    pub id: InstanceId,
    pub container_id: ContainerId,
    pub task_id: TaskId,
    pub cluster: String,
    pub host_ip: String,
    pub container_ip: String,
    pub image: String,
    pub cpu_limit: f64,
    pub mem_limit: i64,
    pub exit_code: i32,
    /// First observed start time. Never overwritten once set.
    pub started_at: Option<DateTime<Utc>>,
    /// Set once the instance is dead and a finish time was reported.
    pub finished_at: Option<DateTime<Utc>>,
    pub phase: Phase,
    pub meta: Annotations,
    pub service_type: ServiceType,
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
}

impl InstanceRecord {
    /// Build an unpersisted record from the first report seen for a task.
    ///
    /// The initial phase is taken from the report as-is.
    #[must_use]
    pub fn observe(event: &ContainerEvent) -> Self {
        let mut record = Self {
            id: InstanceId::UNASSIGNED,
            container_id: event.container_id.clone(),
            task_id: event.task_id.clone(),
            cluster: String::new(),
            host_ip: String::new(),
            container_ip: String::new(),
            image: String::new(),
            cpu_limit: 0.0,
            mem_limit: 0,
            exit_code: 0,
            started_at: None,
            finished_at: None,
            phase: event.phase,
            meta: Annotations::new(),
            service_type: ServiceType::default(),
            org_id: String::new(),
            project_id: String::new(),
            project_name: String::new(),
            application_id: String::new(),
            application_name: String::new(),
            runtime_id: String::new(),
            runtime_name: String::new(),
            service_name: String::new(),
            workspace: String::new(),
            addon_id: String::new(),
        };
        record.overwrite_fields(event);
        if record.phase.is_terminal() {
            record.finished_at = event.finished_at;
        }
        record
    }

    /// Fold a subsequent report into this record.
    ///
    /// Applying the same report twice yields the same record.
    pub fn apply(&mut self, event: &ContainerEvent) {
        let previous = self.phase;
        self.phase = previous.resolve(event.phase);
        self.overwrite_fields(event);

        if self.phase.is_terminal() && self.finished_at.is_none() {
            self.finished_at = event.finished_at;
        }
    }

    fn overwrite_fields(&mut self, event: &ContainerEvent) {
        self.container_id = event.container_id.clone();
        self.task_id = event.task_id.clone();
        self.cluster.clone_from(&event.cluster);
        self.host_ip.clone_from(&event.host_ip);
        self.container_ip.clone_from(&event.container_ip);
        self.image.clone_from(&event.image);
        self.cpu_limit = event.cpu_limit;
        self.mem_limit = event.mem_limit;
        self.exit_code = event.exit_code;

        if self.started_at.is_none() {
            self.started_at = event.started_at;
        }

        self.meta.merge(&event.annotations);

        let class = &event.classification;
        self.service_type = class.service_type;
        overwrite(&mut self.org_id, &class.org_id);
        overwrite(&mut self.project_id, &class.project_id);
        overwrite(&mut self.project_name, &class.project_name);
        overwrite(&mut self.application_id, &class.application_id);
        overwrite(&mut self.application_name, &class.application_name);
        overwrite(&mut self.runtime_id, &class.runtime_id);
        overwrite(&mut self.runtime_name, &class.runtime_name);
        overwrite(&mut self.service_name, &class.service_name);
        overwrite(&mut self.workspace, &class.workspace);
        overwrite(&mut self.addon_id, &class.addon_id);
    }
}

fn overwrite(slot: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        slot.clone_from(value);
    }
}
