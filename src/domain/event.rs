//! Typed container state report decoded from the event stream.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotations::Annotations;
use super::id::{ContainerId, TaskId};
use super::phase::Phase;
use crate::error::Error;

/// Workload category of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    StatelessService,
    Addon,
    Job,
}

impl ServiceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatelessService => "stateless-service",
            Self::Addon => "addon",
            Self::Job => "job",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stateless-service" => Ok(Self::StatelessService),
            "addon" => Ok(Self::Addon),
            "job" => Ok(Self::Job),
            other => Err(Error::Parse(format!("unknown service type '{other}'"))),
        }
    }
}

/// Descriptive classification carried by some events.
///
/// `None` means the event did not carry the key, so the stored value is left
/// untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub service_type: ServiceType,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub application_id: Option<String>,
    pub application_name: Option<String>,
    pub runtime_id: Option<String>,
    pub runtime_name: Option<String>,
    pub service_name: Option<String>,
    pub workspace: Option<String>,
    pub addon_id: Option<String>,
}

/// A single container state report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerEvent {
    pub container_id: ContainerId,
    pub task_id: TaskId,
    /// Raw status as reported by the runtime.
    pub status: String,
    /// Phase proposed by this report.
    pub phase: Phase,
    pub cluster: String,
    pub host_ip: String,
    pub container_ip: String,
    pub image: String,
    /// CPU limit in cores, rounded to two decimals.
    pub cpu_limit: f64,
    /// Memory limit in MiB.
    pub mem_limit: i64,
    pub exit_code: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when the container belongs to an externally-managed group.
    pub managed_group: Option<String>,
    pub classification: Classification,
    pub annotations: Annotations,
}

impl ContainerEvent {
    /// Build an event from the minimal required identity and status.
    ///
    /// Phase is derived from the status; an externally-managed group turns a
    /// `Running` proposal into `Healthy` because its manager never emits
    /// separate health signals.
    pub fn new(
        container_id: impl Into<ContainerId>,
        task_id: impl Into<TaskId>,
        status: impl Into<String>,
    ) -> Self {
        let status = status.into();
        Self {
            container_id: container_id.into(),
            task_id: task_id.into(),
            phase: Phase::from_status(&status),
            status,
            cluster: String::new(),
            host_ip: String::new(),
            container_ip: String::new(),
            image: String::new(),
            cpu_limit: 0.0,
            mem_limit: 0,
            exit_code: 0,
            started_at: None,
            finished_at: None,
            managed_group: None,
            classification: Classification::default(),
            annotations: Annotations::new(),
        }
    }

    /// Mark the container as belonging to an externally-managed group.
    #[must_use]
    pub fn with_managed_group(mut self, group: impl Into<String>) -> Self {
        self.managed_group = Some(group.into());
        if self.phase == Phase::Running {
            self.phase = Phase::Healthy;
        }
        self
    }

    #[must_use]
    pub fn is_managed_group(&self) -> bool {
        self.managed_group.is_some()
    }
}
