//! Competing ingestion paths known to the reconciler.

use crate::domain::{ContainerEvent, TaskId};
use crate::port::outbound::source::CompetingSource;

/// Task namespace under which the orchestrator path records its instances.
pub const ORCHESTRATOR_NAMESPACE: &str = "K8S";

/// The container orchestrator's own watcher.
///
/// Containers it launches report their own ID as the task ID, and they are
/// never part of a managed application group. Those events belong to the
/// orchestrator path and must not be written here.
#[derive(Debug, Clone)]
pub struct OrchestratorSource {
    namespace: TaskId,
}

impl OrchestratorSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: TaskId::new(ORCHESTRATOR_NAMESPACE),
        }
    }
}

impl Default for OrchestratorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CompetingSource for OrchestratorSource {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn namespace(&self) -> &TaskId {
        &self.namespace
    }

    fn owns(&self, event: &ContainerEvent) -> bool {
        event.task_id.as_str() == event.container_id.as_str() && !event.is_managed_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owns_self_tasked_containers() {
        let source = OrchestratorSource::new();
        assert!(source.owns(&ContainerEvent::new("pod-1", "pod-1", "Healthy")));
        assert!(!source.owns(&ContainerEvent::new("c1", "t1", "Healthy")));
    }

    #[test]
    fn managed_group_members_are_not_owned() {
        let source = OrchestratorSource::new();
        let event = ContainerEvent::new("pod-1", "pod-1", "Healthy").with_managed_group("app-1");
        assert!(!source.owns(&event));
    }

    #[test]
    fn namespace_is_orchestrator_task() {
        assert_eq!(OrchestratorSource::new().namespace().as_str(), "K8S");
    }
}
