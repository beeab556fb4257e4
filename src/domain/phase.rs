//! Instance lifecycle phases and the transition rules between them.
//!
//! ```text
//!            Healthy/Unhealthy override Running
//!   Running ─────────────┬───────────────► Healthy ◄──► Unhealthy
//!      │                 │                    │             │
//!      └─────────────────┴──────► Dead ◄──────┴─────────────┘
//!                               (absorbing)
//! ```
//!
//! The transition table is a pure function; there is no shared state to
//! synchronize.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle phase of a tracked instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Container started; no health signal yet.
    Running,
    /// Health check passed.
    Healthy,
    /// Health check failed, or the runtime reported a status we do not know.
    Unhealthy,
    /// Terminal. Never left once reached.
    Dead,
}

impl Phase {
    /// All phases, in declaration order.
    pub const ALL: [Self; 4] = [Self::Running, Self::Healthy, Self::Unhealthy, Self::Dead];

    /// Map a raw runtime status to a phase.
    ///
    /// Unrecognized codes map to [`Phase::Unhealthy`] so they never mask a
    /// real problem behind a healthy-looking `Running`.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "Starting" => Self::Running,
            "Healthy" => Self::Healthy,
            "Killed" | "Stopped" | "OOM" => Self::Dead,
            _ => Self::Unhealthy,
        }
    }

    /// Resolve the phase that results from proposing `proposed` while in `self`.
    ///
    /// | current \ proposed | Running   | Healthy | Unhealthy | Dead |
    /// |--------------------|-----------|---------|-----------|------|
    /// | Running            | Running   | Healthy | Unhealthy | Dead |
    /// | Healthy            | Healthy   | Healthy | Unhealthy | Dead |
    /// | Unhealthy          | Unhealthy | Healthy | Unhealthy | Dead |
    /// | Dead               | Dead      | Dead    | Dead      | Dead |
    #[must_use]
    pub const fn resolve(self, proposed: Self) -> Self {
        match (self, proposed) {
            (Self::Dead, _) | (_, Self::Dead) => Self::Dead,
            (current, Self::Running) => current,
            (_, proposed) => proposed,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Healthy => "Healthy",
            Self::Unhealthy => "UnHealthy",
            Self::Dead => "Dead",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Running" => Ok(Self::Running),
            "Healthy" => Ok(Self::Healthy),
            "UnHealthy" | "Unhealthy" => Ok(Self::Unhealthy),
            "Dead" => Ok(Self::Dead),
            other => Err(Error::Parse(format!("unknown instance phase '{other}'"))),
        }
    }
}
