//! Deploy history entries and their status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a deploy as reported by the control plane.
///
/// Build, pre-deploy, and update phases each have independent limits on the
/// remote side, so a deploy can sit in any in-progress status for a long
/// time before reaching a terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStatus {
    Created,
    BuildInProgress,
    PreDeployInProgress,
    UpdateInProgress,
    Live,
    Deactivated,
    BuildFailed,
    PreDeployFailed,
    UpdateFailed,
    Canceled,
}

impl DeployStatus {
    /// Whether this status is terminal (the deploy will not change again).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.is_live() || self.is_failure()
    }

    /// Whether the deploy reached its one successful terminal status.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, DeployStatus::Live)
    }

    /// Whether the deploy reached a terminal failure status.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            DeployStatus::BuildFailed
                | DeployStatus::PreDeployFailed
                | DeployStatus::UpdateFailed
                | DeployStatus::Canceled
                | DeployStatus::Deactivated
        )
    }

    /// Wire name of the status, for error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeployStatus::Created => "created",
            DeployStatus::BuildInProgress => "build_in_progress",
            DeployStatus::PreDeployInProgress => "pre_deploy_in_progress",
            DeployStatus::UpdateInProgress => "update_in_progress",
            DeployStatus::Live => "live",
            DeployStatus::Deactivated => "deactivated",
            DeployStatus::BuildFailed => "build_failed",
            DeployStatus::PreDeployFailed => "pre_deploy_failed",
            DeployStatus::UpdateFailed => "update_failed",
            DeployStatus::Canceled => "canceled",
        }
    }
}

/// One entry in a service's deploy history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deploy {
    /// Opaque deploy ID assigned by the control plane.
    pub id: String,

    pub status: DeployStatus,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Body for triggering a new deploy (POST /services/:id/deploys).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployTrigger {
    /// Skip the build cache for this deploy.
    #[serde(default)]
    pub clear_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeployStatus::PreDeployInProgress).unwrap(),
            "\"pre_deploy_in_progress\""
        );
        let status: DeployStatus = serde_json::from_str("\"build_failed\"").unwrap();
        assert_eq!(status, DeployStatus::BuildFailed);
    }

    #[test]
    fn test_status_classification() {
        assert!(DeployStatus::Live.is_live());
        assert!(DeployStatus::Live.is_terminal());
        assert!(!DeployStatus::Live.is_failure());

        for failure in [
            DeployStatus::BuildFailed,
            DeployStatus::PreDeployFailed,
            DeployStatus::UpdateFailed,
            DeployStatus::Canceled,
            DeployStatus::Deactivated,
        ] {
            assert!(failure.is_failure(), "{failure:?} should be a failure");
            assert!(failure.is_terminal());
            assert!(!failure.is_live());
        }

        for in_progress in [
            DeployStatus::Created,
            DeployStatus::BuildInProgress,
            DeployStatus::PreDeployInProgress,
            DeployStatus::UpdateInProgress,
        ] {
            assert!(
                !in_progress.is_terminal(),
                "{in_progress:?} should not be terminal"
            );
        }
    }

    #[test]
    fn test_deploy_deserializes_from_wire_shape() {
        let deploy: Deploy = serde_json::from_value(serde_json::json!({
            "id": "dep-1",
            "status": "update_in_progress",
            "createdAt": "2025-06-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(deploy.status, DeployStatus::UpdateInProgress);
        assert!(deploy.finished_at.is_none());
    }
}
