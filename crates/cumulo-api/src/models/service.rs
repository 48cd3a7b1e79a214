//! Service resource schema and its nested mutable details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of workload a service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// HTTP service with a public endpoint.
    WebService,
    /// Service reachable only inside its private network.
    PrivateService,
    /// Long-running worker with no endpoint.
    BackgroundWorker,
    /// Scheduled job.
    CronJob,
    /// Static site served from a CDN.
    StaticSite,
}

/// Whether a service is currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendState {
    Suspended,
    NotSuspended,
}

/// A service as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Opaque ID assigned by the control plane.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Workload kind.
    #[serde(rename = "type")]
    pub kind: ServiceKind,

    /// The environment this service belongs to, if any. A service belongs
    /// to at most one environment at a time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,

    /// Suspension state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<SuspendState>,

    /// Number of running instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_instances: Option<i32>,

    /// Container image path, for image-backed services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Repository branch, for repo-backed services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Attached persistent disk, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<Disk>,

    /// Autoscaling policy, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<Autoscaling>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating a service (POST /services).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ServiceKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_instances: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl CreateService {
    /// Create a minimal request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ServiceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            environment_id: None,
            num_instances: None,
            image_path: None,
            branch: None,
            build_command: None,
            start_command: None,
            plan: None,
        }
    }
}

/// Base-field patch body (PATCH /services/:id). Every field is optional;
/// absent fields are left untouched by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_path: Option<String>,
}

impl ServicePatch {
    /// Whether the patch carries any field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Instance-count scale body (POST /services/:id/scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    pub num_instances: i32,
}

/// Autoscaling policy (PUT /services/:id/autoscaling to upsert,
/// DELETE to remove).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autoscaling {
    pub enabled: bool,
    pub min: i32,
    pub max: i32,
    pub criteria: AutoscalingCriteria,
}

/// Utilization targets that drive scaling decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingCriteria {
    /// Target CPU utilization percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percentage: Option<i32>,

    /// Target memory utilization percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_percentage: Option<i32>,
}

/// Attached persistent disk detail as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    /// Opaque disk ID assigned by the control plane.
    pub id: String,
    pub name: String,
    pub size_gb: i32,
    pub mount_path: String,
}

/// Disk create/patch body. Create is scoped to a service
/// (POST /disks with `serviceId`); patch addresses the disk ID directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub name: String,
    pub size_gb: i32,
    pub mount_path: String,
}

/// One environment variable in a full-replace payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One secret file in a full-replace payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretFile {
    pub name: String,
    pub content: String,
}

/// A custom domain attached to a service. Domains are reconciled as an
/// identifier set keyed by `name`; the control plane addresses them by
/// name, never by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Which deploy outcomes trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifySetting {
    /// Inherit the account-level setting.
    Default,
    None,
    Failure,
    All,
}

/// Per-service notification override
/// (PATCH /services/:id/notification-override).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_notifications_enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_to_send: Option<NotifySetting>,
}
