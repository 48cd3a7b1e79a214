//! Typed wire models for the Cumulo control-plane REST API.
//!
//! This crate carries the request and response bodies the reconciliation
//! engine exchanges with the control plane: services and their nested
//! details (disk, autoscaling), deploys, environments, env groups, custom
//! domains, env vars, secret files, and notification overrides.
//!
//! Pure data: serde structs only, no I/O. Resource IDs are opaque strings
//! assigned by the control plane at creation time and are never generated
//! locally.

pub mod models;

pub use models::{
    Autoscaling, AutoscalingCriteria, CreateService, CustomDomain, Deploy, DeployStatus,
    DeployTrigger, Disk, DiskInput, EnvGroup, EnvVar, Environment, ErrorBody, NotifySetting,
    NotificationOverride, ResourceIds, Scale, SecretFile, Service, ServiceKind, ServicePatch,
    SuspendState,
};
