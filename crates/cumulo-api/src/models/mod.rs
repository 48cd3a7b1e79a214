//! Control-plane schema models for API requests and responses.

pub mod deploy;
pub mod environment;
pub mod response;
pub mod service;

pub use deploy::{Deploy, DeployStatus, DeployTrigger};
pub use environment::{EnvGroup, Environment, ResourceIds};
pub use response::ErrorBody;
pub use service::{
    Autoscaling, AutoscalingCriteria, CreateService, CustomDomain, Disk, DiskInput, EnvVar,
    NotifySetting, NotificationOverride, Scale, SecretFile, Service, ServiceKind, ServicePatch,
    SuspendState,
};
