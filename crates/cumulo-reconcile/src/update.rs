//! Service update orchestration.
//!
//! A compound update is a fixed-order sequence of independent idempotent
//! control-plane calls. There is no rollback: a failure aborts the
//! remaining steps and surfaces the first error, leaving the service in
//! whatever partial state the completed steps produced. The control plane
//! is the durable source of truth; the caller re-runs reconciliation to
//! finish the job.

use crate::deploys::{self, DEFAULT_DEPLOY_TIMEOUT};
use crate::diff;
use crate::environment;
use crate::error::ReconcileResult;
use crate::pair::Pair;
use crate::poll::{PollConfig, Poller};
use cumulo_api::{
    Autoscaling, CreateService, Disk, DiskInput, EnvVar, NotificationOverride, SecretFile, Service,
    ServicePatch,
};
use cumulo_client::{ApiClient, ApiError};
use std::time::Duration;
use tracing::{debug, info};

/// Desired shape of a service's attached disk.
///
/// The observed side of a disk [`Pair`] carries the control-plane disk
/// ID; update and delete address that ID, add creates a new disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSpec {
    /// Control-plane disk ID. Present on the observed side only.
    pub id: Option<String>,
    pub name: String,
    pub size_gb: i32,
    pub mount_path: String,
}

impl DiskSpec {
    /// A desired disk, not yet created.
    #[must_use]
    pub fn new(name: impl Into<String>, size_gb: i32, mount_path: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            size_gb,
            mount_path: mount_path.into(),
        }
    }

    /// The observed side of the pair, from a control-plane disk detail.
    #[must_use]
    pub fn from_disk(disk: &Disk) -> Self {
        Self {
            id: Some(disk.id.clone()),
            name: disk.name.clone(),
            size_gb: disk.size_gb,
            mount_path: disk.mount_path.clone(),
        }
    }

    fn to_input(&self, service_id: Option<&str>) -> DiskInput {
        DiskInput {
            service_id: service_id.map(ToString::to_string),
            name: self.name.clone(),
            size_gb: self.size_gb,
            mount_path: self.mount_path.clone(),
        }
    }
}

/// A compound service update: the base-field patch plus observed/desired
/// pairs for every mutable sub-attribute, and optional full-replace
/// payloads for env vars and secret files (`None` leaves them untouched).
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub service_id: String,

    /// Base-field patch. An empty patch is skipped.
    pub patch: ServicePatch,

    pub num_instances: Pair<i32>,
    pub autoscaling: Pair<Autoscaling>,
    pub disk: Pair<DiskSpec>,
    pub environment: Pair<String>,
    pub notification_override: Pair<NotificationOverride>,

    /// Custom domain names, reconciled as an identifier set.
    pub custom_domains: Pair<Vec<String>>,

    pub env_vars: Option<Vec<EnvVar>>,
    pub secret_files: Option<Vec<SecretFile>>,

    /// Block until the triggered deploy goes live.
    pub wait_until_live: bool,
}

impl ServiceUpdate {
    /// An update that changes nothing but still redeploys.
    #[must_use]
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            ..Default::default()
        }
    }
}

/// Reconciles declared service state against the control plane.
pub struct Reconciler {
    client: ApiClient,
    poll_config: PollConfig,
}

impl Reconciler {
    /// Create a reconciler with the default poll intervals.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            poll_config: PollConfig::default(),
        }
    }

    /// Replace the poll configuration (tests use [`PollConfig::no_wait`]).
    #[must_use]
    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// The underlying control-plane client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn poller(&self) -> Poller {
        Poller::new(self.poll_config.clone(), self.client.cancellation())
    }

    /// Create a service. The control plane starts an initial deploy on
    /// creation; with `wait_until_live` the call blocks until that deploy
    /// reaches a terminal status.
    pub async fn create_service(
        &self,
        create: &CreateService,
        wait_until_live: bool,
    ) -> ReconcileResult<Service> {
        let service = self.client.create_service(create).await?;
        info!(service_id = %service.id, name = %service.name, "service created");

        if wait_until_live {
            self.wait_for_live(&service.id, DEFAULT_DEPLOY_TIMEOUT).await?;
        }
        Ok(service)
    }

    /// Delete a service. Deleting an already-gone service is a success.
    pub async fn delete_service(&self, service_id: &str) -> ReconcileResult<()> {
        match self.client.delete_service(service_id).await {
            Ok(()) => {
                info!(service_id = %service_id, "service deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(service_id = %service_id, "service already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a compound update in the fixed step order, then trigger a
    /// deploy and re-fetch the service.
    ///
    /// Each step runs only when its observed/desired pair differs. Steps
    /// are independent remote mutations: a failure aborts the rest and
    /// surfaces the first error, and the caller re-reads the resource to
    /// learn its true state.
    pub async fn update_service(&self, update: &ServiceUpdate) -> ReconcileResult<Service> {
        let id = update.service_id.as_str();
        info!(service_id = %id, "updating service");

        // 1. Scale before the base patch so the new count is reflected
        //    when the service is re-fetched.
        if update.num_instances.changed() {
            if let Some(count) = update.num_instances.plan {
                debug!(service_id = %id, num_instances = count, "scaling service");
                self.client.scale_service(id, count).await?;
            }
        }

        // 2. Autoscaling upsert or delete.
        if update.autoscaling.changed() {
            match update.autoscaling.plan.as_ref() {
                Some(policy) => {
                    debug!(service_id = %id, "upserting autoscaling policy");
                    self.client.put_autoscaling(id, policy).await?;
                }
                None => {
                    debug!(service_id = %id, "removing autoscaling policy");
                    match self.client.delete_autoscaling(id).await {
                        Ok(()) => {}
                        Err(e) if e.is_not_found() => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        // 3. Base-field patch.
        if !update.patch.is_empty() {
            debug!(service_id = %id, "patching base fields");
            self.client.update_service(id, &update.patch).await?;
        }

        // 4. Env var full replace.
        if let Some(env_vars) = &update.env_vars {
            debug!(service_id = %id, count = env_vars.len(), "replacing env vars");
            self.client.put_env_vars(id, env_vars).await?;
        }

        // 5. Secret file full replace.
        if let Some(files) = &update.secret_files {
            debug!(service_id = %id, count = files.len(), "replacing secret files");
            self.client.put_secret_files(id, files).await?;
        }

        // 6. Disk add / update / delete.
        if update.disk.changed() {
            self.apply_disk_change(id, &update.disk).await?;
        }

        // 7. Notification override patch.
        if update.notification_override.changed() {
            if let Some(over) = update.notification_override.plan.as_ref() {
                debug!(service_id = %id, "patching notification override");
                self.client.patch_notification_override(id, over).await?;
            }
        }

        // 8. Environment membership transition.
        if update.environment.changed() {
            environment::apply_transition(
                &self.client,
                id,
                update.environment.state.as_deref(),
                update.environment.plan.as_deref(),
            )
            .await?;
        }

        // 9. Custom domains via membership diff.
        if update.custom_domains.changed() {
            self.apply_domain_changes(id, &update.custom_domains).await?;
        }

        // 10. The control plane does not redeploy on field patches by
        //     itself, so always trigger one.
        let deploy = self.client.trigger_deploy(id).await?;
        info!(service_id = %id, deploy_id = %deploy.id, "deploy triggered");

        if update.wait_until_live {
            self.wait_for_live(id, DEFAULT_DEPLOY_TIMEOUT).await?;
        }

        let service = self.client.get_service(id).await?;
        Ok(service)
    }

    /// Reconcile the set of services linked to an env group.
    pub async fn sync_env_group_links(
        &self,
        env_group_id: &str,
        desired: &[String],
        observed: &[String],
    ) -> ReconcileResult<()> {
        environment::sync_env_group_links(&self.client, env_group_id, desired, observed).await?;
        Ok(())
    }

    /// Block until the most recent deploy of the service goes live.
    pub async fn wait_for_live(&self, service_id: &str, timeout: Duration) -> ReconcileResult<()> {
        deploys::wait_for_live(&self.client, &self.poller(), service_id, timeout).await
    }

    async fn apply_disk_change(&self, id: &str, disk: &Pair<DiskSpec>) -> ReconcileResult<()> {
        match (disk.state.as_ref(), disk.plan.as_ref()) {
            (None, Some(plan)) => {
                debug!(service_id = %id, disk = %plan.name, "attaching disk");
                self.client.create_disk(&plan.to_input(Some(id))).await?;
            }
            (Some(prev), Some(plan)) => {
                let disk_id = observed_disk_id(prev)?;
                debug!(service_id = %id, disk_id = %disk_id, "updating disk");
                self.client.update_disk(disk_id, &plan.to_input(None)).await?;
            }
            (Some(prev), None) => {
                let disk_id = observed_disk_id(prev)?;
                debug!(service_id = %id, disk_id = %disk_id, "deleting disk");
                match self.client.delete_disk(disk_id).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e.into()),
                }
            }
            // Unreachable behind `changed()`, but harmless.
            (None, None) => {}
        }
        Ok(())
    }

    async fn apply_domain_changes(
        &self,
        id: &str,
        domains: &Pair<Vec<String>>,
    ) -> ReconcileResult<()> {
        let empty = Vec::new();
        let desired = domains.plan.as_ref().unwrap_or(&empty);
        let observed = domains.state.as_ref().unwrap_or(&empty);
        let changes = diff::diff(desired, observed);

        for name in &changes.to_add {
            debug!(service_id = %id, domain = %name, "attaching custom domain");
            self.client.create_custom_domain(id, name).await?;
        }
        for name in &changes.to_remove {
            debug!(service_id = %id, domain = %name, "detaching custom domain");
            match self.client.delete_custom_domain(id, name).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

fn observed_disk_id(spec: &DiskSpec) -> Result<&str, ApiError> {
    spec.id
        .as_deref()
        .ok_or_else(|| ApiError::invalid_config("observed disk is missing its control-plane id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_spec_from_disk_carries_the_id() {
        let disk = Disk {
            id: "dsk-1".to_string(),
            name: "data".to_string(),
            size_gb: 10,
            mount_path: "/var/data".to_string(),
        };
        let spec = DiskSpec::from_disk(&disk);
        assert_eq!(spec.id.as_deref(), Some("dsk-1"));
        assert_eq!(observed_disk_id(&spec).unwrap(), "dsk-1");
    }

    #[test]
    fn test_observed_disk_without_id_is_a_config_error() {
        let spec = DiskSpec::new("data", 10, "/var/data");
        assert!(observed_disk_id(&spec).is_err());
    }

    #[test]
    fn test_default_update_changes_nothing() {
        let update = ServiceUpdate::new("srv-1");
        assert!(!update.num_instances.changed());
        assert!(!update.autoscaling.changed());
        assert!(!update.disk.changed());
        assert!(!update.environment.changed());
        assert!(!update.custom_domains.changed());
        assert!(update.patch.is_empty());
        assert!(update.env_vars.is_none());
    }
}
