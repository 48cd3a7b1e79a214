//! Deploy-completion waiter.
//!
//! A specialization of the [`Poller`]: probe the service's deploy
//! history, pick the most recently created deploy, and classify its
//! status. Build, pre-deploy, and update phases each have independent
//! multi-minute-to-hour limits on the control plane, so the default
//! timeout is hours-scale.

use crate::error::{ReconcileError, ReconcileResult};
use crate::poll::Poller;
use cumulo_client::ApiClient;
use std::time::Duration;
use tracing::debug;

/// Default ceiling for waiting on a deploy to go live.
pub const DEFAULT_DEPLOY_TIMEOUT: Duration = Duration::from_secs(3 * 60 * 60);

/// Block until the most recent deploy of `service_id` goes live.
///
/// An empty deploy history means the deploy has not started yet and keeps
/// the wait going; a terminal failure status stops it with
/// [`ReconcileError::DeployFailed`].
pub async fn wait_for_live(
    client: &ApiClient,
    poller: &Poller,
    service_id: &str,
    timeout: Duration,
) -> ReconcileResult<()> {
    let waiting_for = format!("deploy of {service_id} to go live");

    poller
        .wait(&waiting_for, timeout, move || {
            let client = client;
            async move {
                let deploys = client.list_deploys(service_id).await?;

                let newest = match deploys.iter().max_by_key(|d| d.created_at) {
                    Some(deploy) => deploy,
                    None => {
                        debug!(service_id = %service_id, "no deploys yet");
                        return Ok(false);
                    }
                };

                if newest.status.is_live() {
                    return Ok(true);
                }
                if newest.status.is_failure() {
                    return Err(ReconcileError::DeployFailed {
                        deploy_id: newest.id.clone(),
                        status: newest.status.as_str(),
                    });
                }

                debug!(
                    service_id = %service_id,
                    deploy_id = %newest.id,
                    status = newest.status.as_str(),
                    "deploy still in progress"
                );
                Ok(false)
            }
        })
        .await
}
