//! Environment membership transitions.
//!
//! A resource belongs to at most one environment at a time, and the
//! control plane has no atomic move: it rejects dual membership even
//! transiently. A move is therefore a remove that must be acknowledged
//! before the add is attempted.

use crate::diff;
use cumulo_api::ResourceIds;
use cumulo_client::{ApiClient, ApiResult};
use tracing::{info, warn};

/// One environment membership operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentOp {
    /// Remove the resource from this environment.
    Remove { environment_id: String },
    /// Add the resource to this environment.
    Add { environment_id: String },
}

/// Convert a (previous, desired) environment pair into the membership
/// operations to execute, in order.
///
/// Four cases: both absent or equal is a no-op; desired-only is a join;
/// previous-only is a leave; two different environments is a leave
/// followed by a join.
#[must_use]
pub fn resolve_transition(previous: Option<&str>, desired: Option<&str>) -> Vec<EnvironmentOp> {
    match (previous, desired) {
        (None, None) => Vec::new(),
        (Some(prev), Some(want)) if prev == want => Vec::new(),
        (Some(prev), None) => vec![EnvironmentOp::Remove {
            environment_id: prev.to_string(),
        }],
        (None, Some(want)) => vec![EnvironmentOp::Add {
            environment_id: want.to_string(),
        }],
        (Some(prev), Some(want)) => vec![
            EnvironmentOp::Remove {
                environment_id: prev.to_string(),
            },
            EnvironmentOp::Add {
                environment_id: want.to_string(),
            },
        ],
    }
}

/// Execute a membership transition for one resource.
///
/// Operations run sequentially: on a move, the add is only attempted
/// after the remove succeeds. If the add then fails, the resource is left
/// without an environment and the error surfaces — no attempt is made to
/// rejoin the original environment.
pub async fn apply_transition(
    client: &ApiClient,
    resource_id: &str,
    previous: Option<&str>,
    desired: Option<&str>,
) -> ApiResult<()> {
    for op in resolve_transition(previous, desired) {
        match op {
            EnvironmentOp::Remove { environment_id } => {
                client
                    .remove_environment_resources(&environment_id, &[resource_id.to_string()])
                    .await?;
                info!(
                    resource_id = %resource_id,
                    environment_id = %environment_id,
                    "removed resource from environment"
                );
            }
            EnvironmentOp::Add { environment_id } => {
                client
                    .add_environment_resources(&environment_id, &ResourceIds::one(resource_id))
                    .await?;
                info!(
                    resource_id = %resource_id,
                    environment_id = %environment_id,
                    "added resource to environment"
                );
            }
        }
    }
    Ok(())
}

/// Reconcile the set of services linked to an env group.
///
/// Links are an unordered identifier set; an unlink of an already-absent
/// link is treated as success.
pub async fn sync_env_group_links(
    client: &ApiClient,
    env_group_id: &str,
    desired: &[String],
    observed: &[String],
) -> ApiResult<()> {
    let changes = diff::diff(desired, observed);

    for service_id in &changes.to_add {
        client.link_env_group_service(env_group_id, service_id).await?;
        info!(
            env_group_id = %env_group_id,
            service_id = %service_id,
            "linked service to env group"
        );
    }

    for service_id in &changes.to_remove {
        match client
            .unlink_env_group_service(env_group_id, service_id)
            .await
        {
            Ok(()) => {
                info!(
                    env_group_id = %env_group_id,
                    service_id = %service_id,
                    "unlinked service from env group"
                );
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    env_group_id = %env_group_id,
                    service_id = %service_id,
                    "link already absent, nothing to unlink"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
