//! Environments (resource grouping) and env groups (shared env vars).

use serde::{Deserialize, Serialize};

/// An environment groups resources inside a project. A resource belongs to
/// at most one environment at a time; the control plane rejects dual
/// membership, so moves are expressed as remove-then-add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Opaque ID assigned by the control plane.
    pub id: String,
    pub name: String,
    pub project_id: String,
}

/// A named set of env vars that services link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvGroup {
    /// Opaque ID assigned by the control plane.
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_ids: Vec<String>,
}

/// Body for environment membership operations
/// (POST /environments/:id/resources).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIds {
    pub resource_ids: Vec<String>,
}

impl ResourceIds {
    /// Build a single-resource membership payload.
    #[must_use]
    pub fn one(resource_id: impl Into<String>) -> Self {
        Self {
            resource_ids: vec![resource_id.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ids_body_shape() {
        let json = serde_json::to_value(ResourceIds::one("srv-1")).unwrap();
        assert_eq!(json, serde_json::json!({ "resourceIds": ["srv-1"] }));
    }

    #[test]
    fn test_env_group_defaults_empty_links() {
        let group: EnvGroup = serde_json::from_value(serde_json::json!({
            "id": "evg-1",
            "name": "shared"
        }))
        .unwrap();
        assert!(group.service_ids.is_empty());
    }
}
