//! Typed control-plane HTTP client (reqwest-based).
//!
//! One method per control-plane operation the reconciliation engine
//! issues. Every request passes through rate-limiter admission and the
//! 429 retry policy; every response passes through the single
//! classification funnel.

use crate::error::{ApiError, ApiResult};
use crate::limit::RateLimiter;
use crate::retry::{parse_retry_after, RetryPolicy};
use cumulo_api::{
    Autoscaling, CreateService, CustomDomain, Deploy, DeployTrigger, Disk, DiskInput, EnvVar,
    ErrorBody, NotificationOverride, ResourceIds, Scale, SecretFile, Service, ServicePatch,
};
use reqwest::{header, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for one control-plane client.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientConfig {
    /// Base URL of the control plane (e.g. "<https://api.cumulo.dev/v1>").
    pub base_url: String,

    /// API key; the quota behind the shared rate limiter is enforced per
    /// key.
    pub api_key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Create a config with the default request timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Control-plane HTTP client.
///
/// One reconciliation invocation gets one client (and one cancellation
/// token); the [`RateLimiter`] is the only piece shared across concurrent
/// invocations, because the remote quota is per credential.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: &ClientConfig, limiter: Arc<RateLimiter>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("cumulo-client/0.1")
            .build()
            .map_err(|e| ApiError::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
            limiter,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the retry policy (tests use zero-length ladder rungs).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach the caller's cancellation token. Every suspension point
    /// (limiter admission, retry sleeps) observes it.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The cancellation token this client observes.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Services ──────────────────────────────────────────────────────

    /// Fetch a service (GET /services/:id).
    pub async fn get_service(&self, id: &str) -> ApiResult<Service> {
        self.request(Method::GET, &format!("services/{id}"), None).await
    }

    /// Create a service (POST /services). The control plane assigns the
    /// ID and starts an initial deploy.
    pub async fn create_service(&self, create: &CreateService) -> ApiResult<Service> {
        self.request(Method::POST, "services", Some(serde_json::to_value(create)?))
            .await
    }

    /// Patch base fields (PATCH /services/:id).
    pub async fn update_service(&self, id: &str, patch: &ServicePatch) -> ApiResult<Service> {
        self.request(
            Method::PATCH,
            &format!("services/{id}"),
            Some(serde_json::to_value(patch)?),
        )
        .await
    }

    /// Delete a service (DELETE /services/:id).
    pub async fn delete_service(&self, id: &str) -> ApiResult<()> {
        self.request_empty(Method::DELETE, &format!("services/{id}"), None)
            .await
    }

    /// Set the instance count (POST /services/:id/scale).
    pub async fn scale_service(&self, id: &str, num_instances: i32) -> ApiResult<()> {
        self.request_empty(
            Method::POST,
            &format!("services/{id}/scale"),
            Some(serde_json::to_value(Scale { num_instances })?),
        )
        .await
    }

    /// Suspend a service (POST /services/:id/suspend).
    pub async fn suspend_service(&self, id: &str) -> ApiResult<()> {
        self.request_empty(Method::POST, &format!("services/{id}/suspend"), None)
            .await
    }

    /// Resume a suspended service (POST /services/:id/resume).
    pub async fn resume_service(&self, id: &str) -> ApiResult<()> {
        self.request_empty(Method::POST, &format!("services/{id}/resume"), None)
            .await
    }

    // ── Autoscaling ───────────────────────────────────────────────────

    /// Upsert the autoscaling policy (PUT /services/:id/autoscaling).
    pub async fn put_autoscaling(&self, id: &str, policy: &Autoscaling) -> ApiResult<Autoscaling> {
        self.request(
            Method::PUT,
            &format!("services/{id}/autoscaling"),
            Some(serde_json::to_value(policy)?),
        )
        .await
    }

    /// Remove the autoscaling policy (DELETE /services/:id/autoscaling).
    pub async fn delete_autoscaling(&self, id: &str) -> ApiResult<()> {
        self.request_empty(Method::DELETE, &format!("services/{id}/autoscaling"), None)
            .await
    }

    // ── Env vars and secret files ─────────────────────────────────────

    /// Replace all env vars (PUT /services/:id/env-vars).
    pub async fn put_env_vars(&self, id: &str, env_vars: &[EnvVar]) -> ApiResult<()> {
        self.request_empty(
            Method::PUT,
            &format!("services/{id}/env-vars"),
            Some(serde_json::to_value(env_vars)?),
        )
        .await
    }

    /// Replace all secret files (PUT /services/:id/secret-files).
    pub async fn put_secret_files(&self, id: &str, files: &[SecretFile]) -> ApiResult<()> {
        self.request_empty(
            Method::PUT,
            &format!("services/{id}/secret-files"),
            Some(serde_json::to_value(files)?),
        )
        .await
    }

    // ── Disks ─────────────────────────────────────────────────────────

    /// Attach a new disk (POST /disks, scoped by `serviceId` in the body).
    pub async fn create_disk(&self, input: &DiskInput) -> ApiResult<Disk> {
        self.request(Method::POST, "disks", Some(serde_json::to_value(input)?))
            .await
    }

    /// Update an existing disk (PATCH /disks/:id).
    pub async fn update_disk(&self, disk_id: &str, input: &DiskInput) -> ApiResult<Disk> {
        self.request(
            Method::PATCH,
            &format!("disks/{disk_id}"),
            Some(serde_json::to_value(input)?),
        )
        .await
    }

    /// Detach and delete a disk (DELETE /disks/:id).
    pub async fn delete_disk(&self, disk_id: &str) -> ApiResult<()> {
        self.request_empty(Method::DELETE, &format!("disks/{disk_id}"), None)
            .await
    }

    // ── Notification override ─────────────────────────────────────────

    /// Patch the per-service notification override
    /// (PATCH /services/:id/notification-override).
    pub async fn patch_notification_override(
        &self,
        id: &str,
        over: &NotificationOverride,
    ) -> ApiResult<NotificationOverride> {
        self.request(
            Method::PATCH,
            &format!("services/{id}/notification-override"),
            Some(serde_json::to_value(over)?),
        )
        .await
    }

    // ── Environment membership ────────────────────────────────────────

    /// Add resources to an environment (POST /environments/:id/resources).
    pub async fn add_environment_resources(
        &self,
        environment_id: &str,
        resources: &ResourceIds,
    ) -> ApiResult<()> {
        self.request_empty(
            Method::POST,
            &format!("environments/{environment_id}/resources"),
            Some(serde_json::to_value(resources)?),
        )
        .await
    }

    /// Remove resources from an environment
    /// (DELETE /environments/:id/resources?resourceIds=...).
    pub async fn remove_environment_resources(
        &self,
        environment_id: &str,
        resource_ids: &[String],
    ) -> ApiResult<()> {
        let query: Vec<(&str, String)> = resource_ids
            .iter()
            .map(|id| ("resourceIds", id.clone()))
            .collect();
        let url = format!("{}/environments/{environment_id}/resources", self.base_url);
        let response = self
            .send_throttled(Method::DELETE, &url, None, Some(&query))
            .await?;
        Self::check_response(response).await
    }

    // ── Env group links ───────────────────────────────────────────────

    /// Link a service to an env group
    /// (POST /env-groups/:id/services/:serviceId).
    pub async fn link_env_group_service(
        &self,
        env_group_id: &str,
        service_id: &str,
    ) -> ApiResult<()> {
        self.request_empty(
            Method::POST,
            &format!("env-groups/{env_group_id}/services/{service_id}"),
            None,
        )
        .await
    }

    /// Unlink a service from an env group
    /// (DELETE /env-groups/:id/services/:serviceId).
    pub async fn unlink_env_group_service(
        &self,
        env_group_id: &str,
        service_id: &str,
    ) -> ApiResult<()> {
        self.request_empty(
            Method::DELETE,
            &format!("env-groups/{env_group_id}/services/{service_id}"),
            None,
        )
        .await
    }

    // ── Custom domains ────────────────────────────────────────────────

    /// List custom domains (GET /services/:id/custom-domains).
    pub async fn list_custom_domains(&self, id: &str) -> ApiResult<Vec<CustomDomain>> {
        self.request(Method::GET, &format!("services/{id}/custom-domains"), None)
            .await
    }

    /// Attach a custom domain (POST /services/:id/custom-domains).
    pub async fn create_custom_domain(&self, id: &str, name: &str) -> ApiResult<CustomDomain> {
        let body = CustomDomain {
            id: None,
            name: name.to_string(),
        };
        self.request(
            Method::POST,
            &format!("services/{id}/custom-domains"),
            Some(serde_json::to_value(body)?),
        )
        .await
    }

    /// Detach a custom domain (DELETE /services/:id/custom-domains/:name).
    pub async fn delete_custom_domain(&self, id: &str, name: &str) -> ApiResult<()> {
        self.request_empty(
            Method::DELETE,
            &format!("services/{id}/custom-domains/{name}"),
            None,
        )
        .await
    }

    // ── Deploys ───────────────────────────────────────────────────────

    /// Trigger a new deploy (POST /services/:id/deploys). The control
    /// plane does not redeploy on field patches by itself.
    pub async fn trigger_deploy(&self, id: &str) -> ApiResult<Deploy> {
        self.request(
            Method::POST,
            &format!("services/{id}/deploys"),
            Some(serde_json::to_value(DeployTrigger::default())?),
        )
        .await
    }

    /// Fetch the deploy history (GET /services/:id/deploys). Ordering is
    /// not guaranteed by the control plane; callers pick by `created_at`.
    pub async fn list_deploys(&self, id: &str) -> ApiResult<Vec<Deploy>> {
        self.request(Method::GET, &format!("services/{id}/deploys"), None)
            .await
    }

    // ── Internal request path ─────────────────────────────────────────

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .send_throttled(method, &url, body.as_ref(), None)
            .await?;
        Self::decode_response(response).await
    }

    async fn request_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<()> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .send_throttled(method, &url, body.as_ref(), None)
            .await?;
        Self::check_response(response).await
    }

    fn build_request(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        query: Option<&[(&str, String)]>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json");
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    /// Send one logical request, retrying only HTTP 429 responses.
    ///
    /// A `Retry-After` header (whole seconds) is honored once, because it
    /// is an authoritative signal; if the response after that wait is
    /// still 429, or the header was absent or unparseable, the fixed
    /// backoff ladder is walked from its first rung. Transport errors are
    /// returned immediately.
    async fn send_throttled(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        query: Option<&[(&str, String)]>,
    ) -> ApiResult<Response> {
        self.limiter.acquire(&self.cancel).await?;
        debug!(method = %method, url = %url, "sending control-plane request");
        let mut response = self.build_request(&method, url, body, query).send().await?;

        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        if let Some(wait) = retry_after {
            warn!(
                url = %url,
                wait_secs = wait.as_secs(),
                "throttled (429), honoring Retry-After"
            );
            self.sleep_cancellable(wait).await?;
            self.limiter.acquire(&self.cancel).await?;
            response = self.build_request(&method, url, body, query).send().await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
        }

        for (rung, wait) in self.retry.backoff_ladder.iter().enumerate() {
            warn!(
                url = %url,
                rung = rung,
                wait_secs = wait.as_secs(),
                "still throttled (429), walking backoff ladder"
            );
            self.sleep_cancellable(*wait).await?;
            self.limiter.acquire(&self.cancel).await?;
            response = self.build_request(&method, url, body, query).send().await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
        }

        Err(ApiError::RateLimited)
    }

    async fn sleep_cancellable(&self, wait: Duration) -> ApiResult<()> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(ApiError::Cancelled),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }

    // ── Response classification ───────────────────────────────────────

    /// Decode a 2xx body into the caller's target type; classify
    /// everything else.
    async fn decode_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::classify_failure(status, response).await)
        }
    }

    /// 2xx with the body ignored; classify everything else.
    async fn check_response(response: Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::classify_failure(status, response).await)
        }
    }

    /// Map a non-2xx response onto the error taxonomy. Exactly 404 is
    /// absence; other 4xx carry the remote message when the body decodes,
    /// or a synthesized one embedding the status; anything else is a
    /// server fault.
    async fn classify_failure(status: StatusCode, response: Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            s if s.is_client_error() => ApiError::Api {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Server { status: s.as_u16() },
        }
    }
}
