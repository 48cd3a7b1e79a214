//! # Reconciliation Engine
//!
//! Sequencing, retry, and polling logic for reconciling declared resource
//! state against the Cumulo control plane.
//!
//! The control plane has ordering constraints and no transactional
//! semantics: a compound update is an ordered sequence of independent
//! idempotent operations, with no compensation on failure. The engine's
//! job is getting the order and the skip conditions right, and waiting
//! out the control plane's asynchronous state transitions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌──────────────┐
//! │ ServiceUpdate│────►│     Reconciler     │────►│  ApiClient   │
//! │ (state/plan) │     │  (ordered steps)   │     │ (rate-limit, │
//! └──────────────┘     └───┬──────────┬─────┘     │  429 retry)  │
//!                          │          │           └──────────────┘
//!                    ┌─────▼───┐ ┌────▼─────────┐
//!                    │ SetDiff │ │ environment  │
//!                    │         │ │ transitions  │
//!                    └─────────┘ └──────────────┘
//!                          │
//!                    ┌─────▼────────┐
//!                    │    Poller    │  (deploy-completion waiter)
//!                    └──────────────┘
//! ```
//!
//! Every mutable sub-attribute travels as a [`Pair`] of observed ("state")
//! and desired ("plan") values; a step is skipped, not re-sent, when the
//! two are equal. Identifier sets (custom domains, env-group links) are
//! reconciled by membership diff, never positionally.

pub mod deploys;
pub mod diff;
pub mod environment;
pub mod error;
pub mod pair;
pub mod poll;
pub mod update;

pub use deploys::{wait_for_live, DEFAULT_DEPLOY_TIMEOUT};
pub use diff::{diff, SetDiff};
pub use environment::{resolve_transition, EnvironmentOp};
pub use error::{ReconcileError, ReconcileResult};
pub use pair::Pair;
pub use poll::{PollConfig, Poller};
pub use update::{DiskSpec, Reconciler, ServiceUpdate};
