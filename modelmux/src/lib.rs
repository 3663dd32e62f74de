//! Multi-provider LLM routing and ensemble consensus engine.
//!
//! modelmux resolves which backend serves a prompt, dispatches one or many
//! calls concurrently to heterogeneous HTTP providers, isolates per-call
//! failure, and ranks the concurrent results into a consensus report.
//!
//! # Components
//!
//! - `catalog`: immutable provider/model lookup tables, built once at
//!   startup and passed explicitly
//! - `router`: explicit and keyword-based provider/model resolution
//! - `credentials`: fail-fast per-provider secret lookup
//! - `wire`: one typed request/response mapping per provider wire family
//! - `dispatch`: single-call and fan-out execution with per-call timeouts
//!   and failure isolation
//! - `consensus`: request-ordered report with argmax winner selection
//! - `health`: TTL-cached liveness gate for the sidecar backend
//!
//! # Usage
//!
//! ```bash
//! # Single routed call
//! modelmux ask "Explain recursion"
//!
//! # Fan-out across the top-scored models
//! modelmux consensus "Summarize this design"
//!
//! # Explicit ensemble
//! modelmux consensus "Review the plan" --model gpt-4o --model llama3.1
//! ```

pub mod catalog;
pub mod config;
pub mod consensus;
pub mod credentials;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod health;
pub mod router;
pub mod transport;
pub mod types;
pub mod wire;

// Re-export the engine surface
pub use engine::ModelMux;
pub use error::{CallError, MuxError};
pub use types::{ConsensusReport, InvocationRequest, InvocationResult, InvokeOptions};

// Re-export catalog and configuration types
pub use catalog::{Catalog, ModelSpec, Provider, RoutingError, WireFamily};
pub use config::{MuxConfig, SidecarConfig};

// Re-export component types for callers that compose their own stack
pub use credentials::{CredentialError, CredentialResolver};
pub use dispatch::Dispatcher;
pub use health::{HealthMonitor, HealthStatus};
pub use router::{RoleModels, Route, Router};
pub use transport::{HttpCall, HttpMethod, HttpReply, HttpTransport, ReqwestTransport};
