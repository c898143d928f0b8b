//! faqbot Server - HTTP REST API for the multi-tenant FAQ chatbot
//!
//! Serves the embeddable chat widget and the tenant management API:
//!
//! - **Chat**: FAQ-first answers with an LLM fallback, per tenant
//! - **Knowledge**: website description and FAQ management
//! - **Widget**: appearance settings, quick replies and the AI toggle
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! Every tenant request carries an API key (`X-API-Key` or
//! `Authorization: Bearer <key>`) that resolves to exactly one tenant; all
//! reads and writes are scoped to that tenant.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Tenant Endpoints (API Key Required)
//!
//! - `POST /api/v1/chat/query` - Answer a visitor message
//! - `POST /api/v1/chat/explain` - Per-FAQ similarity scores for a message
//! - `GET /api/v1/context` - Widget bootstrap data
//! - `GET|POST /api/v1/website` - Website description
//! - `GET|POST|PUT|DELETE /api/v1/faq` - FAQ management
//! - `GET|POST /api/v1/settings` - Widget settings
//! - `GET /api/v1/stats` - Message statistics
//! - `GET|POST /api/v1/apikey` - Current key / rotate key
//!
//! ## Admin Endpoints (Admin Key Required)
//!
//! - `POST /api/v1/apikey/generate` - Provision a tenant and issue a key

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
pub use store::{InMemoryStore, TenantStore};
