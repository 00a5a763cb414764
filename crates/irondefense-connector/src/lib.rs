//! IronDefense connector.
//!
//! Maps orchestration actions onto IronAPI calls and turns IronAPI
//! notification feeds into container/artifact records.
//!
//! ```text
//! handle_action ─┬─ rate/comment/status/report/get_* ── IronApiClient::post
//!                └─ on_poll ── alert / dome / event feed
//!                                  └─ filter ── IngestSink
//! ```

pub mod actions;
pub mod client;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod params;
pub mod poll;
pub mod result;
pub mod state;

pub use actions::{ActionContext, ActionId, Connector, UnknownAction};
pub use client::IronApiClient;
pub use error::{ConnectorError, ParamError};
pub use filter::{Decision, FeedKind, SkipReason};
pub use ingest::{Artifact, Container, IngestError, IngestSink, JsonlSink, MemorySink, RecordKind, SavedRecord};
pub use params::*;
pub use poll::{FeedFailure, FeedSummary, PollSummary};
pub use result::{ActionResult, ActionStatus};
pub use state::{ConnectorState, StateError, StateStore};
