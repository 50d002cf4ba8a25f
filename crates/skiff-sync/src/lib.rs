//! Live-state synchronization engine for the skiff console.
//!
//! The engine keeps a client-side tabular view of a file-serving daemon's
//! routes and torrents consistent with server state while minimizing view
//! churn, and tails the daemon's structured log stream. Rendering is
//! abstracted behind [`reconcile::RowSink`] so the same engine drives a
//! terminal table, a test recorder, or any other surface.
//!
//! Layout:
//! - `client.rs`: HTTP client for the daemon's JSON API
//! - `error.rs`: error taxonomy shared by the crate
//! - `formatter.rs`: pure display formatting (bytes, health, piece bars)
//! - `guard.rs`: interaction guard suppressing refresh during user edits
//! - `logtail.rs`: streaming + polling structured-log tail decoder
//! - `pager.rs`: pagination state and page-link windowing
//! - `poller.rs`: the recurring poll/diff/render cycle
//! - `reconcile.rs`: diff-then-patch row reconciliation

pub mod client;
pub mod error;
pub mod formatter;
pub mod guard;
pub mod logtail;
pub mod pager;
pub mod poller;
pub mod reconcile;

pub use client::DaemonClient;
pub use error::{SyncError, SyncResult};
pub use guard::InteractionGuard;
pub use poller::{Notifier, Poller, WatchSession};
pub use reconcile::{RenderedRowSet, RowMutation, RowSink};
