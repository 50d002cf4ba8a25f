#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the skiff daemon API.
//!
//! Every payload exchanged with the daemon is declared here so the client has
//! a single, explicit schema per endpoint. Fields follow the daemon's wire
//! names (`camelCase`); missing optional fields are defaulted at the boundary
//! rather than surfacing as parse failures deep in rendering code.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error payload returned by the daemon on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Lightweight route entry returned by `GET /api/routes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteSummary {
    /// Unique route name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Filesystem folder backing the route, when configured.
    pub folder: Option<String>,
    #[serde(default)]
    /// Total number of torrents attached to the route.
    pub total: u32,
}

/// Coarse completion state of a run of torrent pieces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PieceState {
    /// Pieces currently being hash-checked.
    #[serde(rename = "H")]
    Checking,
    /// Pieces partially downloaded.
    #[serde(rename = "P")]
    Partial,
    /// Pieces fully downloaded and verified.
    #[serde(rename = "C")]
    Complete,
    /// Pieces not yet requested.
    #[serde(rename = "W")]
    Waiting,
    /// Pieces that failed verification.
    #[serde(rename = "?")]
    Error,
}

/// A run of consecutive pieces sharing one [`PieceState`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PieceChunk {
    /// State shared by every piece in the run.
    pub status: PieceState,
    #[serde(rename = "numPieces", default)]
    /// Number of pieces in the run.
    pub num_pieces: u32,
}

/// Live statistics for one torrent, keyed by its info hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TorrentStats {
    /// Display name of the torrent.
    pub name: String,
    /// Stable info-hash identity.
    pub hash: String,
    /// Total content size in bytes.
    pub size_bytes: u64,
    /// Bytes downloaded since the daemon started tracking.
    pub downloaded_bytes: u64,
    /// Bytes uploaded since the daemon started tracking.
    pub uploaded_bytes: u64,
    /// Connected peer count.
    pub peers: u32,
    /// Connected seeder count.
    pub seeders: u32,
    /// Seconds elapsed since the counters were reset.
    pub time_passed: f64,
    /// Piece completion summarized as runs of equal state.
    pub piece_chunks: Vec<PieceChunk>,
    /// Total piece count for the torrent.
    pub total_pieces: u32,
    /// Piece length in bytes.
    pub piece_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Unix timestamp of admission, when known.
    pub added_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Server-side health label, when computed.
    pub health: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Server-side unhealthy flag, when computed.
    pub unhealthy: Option<bool>,
}

/// One page of a route's torrent collection, from
/// `GET /api/routes/{route}/torrents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TorrentPage {
    /// Route the page belongs to.
    pub name: String,
    /// 1-based page number that was served.
    pub page: u32,
    /// Page size used by the server.
    pub size: u32,
    /// Total number of torrents in the route.
    pub total: u32,
    /// Torrents on this page, in server order.
    pub items: Vec<TorrentStats>,
}

/// Mount locations where a torrent's content is exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MountPaths {
    /// FUSE mount path, empty when FUSE is disabled.
    pub fuse: String,
    /// HTTP filesystem path.
    pub httpfs: String,
}

/// Detailed view of a single torrent, from
/// `GET /api/routes/{route}/torrent/{hash}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentDetail {
    #[serde(default)]
    /// Route the torrent is attached to.
    pub route: String,
    #[serde(default)]
    /// Info hash echoed back by the server.
    pub hash: String,
    /// Live statistics snapshot.
    pub stats: TorrentStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Route folder on the serving host.
    pub folder: Option<String>,
    #[serde(default)]
    /// Where the content is mounted.
    pub paths: MountPaths,
}

/// One file inside a torrent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentFileEntry {
    /// Path of the file relative to the torrent root.
    pub path: String,
    /// File length in bytes.
    pub length: u64,
}

/// File listing for a torrent, from
/// `GET /api/routes/{route}/torrent/{hash}/files`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TorrentFileList {
    #[serde(default)]
    /// Files contained in the torrent.
    pub files: Vec<TorrentFileEntry>,
}

/// Poll interval payload for `GET`/`POST /api/watch_interval`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchInterval {
    /// Interval between refresh cycles, in seconds.
    pub interval: u32,
}

/// Body for `POST /api/routes/{route}/torrent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MagnetRequest {
    /// Magnet URI describing the torrent to add.
    pub magnet: String,
}

/// Body for `POST /api/routes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteCreateRequest {
    /// Name of the route to create.
    pub name: String,
}

/// Severity of a structured log record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Routine operational message.
    #[default]
    Info,
    /// Recoverable anomaly.
    Warn,
    /// Failure requiring attention.
    Error,
}

impl LogLevel {
    /// Lowercase label matching the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One decoded line of the daemon's structured log stream.
///
/// Any key other than `time`/`level`/`component`/`message` is captured
/// verbatim in [`LogRecord::fields`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LogRecord {
    #[serde(default)]
    /// Unix timestamp in seconds, fractional part allowed.
    pub time: f64,
    #[serde(default)]
    /// Record severity.
    pub level: LogLevel,
    #[serde(default)]
    /// Subsystem that emitted the record.
    pub component: String,
    #[serde(default)]
    /// Free-form message text.
    pub message: String,
    #[serde(flatten)]
    /// Remaining structured fields.
    pub fields: Map<String, Value>,
}
