//! Diff-then-patch reconciliation of a route's torrent rows.
//!
//! The reconciler owns the cache of rendered cell values per row and computes
//! the minimal mutation batch that moves the view from its previous state to
//! a freshly fetched page: row shells for unseen hashes, cell writes only
//! where the formatted value changed, removals for rows that left the page.
//! The whole batch is handed to the sink in one call so the surface can apply
//! it without intermediate layout passes.
//!
//! Invariants:
//! - after `reconcile`, the cached key set equals the page's key set exactly;
//! - reconciling the same page twice produces an empty batch the second time;
//! - duplicate hashes in the input are logged and ignored, never merged.

use std::collections::HashMap;

use skiff_api_models::{TorrentPage, TorrentStats};

use crate::formatter;

/// Table columns rendered for each torrent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Shortened display name.
    Name,
    /// Downloaded / uploaded totals.
    Transfer,
    /// Content size.
    Size,
    /// Swarm health classification.
    Health,
    /// Piece-progress bar.
    Status,
}

impl Column {
    /// All columns, in display order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Transfer,
        Self::Size,
        Self::Health,
        Self::Status,
    ];

    /// Position of the column within [`Column::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Column header label.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Transfer => "DL / UL",
            Self::Size => "SIZE",
            Self::Health => "HEALTH",
            Self::Status => "STATUS",
        }
    }
}

/// One view mutation within a reconciliation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMutation {
    /// Create an empty row shell for a newly observed torrent.
    Insert {
        /// Identity of the new row.
        hash: String,
    },
    /// Write one cell whose formatted value changed.
    SetCell {
        /// Identity of the row being written.
        hash: String,
        /// Cell being written.
        column: Column,
        /// Freshly formatted display value.
        value: String,
    },
    /// Remove a row whose torrent left the page.
    Remove {
        /// Identity of the removed row.
        hash: String,
    },
}

/// Rendering surface for reconciled rows.
///
/// Implementations receive each reconciliation as a single batch and must
/// apply it atomically from the viewer's perspective. The engine never calls
/// `apply` with an empty batch.
pub trait RowSink {
    /// Apply one batch of mutations for the given route.
    fn apply(&mut self, route: &str, batch: &[RowMutation]);

    /// Drop every row belonging to a route that disappeared from the listing.
    fn retire_route(&mut self, route: &str) {
        let _ = route;
    }
}

/// Cached rendered state for one route's rows.
///
/// Keys always mirror the most recently reconciled page; values hold the
/// last-written display string per column so unchanged cells are skipped.
#[derive(Debug, Default)]
pub struct RenderedRowSet {
    rows: HashMap<String, [String; Column::ALL.len()]>,
}

impl RenderedRowSet {
    /// Create an empty row set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rendered rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a row exists for the given hash.
    #[must_use]
    pub fn contains(&self, hash: &str) -> bool {
        self.rows.contains_key(hash)
    }

    /// Iterate over the rendered row keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

/// Formatted display values for one torrent, in [`Column::ALL`] order.
#[must_use]
pub fn display_cells(stats: &TorrentStats) -> [String; Column::ALL.len()] {
    [
        formatter::shorten_name(&stats.name),
        formatter::transfer_cell(stats.downloaded_bytes, stats.uploaded_bytes),
        formatter::size_cell(stats.size_bytes),
        formatter::health_cell(stats.peers, stats.seeders),
        formatter::status_cell(&stats.piece_chunks, stats.total_pieces),
    ]
}

/// Reconcile a route's rendered rows against a freshly fetched page.
///
/// Returns the number of mutations applied; zero means the view was already
/// consistent and the sink was not called.
pub fn reconcile(
    route: &str,
    rows: &mut RenderedRowSet,
    window: &TorrentPage,
    sink: &mut dyn RowSink,
) -> usize {
    let mut batch = Vec::new();
    let mut seen: Vec<&str> = Vec::with_capacity(window.items.len());

    for stats in &window.items {
        if seen.contains(&stats.hash.as_str()) {
            tracing::warn!(route, hash = %stats.hash, "duplicate identity in page, ignoring");
            continue;
        }
        seen.push(&stats.hash);

        let cells = rows.rows.entry(stats.hash.clone()).or_insert_with(|| {
            batch.push(RowMutation::Insert {
                hash: stats.hash.clone(),
            });
            std::array::from_fn(|_| String::new())
        });

        let fresh = display_cells(stats);
        for (column, value) in Column::ALL.into_iter().zip(fresh) {
            let cached = &mut cells[column.index()];
            if *cached != value {
                batch.push(RowMutation::SetCell {
                    hash: stats.hash.clone(),
                    column,
                    value: value.clone(),
                });
                *cached = value;
            }
        }
    }

    let stale: Vec<String> = rows
        .rows
        .keys()
        .filter(|hash| !seen.contains(&hash.as_str()))
        .cloned()
        .collect();
    for hash in stale {
        rows.rows.remove(&hash);
        batch.push(RowMutation::Remove { hash });
    }

    if !batch.is_empty() {
        sink.apply(route, &batch);
    }
    batch.len()
}
