//! Pure display formatting for table cells and log lines.
//!
//! Everything here is a function from raw values to display strings; no state
//! and no I/O. The reconciler compares these strings against the previously
//! rendered value to decide whether a cell needs rewriting, so the output
//! must be deterministic for a given input.

use chrono::{Local, LocalResult, TimeZone};
use skiff_api_models::{PieceChunk, PieceState};

/// Width of the textual piece-progress bar.
const BAR_WIDTH: u32 = 24;

/// Names longer than this are shortened for display.
const NAME_LIMIT: usize = 70;

/// Health classification derived from the seeder count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTier {
    /// No seeders: content may be unavailable.
    Unhealthy,
    /// One seeder: fragile.
    Weak,
    /// Two or more seeders.
    Healthy,
}

impl HealthTier {
    /// Lowercase display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unhealthy => "unhealthy",
            Self::Weak => "weak",
            Self::Healthy => "healthy",
        }
    }
}

/// Classify swarm health; seeders drive the tier.
#[must_use]
pub const fn health_tier(seeders: u32) -> HealthTier {
    match seeders {
        0 => HealthTier::Unhealthy,
        1 => HealthTier::Weak,
        _ => HealthTier::Healthy,
    }
}

/// Render the health cell as `seeders/peers` plus the tier label.
#[must_use]
pub fn health_cell(peers: u32, seeders: u32) -> String {
    format!("{seeders}/{peers} {}", health_tier(seeders).label())
}

/// Render the transfer cell as `downloaded / uploaded`.
#[must_use]
pub fn transfer_cell(downloaded: u64, uploaded: u64) -> String {
    format!("{} / {}", format_bytes(downloaded), format_bytes(uploaded))
}

/// Render the size cell; zero-size entries stay blank.
#[must_use]
pub fn size_cell(size_bytes: u64) -> String {
    if size_bytes == 0 {
        String::new()
    } else {
        format_bytes(size_bytes)
    }
}

/// Render the piece-progress cell as a fixed-width bar plus a percentage.
///
/// Each chunk occupies a run of the bar proportional to its share of the
/// total piece count; `#` complete, `=` partial, `h` checking, `.` waiting,
/// `!` errored. An unknown total yields an empty cell.
#[must_use]
pub fn status_cell(chunks: &[PieceChunk], total_pieces: u32) -> String {
    if total_pieces == 0 {
        return String::new();
    }

    let mut bar = String::with_capacity(BAR_WIDTH as usize + 8);
    bar.push('[');
    let mut seen: u64 = 0;
    let mut drawn: u32 = 0;
    for chunk in chunks {
        seen += u64::from(chunk.num_pieces);
        let fill = (seen * u64::from(BAR_WIDTH) / u64::from(total_pieces)) as u32;
        let width = fill.saturating_sub(drawn);
        drawn = fill;
        let glyph = match chunk.status {
            PieceState::Complete => '#',
            PieceState::Partial => '=',
            PieceState::Checking => 'h',
            PieceState::Waiting => '.',
            PieceState::Error => '!',
        };
        for _ in 0..width {
            bar.push(glyph);
        }
    }
    for _ in drawn..BAR_WIDTH {
        bar.push(' ');
    }
    bar.push(']');

    let complete: u64 = chunks
        .iter()
        .filter(|chunk| chunk.status == PieceState::Complete)
        .map(|chunk| u64::from(chunk.num_pieces))
        .sum();
    let percent = complete * 100 / u64::from(total_pieces);
    format!("{bar} {percent}%")
}

/// Shorten an over-long display name, keeping the first 67 characters.
#[must_use]
pub fn shorten_name(name: &str) -> String {
    if name.chars().count() <= NAME_LIMIT {
        return name.to_string();
    }
    let mut short: String = name.chars().take(NAME_LIMIT - 3).collect();
    short.push_str("...");
    short
}

/// Human-readable byte count using IEC units.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Average transfer rate over an observation window.
#[must_use]
pub fn format_rate(bytes: u64, seconds: f64) -> String {
    if seconds <= 0.0 {
        return "0 B/s".to_string();
    }
    let per_second = bytes_to_f64(bytes) / seconds;
    format!("{}/s", format_bytes(per_second as u64))
}

/// Render a fractional unix timestamp in local time.
#[must_use]
pub fn format_timestamp(unix_seconds: f64) -> String {
    let secs = unix_seconds.trunc() as i64;
    let nanos = (unix_seconds.fract() * 1e9) as u32;
    match Local.timestamp_opt(secs, nanos) {
        LocalResult::Single(when) | LocalResult::Ambiguous(when, _) => {
            when.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        LocalResult::None => format!("{unix_seconds}"),
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}
