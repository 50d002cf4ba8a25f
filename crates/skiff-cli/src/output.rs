//! Output renderers and formatting helpers for CLI commands.

use skiff_api_models::{LogRecord, RouteSummary, TorrentDetail, TorrentFileList, TorrentPage};
use skiff_sync::formatter::{format_bytes, format_timestamp, health_cell, status_cell};
use skiff_sync::pager::{self, PagerView};
use skiff_sync::reconcile::{Column, display_cells};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_routes(routes: &[RouteSummary], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&routes)?,
        OutputFormat::Table => {
            println!("{:<24} {:>7} FOLDER", "NAME", "TOTAL");
            for route in routes {
                println!(
                    "{:<24} {:>7} {}",
                    route.name,
                    route.total,
                    route.folder.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_page(page: &TorrentPage, route: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!(
                "{:<40} {:<21} {:>10} {:<16} {}",
                Column::Name.header(),
                Column::Transfer.header(),
                Column::Size.header(),
                Column::Health.header(),
                Column::Status.header()
            );
            for stats in &page.items {
                let cells = display_cells(stats);
                println!(
                    "{:<40} {:<21} {:>10} {:<16} {}",
                    cells[Column::Name.index()],
                    cells[Column::Transfer.index()],
                    cells[Column::Size.index()],
                    cells[Column::Health.index()],
                    cells[Column::Status.index()]
                );
            }
            if let Some(view) = pager::render_pager(page.page, page.size, page.total) {
                println!("{}", pager_line(route, &view));
            }
        }
    }
    Ok(())
}

/// One-line pager summary mirroring the numbered-link window.
pub(crate) fn pager_line(route: &str, view: &PagerView) -> String {
    let mut parts: Vec<String> = Vec::new();
    if view.leading_gap {
        parts.push("..".to_string());
    }
    for number in &view.numbers {
        if *number == view.page {
            parts.push(format!("[{number}]"));
        } else {
            parts.push(number.to_string());
        }
    }
    if view.trailing_gap {
        parts.push("..".to_string());
    }
    format!(
        "{route}: page {}/{} {}",
        view.page,
        view.total_pages,
        parts.join(" ")
    )
}

pub(crate) fn render_detail(detail: &TorrentDetail, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(detail)?,
        OutputFormat::Table => {
            let stats = &detail.stats;
            println!("name: {}", stats.name);
            println!("hash: {}", stats.hash);
            println!("health: {}", health_cell(stats.peers, stats.seeders));
            println!(
                "transfer: down {} / up {}",
                format_bytes(stats.downloaded_bytes),
                format_bytes(stats.uploaded_bytes)
            );
            println!("size: {}", format_bytes(stats.size_bytes));
            println!("piece size: {}", format_bytes(stats.piece_size));
            println!(
                "pieces: {}",
                status_cell(&stats.piece_chunks, stats.total_pieces)
            );
            if let Some(folder) = &detail.folder {
                println!("folder: {folder}");
            }
            if !detail.paths.fuse.is_empty() {
                println!("fuse: {}/{}", detail.paths.fuse, stats.name);
            }
            if !detail.paths.httpfs.is_empty() {
                println!("httpfs: {}/{}", detail.paths.httpfs, stats.name);
            }
        }
    }
    Ok(())
}

pub(crate) fn render_files(files: &TorrentFileList, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(files)?,
        OutputFormat::Table => {
            println!("{:>12} PATH", "SIZE");
            for file in &files.files {
                println!("{:>12} {}", format_bytes(file.length), file.path);
            }
        }
    }
    Ok(())
}

pub(crate) fn render_log_record(record: &LogRecord, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(record)?,
        OutputFormat::Table => println!("{}", format_log_line(record)),
    }
    Ok(())
}

/// Render one log record as a single line.
pub(crate) fn format_log_line(record: &LogRecord) -> String {
    let mut line = format!(
        "{} {:<5} {:<12} {}",
        format_timestamp(record.time),
        record.level.as_str(),
        record.component,
        record.message
    );
    for (key, value) in &record.fields {
        line.push_str(&format!(" {key}={value}"));
    }
    line
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow::anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}
