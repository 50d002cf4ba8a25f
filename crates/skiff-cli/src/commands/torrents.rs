use std::path::Path;

use anyhow::anyhow;

use crate::cli::{TorrentAddArgs, TorrentPageArgs, TorrentRefArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_detail, render_files, render_page};
use skiff_sync::pager::PAGE_SIZE;

pub(crate) async fn handle_torrent_page(ctx: &AppContext, args: TorrentPageArgs) -> CliResult<()> {
    let TorrentPageArgs { route, page } = args;
    let window = ctx.daemon.torrent_page(&route, page.max(1), PAGE_SIZE).await?;
    render_page(&window, &route, ctx.output)
}

pub(crate) async fn handle_torrent_status(ctx: &AppContext, args: TorrentRefArgs) -> CliResult<()> {
    let TorrentRefArgs { route, hash } = args;
    let detail = ctx.daemon.torrent_detail(&route, &hash).await?;
    render_detail(&detail, ctx.output)
}

pub(crate) async fn handle_torrent_files(ctx: &AppContext, args: TorrentRefArgs) -> CliResult<()> {
    let TorrentRefArgs { route, hash } = args;
    let files = ctx.daemon.torrent_files(&route, &hash).await?;
    render_files(&files, ctx.output)
}

pub(crate) async fn handle_torrent_add(ctx: &AppContext, args: TorrentAddArgs) -> CliResult<()> {
    let TorrentAddArgs { route, source } = args;
    let source = source.trim();
    if source.is_empty() {
        return Err(CliError::validation("source must not be empty"));
    }

    if source.starts_with("magnet:") {
        ctx.daemon.add_magnet(&route, source).await?;
        println!("New magnet added to {route}");
        return Ok(());
    }

    let path = Path::new(source);
    let bytes = std::fs::read(path).map_err(|err| {
        CliError::failure(anyhow!(
            "failed to read torrent file '{}': {err}",
            path.display()
        ))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.torrent");
    ctx.daemon.upload_torrent(&route, file_name, bytes).await?;
    println!("File uploaded to {route}");
    Ok(())
}

pub(crate) async fn handle_torrent_remove(ctx: &AppContext, args: TorrentRefArgs) -> CliResult<()> {
    let TorrentRefArgs { route, hash } = args;
    ctx.daemon.delete_torrent(&route, &hash).await?;
    println!("Torrent deleted ({hash})");
    Ok(())
}

pub(crate) async fn handle_torrent_blacklist(
    ctx: &AppContext,
    args: TorrentRefArgs,
) -> CliResult<()> {
    let TorrentRefArgs { route, hash } = args;
    ctx.daemon.blacklist_torrent(&route, &hash).await?;
    println!("Blacklisted and removed ({hash})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;
    use skiff_sync::DaemonClient;
    use std::io::Write;

    fn context_for(server: &MockServer) -> AppContext {
        AppContext {
            daemon: DaemonClient::new(Client::new(), server.base_url().parse().expect("valid URL")),
            output: OutputFormat::Table,
        }
    }

    #[tokio::test]
    async fn torrent_page_clamps_page_to_one() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/routes/movies/torrents")
                .query_param("page", "1")
                .query_param("size", "25");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "name": "movies", "page": 1, "size": 25, "total": 1,
                    "items": [{"name": "Alpha", "hash": "aa"}]
                }));
        });

        handle_torrent_page(
            &context_for(&server),
            TorrentPageArgs {
                route: "movies".to_string(),
                page: 0,
            },
        )
        .await
        .expect("page should render");
        mock.assert();
    }

    #[tokio::test]
    async fn torrent_status_renders_detail() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/routes/movies/torrent/aa");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "route": "movies",
                    "hash": "aa",
                    "stats": {"name": "Alpha", "hash": "aa", "peers": 4, "seeders": 2},
                    "folder": "/srv/movies",
                    "paths": {"fuse": "/mnt/fuse/movies", "httpfs": "/fs/movies"}
                }));
        });

        handle_torrent_status(
            &context_for(&server),
            TorrentRefArgs {
                route: "movies".to_string(),
                hash: "aa".to_string(),
            },
        )
        .await
        .expect("status should succeed");
    }

    #[tokio::test]
    async fn torrent_files_renders_listing() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/routes/movies/torrent/aa/files");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"files": [{"path": "movie.mkv", "length": 2048}]}));
        });

        handle_torrent_files(
            &context_for(&server),
            TorrentRefArgs {
                route: "movies".to_string(),
                hash: "aa".to_string(),
            },
        )
        .await
        .expect("files should succeed");
    }

    #[tokio::test]
    async fn torrent_add_dispatches_magnet() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/routes/movies/torrent")
                .json_body(json!({"magnet": "magnet:?xt=urn:btih:demo"}));
            then.status(200);
        });

        handle_torrent_add(
            &context_for(&server),
            TorrentAddArgs {
                route: "movies".to_string(),
                source: "magnet:?xt=urn:btih:demo".to_string(),
            },
        )
        .await
        .expect("magnet add should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn torrent_add_uploads_file_source() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/routes/movies/files")
                .body_includes("demo.torrent");
            then.status(200);
        });

        let mut path = std::env::temp_dir();
        path.push(format!("skiff-cli-test-{}-demo.torrent", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"d8:announce0:e").expect("write file");

        handle_torrent_add(
            &context_for(&server),
            TorrentAddArgs {
                route: "movies".to_string(),
                source: path.to_string_lossy().into_owned(),
            },
        )
        .await
        .expect("upload should succeed");
        mock.assert();
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn torrent_add_rejects_empty_source() {
        let server = MockServer::start_async().await;
        let err = handle_torrent_add(
            &context_for(&server),
            TorrentAddArgs {
                route: "movies".to_string(),
                source: "  ".to_string(),
            },
        )
        .await
        .expect_err("empty source must fail");
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[tokio::test]
    async fn torrent_remove_issues_delete() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/routes/movies/torrent/aa");
            then.status(200);
        });

        handle_torrent_remove(
            &context_for(&server),
            TorrentRefArgs {
                route: "movies".to_string(),
                hash: "aa".to_string(),
            },
        )
        .await
        .expect("remove should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn torrent_blacklist_posts_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/routes/movies/torrent/aa/blacklist");
            then.status(200);
        });

        handle_torrent_blacklist(
            &context_for(&server),
            TorrentRefArgs {
                route: "movies".to_string(),
                hash: "aa".to_string(),
            },
        )
        .await
        .expect("blacklist should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn torrent_add_missing_file_is_a_failure() {
        let server = MockServer::start_async().await;
        let err = handle_torrent_add(
            &context_for(&server),
            TorrentAddArgs {
                route: "movies".to_string(),
                source: "/nonexistent/skiff-test.torrent".to_string(),
            },
        )
        .await
        .expect_err("missing file must fail");
        assert!(matches!(err, CliError::Failure(_)));
    }
}
