use crate::cli::{IntervalSetArgs, RouteNameArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_routes;

pub(crate) async fn handle_route_list(ctx: &AppContext) -> CliResult<()> {
    let routes = ctx.daemon.routes().await?;
    render_routes(&routes, ctx.output)
}

pub(crate) async fn handle_route_add(ctx: &AppContext, args: RouteNameArgs) -> CliResult<()> {
    let RouteNameArgs { name } = args;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::validation("route name required"));
    }
    ctx.daemon.create_route(name).await?;
    println!("Route created: {name}");
    Ok(())
}

pub(crate) async fn handle_route_remove(ctx: &AppContext, args: RouteNameArgs) -> CliResult<()> {
    let RouteNameArgs { name } = args;
    ctx.daemon.delete_route(&name).await?;
    println!("Route deleted: {name}");
    Ok(())
}

pub(crate) async fn handle_interval_get(ctx: &AppContext) -> CliResult<()> {
    let interval = ctx.daemon.watch_interval().await?;
    println!("{interval}");
    Ok(())
}

pub(crate) async fn handle_interval_set(ctx: &AppContext, args: IntervalSetArgs) -> CliResult<()> {
    let IntervalSetArgs { seconds } = args;
    if seconds == 0 {
        return Err(CliError::validation(
            "interval must be a positive number of seconds",
        ));
    }
    ctx.daemon.set_watch_interval(seconds).await?;
    println!("Watch interval updated to {seconds}s");
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

    fn context_for(server: &MockServer) -> AppContext {
        AppContext {
            daemon: DaemonClient::new(Client::new(), server.base_url().parse().expect("valid URL")),
            output: OutputFormat::Table,
        }
    }

    #[tokio::test]
    async fn route_list_renders_table() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/routes");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"name": "movies", "folder": "/srv/movies", "total": 3}]));
        });

        handle_route_list(&context_for(&server))
            .await
            .expect("list should succeed");
    }

    #[tokio::test]
    async fn route_add_posts_name() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/routes")
                .json_body(json!({"name": "books"}));
            then.status(200);
        });

        handle_route_add(
            &context_for(&server),
            RouteNameArgs {
                name: " books ".to_string(),
            },
        )
        .await
        .expect("create should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn route_add_rejects_blank_name() {
        let server = MockServer::start_async().await;
        let err = handle_route_add(
            &context_for(&server),
            RouteNameArgs {
                name: "   ".to_string(),
            },
        )
        .await
        .expect_err("blank name must fail");
        assert!(matches!(err, CliError::Validation(message) if message.contains("required")));
    }

    #[tokio::test]
    async fn route_remove_surfaces_server_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/api/routes/books");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"error": "route not found"}));
        });

        let err = handle_route_remove(
            &context_for(&server),
            RouteNameArgs {
                name: "books".to_string(),
            },
        )
        .await
        .expect_err("removal should fail");
        assert!(matches!(err, CliError::Validation(message) if message == "route not found"));
    }

    #[tokio::test]
    async fn interval_set_rejects_zero() {
        let server = MockServer::start_async().await;
        let err = handle_interval_set(&context_for(&server), IntervalSetArgs { seconds: 0 })
            .await
            .expect_err("zero interval must fail");
        assert!(matches!(err, CliError::Validation(message) if message.contains("positive")));
    }

    #[tokio::test]
    async fn interval_set_posts_payload() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/watch_interval")
                .json_body(json!({"interval": 15}));
            then.status(200);
        });

        handle_interval_set(&context_for(&server), IntervalSetArgs { seconds: 15 })
            .await
            .expect("set should succeed");
        mock.assert();
    }
}
