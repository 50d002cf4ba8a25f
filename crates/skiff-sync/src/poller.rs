//! The recurring poll/diff/render cycle.
//!
//! One cycle fetches the route listing and the configured watch interval
//! concurrently, waits for both, then reconciles each live route's current
//! page into the sink — unless the interaction guard is busy, in which case
//! the fetched data is discarded at the render boundary. The loop re-arms
//! only after a cycle fully settles, so cycles never overlap and an interval
//! change takes effect on the next tick.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use skiff_api_models::RouteSummary;

use crate::client::DaemonClient;
use crate::guard::InteractionGuard;
use crate::pager::{PAGE_SIZE, PageMap};
use crate::reconcile::{self, RenderedRowSet, RowSink};

/// Default watch interval in seconds until the server reports one.
const DEFAULT_INTERVAL_SECS: u32 = 5;

/// User-visible notification surface.
///
/// Every recoverable failure produces exactly one call; the loop itself never
/// propagates errors.
pub trait Notifier {
    /// Report a routine outcome.
    fn info(&mut self, message: &str);
    /// Report a failure.
    fn error(&mut self, message: &str);
}

/// Mutable per-watch state: interval, busy guard, page cursors, row caches.
///
/// Owned by one [`Poller`]; nothing here is shared or ambient.
#[derive(Debug)]
pub struct WatchSession {
    /// Seconds between poll cycles, kept in sync with the server.
    pub interval_secs: u32,
    /// Guard consulted before any poll-driven view mutation.
    pub guard: InteractionGuard,
    /// Client-local current page per route.
    pub pages: PageMap,
    rows: HashMap<String, RenderedRowSet>,
}

impl WatchSession {
    /// Fresh session with the default interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            guard: InteractionGuard::new(),
            pages: PageMap::new(),
            rows: HashMap::new(),
        }
    }

    /// Rendered rows for a route, if any.
    #[must_use]
    pub fn rows(&self, route: &str) -> Option<&RenderedRowSet> {
        self.rows.get(route)
    }
}

impl Default for WatchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the poll cycle against one daemon, rendering into one sink.
pub struct Poller<S, N> {
    client: DaemonClient,
    session: WatchSession,
    sink: S,
    notifier: N,
}

impl<S: RowSink, N: Notifier> Poller<S, N> {
    /// Build a poller with a fresh session.
    pub fn new(client: DaemonClient, sink: S, notifier: N) -> Self {
        Self {
            client,
            session: WatchSession::new(),
            sink,
            notifier,
        }
    }

    /// Session state, for embedding surfaces that render pagers or arm the
    /// guard.
    #[must_use]
    pub const fn session(&self) -> &WatchSession {
        &self.session
    }

    /// Mutable session access.
    pub const fn session_mut(&mut self) -> &mut WatchSession {
        &mut self.session
    }

    /// The rendering sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Delay before the next cycle: at least one second, otherwise the
    /// server-configured interval.
    #[must_use]
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.session.interval_secs.max(1)))
    }

    /// Run cycles forever, re-arming after each one settles.
    pub async fn run(&mut self) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.poll_delay()).await;
        }
    }

    /// Execute one poll cycle.
    ///
    /// Returns the live route listing when a render happened, `None` when the
    /// cycle degraded (listing fetch failed) or the guard discarded the
    /// result.
    pub async fn run_cycle(&mut self) -> Option<Vec<RouteSummary>> {
        let (routes, interval) = tokio::join!(self.client.routes(), self.client.watch_interval());

        match interval {
            Ok(secs) if secs > 0 => self.session.interval_secs = secs,
            Ok(_) => {}
            Err(err) => self
                .notifier
                .error(&format!("error getting watch interval: {err}")),
        }

        let routes = match routes {
            Ok(routes) => routes,
            Err(err) => {
                self.notifier.error(&format!("error getting routes: {err}"));
                return None;
            }
        };

        if self.session.guard.is_busy(Instant::now()) {
            return None;
        }

        self.drop_vanished(&routes);

        for route in &routes {
            let page = self.session.pages.current(&route.name);
            match self
                .client
                .torrent_page(&route.name, page, PAGE_SIZE)
                .await
            {
                Ok(window) => {
                    // A stale page arriving after the guard engaged is
                    // discarded here, not cancelled earlier.
                    if self.session.guard.is_busy(Instant::now()) {
                        continue;
                    }
                    let rows = self.session.rows.entry(route.name.clone()).or_default();
                    reconcile::reconcile(&route.name, rows, &window, &mut self.sink);
                }
                Err(err) => self.notifier.error(&format!(
                    "error getting torrents for {}: {err}",
                    route.name
                )),
            }
        }

        Some(routes)
    }

    /// Navigate one route to a page and reconcile it, leaving other routes
    /// untouched.
    pub async fn goto_page(&mut self, route: &str, page: u32, total_pages: Option<u32>) {
        let resolved = self.session.pages.goto_page(route, page, total_pages);
        match self.client.torrent_page(route, resolved, PAGE_SIZE).await {
            Ok(window) => {
                if self.session.guard.is_busy(Instant::now()) {
                    return;
                }
                let rows = self.session.rows.entry(route.to_string()).or_default();
                reconcile::reconcile(route, rows, &window, &mut self.sink);
            }
            Err(err) => self
                .notifier
                .error(&format!("error getting torrents for {route}: {err}")),
        }
    }

    fn drop_vanished(&mut self, routes: &[RouteSummary]) {
        let stale: Vec<String> = self
            .session
            .rows
            .keys()
            .filter(|name| !routes.iter().any(|route| route.name == **name))
            .cloned()
            .collect();
        for route in stale {
            self.session.rows.remove(&route);
            self.session.pages.remove(&route);
            self.sink.retire_route(&route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RowMutation;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        batches: Vec<(String, Vec<RowMutation>)>,
        retired: Vec<String>,
    }

    impl RowSink for RecordingSink {
        fn apply(&mut self, route: &str, batch: &[RowMutation]) {
            self.batches.push((route.to_string(), batch.to_vec()));
        }

        fn retire_route(&mut self, route: &str) {
            self.retired.push(route.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        infos: Vec<String>,
        errors: Vec<String>,
    }

    impl Notifier for RecordingNotifier {
        fn info(&mut self, message: &str) {
            self.infos.push(message.to_string());
        }

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn poller_for(server: &MockServer) -> Poller<RecordingSink, RecordingNotifier> {
        let client = DaemonClient::new(Client::new(), server.base_url().parse().expect("url"));
        Poller::new(client, RecordingSink::default(), RecordingNotifier::default())
    }

    fn mock_interval(server: &MockServer, secs: u32) -> httpmock::Mock<'_> {
        server.mock(move |when, then| {
            when.method(GET).path("/api/watch_interval");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"interval": secs}));
        })
    }

    fn mock_routes(server: &MockServer, body: serde_json::Value) -> httpmock::Mock<'_> {
        server.mock(move |when, then| {
            when.method(GET).path("/api/routes");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body.clone());
        })
    }

    fn mock_page<'a>(server: &'a MockServer, route: &str, items: serde_json::Value) -> httpmock::Mock<'a> {
        let path = format!("/api/routes/{route}/torrents");
        server.mock(move |when, then| {
            when.method(GET).path(path.as_str());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "name": "movies", "page": 1, "size": 25, "total": 2,
                    "items": items.clone()
                }));
        })
    }

    #[tokio::test]
    async fn cycle_renders_routes_and_adopts_interval() {
        let server = MockServer::start_async().await;
        mock_routes(&server, json!([{"name": "movies", "total": 2}]));
        mock_interval(&server, 30);
        mock_page(
            &server,
            "movies",
            json!([
                {"name": "Alpha", "hash": "aa", "peers": 4, "seeders": 0},
                {"name": "Bravo", "hash": "bb", "peers": 9, "seeders": 5}
            ]),
        );

        let mut poller = poller_for(&server);
        let routes = poller.run_cycle().await.expect("render happened");

        assert_eq!(routes.len(), 1);
        assert_eq!(poller.session().interval_secs, 30);
        assert_eq!(poller.poll_delay(), Duration::from_secs(30));
        let rows = poller.session().rows("movies").expect("rows rendered");
        assert_eq!(rows.len(), 2);
        assert!(rows.contains("aa") && rows.contains("bb"));
    }

    #[tokio::test]
    async fn busy_guard_discards_fetched_data() {
        let server = MockServer::start_async().await;
        mock_routes(&server, json!([{"name": "movies", "total": 1}]));
        mock_interval(&server, 5);
        mock_page(
            &server,
            "movies",
            json!([{"name": "Alpha", "hash": "aa"}]),
        );

        let mut poller = poller_for(&server);
        poller.session_mut().guard.begin_selection();
        let outcome = poller.run_cycle().await;

        assert!(outcome.is_none());
        assert!(poller.sink().batches.is_empty(), "no row may change while busy");
        assert!(poller.session().rows("movies").is_none());
    }

    #[tokio::test]
    async fn listing_failure_notifies_once_and_degrades() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/routes");
            then.status(502);
        });
        mock_interval(&server, 5);

        let mut poller = poller_for(&server);
        let outcome = poller.run_cycle().await;

        assert!(outcome.is_none());
        assert_eq!(poller.notifier.errors.len(), 1);
        assert!(poller.notifier.infos.is_empty());
        assert!(poller.sink().batches.is_empty());
    }

    #[tokio::test]
    async fn interval_failure_does_not_block_rendering() {
        let server = MockServer::start_async().await;
        mock_routes(&server, json!([{"name": "movies", "total": 1}]));
        server.mock(|when, then| {
            when.method(GET).path("/api/watch_interval");
            then.status(500);
        });
        mock_page(&server, "movies", json!([{"name": "Alpha", "hash": "aa"}]));

        let mut poller = poller_for(&server);
        let outcome = poller.run_cycle().await;

        assert!(outcome.is_some());
        assert_eq!(poller.notifier.errors.len(), 1);
        assert_eq!(poller.session().interval_secs, DEFAULT_INTERVAL_SECS);
        assert!(poller.session().rows("movies").is_some());
    }

    #[tokio::test]
    async fn vanished_route_state_is_dropped() {
        let server = MockServer::start_async().await;
        let mut routes = mock_routes(&server, json!([{"name": "movies", "total": 1}]));
        mock_interval(&server, 5);
        mock_page(&server, "movies", json!([{"name": "Alpha", "hash": "aa"}]));

        let mut poller = poller_for(&server);
        poller.run_cycle().await.expect("first cycle renders");
        assert!(poller.session().rows("movies").is_some());

        routes.delete();
        mock_routes(&server, json!([]));
        poller.run_cycle().await.expect("second cycle renders");

        assert!(poller.session().rows("movies").is_none());
        assert_eq!(poller.session().pages.current("movies"), 1);
        assert_eq!(poller.sink().retired, vec!["movies".to_string()]);
    }

    #[tokio::test]
    async fn goto_page_touches_one_route_only() {
        let server = MockServer::start_async().await;
        let page_two = server.mock(|when, then| {
            when.method(GET)
                .path("/api/routes/movies/torrents")
                .query_param("page", "2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "name": "movies", "page": 2, "size": 25, "total": 30,
                    "items": [{"name": "Charlie", "hash": "cc"}]
                }));
        });

        let mut poller = poller_for(&server);
        poller.goto_page("movies", 99, Some(2)).await;

        page_two.assert();
        assert_eq!(poller.session().pages.current("movies"), 2);
        let rows = poller.session().rows("movies").expect("rows");
        assert!(rows.contains("cc"));
    }
}
