use std::collections::HashMap;

use skiff_sync::pager::{self, PAGE_SIZE};
use skiff_sync::reconcile::{Column, RowMutation, RowSink};
use skiff_sync::{Notifier, Poller};

use crate::cli::WatchArgs;
use crate::client::{AppContext, CliResult};
use crate::output::pager_line;

pub(crate) async fn handle_watch(ctx: &AppContext, args: WatchArgs) -> CliResult<()> {
    let WatchArgs { once } = args;
    let mut poller = Poller::new(ctx.daemon.clone(), TermSink::default(), CliNotifier);

    loop {
        if let Some(routes) = poller.run_cycle().await {
            for route in &routes {
                let page = poller.session().pages.current(&route.name);
                if let Some(view) = pager::render_pager(page, PAGE_SIZE, route.total) {
                    println!("{}", pager_line(&route.name, &view));
                }
            }
        }

        if once {
            return Ok(());
        }

        tokio::select! {
            () = tokio::time::sleep(poller.poll_delay()) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Notification surface printing to the terminal.
struct CliNotifier;

impl Notifier for CliNotifier {
    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Terminal rendering surface: keeps each route's rows in arrival order and
/// reprints the route's table whenever a batch lands.
#[derive(Default)]
struct TermSink {
    tables: HashMap<String, RouteTable>,
}

#[derive(Default)]
struct RouteTable {
    order: Vec<String>,
    cells: HashMap<String, [String; Column::ALL.len()]>,
}

impl TermSink {
    fn print_route(&self, route: &str) {
        let Some(table) = self.tables.get(route) else {
            return;
        };
        println!("== {route} ==");
        println!(
            "{:<40} {:<21} {:>10} {:<16} {}",
            Column::Name.header(),
            Column::Transfer.header(),
            Column::Size.header(),
            Column::Health.header(),
            Column::Status.header()
        );
        for hash in &table.order {
            if let Some(cells) = table.cells.get(hash) {
                println!(
                    "{:<40} {:<21} {:>10} {:<16} {}",
                    cells[Column::Name.index()],
                    cells[Column::Transfer.index()],
                    cells[Column::Size.index()],
                    cells[Column::Health.index()],
                    cells[Column::Status.index()]
                );
            }
        }
    }
}

impl RowSink for TermSink {
    fn apply(&mut self, route: &str, batch: &[RowMutation]) {
        let table = self.tables.entry(route.to_string()).or_default();
        for mutation in batch {
            match mutation {
                RowMutation::Insert { hash } => {
                    table.order.push(hash.clone());
                    table
                        .cells
                        .insert(hash.clone(), std::array::from_fn(|_| String::new()));
                }
                RowMutation::SetCell {
                    hash,
                    column,
                    value,
                } => {
                    if let Some(cells) = table.cells.get_mut(hash) {
                        cells[column.index()] = value.clone();
                    }
                }
                RowMutation::Remove { hash } => {
                    table.order.retain(|existing| existing != hash);
                    table.cells.remove(hash);
                }
            }
        }
        self.print_route(route);
    }

    fn retire_route(&mut self, route: &str) {
        self.tables.remove(route);
        println!("== {route} == (removed)");
    }
}
