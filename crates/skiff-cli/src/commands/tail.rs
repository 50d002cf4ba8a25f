use std::time::Duration;

use skiff_sync::logtail::{self, TailOptions};

use crate::cli::TailArgs;
use crate::client::{AppContext, CliResult};
use crate::output::render_log_record;

pub(crate) async fn handle_tail(ctx: &AppContext, args: TailArgs) -> CliResult<()> {
    let TailArgs { poll_interval_secs } = args;
    let options = TailOptions {
        poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
    };
    let output = ctx.output;

    logtail::follow(&ctx.daemon, &options, |record| {
        if let Err(err) = render_log_record(&record, output) {
            eprintln!("error: {}", err.display_message());
        }
    })
    .await?;
    Ok(())
}
