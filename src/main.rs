//! uplink-dedupe binary entry point.
//!
//! Reads messages from stdin, one per line, and prints window reports.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uplink_dedupe::cli::{self, Args};
use uplink_dedupe::config::Config;
use uplink_dedupe::{logging, Callback, Deduplicator, Message, UplinkHandler};

/// Slack after the last collection window for detached reports to print.
const REPORT_GRACE: Duration = Duration::from_millis(100);

#[derive(Serialize)]
struct Report<'a> {
    event: &'a str,
    key: &'a str,
    count: usize,
    messages: &'a [Message],
}

fn reporter(event: &'static str, json: bool) -> Callback {
    Arc::new(move |key: String, messages: Vec<Message>| {
        if !json {
            println!("{}: {} {}", key, event, messages.len());
            return;
        }

        let report = Report {
            event,
            key: &key,
            count: messages.len(),
            messages: &messages,
        };
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(key = %key, error = %e, "failed to encode report"),
        }
    })
}

async fn feed_stdin(handler: &impl UplinkHandler) -> std::io::Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        handler.handle_uplink(Message::new(line));
        count += 1;
    }
    Ok(count)
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args)?;
    logging::try_init_with(config.log_filter()).ok();

    let windows = config.to_window_config()?;
    info!(
        "uplink-dedupe v{} (dedupe {:?}, collect {:?})",
        env!("CARGO_PKG_VERSION"),
        windows.dedupe,
        windows.collect
    );

    let dedup = Deduplicator::new(
        windows,
        reporter("deduped", args.json),
        reporter("collected", args.json),
    )?;

    if !args.json {
        println!("type text and press enter");
    }

    tokio::select! {
        result = feed_stdin(&dedup) => {
            let count = result?;
            info!(count, "input closed; waiting for open sessions to report");
            // Every open session started before EOF, so one collection
            // window is enough for all of them to report.
            tokio::time::sleep(windows.collect + REPORT_GRACE).await;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    dedup.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("try 'uplink-dedupe --help' for more information");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
