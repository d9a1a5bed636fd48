//! The `scan` command: render the live view in the terminal.

use anyhow::{bail, Result};
use colored::Colorize;
use tracing::info;

use wifi_watch_scan::{PollingScheduler, ViewState};

use crate::render::render_view;
use crate::{OutputFormat, ScanArgs};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Execute the scan command.
pub async fn execute(args: ScanArgs) -> Result<()> {
    let scheduler = args.source.scheduler()?;
    if args.watch {
        watch(&scheduler, args.format).await
    } else {
        once(&scheduler, args.format).await
    }
}

/// Run one cycle and print the resulting view. Fails if the cycle failed.
async fn once(scheduler: &PollingScheduler, format: OutputFormat) -> Result<()> {
    scheduler.run_cycle().await;
    let view = scheduler.snapshot();
    print_view(&view, format, false)?;

    if let Some(error) = &view.error {
        bail!("scan failed: {error}");
    }
    Ok(())
}

/// Poll on the configured interval and re-render on every publication
/// until Ctrl-C.
async fn watch(scheduler: &PollingScheduler, format: OutputFormat) -> Result<()> {
    let mut views = scheduler.subscribe();
    scheduler.start();
    info!(
        backend = scheduler.backend_name(),
        poll_interval_ms = scheduler.config().poll_interval_ms,
        "watching; press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view, format, true)?;
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{} Stopping", "[OK]".green().bold());
                break;
            }
        }
    }

    scheduler.shutdown();
    Ok(())
}

fn print_view(view: &ViewState, format: OutputFormat, redraw: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(view)?);
        }
        OutputFormat::Table => {
            if redraw {
                print!("{CLEAR_SCREEN}");
            }
            print!("{}", render_view(view));
        }
    }
    Ok(())
}
