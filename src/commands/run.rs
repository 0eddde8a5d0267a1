//! `listsync run`: reconcile now, then on every tick until Ctrl-C.

use anyhow::{Context as _, Result};
use log::info;
use reconcile::{CancelToken, Reconciler, Scheduler};

use crate::Context;
use crate::cli::SyncArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &SyncArgs) -> Result<()> {
    let settings = super::load_settings(ctx, &args.connect, args.interval, args.dry_run)?;

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || {
        info!("shutdown requested, finishing current cycle");
        on_signal.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    info!(
        "syncing list {} every {}{}",
        settings.list_id,
        settings.interval_display(),
        if settings.dry_run { " (dry run)" } else { "" }
    );

    let reconciler =
        Reconciler::with_options(settings.client(), settings.list_id, settings.options());
    let mut scheduler = Scheduler::new(settings.interval);
    let report = scheduler.run(&reconciler, &cancel, |_| {});

    if !ctx.quiet {
        ui::success(&format!(
            "Stopped after {} cycle(s): {} ok, {} partial, {} aborted",
            report.cycles, report.succeeded, report.partial_failures, report.aborted
        ));
    }

    Ok(())
}
