//! `listsync once`: a single reconciliation cycle.

use anyhow::{Result, bail};
use reconcile::{ApplyOutcome, CycleResult, GatewayError, Reconciler};
use twitterkit::ErrorCategory;

use crate::Context;
use crate::cli::SyncArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &SyncArgs) -> Result<()> {
    let settings = super::load_settings(ctx, &args.connect, args.interval, args.dry_run)?;
    let reconciler =
        Reconciler::with_options(settings.client(), settings.list_id, settings.options());

    let result = reconciler.run_cycle();

    if !ctx.quiet {
        print_result(settings.list_id, &result);
    }

    check(&result)
}

/// Turn an aborted or partially failed cycle into an error exit
fn check(result: &CycleResult) -> Result<()> {
    match result {
        CycleResult::Aborted(e) => bail!("Cycle aborted: {e}"),
        _ if result.is_partial_failure() => {
            let errors: Vec<String> = result
                .apply_errors()
                .iter()
                .map(ToString::to_string)
                .collect();
            bail!("Cycle finished with errors: {}", errors.join("; "))
        }
        _ => Ok(()),
    }
}

fn print_result(list_id: i64, result: &CycleResult) {
    ui::header(&format!("List {list_id}"));

    let (Some(additions), Some(removals)) = (result.additions(), result.removals()) else {
        if let Some(e) = result.fetch_error() {
            ui::error(&e.to_string());
            if let GatewayError::Http { status, .. } = e.gateway_error() {
                ui::dim(ErrorCategory::from_status(*status).advice());
            }
        }
        return;
    };

    print_outcome("add", additions);
    print_outcome("remove", removals);
}

fn print_outcome(label: &str, outcome: &ApplyOutcome) {
    match outcome {
        ApplyOutcome::Skipped => ui::dim(&format!("{label}: nothing to do")),
        ApplyOutcome::Applied { count } => ui::success(&format!("{label}: {count} applied")),
        ApplyOutcome::DryRun { count } => ui::warn(&format!("{label}: {count} (dry run)")),
        ApplyOutcome::Failed { count, error } => {
            ui::error(&format!("{label}: {count} not applied ({error})"));
        }
    }
}
