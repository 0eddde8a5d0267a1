//! `listsync diff`: fetch both sets and show the pending changes.

use anyhow::Result;
use reconcile::{Diff, ListId, Reconciler};
use serde::Serialize;

use crate::Context;
use crate::cli::DiffArgs;
use crate::ui;

#[derive(Serialize)]
struct DiffReport<'a> {
    list_id: ListId,
    #[serde(flatten)]
    diff: &'a Diff,
}

pub fn run(ctx: &Context, args: &DiffArgs) -> Result<()> {
    let settings = super::load_settings(ctx, &args.connect, None, false)?;
    let reconciler = Reconciler::new(settings.client(), settings.list_id);

    let diff = reconciler.plan()?;

    if args.json {
        let report = DiffReport {
            list_id: settings.list_id,
            diff: &diff,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    ui::header(&format!("List {} Diff", settings.list_id));

    if diff.is_empty() {
        println!();
        ui::success("No changes - list matches the accounts you follow");
        return Ok(());
    }

    if !diff.additions.is_empty() {
        ui::section("To add");
        diff.additions.iter().copied().for_each(ui::added);
    }
    if !diff.removals.is_empty() {
        ui::section("To remove");
        diff.removals.iter().copied().for_each(ui::removed);
    }

    let summary = diff.summary();
    println!();
    ui::dim(&format!(
        "{} to add, {} to remove",
        summary.additions, summary.removals
    ));

    Ok(())
}
