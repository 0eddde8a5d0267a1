//! `listsync config`: show resolved settings.

use anyhow::Result;

use crate::Context;
use crate::cli::SyncArgs;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, args: &SyncArgs) -> Result<()> {
    let settings = super::load_settings(ctx, &args.connect, args.interval, args.dry_run)?;

    ui::header("listsync Configuration");

    let source = match &settings.source {
        Some(path) => path.display().to_string(),
        None => format!("(none, looked for {})", paths::default_config_file()?.display()),
    };
    ui::kv("Config file", &source);

    ui::section("Sync");
    ui::kv("List", &settings.list_id.to_string());
    ui::kv("Interval", &settings.interval_display());
    ui::kv("Page size", &settings.page_size.to_string());
    ui::kv("Dry run", if settings.dry_run { "yes" } else { "no" });
    ui::kv("API", &settings.api_base);

    let creds = &settings.credentials;
    ui::section("Credentials");
    ui::kv("Consumer key (CK)", &ui::mask_secret(&creds.consumer_key));
    ui::kv("Consumer secret (CS)", &ui::mask_secret(&creds.consumer_secret));
    ui::kv("Access token (AT)", &ui::mask_secret(&creds.access_token));
    ui::kv(
        "Access token secret (ATS)",
        &ui::mask_secret(&creds.access_token_secret),
    );

    Ok(())
}
