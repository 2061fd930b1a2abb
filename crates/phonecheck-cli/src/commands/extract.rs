use crate::commands::{fetch_url_page, open_file_page, print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use phonecheck_config::MAX_WAIT_TIMEOUT_MS;
use phonecheck_core::extract_phone_numbers;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("location")
        .required(true)
        .args(["url", "file"]),
))]
pub struct ExtractArgs {
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Selector group to read, in order (repeatable)
    #[arg(long = "selector", value_name = "SELECTOR", required = true)]
    pub selectors: Vec<String>,
    /// Label used in output
    #[arg(long, default_value = "page")]
    pub name: String,
    /// Wait budget per selector; defaults to `wait_timeout_ms` from the config
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

pub fn extract(ctx: &Context<'_>, args: ExtractArgs) -> Result<()> {
    let timeout = match args.timeout_ms {
        Some(ms) if ms == 0 || ms > MAX_WAIT_TIMEOUT_MS => {
            return Err(invalid_input(format!(
                "--timeout-ms must be between 1 and {MAX_WAIT_TIMEOUT_MS}"
            )));
        }
        Some(ms) => Duration::from_millis(ms),
        None => ctx.config.wait_timeout,
    };

    let page = match (&args.url, &args.file) {
        (Some(url), _) => fetch_url_page(ctx, &args.name, url)?,
        (None, Some(file)) => open_file_page(&args.name, file)?,
        (None, None) => return Err(invalid_input("one of --url or --file is required")),
    };

    let capture = extract_phone_numbers(&page, &args.selectors, timeout)
        .with_context(|| format!("extract phone numbers from {}", args.name))?;

    if ctx.json {
        return print_json(&capture);
    }

    println!(
        "Found {} phone numbers on {}",
        capture.phones.len(),
        capture.origin
    );
    for sighting in capture.phones.sightings() {
        println!("{}\t{}", sighting.phone, sighting.raw);
    }
    if !capture.unmatched.is_empty() {
        println!("Unmatched selectors:");
        for miss in capture.unmatched {
            println!("- {}", miss.selector);
        }
    }
    Ok(())
}
