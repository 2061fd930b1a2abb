use crate::commands::{open_page, print_json, Context};
use crate::error::{invalid_input, not_found};
use anyhow::{Context as _, Result};
use clap::Args;
use phonecheck_config::PageConfig;
use phonecheck_core::{
    extract_phone_numbers, reconcile, CheckKind, ExpectedPhones, PageCapture,
    ReconciliationReport,
};
use phonecheck_source::load_expected_phones;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Expected phone CSV; defaults to `expected_csv` from the config
    #[arg(long)]
    pub expected: Option<PathBuf>,
    /// Only visit the named page (repeatable)
    #[arg(long = "page", value_name = "NAME")]
    pub pages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct VerifyOutput<'a> {
    expected_csv: String,
    expected_count: usize,
    pages: &'a [PageCapture],
    report: &'a ReconciliationReport,
    mismatches: Vec<String>,
}

pub fn verify(ctx: &Context<'_>, args: VerifyArgs) -> Result<()> {
    let path = ctx.expected_path(args.expected);
    let expected = load_expected_phones(&path)
        .with_context(|| format!("load expected phones from {}", path.display()))?;

    let pages = select_pages(ctx, &args.pages)?;
    let captures = visit_pages(ctx, &pages, &expected)?;
    let report = reconcile(&expected, &captures);
    let mismatches = report.mismatches();

    if ctx.json {
        print_json(&VerifyOutput {
            expected_csv: path.display().to_string(),
            expected_count: expected.len(),
            pages: &captures,
            report: &report,
            mismatches: mismatches.iter().map(ToString::to_string).collect(),
        })?;
    } else {
        print_summary(&captures, &report);
    }

    report.into_result()?;
    Ok(())
}

fn select_pages<'a>(ctx: &Context<'a>, names: &[String]) -> Result<Vec<&'a PageConfig>> {
    if ctx.config.pages.is_empty() {
        return Err(invalid_input(
            "no pages configured; add [[pages]] entries to the config file",
        ));
    }
    if names.is_empty() {
        return Ok(ctx.config.pages.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            ctx.config
                .page(name)
                .ok_or_else(|| not_found(format!("page {name:?} is not configured")))
        })
        .collect()
}

fn visit_pages(
    ctx: &Context<'_>,
    pages: &[&PageConfig],
    expected: &ExpectedPhones,
) -> Result<Vec<PageCapture>> {
    info!(expected = expected.len(), pages = pages.len(), "validating phone numbers");
    let mut captures = Vec::with_capacity(pages.len());
    for page in pages {
        let source = open_page(ctx, page)?;
        let capture = extract_phone_numbers(&source, &page.selectors, ctx.config.wait_timeout)
            .with_context(|| format!("extract phone numbers from {}", page.name))?;
        if !ctx.json {
            println!(
                "Found {} phone numbers on {}",
                capture.phones.len(),
                capture.origin
            );
            for sighting in capture.phones.sightings() {
                println!("  {} ({})", sighting.phone, sighting.raw);
            }
            for miss in &capture.unmatched {
                println!(
                    "  selector {:?} not found within {} ms",
                    miss.selector,
                    miss.waited.as_millis()
                );
            }
        }
        captures.push(capture);
    }
    Ok(captures)
}

fn print_summary(captures: &[PageCapture], report: &ReconciliationReport) {
    let visited: Vec<&str> = captures.iter().map(|c| c.origin.as_str()).collect();
    println!("Visited: {}", visited.join(", "));
    println!(
        "Page numbers in expected list: {} passed, {} failed",
        report.count(CheckKind::Forward, true),
        report.count(CheckKind::Forward, false)
    );
    println!(
        "Expected numbers found on pages: {} passed, {} failed",
        report.count(CheckKind::Backward, true),
        report.count(CheckKind::Backward, false)
    );
    let mismatches = report.mismatches();
    if mismatches.is_empty() {
        println!("All phone numbers match.");
        return;
    }
    println!("Mismatches:");
    for mismatch in mismatches {
        println!("- {}", mismatch);
    }
}
