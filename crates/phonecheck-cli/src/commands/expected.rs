use crate::commands::{print_json, Context};
use anyhow::{Context as _, Result};
use clap::Args;
use phonecheck_source::load_expected_phones;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExpectedArgs {
    /// Expected phone CSV; defaults to `expected_csv` from the config
    #[arg(long)]
    pub expected: Option<PathBuf>,
}

pub fn expected(ctx: &Context<'_>, args: ExpectedArgs) -> Result<()> {
    let path = ctx.expected_path(args.expected);
    let phones = load_expected_phones(&path)
        .with_context(|| format!("load expected phones from {}", path.display()))?;

    if ctx.json {
        return print_json(&phones);
    }

    println!(
        "Loaded {} expected phone numbers from {}",
        phones.len(),
        path.display()
    );
    for record in phones.records() {
        let country = record.country.as_deref().unwrap_or("-");
        println!("{}\t{}\t{}", record.row, country, record.phone);
    }
    Ok(())
}
