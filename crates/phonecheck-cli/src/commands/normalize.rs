use crate::commands::print_json;
use anyhow::Result;
use clap::Args;
use phonecheck_core::NormalizedPhone;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[arg(required = true)]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NormalizedValue {
    input: String,
    phone: Option<NormalizedPhone>,
}

pub fn normalize(json: bool, args: NormalizeArgs) -> Result<()> {
    let values: Vec<NormalizedValue> = args
        .values
        .into_iter()
        .map(|input| NormalizedValue {
            phone: NormalizedPhone::parse(&input),
            input,
        })
        .collect();

    if json {
        return print_json(&values);
    }

    for value in values {
        match value.phone {
            Some(phone) => println!("{phone}"),
            None => println!("(no phone number)"),
        }
    }
    Ok(())
}
