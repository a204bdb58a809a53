//! Prompt command - print the vision model prompt.

use clap::Args;

use biller_core::receipt::prompt::build_prompt;

use super::load_config;

/// Arguments for the prompt command.
#[derive(Args)]
pub struct PromptArgs {
    /// Currency symbol to ask for (overrides config)
    #[arg(long)]
    currency: Option<String>,
}

pub async fn run(args: PromptArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut extraction = config.extraction;
    if let Some(symbol) = args.currency {
        extraction.currency_symbol = symbol;
    }
    extraction.validate()?;

    print!("{}", build_prompt(extraction.currency_symbol.trim()));

    Ok(())
}
