//! Offline helpers: profit calculator and configuration file.

use anyhow::{Context, Result};

use threadline_client::ClientConfig;
use threadline_core::calc;

use crate::cli::{ConfigCommand, ProfitArgs};
use crate::context::AppContext;
use crate::render::money_pair;

pub fn profit(args: ProfitArgs) {
    money_pair("Cost", args.cost);
    money_pair("Selling", args.selling);
    match calc::profit_percentage(args.cost, args.selling) {
        Some(pct) => println!("{:<10}{pct:.2}%", "Profit"),
        None => println!("{:<10}n/a (cost is zero)", "Profit"),
    }
}

pub fn config(ctx: &AppContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(&ctx.config)?);
            if let Some(path) = ctx
                .config_path
                .clone()
                .or_else(ClientConfig::default_config_path)
            {
                println!("# file: {}", path.display());
            }
        }
        ConfigCommand::Init => {
            ctx.config
                .save(ctx.config_path.clone())
                .context("Failed to write configuration")?;
            println!("Configuration written");
        }
    }
    Ok(())
}
