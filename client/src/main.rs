use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use client::{ClientConfig, ConfigReport, LoadOptions};
use shared::ApiRoute;

#[derive(Parser, Debug)]
#[command(name = "planner-config")]
#[command(about = "Show the API base URL the planner client will use")]
struct Args {
    /// Base URL to use instead of API_BASE_URL, the config file and the built-in default.
    /// Pass "null" for the localhost default
    #[arg(long)]
    base_url: Option<String>,
    /// JSON config file, e.g. { "api_base_url": "http://10.0.0.75:8000" }
    #[arg(long, env = "API_CONFIG_FILE")]
    config: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Routes to expand into full URLs: health, init-db, tasks, task:<id>,
    /// schedule, schedule:<YYYY-MM-DD>, week:<YYYY-MM-DD>, unschedule:<id>
    #[arg(value_name = "ROUTE")]
    routes: Vec<ApiRoute>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = LoadOptions {
        base_url_override: args.base_url,
        config_file: args.config,
    };
    let config = ClientConfig::load_with(&options).context("Failed to load API configuration")?;
    let report = ConfigReport::new(&config, &args.routes).context("Failed to build request URLs")?;
    info!("Resolved {} route(s)", report.routes.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
