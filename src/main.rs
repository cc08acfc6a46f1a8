mod cli;

use std::path::Path;

use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use qf_calculator::{
    config::{Config, DEFAULT_CONFIG_PATH},
    qf::{parse_amount, split_tokens, CalculatorState},
    report::{OutputFormat, StateReport},
    session::{grant_index, Session},
    share::restore_or_default,
    utils,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("qf_calculator=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Show { query, format } => {
            let state = restore_or_default(query.as_deref(), &config);
            render(&state, &config, format)
        }

        Commands::Compute { grants, budget, format } => compute(&config, &grants, budget.as_deref(), format),

        Commands::Add { query, format } => {
            let state = restore_or_default(query.as_deref(), &config).add_grant();
            render(&state, &config, format)
        }

        Commands::Remove { number, query, format } => {
            let state = restore_or_default(query.as_deref(), &config);
            grant_index(&state, number)
                .and_then(|index| render(&state.remove_grant(index), &config, format))
        }

        Commands::Update { number, amounts, query, format } => {
            let state = restore_or_default(query.as_deref(), &config);
            let joined = amounts.join(" ");
            let tokens = split_tokens(&joined);
            grant_index(&state, number).and_then(|index| {
                render(&state.update_contributions(index, tokens.as_slice()), &config, format)
            })
        }

        Commands::Budget { value, query, format } => {
            let state = restore_or_default(query.as_deref(), &config).set_match_budget(parse_amount(&value));
            render(&state, &config, format)
        }

        Commands::Session { query } => {
            let mut session = Session::new(config, query.as_deref());
            session.run(std::io::stdin().lock())
        }

        Commands::Init { path, yes } => initialize(&config, path.as_deref(), yes),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn render(state: &CalculatorState, config: &Config, format: OutputFormat) -> qf_calculator::Result<()> {
    StateReport::new(state, config)?.print(config, format)
}

fn compute(config: &Config, grants: &[String], budget: Option<&str>, format: OutputFormat) -> qf_calculator::Result<()> {
    let budget = budget.map(parse_amount).unwrap_or(config.calculator.default_match);
    info!("Computing matches for {} grants with budget {}", grants.len(), budget);

    let state = grants.iter().enumerate().fold(
        CalculatorState::with_empty_grants(grants.len(), budget).with_policy(config.contribution_policy()),
        |state, (index, list)| state.update_contributions(index, split_tokens(list).as_slice()),
    );
    render(&state, config, format)
}

fn initialize(config: &Config, path: Option<&str>, yes: bool) -> qf_calculator::Result<()> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    if Path::new(path).exists()
        && !yes
        && !utils::confirm_action(&format!("{} already exists. Overwrite?", path))
    {
        println!("Cancelled");
        return Ok(());
    }

    std::fs::write(path, config.to_toml()?)?;
    info!("Wrote configuration to {}", path);

    println!("{}", format!("✓ Configuration written to {}", path).green());
    println!("\n{}", "Configuration:".cyan());
    println!("  Default match:    {}", utils::format_amount(config.calculator.default_match, &config.display));
    println!("  Default grants:   {}", config.calculator.default_grants);
    println!("  Reject negative:  {}", config.calculator.reject_negative);
    println!("  Share base URL:   {}", config.share.base_url);

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to start an interactive calculator", "qf-calc session".yellow());
    println!(
        "  {} to compare two grants",
        "qf-calc compute -g 100 -g 25,25,25,25 -b 500".yellow()
    );
    Ok(())
}
