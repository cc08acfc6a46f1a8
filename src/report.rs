use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::{
    config::Config,
    error::Result,
    qf::CalculatorState,
    share::{encode_state_to_query, share_url},
    utils,
};

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

const COLUMN_WIDTHS: [usize; 5] = [10, 32, 10, 14, 14];

/// One rendered row of the grant table
#[derive(Debug, Clone, Serialize)]
pub struct GrantRow {
    pub number: usize,
    pub contributions: Vec<f64>,
    pub funding_amount: f64,
    pub match_amount: f64,
    pub weight: f64,
    pub match_multiplier: Option<f64>,
}

/// Everything the front ends show for one state
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub grants: Vec<GrantRow>,
    pub match_budget: f64,
    pub total_funding: f64,
    pub total_matched: f64,
    pub invalid_grants: usize,
    pub query: String,
    pub share_url: String,
}

impl StateReport {
    pub fn new(state: &CalculatorState, config: &Config) -> Result<Self> {
        let summary = state.summary();
        let grants = state
            .grants()
            .iter()
            .zip(summary.grants)
            .map(|(grant, line)| GrantRow {
                number: line.number,
                contributions: grant.contributions().to_vec(),
                funding_amount: line.funding_amount,
                match_amount: line.match_amount,
                weight: line.weight,
                match_multiplier: line.match_multiplier,
            })
            .collect();

        Ok(Self {
            grants,
            match_budget: summary.match_budget,
            total_funding: summary.total_funding,
            total_matched: summary.total_matched,
            invalid_grants: summary.invalid_grants,
            query: encode_state_to_query(state),
            share_url: share_url(&config.share.base_url, state)?.to_string(),
        })
    }

    /// Plain-text table lines (no colors), header first
    pub fn table_lines(&self, config: &Config) -> Vec<String> {
        let display = &config.display;
        let mut lines = vec![utils::table_row(
            &["Grant", "Funding", "Funded", "Match amount", "Multiplier"],
            &COLUMN_WIDTHS,
        )];

        for row in &self.grants {
            let multiplier = row
                .match_multiplier
                .map(|m| format!("{:.2}x", m))
                .unwrap_or_else(|| "-".to_string());
            lines.push(utils::table_row(
                &[
                    &format!("Grant #{}", row.number),
                    &utils::format_contributions(&row.contributions),
                    &utils::format_amount(row.funding_amount, display),
                    &utils::format_amount(row.match_amount, display),
                    &multiplier,
                ],
                &COLUMN_WIDTHS,
            ));
        }
        lines
    }

    /// Print the grant table and totals to the console
    pub fn print_table(&self, config: &Config) {
        let display = &config.display;
        let width = COLUMN_WIDTHS.iter().sum::<usize>() + 2 * COLUMN_WIDTHS.len();
        let lines = self.table_lines(config);

        println!("\n{}", "=== Quadratic Funding Match ===".cyan().bold());
        utils::print_table_border(width);
        println!("{}", lines[0]);
        utils::print_table_border(width);
        if self.grants.is_empty() {
            println!("{}", "No grants. Add one to start matching.".yellow());
        }
        for line in &lines[1..] {
            println!("{}", line);
        }
        utils::print_table_border(width);

        println!("Match budget:   {}", utils::format_amount_colored(self.match_budget, display));
        println!("Total funded:   {}", utils::format_amount_colored(self.total_funding, display));
        println!("Total matched:  {}", utils::format_amount_colored(self.total_matched, display));
        if self.invalid_grants > 0 {
            println!(
                "{}",
                format!("{} grant(s) have invalid amounts", self.invalid_grants).red()
            );
        }
        println!("Share:          {}", self.share_url.cyan());
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn print(&self, config: &Config, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => self.print_table(config),
            OutputFormat::Json => println!("{}", self.to_json()?),
        }
        Ok(())
    }
}
