use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{CalculatorError, Result},
    qf::{parse_amount, split_tokens, CalculatorState},
    report::{OutputFormat, StateReport},
    share::restore_or_default,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "qf", disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Commands accepted on the session prompt
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Add an empty grant
    Add,
    /// Remove a grant by its number
    #[command(alias = "rm")]
    Remove { number: usize },
    /// Replace a grant's contributions, e.g. `set 2 10 10 5` or `set 2 10,10,5`
    Set {
        number: usize,
        #[arg(allow_hyphen_values = true)]
        amounts: Vec<String>,
    },
    /// Set the match budget
    Budget {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Show the grant table
    Show,
    /// Print the shareable URL
    Url,
    /// Show the state as JSON
    Json,
    /// Go back to the state the session started with
    Reset,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

impl SessionCommand {
    pub fn parse_line(line: &str) -> std::result::Result<Self, clap::Error> {
        SessionLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }
}

/// Translate a 1-based grant number, as displayed, into an index
pub fn grant_index(state: &CalculatorState, number: usize) -> Result<usize> {
    if number == 0 || number > state.len() {
        return Err(CalculatorError::GrantIndexOutOfRange {
            index: number,
            len: state.len(),
        });
    }
    Ok(number - 1)
}

/// What the front end should do after a command ran
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutput {
    Report(OutputFormat),
    Text(String),
    Quit,
}

/// An interactive calculator: owns the current state and applies one
/// command at a time, like the page's table did for clicks and edits
pub struct Session {
    config: Config,
    initial: CalculatorState,
    state: CalculatorState,
    pub should_quit: bool,
}

impl Session {
    pub fn new(config: Config, query: Option<&str>) -> Self {
        let state = restore_or_default(query, &config);
        Self {
            config,
            initial: state.clone(),
            state,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    fn apply(&mut self, transition: impl FnOnce(CalculatorState) -> CalculatorState) {
        let state = std::mem::take(&mut self.state);
        self.state = transition(state);
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<SessionOutput> {
        debug!("Session command: {:?}", command);
        let output = match command {
            SessionCommand::Add => {
                self.apply(CalculatorState::add_grant);
                SessionOutput::Report(OutputFormat::Table)
            }
            SessionCommand::Remove { number } => {
                let index = grant_index(&self.state, number)?;
                self.apply(|state| state.remove_grant(index));
                SessionOutput::Report(OutputFormat::Table)
            }
            SessionCommand::Set { number, amounts } => {
                let index = grant_index(&self.state, number)?;
                let joined = amounts.join(" ");
                let tokens = split_tokens(&joined);
                self.apply(|state| state.update_contributions(index, tokens.as_slice()));
                SessionOutput::Report(OutputFormat::Table)
            }
            SessionCommand::Budget { value } => {
                let budget = parse_amount(&value);
                self.apply(|state| state.set_match_budget(budget));
                SessionOutput::Report(OutputFormat::Table)
            }
            SessionCommand::Show => SessionOutput::Report(OutputFormat::Table),
            SessionCommand::Json => SessionOutput::Report(OutputFormat::Json),
            SessionCommand::Url => {
                let report = StateReport::new(&self.state, &self.config)?;
                SessionOutput::Text(report.share_url)
            }
            SessionCommand::Reset => {
                self.state = self.initial.clone();
                SessionOutput::Report(OutputFormat::Table)
            }
            SessionCommand::Quit => {
                self.should_quit = true;
                SessionOutput::Quit
            }
        };
        Ok(output)
    }

    fn render(&self, output: &SessionOutput) -> Result<()> {
        match output {
            SessionOutput::Report(format) => {
                StateReport::new(&self.state, &self.config)?.print(&self.config, *format)?
            }
            SessionOutput::Text(text) => println!("{}", text),
            SessionOutput::Quit => {}
        }
        Ok(())
    }

    /// Read commands from `input` until it ends or the user quits
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        info!("Starting calculator session with {} grants", self.state.len());
        self.render(&SessionOutput::Report(OutputFormat::Table))?;
        println!("{}", "Type `help` for commands, `quit` to leave.".cyan());

        let mut lines = input.lines();
        while !self.should_quit {
            print!("{} ", "qf>".green().bold());
            io::stdout().flush()?;

            let Some(line) = lines.next() else { break };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match SessionCommand::parse_line(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e.render());
                    continue;
                }
            };

            match self.execute(command) {
                Ok(output) => self.render(&output)?,
                Err(e) => println!("{}", format!("Error: {}", e).red()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(query: &str) -> Session {
        Session::new(Config::default(), Some(query))
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(SessionCommand::parse_line("add").unwrap(), SessionCommand::Add);
        assert_eq!(
            SessionCommand::parse_line("rm 2").unwrap(),
            SessionCommand::Remove { number: 2 }
        );
        assert_eq!(
            SessionCommand::parse_line("set 1 10,5 3").unwrap(),
            SessionCommand::Set {
                number: 1,
                amounts: vec!["10,5".to_string(), "3".to_string()]
            }
        );
        assert_eq!(SessionCommand::parse_line("exit").unwrap(), SessionCommand::Quit);
        assert!(SessionCommand::parse_line("frobnicate").is_err());
        assert!(SessionCommand::parse_line("remove two").is_err());
    }

    #[test]
    fn test_new_session_uses_defaults_without_query() {
        let session = Session::new(Config::default(), None);
        assert_eq!(session.state().len(), 4);
        assert_eq!(session.state().match_budget(), 1000.0);
    }

    #[test]
    fn test_commands_mutate_state() {
        let mut session = session("grant=&match=500");

        session
            .execute(SessionCommand::Set {
                number: 1,
                amounts: vec!["100".to_string()],
            })
            .unwrap();
        session.execute(SessionCommand::Add).unwrap();
        session
            .execute(SessionCommand::Set {
                number: 2,
                amounts: vec!["25,25".to_string(), "25".to_string(), "25".to_string()],
            })
            .unwrap();

        let grants = session.state().grants();
        assert_eq!(grants[1].contributions(), &[25.0; 4]);
        assert!((grants[0].match_amount() - 100.0).abs() < 1e-9);
        assert!((grants[1].match_amount() - 400.0).abs() < 1e-9);

        session.execute(SessionCommand::Remove { number: 1 }).unwrap();
        assert_eq!(session.state().len(), 1);
        assert!((session.state().grants()[0].match_amount() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_numbers_are_reported() {
        let mut session = session("grant=1&match=10");

        let err = session.execute(SessionCommand::Remove { number: 0 }).unwrap_err();
        assert!(matches!(err, CalculatorError::GrantIndexOutOfRange { .. }));
        assert!(session
            .execute(SessionCommand::Set {
                number: 2,
                amounts: vec![]
            })
            .is_err());
        assert_eq!(session.state().len(), 1);
    }

    #[test]
    fn test_budget_and_reset() {
        let mut session = session("grant=4&match=10");
        session
            .execute(SessionCommand::Budget {
                value: "250".to_string(),
            })
            .unwrap();
        assert_eq!(session.state().match_budget(), 250.0);

        session.execute(SessionCommand::Reset).unwrap();
        assert_eq!(session.state().match_budget(), 10.0);
    }

    #[test]
    fn test_url_and_quit() {
        let mut session = session("grant=4&match=10");
        let output = session.execute(SessionCommand::Url).unwrap();
        assert_eq!(
            output,
            SessionOutput::Text("https://wtfisqf.com/?grant=4&match=10".to_string())
        );

        assert_eq!(session.execute(SessionCommand::Quit).unwrap(), SessionOutput::Quit);
        assert!(session.should_quit);
    }

    #[test]
    fn test_run_stops_at_quit() {
        let mut session = session("grant=4&match=10");
        let input = io::Cursor::new("add\nbogus\nbudget 20\nquit\nadd\n");
        session.run(input).unwrap();

        assert_eq!(session.state().len(), 2);
        assert_eq!(session.state().match_budget(), 20.0);
    }
}
