use client_core::{RegenerateOutcome, SessionController, SubmitOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{print_session, OutputFormat};

const HELP: &str = "\
Commands:
  name <text>       set the business name
  location <text>   set the business location
  submit            analyze the business
  regenerate        ask for a new headline
  reset             start over
  show              print the current view
  help              print this message
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Name(String),
    Location(String),
    Submit,
    Regenerate,
    Reset,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim_start();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match verb.to_ascii_lowercase().as_str() {
        "name" => ReplCommand::Name(rest.to_string()),
        "location" | "loc" => ReplCommand::Location(rest.to_string()),
        "submit" | "analyze" => ReplCommand::Submit,
        "regenerate" | "regen" => ReplCommand::Regenerate,
        "reset" => ReplCommand::Reset,
        "show" => ReplCommand::Show,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(command)
}

pub async fn run(controller: &mut SessionController, format: OutputFormat) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            ReplCommand::Name(value) => controller.set_business_name(value),
            ReplCommand::Location(value) => controller.set_location(value),
            ReplCommand::Submit => match controller.submit() {
                SubmitOutcome::Dispatched => {
                    println!("Analyzing...");
                    controller.settle().await;
                }
                SubmitOutcome::Invalid(_) => {}
                SubmitOutcome::AlreadyInFlight => println!("An analysis is already running."),
            },
            ReplCommand::Regenerate => match controller.regenerate_headline() {
                RegenerateOutcome::Dispatched => {
                    println!("Regenerating headline...");
                    controller.settle().await;
                }
                RegenerateOutcome::NoReport => {
                    println!("Nothing to regenerate yet; submit a business first.");
                    continue;
                }
                RegenerateOutcome::AlreadyInFlight => {
                    println!("A headline is already being generated.");
                }
            },
            ReplCommand::Reset => {
                if !controller.session().phase.has_report() {
                    println!("No report to reset.");
                    continue;
                }
                controller.reset_session();
            }
            ReplCommand::Show => {}
            ReplCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ReplCommand::Quit => break,
        }

        print_session(controller.session(), format)?;
        controller.take_notice();
    }

    Ok(())
}
