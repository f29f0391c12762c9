//! Interactive shell holding one session across commands.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use predictor_client::Severity;
use predictor_client::auth::{self, LoginForm, nav_state};
use predictor_client::tabular::TabularForm;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::debug;

use super::App;
use super::train_predict::{read_csv_file, submit};

const HELP: &str = "\
Commands:
  login <username> <password> [scope ...]
  logout
  status
  scopes
  models
  health
  train <model> <targets> <train.csv> <predict.csv> [features]
  help
  quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login(LoginForm),
    Logout,
    Status,
    Scopes,
    Models,
    Health,
    Train {
        model: String,
        targets: String,
        train: PathBuf,
        predict: PathBuf,
        features: String,
    },
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses a line; blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a usage message for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("login", [username, password, scopes @ ..]) => {
                Self::Login(LoginForm::new(*username, *password, scopes.join(" ")))
            }
            ("login", _) => return Err("Usage: login <username> <password> [scope ...]".to_owned()),
            ("logout", []) => Self::Logout,
            ("status", []) => Self::Status,
            ("scopes", []) => Self::Scopes,
            ("models", []) => Self::Models,
            ("health", []) => Self::Health,
            ("train", [model, targets, train, predict, features @ ..]) if features.len() <= 1 => {
                Self::Train {
                    model: (*model).to_owned(),
                    targets: (*targets).to_owned(),
                    train: PathBuf::from(train),
                    predict: PathBuf::from(predict),
                    features: features.first().map_or_else(String::new, |f| (*f).to_owned()),
                }
            }
            ("train", _) => {
                return Err(
                    "Usage: train <model> <targets> <train.csv> <predict.csv> [features]"
                        .to_owned(),
                );
            }
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(format!("Unknown command: {line}. Type 'help' for a list.")),
        };

        Ok(Some(command))
    }
}

fn print_status(app: &App) {
    let session = &app.session;
    let nav = nav_state(session);

    println!("{} {}", "Status:".bold(), session.status());
    if session.is_authenticated() {
        println!("{} {}", "Scopes:".bold(), session.scopes().join(" "));
        if let Some(minutes) = session.expires_minutes() {
            println!("{} {minutes} minutes", "Expires in:".bold());
        }
    }
    debug!(?nav, "Navigation state");
    if let Some(view) = nav.forced_view {
        println!("{} {view}", "View:".bold());
    }
}

async fn execute(app: &mut App, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Login(form) => app.login(&form).await?,
        ShellCommand::Logout => {
            auth::logout(&mut app.session, app.client.messages());
        }
        ShellCommand::Status => print_status(app),
        ShellCommand::Scopes => super::scopes::run(app).await?,
        ShellCommand::Models => super::models::run(app, &super::Credentials::default()).await?,
        ShellCommand::Health => super::health::run(app).await?,
        ShellCommand::Train {
            model,
            targets,
            train,
            predict,
            features,
        } => {
            let csv = read_csv_file(&train).and_then(|train_csv| {
                read_csv_file(&predict).map(|predict_csv| (train_csv, predict_csv))
            });
            let (train_csv, predict_csv) = csv.inspect_err(|err| {
                app.messages().post(format!("{err:#}"), Severity::Error);
            })?;
            let form = TabularForm {
                model_type: model,
                target_columns: targets,
                feature_columns: features,
                train_csv,
                predict_csv,
            };
            submit(app, &form).await?;
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}

/// Runs the shell until `quit` or end of input.
///
/// Failed commands leave the shell running; their message has already been
/// posted.
///
/// # Errors
///
/// Returns an error if standard input cannot be read.
pub async fn run(app: &mut App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        eprint!("{} ", ">".bold());
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                app.messages().post(usage, Severity::Error);
                continue;
            }
        };

        if let Err(err) = execute(app, command).await {
            debug!("Shell command failed: {err:#}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_login_with_scopes() {
        assert_eq!(
            ShellCommand::parse("login alice secret admin client"),
            Ok(Some(ShellCommand::Login(LoginForm::new(
                "alice",
                "secret",
                "admin client"
            ))))
        );
        assert_eq!(
            ShellCommand::parse("  login alice secret "),
            Ok(Some(ShellCommand::Login(LoginForm::new("alice", "secret", ""))))
        );
        assert!(ShellCommand::parse("login alice").is_err());
    }

    #[test]
    fn test_parse_train() {
        assert_eq!(
            ShellCommand::parse("train Ridge y,z train.csv predict.csv x1,x2"),
            Ok(Some(ShellCommand::Train {
                model: "Ridge".to_owned(),
                targets: "y,z".to_owned(),
                train: PathBuf::from("train.csv"),
                predict: PathBuf::from("predict.csv"),
                features: "x1,x2".to_owned(),
            }))
        );
        assert!(matches!(
            ShellCommand::parse("train Ridge y a.csv b.csv"),
            Ok(Some(ShellCommand::Train { features, .. })) if features.is_empty()
        ));
        assert!(ShellCommand::parse("train Ridge y a.csv").is_err());
        assert!(ShellCommand::parse("train Ridge y a.csv b.csv x extra").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ShellCommand::parse(""), Ok(None));
        assert_eq!(ShellCommand::parse("   "), Ok(None));
        assert_eq!(ShellCommand::parse("logout"), Ok(Some(ShellCommand::Logout)));
        assert_eq!(ShellCommand::parse("exit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(ShellCommand::parse("help"), Ok(Some(ShellCommand::Help)));
        assert!(ShellCommand::parse("status now").is_err());
        assert_eq!(
            ShellCommand::parse("dance"),
            Err("Unknown command: dance. Type 'help' for a list.".to_owned())
        );
    }
}
