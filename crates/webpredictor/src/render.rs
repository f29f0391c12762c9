//! Terminal and HTML output.

use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use predictor_client::tabular::{TabularResults, escape_html};
use predictor_client::{MessageBoard, Notification, Severity};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Info => label.cyan(),
        Severity::Success => label.green().bold(),
        Severity::Error => label.red().bold(),
    }
}

fn print_notification(notification: &Notification) {
    eprintln!(
        "[{}] {}",
        severity_label(notification.severity),
        notification.text
    );
}

/// Prints every message posted to the slot on stderr, until stopped.
pub struct MessagePrinter {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MessagePrinter {
    #[must_use]
    pub fn spawn(messages: &MessageBoard) -> Self {
        let (shutdown, stop) = oneshot::channel();
        let task = tokio::spawn(print_messages(messages.subscribe(), stop));
        Self { shutdown, task }
    }

    /// Prints anything still pending and stops the printer.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn print_messages(
    mut receiver: watch::Receiver<Option<Notification>>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = &mut stop => {
                if receiver.has_changed().unwrap_or(false)
                    && let Some(notification) = receiver.borrow_and_update().as_ref()
                {
                    print_notification(notification);
                }
                return;
            }
        }

        // Cleared slots are not printed
        if let Some(notification) = receiver.borrow_and_update().as_ref() {
            print_notification(notification);
        }
    }
}

/// Prints versions, metrics and predictions to stdout.
pub fn print_results(results: &TabularResults) {
    println!(
        "{} {}  {} {}",
        "API version:".bold(),
        results.api_version,
        "Model version:".bold(),
        results.model_version
    );
    println!();
    println!("{}", "Metrics".bold().underline());
    println!("{}", results.metrics.render_text());
    println!();
    println!("{}", "Predictions".bold().underline());
    println!("{}", results.predictions.render_text());
}

/// Standalone HTML page with both result tables.
#[must_use]
pub fn html_report(results: &TabularResults) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>WebPredictor results</title></head>\n<body>\n\
         <p>API version: {api}, Model version: {model}</p>\n\
         <h2>Metrics</h2>\n{metrics}\n\
         <h2>Predictions</h2>\n{predictions}\n\
         </body>\n</html>\n",
        api = escape_html(&results.api_version),
        model = escape_html(&results.model_version),
        metrics = results.metrics.to_html(),
        predictions = results.predictions.to_html(),
    )
}

/// Writes [`html_report`] to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_html_report(path: &Path, results: &TabularResults) -> Result<()> {
    std::fs::write(path, html_report(results))
        .with_context(|| format!("Failed to write HTML report to {}", path.display()))
}
