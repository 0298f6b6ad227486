use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use simulator::{ErrorKind, Outcome, SimulatorError, TrainerSession};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use trainer_api::TrainerClient;
use trainer_core::{Stage, TOTAL_STAGES};

use events::{Event, EventBus};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Stage,
    Reset,
    Complete(String),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Say(line.to_string()));
        };

        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        Some(match name {
            "stage" => Self::Stage,
            "reset" => Self::Reset,
            "complete" | "done" => Self::Complete(args.trim().to_string()),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        })
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn stage_line(stage: Stage) -> String {
    format!("Stage {}/{}: {}", stage.index() + 1, TOTAL_STAGES, stage.title())
}

fn print_help() {
    println!("  Type a message to speak as the mentor.");
    println!("  /stage             show the current stage");
    println!("  /reset             start over with a new case");
    println!("  /complete <notes>  submit the session with your notes");
    println!("  /quit              leave without submitting");
}

fn report_error(err: &SimulatorError) {
    let label = match err.kind() {
        ErrorKind::Validation => "Invalid input".yellow(),
        ErrorKind::Service => "Service error".red(),
        ErrorKind::State => "Not now".yellow(),
    };
    println!("{} {}", label.bold(), err);
    if err.is_retryable() {
        println!("{}", "  Send the message again to retry.".dimmed());
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?)
}

/// Ask for expertise until a case is generated. `false` when input ran out.
async fn start_case(
    session: &TrainerSession<TrainerClient>,
    lines: &mut Lines<BufReader<Stdin>>,
    mut expertise: Option<String>,
) -> Result<bool> {
    loop {
        let text = match expertise.take() {
            Some(text) => text,
            None => match prompt(lines, &format!("{} ", "Your expertise:".bold())).await? {
                Some(text) => text,
                None => return Ok(false),
            },
        };

        let bar = spinner("Generating case...");
        let result = session.generate_case(&text).await;
        bar.finish_and_clear();

        match result {
            Ok(Outcome::Applied(case)) => {
                println!();
                println!("{}", "Case".bold().underline());
                println!("{}", case.generated_scenario());
                println!();
                println!("{}", stage_line(session.current_stage()).cyan());
                return Ok(true);
            }
            Ok(Outcome::Stale) => continue,
            Err(e) => report_error(&e),
        }
    }
}

pub async fn run(
    client: TrainerClient,
    expertise: Option<String>,
) -> Result<()> {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let session = TrainerSession::new(Arc::new(client)).with_events(bus);

    tokio::spawn(async move {
        while let Ok(envelope) = rx.recv().await {
            match &envelope.event {
                Event::ReplyFailed { error, .. } => tracing::warn!(error = %error, "Reply failed"),
                event => tracing::debug!(?event, "Session event"),
            }
        }
    });

    println!("{}", "Session trainer".bold());
    println!("{}", "Type /help for commands.".dimmed());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if !start_case(&session, &mut lines, expertise).await? {
        return Ok(());
    }

    while let Some(line) = prompt(&mut lines, &format!("{} ", "mentor>".green().bold())).await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Say(text) => {
                let bar = spinner("Mentee is typing...");
                let result = session.send_message(&text).await;
                bar.finish_and_clear();

                match result {
                    Ok(Outcome::Applied(report)) => {
                        println!("{} {}", "mentee>".blue().bold(), report.reply.content);
                        if report.advanced() {
                            println!("{}", stage_line(report.stage).cyan());
                        }
                    }
                    Ok(Outcome::Stale) => {}
                    Err(e) => report_error(&e),
                }
            }
            Command::Stage => println!("{}", stage_line(session.current_stage()).cyan()),
            Command::Reset => {
                session.reset();
                println!("{}", "Session reset.".yellow());
                if !start_case(&session, &mut lines, None).await? {
                    return Ok(());
                }
            }
            Command::Complete(notes) => {
                let bar = spinner("Submitting...");
                let result = session.complete(&notes).await;
                bar.finish_and_clear();

                match result {
                    Ok(Outcome::Applied(done)) => {
                        println!(
                            "{} {}/{} stages completed",
                            "Submitted.".green().bold(),
                            done.submission.completed_stages(),
                            done.submission.total_stages()
                        );
                        if let Some(id) = done.record.id_string() {
                            println!("  Submission id: {}", id);
                        }
                        return Ok(());
                    }
                    Ok(Outcome::Stale) => {}
                    Err(e) => report_error(&e),
                }
            }
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Unknown(name) => {
                println!("{} /{}", "Unknown command".yellow(), name);
                print_help();
            }
        }
    }

    println!("{}", "Left without submitting.".dimmed());
    Ok(())
}

/// Build the client, failing early on incomplete configuration.
pub fn client(config: trainer_api::ClientConfig) -> Result<TrainerClient> {
    TrainerClient::new(config).context("Run 'session-trainer init' or pass --course and --assignment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_message() {
        assert_eq!(
            Command::parse("  What is on your mind? "),
            Some(Command::Say("What is on your mind?".to_string()))
        );
    }

    #[test]
    fn test_blank_line_ignored() {
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(Command::parse("/stage"), Some(Command::Stage));
        assert_eq!(Command::parse("/reset"), Some(Command::Reset));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("/?"), Some(Command::Help));
        assert_eq!(
            Command::parse("/complete  listened well,  rushed the wrap-up "),
            Some(Command::Complete("listened well,  rushed the wrap-up".to_string()))
        );
        assert_eq!(Command::parse("/complete"), Some(Command::Complete(String::new())));
        assert_eq!(
            Command::parse("/teleport now"),
            Some(Command::Unknown("teleport".to_string()))
        );
    }

    #[test]
    fn test_stage_line() {
        assert_eq!(stage_line(Stage::WrapUp), "Stage 3/3: Wrap up");
    }
}
