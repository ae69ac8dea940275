//! Datebook command-line entry point.
//!
//! # Responsibility
//! - Resolve settings, start logging and dispatch the requested action.
//! - Report errors as one line on stderr with exit code 1.

mod cli;
mod settings;

use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Action, Cli};
use datebook_core::{
    default_log_level, init_logging, journal_service, parse_date_words, CommitOutcome,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", error_chain(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    start_logging(cli);

    let config = settings::resolve_config(cli)?;
    config.ensure_root()?;
    let service = journal_service(&config);
    info!(
        "event=cli_run module=cli status=start action={:?} root={}",
        cli.action,
        config.root.display()
    );

    match cli.action {
        Action::Open => {
            let date = entry_date(cli)?;
            let outcome = service.open(date)?;
            if let Some(finished) = outcome.cleaned_up {
                println!("Finished deferred entry for {finished}");
            }
            report_commit(outcome.commit, date);
        }
        Action::Print => {
            let date = entry_date(cli)?;
            let day_path = service.print(date)?;
            println!("{}", day_path.display());
        }
        Action::Cleanup => match service.cleanup()? {
            Some(outcome) => {
                println!("Finished deferred entry for {}", outcome.date);
                report_commit(outcome.commit, outcome.date);
            }
            None => println!("Nothing to clean up"),
        },
    }
    Ok(())
}

fn entry_date(cli: &Cli) -> Result<NaiveDate, Box<dyn Error>> {
    Ok(parse_date_words(cli.date.as_slice(), Local::now().date_naive())?)
}

// Logging problems are reported but never block the journal action.
fn start_logging(cli: &Cli) {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let Some(log_dir) = settings::resolve_log_dir(cli) else {
        eprintln!("warning: no log directory available; logging disabled");
        return;
    };
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("warning: {err}; logging disabled");
    }
}

fn report_commit(commit: CommitOutcome, date: NaiveDate) {
    match commit {
        CommitOutcome::Committed => println!(
            "Committed changes to datebook for {}",
            date.format("%A %B %-d %Y")
        ),
        CommitOutcome::NothingToCommit => {}
        CommitOutcome::NotARepository => println!("Datebook directory is not a git repository"),
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
