//! qrsnap terminal front end.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use qrsnap::config::DEFAULT_FILE_NAME;
use qrsnap::logging::{init_logging, LogConfig};
use qrsnap::render::to_text;
use qrsnap::session::{Session, Severity};

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_ansi(io::stderr().is_terminal())
        .with_target(cli.verbose >= 3);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let mut session = Session::new(cli.encoding_config(), cli.colors());
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let preview = !cli.no_preview;
    let result = match cli.text.as_deref() {
        Some(text) => run_once(
            &mut session,
            text,
            cli.output.as_deref(),
            preview,
            &mut stdout,
            &mut stderr,
        ),
        None => run_interactive(
            &mut session,
            io::stdin().lock(),
            preview,
            &mut stdout,
            &mut stderr,
        ),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Generates, previews and optionally saves `text`. Returns whether every step succeeded.
fn run_once(
    session: &mut Session,
    text: &str,
    output: Option<&Path>,
    preview: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<bool> {
    session.set_input(text);
    let mut ok = session.check_can_generate() && session.generate().is_ok();
    if ok {
        if preview {
            print_preview(out, session)?;
        }
        if let Some(path) = output {
            ok = session.save_to(path).is_ok();
        }
    }
    report(session, out, err)?;
    Ok(ok)
}

/// Reads commands from `input` until `:quit` or end of input.
fn run_interactive(
    session: &mut Session,
    input: impl BufRead,
    preview: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<bool> {
    writeln!(
        out,
        "Type a text, then :generate (:g), :save [PATH] (:s), :status or :quit (:q)."
    )?;

    for line in input.lines() {
        let line = line?;
        if !line.starts_with(':') {
            session.set_input(line);
            continue;
        }
        let command = &line[1..];
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "generate" | "g" => {
                if session.check_can_generate() && session.generate().is_ok() && preview {
                    print_preview(out, session)?;
                }
            }
            "save" | "s" => {
                if session.check_can_save() {
                    let path = if arg.is_empty() { DEFAULT_FILE_NAME } else { arg };
                    // Failures are reported through the session status
                    let _ = session.save_to(path);
                }
            }
            "status" => {
                writeln!(out, "state: {}", session.status())?;
            }
            "quit" | "q" => break,
            other => {
                writeln!(err, "unknown command ':{other}'")?;
                continue;
            }
        }
        report(session, out, err)?;
    }
    Ok(true)
}

fn print_preview(out: &mut impl Write, session: &Session) -> io::Result<()> {
    if let Some(matrix) = session.matrix() {
        write!(out, "{}", to_text(matrix))?;
    }
    Ok(())
}

/// Prints the status line and drains pending notifications.
fn report(session: &mut Session, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    if let Some(line) = session.status_line() {
        match line.severity {
            Severity::Info => writeln!(out, "{}", line.text)?,
            Severity::Warning | Severity::Critical => writeln!(err, "{}", line.text)?,
        }
    }
    for notification in session.take_notifications() {
        let label = match notification.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "error",
        };
        writeln!(err, "{label}: {}", notification.message)?;
    }
    Ok(())
}
