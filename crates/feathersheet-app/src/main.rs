use std::io::{self, BufRead, Write};

use anyhow::Context;
use feathersheet_app::{Config, MemoryClipboard, Session, Shell, ShellOutcome};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let mut session = Session::new(config, Box::new(MemoryClipboard::new()));
    if let Some(path) = std::env::args().nth(1) {
        match session.open(&path) {
            Ok(message) => println!("{}", message),
            Err(err) => eprintln!("Error loading file: {}", err),
        }
    }

    let mut shell = Shell::new(session);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush().context("failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read command")?;

        match shell.run_line(&line) {
            ShellOutcome::Continue(reply) if reply.is_empty() => {}
            ShellOutcome::Continue(reply) => writeln!(stdout, "{}", reply)?,
            ShellOutcome::Quit => break,
        }
    }

    Ok(())
}
