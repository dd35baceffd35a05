use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::commands::CommandReport;
use crate::gateway;
use crate::session::config::load_config;
use crate::session::engine::ChatSession;
use crate::session::paths::resolve_paths;

/// Interactive REPL: each line of input is one turn. `:quit`, `:exit`,
/// or end of input ends the session.
pub fn run() -> Result<CommandReport> {
    let mut report = CommandReport::new("chat");

    let config = load_config()?;
    let paths = resolve_paths()?;
    let client = gateway::resolve_client();
    let provider = client.name();
    let model = client.model_name().map(str::to_string);

    let mut session = ChatSession::new(config, paths, client);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("model: {}", session.greeting());

    let mut turns = 0usize;
    let mut rejected = 0usize;
    loop {
        print!("you: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == ":quit" || text == ":exit" {
            break;
        }

        let outcome = session.submit(text);
        if outcome.admitted {
            turns += 1;
        } else {
            rejected += 1;
        }
        println!("model: {}", outcome.reply);
    }

    report.detail(format!("session_id={}", session.session_id()));
    report.detail(format!("provider={provider}"));
    if let Some(model) = model {
        report.detail(format!("model={model}"));
    }
    report.detail(format!("turns={turns}"));
    report.detail(format!("rejected={rejected}"));
    Ok(report)
}
