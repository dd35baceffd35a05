use anyhow::Result;

use crate::commands::CommandReport;
use crate::gateway;
use crate::session::config::load_config;
use crate::session::engine::ChatSession;
use crate::session::paths::resolve_paths;

#[derive(Debug, Clone)]
pub struct OnceOptions {
    pub message: String,
}

/// Scriptable form of the chat loop: one turn, reply on stdout.
pub fn run(opts: &OnceOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("once");

    let message = opts.message.trim();
    if message.is_empty() {
        report.issue("message cannot be empty");
        return Ok(report);
    }

    let config = load_config()?;
    let paths = resolve_paths()?;
    let client = gateway::resolve_client();
    let provider = client.name();
    let model = client.model_name().map(str::to_string);

    let mut session = ChatSession::new(config, paths, client);
    let outcome = session.submit(message);

    println!("{}", outcome.reply);

    report.detail(format!("session_id={}", session.session_id()));
    report.detail(format!("provider={provider}"));
    if let Some(model) = model {
        report.detail(format!("model={model}"));
    }
    report.detail(format!("admitted={}", outcome.admitted));
    if let Some(strategy) = outcome.strategy {
        report.detail(format!("strategy={}", strategy.label()));
    }
    report.detail(format!("condensed={}", outcome.condensed));
    Ok(report)
}
