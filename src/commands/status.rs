use anyhow::Result;

use crate::commands::CommandReport;
use crate::gateway;
use crate::session::config::load_config;
use crate::session::paths::resolve_paths;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("parley_home={}", paths.parley_home.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("directive_file={}", paths.directive_file.display()));
    report.detail(format!(
        "directive_present={}",
        paths.directive_file.is_file()
    ));

    match load_config() {
        Ok(cfg) => {
            report.detail(format!("persona_chars={}", cfg.persona.persona.chars().count()));
            report.detail(format!("memory.token_limit={}", cfg.memory.token_limit));
            report.detail(format!(
                "memory.recent_messages={}",
                cfg.memory.recent_messages
            ));
            report.detail(format!("strategy.enabled={}", cfg.strategy.enabled));
            report.detail(format!("rate_limit.enabled={}", cfg.rate_limit.enabled));
            report.detail(format!(
                "rate_limit.max_requests={}",
                cfg.rate_limit.max_requests
            ));
            report.detail(format!(
                "rate_limit.window_secs={}",
                cfg.rate_limit.window_secs
            ));
        }
        Err(err) => {
            report.issue(format!("config invalid: {err:#}"));
        }
    }

    let client = gateway::resolve_client();
    report.detail(format!("provider={}", client.name()));
    if let Some(model) = client.model_name() {
        report.detail(format!("model={model}"));
    }
    if let Some(value) = gateway::unknown_provider_setting() {
        report.issue(format!(
            "unknown PARLEY_PROVIDER value `{value}`; use openai, anthropic, gemini, openai-compatible, or offline"
        ));
    }

    Ok(report)
}
