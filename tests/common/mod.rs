use assert_cmd::Command;
use std::path::Path;

/// Base `parley` invocation pinned to a temp home and the offline
/// client, with any provider credentials from the host scrubbed.
pub fn parley_cmd(cwd: &Path, home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("parley").expect("binary");
    cmd.current_dir(cwd)
        .env("PARLEY_HOME", home)
        .env("PARLEY_PROVIDER", "offline")
        .env_remove("PARLEY_MODEL")
        .env_remove("PARLEY_CONFIG_PATH")
        .env_remove("PARLEY_LOGS_DIR")
        .env_remove("PARLEY_DIRECTIVE_FILE")
        .env_remove("PARLEY_PERSONA")
        .env_remove("PARLEY_GREETING")
        .env_remove("PARLEY_MEMORY_TOKEN_LIMIT")
        .env_remove("PARLEY_RECENT_MESSAGES")
        .env_remove("PARLEY_STRATEGY_ENABLED")
        .env_remove("PARLEY_STRATEGY_RECENT_MESSAGES")
        .env_remove("PARLEY_RATE_LIMIT_ENABLED")
        .env_remove("PARLEY_RATE_LIMIT_MAX")
        .env_remove("PARLEY_RATE_LIMIT_WINDOW_SECS")
        .env_remove("AI_PROVIDER")
        .env_remove("AI_MODEL")
        .env_remove("AI_API_KEY")
        .env_remove("AI_BASE_URL")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("DEEPSEEK_API_KEY");
    cmd
}
