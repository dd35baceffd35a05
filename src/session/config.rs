use crate::error::ParleyError;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub persona: String,
    pub greeting: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            persona: "You are a sarcastic pirate who is skeptical of modern technology."
                .to_string(),
            greeting: "Ahoy! What be yer question, landlubber?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub token_limit: u64,
    pub recent_messages: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            token_limit: 3000,
            recent_messages: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRoutingConfig {
    pub enabled: bool,
    pub recent_messages: usize,
}

impl Default for StrategyRoutingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            recent_messages: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_requests: 5,
            window_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatConfig {
    pub persona: PersonaConfig,
    pub memory: MemoryConfig,
    pub strategy: StrategyRoutingConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialChatConfig {
    persona: Option<PersonaConfig>,
    memory: Option<MemoryConfig>,
    strategy: Option<StrategyRoutingConfig>,
    rate_limit: Option<RateLimitConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &ChatConfig) -> Result<()> {
    if cfg.persona.persona.trim().is_empty() {
        return Err(anyhow!("invalid persona: cannot be empty"));
    }
    if cfg.memory.token_limit == 0 {
        return Err(anyhow!("invalid memory token limit: must be >= 1"));
    }
    if cfg.memory.recent_messages == 0 {
        return Err(anyhow!("invalid recent message count: must be >= 1"));
    }
    if cfg.strategy.recent_messages == 0 {
        return Err(anyhow!("invalid strategy recent message count: must be >= 1"));
    }
    if cfg.rate_limit.max_requests == 0 {
        return Err(anyhow!("invalid rate limit max requests: must be >= 1"));
    }
    if cfg.rate_limit.window_secs == 0 {
        return Err(anyhow!("invalid rate limit window: must be >= 1 second"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("PARLEY_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(home) = env::var("PARLEY_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("parley.toml"));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".parley").join("parley.toml"))
}

fn merge_file_config(base: &mut ChatConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path).map_err(|err| {
        ParleyError::InvalidConfig(format!("{}: {err}", path.display()))
    })?;
    let parsed: PartialChatConfig = toml::from_str(&raw)
        .map_err(|err| ParleyError::InvalidConfig(format!("{}: {err}", path.display())))?;
    if let Some(persona) = parsed.persona {
        base.persona = persona;
    }
    if let Some(memory) = parsed.memory {
        base.memory = memory;
    }
    if let Some(strategy) = parsed.strategy {
        base.strategy = strategy;
    }
    if let Some(rate_limit) = parsed.rate_limit {
        base.rate_limit = rate_limit;
    }
    Ok(())
}

pub fn load_config() -> Result<ChatConfig> {
    let mut cfg = ChatConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.persona.persona = env_or_string("PARLEY_PERSONA", &cfg.persona.persona);
    cfg.persona.greeting = env_or_string("PARLEY_GREETING", &cfg.persona.greeting);
    cfg.memory.token_limit = env_or_u64("PARLEY_MEMORY_TOKEN_LIMIT", cfg.memory.token_limit);
    cfg.memory.recent_messages =
        env_or_usize("PARLEY_RECENT_MESSAGES", cfg.memory.recent_messages);
    cfg.strategy.enabled = env_or_bool("PARLEY_STRATEGY_ENABLED", cfg.strategy.enabled);
    cfg.strategy.recent_messages =
        env_or_usize("PARLEY_STRATEGY_RECENT_MESSAGES", cfg.strategy.recent_messages);
    cfg.rate_limit.enabled = env_or_bool("PARLEY_RATE_LIMIT_ENABLED", cfg.rate_limit.enabled);
    cfg.rate_limit.max_requests =
        env_or_usize("PARLEY_RATE_LIMIT_MAX", cfg.rate_limit.max_requests);
    cfg.rate_limit.window_secs =
        env_or_u64("PARLEY_RATE_LIMIT_WINDOW_SECS", cfg.rate_limit.window_secs);

    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::{ChatConfig, validate};

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&ChatConfig::default()).is_ok());
    }

    #[test]
    fn zero_token_limit_is_rejected() {
        let mut cfg = ChatConfig::default();
        cfg.memory.token_limit = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn zero_width_rate_window_is_rejected() {
        let mut cfg = ChatConfig::default();
        cfg.rate_limit.window_secs = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn empty_persona_is_rejected() {
        let mut cfg = ChatConfig::default();
        cfg.persona.persona = "  ".to_string();
        assert!(validate(&cfg).is_err());
    }
}
