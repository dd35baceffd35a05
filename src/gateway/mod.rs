use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

use crate::session::history::{Message, Role};

const REQUEST_TIMEOUT_SECS: u64 = 45;
const MAX_OFFLINE_ECHO_CHARS: usize = 120;
const MAX_OFFLINE_SUMMARY_LINES: usize = 8;

/// Boundary to the hosted model API: one system instruction, a list of
/// prior turns, and a new user message in; generated text out.
pub trait ModelClient {
    fn name(&self) -> &'static str;

    fn model_name(&self) -> Option<&str> {
        None
    }

    fn chat(&self, system: &str, turns: &[Message], user_message: &str) -> Result<String>;

    /// One-shot completion with no prior turns, used by the summarizer
    /// and the strategy classifier.
    fn complete(&self, prompt: &str) -> Result<String> {
        self.chat("", &[], prompt)
    }

    /// Token count for `text`. Providers without a counting endpoint
    /// use the rough chars/4 estimate.
    fn count_tokens(&self, text: &str) -> u64 {
        estimate_tokens(text)
    }
}

/// Rough character-based token estimate (chars/4 baseline).
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() as u64) / 4).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProvider {
    OpenAi,
    Anthropic,
    Gemini,
    OpenAiCompatible,
}

#[derive(Debug, Clone)]
struct RemoteModelConfig {
    provider: RemoteProvider,
    model: String,
    api_key: String,
    base_url: Option<String>,
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

pub fn parse_provider_alias(raw: &str) -> Option<RemoteProvider> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(RemoteProvider::OpenAi),
        "anthropic" | "claude" => Some(RemoteProvider::Anthropic),
        "gemini" | "google" => Some(RemoteProvider::Gemini),
        "openai-compatible" | "compatible" | "deepseek" => Some(RemoteProvider::OpenAiCompatible),
        _ => None,
    }
}

pub fn parse_prefixed_model(raw: &str) -> (Option<RemoteProvider>, String) {
    let trimmed = raw.trim();
    if let Some((prefix, model)) = trimmed.split_once(':')
        && let Some(provider) = parse_provider_alias(prefix)
    {
        return (Some(provider), model.trim().to_string());
    }
    (None, trimmed.to_string())
}

pub fn infer_provider_from_model(model: &str) -> Option<RemoteProvider> {
    let lower = model.trim().to_ascii_lowercase();
    if lower.starts_with("deepseek-") {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if lower.starts_with("claude-") {
        return Some(RemoteProvider::Anthropic);
    }
    if lower.starts_with("gemini-") {
        return Some(RemoteProvider::Gemini);
    }
    if lower.starts_with("gpt-")
        || lower.starts_with("o1")
        || lower.starts_with("o3")
        || lower.starts_with("o4")
    {
        return Some(RemoteProvider::OpenAi);
    }
    None
}

fn first_available_provider() -> Option<RemoteProvider> {
    if env_non_empty("AI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if env_non_empty("OPENAI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAi);
    }
    if env_non_empty("ANTHROPIC_API_KEY").is_some() {
        return Some(RemoteProvider::Anthropic);
    }
    if env_non_empty("GEMINI_API_KEY").is_some() {
        return Some(RemoteProvider::Gemini);
    }
    None
}

fn default_model_for_provider(provider: RemoteProvider) -> &'static str {
    match provider {
        RemoteProvider::OpenAi => "gpt-4.1-mini",
        RemoteProvider::Anthropic => "claude-3-5-haiku-latest",
        RemoteProvider::Gemini => "gemini-2.5-flash-lite",
        RemoteProvider::OpenAiCompatible => "deepseek-chat",
    }
}

fn resolve_api_key(provider: RemoteProvider) -> Option<String> {
    match provider {
        RemoteProvider::OpenAi => {
            env_non_empty("OPENAI_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::Anthropic => {
            env_non_empty("ANTHROPIC_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::Gemini => {
            env_non_empty("GEMINI_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::OpenAiCompatible => env_non_empty("AI_API_KEY")
            .or_else(|| env_non_empty("DEEPSEEK_API_KEY"))
            .or_else(|| env_non_empty("OPENAI_API_KEY")),
    }
}

fn resolve_compatible_base_url(model: &str) -> Option<String> {
    if let Some(base) = env_non_empty("AI_BASE_URL") {
        return Some(base);
    }
    if model.trim().to_ascii_lowercase().starts_with("deepseek-") {
        return Some("https://api.deepseek.com".to_string());
    }
    None
}

fn offline_forced() -> bool {
    env_non_empty("PARLEY_PROVIDER")
        .as_deref()
        .is_some_and(|v| v.eq_ignore_ascii_case("offline") || v.eq_ignore_ascii_case("local"))
}

/// Value of `PARLEY_PROVIDER` when it is set but neither a known alias
/// nor an offline spelling. Surfaced by `status` as a misconfiguration.
pub fn unknown_provider_setting() -> Option<String> {
    let value = env_non_empty("PARLEY_PROVIDER")?;
    if value.eq_ignore_ascii_case("offline") || value.eq_ignore_ascii_case("local") {
        return None;
    }
    if parse_provider_alias(&value).is_some() {
        return None;
    }
    Some(value)
}

fn resolve_remote_config() -> Option<RemoteModelConfig> {
    if offline_forced() {
        return None;
    }

    let configured_model = env_non_empty("PARLEY_MODEL")
        .or_else(|| env_non_empty("AI_MODEL"))
        .or_else(|| first_available_provider().map(|p| default_model_for_provider(p).to_string()));

    let mut chosen_provider = env_non_empty("PARLEY_PROVIDER")
        .as_deref()
        .and_then(parse_provider_alias)
        .or_else(|| {
            env_non_empty("AI_PROVIDER")
                .as_deref()
                .and_then(parse_provider_alias)
        });
    let (prefixed_provider, mut model) = configured_model
        .as_deref()
        .map(parse_prefixed_model)
        .unwrap_or((None, String::new()));
    if chosen_provider.is_none() {
        chosen_provider = prefixed_provider
            .or_else(|| infer_provider_from_model(&model))
            .or_else(first_available_provider);
    }

    let provider = chosen_provider?;
    if model.trim().is_empty() {
        model = default_model_for_provider(provider).to_string();
    }
    let base_url = match provider {
        RemoteProvider::OpenAiCompatible => resolve_compatible_base_url(&model),
        _ => None,
    };
    let api_key = resolve_api_key(provider)?;
    Some(RemoteModelConfig {
        provider,
        model,
        api_key,
        base_url,
    })
}

/// Resolve the session's model client from the environment. With no
/// provider configured (or `PARLEY_PROVIDER=offline`) the deterministic
/// offline client is returned.
pub fn resolve_client() -> Box<dyn ModelClient> {
    let Some(remote) = resolve_remote_config() else {
        return Box::new(OfflineClient);
    };

    match remote.provider {
        RemoteProvider::OpenAi => Box::new(OpenAiClient {
            api_key: remote.api_key,
            model: remote.model,
        }),
        RemoteProvider::Anthropic => Box::new(AnthropicClient {
            api_key: remote.api_key,
            model: remote.model,
        }),
        RemoteProvider::Gemini => Box::new(GeminiClient {
            api_key: remote.api_key,
            model: remote.model,
        }),
        RemoteProvider::OpenAiCompatible => Box::new(OpenAiCompatClient {
            api_key: remote.api_key,
            model: remote.model,
            base_url: remote
                .base_url
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
        }),
    }
}

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

fn openai_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn openai_style_messages(system: &str, turns: &[Message], user_message: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(turns.len() + 2);
    if !system.trim().is_empty() {
        out.push(serde_json::json!({"role": "system", "content": system}));
    }
    for turn in turns {
        out.push(serde_json::json!({
            "role": openai_role(turn.role),
            "content": turn.text,
        }));
    }
    out.push(serde_json::json!({"role": "user", "content": user_message}));
    out
}

fn gemini_contents(turns: &[Message], user_message: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(turns.len() + 1);
    for turn in turns {
        out.push(serde_json::json!({
            "role": gemini_role(turn.role),
            "parts": [{"text": turn.text}],
        }));
    }
    out.push(serde_json::json!({
        "role": "user",
        "parts": [{"text": user_message}],
    }));
    out
}

fn extract_gemini_text(json: &Value) -> Option<String> {
    json.get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_openai_text(json: &Value) -> Option<String> {
    if let Some(text) = json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut chunks = Vec::new();
    let output = json.get("output").and_then(Value::as_array)?;
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in content {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                chunks.push(text.to_string());
            }
        }
    }

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

fn extract_anthropic_text(json: &Value) -> Option<String> {
    let mut chunks = Vec::new();
    let content = json.get("content").and_then(Value::as_array)?;
    for part in content {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            chunks.push(text.to_string());
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

fn extract_openai_compatible_text(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let first = choices.first()?;
    let content = first.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.to_string()),
        Value::Array(parts) => {
            let mut chunks = Vec::new();
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    chunks.push(text.to_string());
                }
            }
            if chunks.is_empty() {
                None
            } else {
                Some(chunks.join("\n"))
            }
        }
        _ => None,
    }
}

pub struct GeminiClient {
    pub api_key: String,
    pub model: String,
}

impl ModelClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn chat(&self, system: &str, turns: &[Message], user_message: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let mut payload = serde_json::json!({
            "contents": gemini_contents(turns, user_message),
        });
        if !system.trim().is_empty() {
            payload["systemInstruction"] = serde_json::json!({
                "parts": [{"text": system}],
            });
        }

        let response = http_client()?.post(&url).json(&payload).send()?;
        if !response.status().is_success() {
            anyhow::bail!("gemini call failed with status {}", response.status());
        }
        let json: Value = response.json()?;
        extract_gemini_text(&json).context("gemini response missing text content")
    }

    fn count_tokens(&self, text: &str) -> u64 {
        self.remote_count_tokens(text)
            .unwrap_or_else(|| estimate_tokens(text))
    }
}

impl GeminiClient {
    fn remote_count_tokens(&self, text: &str) -> Option<u64> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:countTokens?key={}",
            self.model, self.api_key
        );
        let payload = serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": text}]}],
        });

        let client = http_client().ok()?;
        let response = client.post(&url).json(&payload).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        let json: Value = response.json().ok()?;
        json.get("totalTokens").and_then(Value::as_u64)
    }
}

pub struct OpenAiClient {
    pub api_key: String,
    pub model: String,
}

impl ModelClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn chat(&self, system: &str, turns: &[Message], user_message: &str) -> Result<String> {
        let mut input = Vec::with_capacity(turns.len() + 1);
        for turn in turns {
            input.push(serde_json::json!({
                "role": openai_role(turn.role),
                "content": turn.text,
            }));
        }
        input.push(serde_json::json!({"role": "user", "content": user_message}));

        let mut payload = serde_json::json!({
            "model": self.model,
            "input": input,
            "temperature": 0.2,
        });
        if !system.trim().is_empty() {
            payload["instructions"] = Value::String(system.to_string());
        }

        let response = http_client()?
            .post("https://api.openai.com/v1/responses")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!("openai call failed with status {}", response.status());
        }

        let json: Value = response.json()?;
        extract_openai_text(&json).context("openai response missing text content")
    }
}

pub struct AnthropicClient {
    pub api_key: String,
    pub model: String,
}

impl ModelClient for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn chat(&self, system: &str, turns: &[Message], user_message: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        for turn in turns {
            messages.push(serde_json::json!({
                "role": openai_role(turn.role),
                "content": turn.text,
            }));
        }
        messages.push(serde_json::json!({"role": "user", "content": user_message}));

        let mut payload = serde_json::json!({
            "model": self.model,
            "max_tokens": 1200,
            "temperature": 0.2,
            "messages": messages,
        });
        if !system.trim().is_empty() {
            payload["system"] = Value::String(system.to_string());
        }

        let response = http_client()?
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!("anthropic call failed with status {}", response.status());
        }

        let json: Value = response.json()?;
        extract_anthropic_text(&json).context("anthropic response missing text content")
    }
}

pub struct OpenAiCompatClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ModelClient for OpenAiCompatClient {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn chat(&self, system: &str, turns: &[Message], user_message: &str) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");
        let payload = serde_json::json!({
            "model": self.model,
            "messages": openai_style_messages(system, turns, user_message),
            "temperature": 0.2,
        });

        let response = http_client()?
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!(
                "openai-compatible call failed with status {}",
                response.status()
            );
        }

        let json: Value = response.json()?;
        extract_openai_compatible_text(&json)
            .context("openai-compatible response missing text content")
    }
}

/// Deterministic keyless client. Chat turns are acknowledged verbatim;
/// completions return an extractive digest of the prompt, which keeps
/// the summarizer usable offline and never matches a strategy label.
pub struct OfflineClient;

impl ModelClient for OfflineClient {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn chat(&self, _system: &str, _turns: &[Message], user_message: &str) -> Result<String> {
        let shown = crate::session::util::truncate_with_ellipsis(
            user_message.trim(),
            MAX_OFFLINE_ECHO_CHARS,
        );
        Ok(format!(
            "(offline) No model provider is configured, so I can only acknowledge: {shown}"
        ))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let mut out = String::new();
        for line in prompt
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(MAX_OFFLINE_SUMMARY_LINES)
        {
            out.push_str("- ");
            out.push_str(&crate::session::util::truncate_with_ellipsis(line, 160));
            out.push('\n');
        }
        if out.is_empty() {
            out.push_str("- (nothing to summarize)\n");
        }
        Ok(out)
    }
}
