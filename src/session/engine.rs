use crate::error::WarnCode;
use crate::gateway::ModelClient;
use crate::session::condense;
use crate::session::config::ChatConfig;
use crate::session::directive;
use crate::session::history::{History, Message};
use crate::session::paths::ParleyPaths;
use crate::session::ratelimit::RateLimiter;
use crate::session::strategy::{self, Strategy};
use crate::session::util::now_epoch_secs;
use crate::session::{audit, warn};

/// Every remote failure collapses into this one user-facing reply.
pub const APOLOGY_REPLY: &str = "I'm sorry, I encountered an error. Please try again.";
pub const RATE_LIMIT_REPLY: &str =
    "You've reached the message limit for now. Please wait a while before sending more.";

const MAX_SESSION_NOTES: usize = 8;

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub admitted: bool,
    pub strategy: Option<Strategy>,
    pub condensed: bool,
}

/// One isolated chat session: transcript, limiter, and notes live in
/// process memory and die with it. Each submitted line triggers exactly
/// one blocking model call.
pub struct ChatSession {
    session_id: String,
    config: ChatConfig,
    paths: ParleyPaths,
    client: Box<dyn ModelClient>,
    history: History,
    limiter: Option<RateLimiter>,
    notes: Vec<String>,
    directive: Option<String>,
}

impl ChatSession {
    pub fn new(config: ChatConfig, paths: ParleyPaths, client: Box<dyn ModelClient>) -> Self {
        let session_id = format!(
            "session-{}-{}",
            now_epoch_secs().unwrap_or_default(),
            std::process::id()
        );
        let history = History::with_greeting(&config.persona.greeting);
        let limiter = config
            .rate_limit
            .enabled
            .then(|| RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs));
        let directive = directive::load_directive(&paths.directive_file);

        Self {
            session_id,
            config,
            paths,
            client,
            history,
            limiter,
            notes: Vec::new(),
            directive,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn greeting(&self) -> &str {
        &self.config.persona.greeting
    }

    pub fn provider(&self) -> &'static str {
        self.client.name()
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn submit(&mut self, user_text: &str) -> TurnOutcome {
        let now = now_epoch_secs().unwrap_or_default();
        self.submit_at(user_text, now)
    }

    pub(crate) fn submit_at(&mut self, user_text: &str, now_epoch_secs: u64) -> TurnOutcome {
        if let Some(limiter) = self.limiter.as_mut()
            && !limiter.check_and_record(now_epoch_secs)
        {
            warn::emit(
                WarnCode::W001RateLimited,
                "turn",
                &self.session_id,
                "sliding window exhausted",
                "",
            );
            self.audit("rate_limit", "denied", "turn rejected by sliding window");
            self.note("a message was rejected by the rate limiter");
            return TurnOutcome {
                reply: RATE_LIMIT_REPLY.to_string(),
                admitted: false,
                strategy: None,
                condensed: false,
            };
        }

        self.history.push(Message::user(user_text));

        let chosen = if self.config.strategy.enabled {
            let selection = strategy::select(
                self.client.as_ref(),
                self.history.tail(self.config.strategy.recent_messages),
                &self.notes_text(),
            );
            if selection.fell_back {
                warn::emit(
                    WarnCode::W003StrategyFallback,
                    "strategy",
                    &self.session_id,
                    "label mismatch or call failure",
                    "",
                );
            }
            self.audit(
                "strategy",
                "ok",
                &format!(
                    "label={} fallback={}",
                    selection.strategy.label(),
                    selection.fell_back
                ),
            );
            Some(selection.strategy)
        } else {
            None
        };

        let outcome = condense::condense(
            self.client.as_ref(),
            &self.config.memory,
            self.history.messages(),
        );
        if outcome.condensed {
            if outcome.used_fallback {
                warn::emit(
                    WarnCode::W002CondenseFallback,
                    "condense",
                    &self.session_id,
                    "remote summarizer unavailable",
                    "",
                );
            }
            self.audit(
                "condense",
                "ok",
                &format!(
                    "token_count={} fallback={}",
                    outcome.token_count, outcome.used_fallback
                ),
            );
            self.note(format!(
                "older history was condensed at {} tokens",
                outcome.token_count
            ));
        }

        let system = directive::compose_system(&self.config.persona.persona, self.directive.as_deref());
        let user_request = match chosen {
            Some(strategy) => format!("{}\n\n{user_text}", strategy.preamble()),
            None => user_text.to_string(),
        };
        // The trailing user message re-enters the call as the new message.
        let turns = &outcome.context[..outcome.context.len().saturating_sub(1)];

        match self.client.chat(&system, turns, &user_request) {
            Ok(reply) => {
                self.history.push(Message::model(reply.clone()));
                self.audit(
                    "turn",
                    "ok",
                    &format!("condensed={} provider={}", outcome.condensed, self.client.name()),
                );
                TurnOutcome {
                    reply,
                    admitted: true,
                    strategy: chosen,
                    condensed: outcome.condensed,
                }
            }
            Err(err) => {
                warn::emit(
                    WarnCode::W004ModelFailure,
                    "turn",
                    &self.session_id,
                    "model call failed",
                    &format!("{err:#}"),
                );
                self.audit("turn", "error", &format!("{err:#}"));
                self.note("the model call for a turn failed");
                self.history.push(Message::model(APOLOGY_REPLY));
                TurnOutcome {
                    reply: APOLOGY_REPLY.to_string(),
                    admitted: true,
                    strategy: chosen,
                    condensed: outcome.condensed,
                }
            }
        }
    }

    fn note(&mut self, text: impl Into<String>) {
        self.notes.push(text.into());
        if self.notes.len() > MAX_SESSION_NOTES {
            let overflow = self.notes.len() - MAX_SESSION_NOTES;
            self.notes.drain(..overflow);
        }
    }

    fn notes_text(&self) -> String {
        self.notes.join("\n")
    }

    fn audit(&self, event: &str, status: &str, detail: &str) {
        if let Err(err) = audit::append_event(&self.paths, &self.session_id, event, status, detail)
        {
            warn::emit(
                WarnCode::W006AuditWriteFailed,
                event,
                &self.session_id,
                "audit append failed",
                &format!("{err:#}"),
            );
        }
    }
}
