use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    W001RateLimited,
    W002CondenseFallback,
    W003StrategyFallback,
    W004ModelFailure,
    W005DirectiveUnreadable,
    W006AuditWriteFailed,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W001RateLimited => "W001_RATE_LIMITED",
            Self::W002CondenseFallback => "W002_CONDENSE_FALLBACK",
            Self::W003StrategyFallback => "W003_STRATEGY_FALLBACK",
            Self::W004ModelFailure => "W004_MODEL_FAILURE",
            Self::W005DirectiveUnreadable => "W005_DIRECTIVE_UNREADABLE",
            Self::W006AuditWriteFailed => "W006_AUDIT_WRITE_FAILED",
        }
    }
}
