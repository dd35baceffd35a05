use crate::gateway::ModelClient;
use crate::session::config::MemoryConfig;
use crate::session::history::{Message, joined_text, render_transcript};
use crate::session::util::truncate_with_ellipsis;

const SIGNAL_KEYWORDS: [&str; 5] = ["decision", "prefer", "remember", "plan", "name"];
const MAX_FALLBACK_LINES: usize = 12;
const MAX_FALLBACK_LINE_CHARS: usize = 160;

#[derive(Debug, Clone)]
pub struct CondenseOutcome {
    pub context: Vec<Message>,
    pub condensed: bool,
    pub token_count: u64,
    pub used_fallback: bool,
}

fn summary_prompt(older: &[Message]) -> String {
    format!(
        "Summarize the key facts, decisions, and user preferences from the following conversation. Produce one concise paragraph that can serve as long-term memory for an ongoing chat.\n\nConversation to summarize:\n{}",
        render_transcript(older)
    )
}

fn is_signal_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    SIGNAL_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Offline extractive fallback when the remote summarizer is
/// unavailable: keep lines that look like durable facts, or the leading
/// turns when nothing matches.
fn local_extract_summary(older: &[Message]) -> String {
    let lines = older
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.text))
        .collect::<Vec<_>>();

    let mut picked = lines
        .iter()
        .filter(|line| is_signal_line(line))
        .take(MAX_FALLBACK_LINES)
        .cloned()
        .collect::<Vec<_>>();
    if picked.is_empty() {
        picked = lines.into_iter().take(MAX_FALLBACK_LINES).collect();
    }

    picked
        .into_iter()
        .map(|line| truncate_with_ellipsis(&line, MAX_FALLBACK_LINE_CHARS))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hybrid "sliding window + summary" context builder. When the token
/// count of the whole transcript strictly exceeds the configured limit,
/// everything but the last `recent_messages` turns is replaced with one
/// fabricated summary exchange; the recent turns are kept verbatim.
pub fn condense(
    client: &dyn ModelClient,
    memory: &MemoryConfig,
    history: &[Message],
) -> CondenseOutcome {
    let token_count = client.count_tokens(&joined_text(history));
    if token_count <= memory.token_limit || history.len() <= memory.recent_messages {
        return CondenseOutcome {
            context: history.to_vec(),
            condensed: false,
            token_count,
            used_fallback: false,
        };
    }

    let split = history.len() - memory.recent_messages;
    let (older, recent) = history.split_at(split);

    let (summary, used_fallback) = match client.complete(&summary_prompt(older)) {
        Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), false),
        _ => (local_extract_summary(older), true),
    };

    let mut context = Vec::with_capacity(recent.len() + 2);
    context.push(Message::user(format!(
        "This is a summary of our long-term conversation history: {summary}"
    )));
    context.push(Message::model(
        "Understood. I will use that summary for context as we continue our recent conversation.",
    ));
    context.extend_from_slice(recent);

    CondenseOutcome {
        context,
        condensed: true,
        token_count,
        used_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::{condense, local_extract_summary};
    use crate::gateway::ModelClient;
    use crate::session::config::MemoryConfig;
    use crate::session::history::Message;
    use anyhow::Result;

    struct FixedCountClient {
        tokens: u64,
        summary: &'static str,
    }

    impl ModelClient for FixedCountClient {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn chat(&self, _system: &str, _turns: &[Message], _user_message: &str) -> Result<String> {
            Ok(self.summary.to_string())
        }

        fn count_tokens(&self, _text: &str) -> u64 {
            self.tokens
        }
    }

    struct FailingSummaryClient {
        tokens: u64,
    }

    impl ModelClient for FailingSummaryClient {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn chat(&self, _system: &str, _turns: &[Message], _user_message: &str) -> Result<String> {
            anyhow::bail!("summarizer unavailable")
        }

        fn count_tokens(&self, _text: &str) -> u64 {
            self.tokens
        }
    }

    fn sample_history(len: usize) -> Vec<Message> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("question {i}"))
                } else {
                    Message::model(format!("answer {i}"))
                }
            })
            .collect()
    }

    fn memory(limit: u64, recent: usize) -> MemoryConfig {
        MemoryConfig {
            token_limit: limit,
            recent_messages: recent,
        }
    }

    #[test]
    fn at_threshold_does_not_condense() {
        let client = FixedCountClient {
            tokens: 3000,
            summary: "s",
        };
        let history = sample_history(10);
        let outcome = condense(&client, &memory(3000, 6), &history);
        assert!(!outcome.condensed);
        assert_eq!(outcome.context, history);
    }

    #[test]
    fn strict_excess_condenses_and_keeps_recent_verbatim() {
        let client = FixedCountClient {
            tokens: 3001,
            summary: "the user prefers short answers",
        };
        let history = sample_history(10);
        let outcome = condense(&client, &memory(3000, 6), &history);

        assert!(outcome.condensed);
        assert_eq!(outcome.context.len(), 6 + 2);
        assert!(outcome.context[0].text.contains("summary of our long-term"));
        assert!(
            outcome.context[0]
                .text
                .contains("the user prefers short answers")
        );
        assert_eq!(&outcome.context[2..], &history[4..]);
        assert!(!outcome.used_fallback);
    }

    #[test]
    fn short_history_is_never_condensed() {
        let client = FixedCountClient {
            tokens: 9999,
            summary: "s",
        };
        let history = sample_history(6);
        let outcome = condense(&client, &memory(3000, 6), &history);
        assert!(!outcome.condensed);
        assert_eq!(outcome.context, history);
    }

    #[test]
    fn summarizer_failure_uses_local_fallback() {
        let client = FailingSummaryClient { tokens: 5000 };
        let history = sample_history(10);
        let outcome = condense(&client, &memory(3000, 6), &history);

        assert!(outcome.condensed);
        assert!(outcome.used_fallback);
        assert_eq!(&outcome.context[2..], &history[4..]);
        assert!(!outcome.context[0].text.trim().is_empty());
    }

    #[test]
    fn local_extract_prefers_signal_lines() {
        let older = vec![
            Message::user("hello there"),
            Message::user("remember that my name is Alice"),
            Message::model("noted"),
        ];
        let summary = local_extract_summary(&older);
        assert!(summary.contains("my name is Alice"));
        assert!(!summary.contains("hello there"));
    }
}
