//! LLM-backed judge and verdict parsing.

use std::fmt::Write as _;

use super::http::{ApiResult, ChatClient};
use super::{BoxFuture, Judge, Submission, Verdict};
use crate::config::BackendConfig;
use crate::error::{Result, SeasonError};
use crate::levels::GenerationConfig;

/// Judge that asks a chat model for a best-to-worst ranking
pub struct LlmJudge {
    chat: ChatClient,
    backend: BackendConfig,
}

impl LlmJudge {
    /// Judge over a backend binding
    pub fn new(chat: ChatClient, backend: BackendConfig) -> Self {
        Self { chat, backend }
    }
}

/// Prompt asking for a JSON ranking of the submissions
pub fn judge_prompt(challenge: &str, submissions: &[Submission]) -> String {
    let mut prompt = format!(
        "You are judging an AI competition. Rate these responses to: \"{challenge}\"\n\nResponses:\n"
    );
    for s in submissions {
        let _ = write!(prompt, "\n{}:\n{}\n", s.participant, s.text);
    }
    let example = submissions
        .iter()
        .map(|s| format!("\"{}\"", s.participant))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(
        prompt,
        "\nRank from best to worst. Return ONLY a JSON list of names in order.\nExample: [{example}]"
    );
    prompt
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json`.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

#[derive(serde::Deserialize)]
struct BestWorst {
    best: String,
    worst: String,
}

/// Parse judge output into a [`Verdict`].
///
/// Accepts a JSON list of names (a full ranking) or a `{"best", "worst"}`
/// object, optionally wrapped in a code fence or surrounded by prose.
pub fn parse_verdict(raw: &str) -> Verdict {
    let text = strip_code_fence(raw);

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(order) = serde_json::from_str::<Vec<String>>(&text[start..=end]) {
                if !order.is_empty() {
                    return Verdict::Ranking { order };
                }
            }
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(bw) = serde_json::from_str::<BestWorst>(&text[start..=end]) {
                return Verdict::BestWorst {
                    best: bw.best,
                    worst: bw.worst,
                };
            }
        }
    }
    Verdict::Malformed {
        raw: raw.to_string(),
    }
}

impl Judge for LlmJudge {
    fn judge<'a>(
        &'a self,
        challenge: &'a str,
        submissions: &'a [Submission],
    ) -> BoxFuture<'a, Result<Verdict>> {
        Box::pin(async move {
            let prompt = judge_prompt(challenge, submissions);
            let config = GenerationConfig {
                max_tokens: 200,
                temperature: 0.0,
            };
            match self.chat.complete(&self.backend, &prompt, config).await {
                ApiResult::Success { content, .. } => Ok(parse_verdict(&content)),
                ApiResult::RateLimited => Err(SeasonError::Provider("judge rate limited".into())),
                ApiResult::Error(e) => Err(SeasonError::Provider(e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_ranking() {
        assert_eq!(
            parse_verdict(r#"["Claude", "ChatGPT", "Grok", "DeepSeek"]"#),
            Verdict::Ranking {
                order: vec![
                    "Claude".into(),
                    "ChatGPT".into(),
                    "Grok".into(),
                    "DeepSeek".into()
                ]
            }
        );
    }

    #[test]
    fn test_parse_fenced_ranking() {
        let raw = "```json\n[\"Grok\", \"Claude\"]\n```";
        assert_eq!(
            parse_verdict(raw),
            Verdict::Ranking {
                order: vec!["Grok".into(), "Claude".into()]
            }
        );
    }

    #[test]
    fn test_parse_ranking_in_prose() {
        let raw = "After careful thought: [\"DeepSeek\", \"Grok\"] is my ranking.";
        assert!(matches!(parse_verdict(raw), Verdict::Ranking { .. }));
    }

    #[test]
    fn test_parse_best_worst() {
        let raw = "```\n{\"best\": \"Claude\", \"worst\": \"Grok\"}\n```";
        assert_eq!(
            parse_verdict(raw),
            Verdict::BestWorst {
                best: "Claude".into(),
                worst: "Grok".into()
            }
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_verdict("I refuse to rank my friends."),
            Verdict::Malformed { .. }
        ));
        assert!(matches!(parse_verdict("[]"), Verdict::Malformed { .. }));
    }

    #[test]
    fn test_prompt_lists_every_submission() {
        let submissions = vec![
            Submission {
                participant: "Grok".into(),
                text: "one".into(),
            },
            Submission {
                participant: "Claude".into(),
                text: "two".into(),
            },
        ];
        let prompt = judge_prompt("Describe rain", &submissions);
        assert!(prompt.contains("Grok:\none"));
        assert!(prompt.contains("Claude:\ntwo"));
        assert!(prompt.contains(r#"Example: ["Grok", "Claude"]"#));
    }
}
