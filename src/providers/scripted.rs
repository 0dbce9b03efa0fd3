//! Deterministic in-process collaborators for dry runs and tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{BoxFuture, Generation, GenerationRequest, Generator, Judge, Submission, Verdict};
use crate::error::{Result, SeasonError};
use crate::participant::ParticipantId;

/// A queued generator reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Respond with this text
    Text(String),
    /// Report a provider failure
    Fail(String),
    /// Sleep before responding (exercises the per-call timeout)
    Delayed(Duration, String),
}

/// Generator answering from per-participant reply queues.
///
/// When a participant's queue is empty a deterministic default is built
/// from the prompt kind: a statement line plus answer for cooperation
/// prompts, a vote for the next roster name for vote prompts, and a short
/// answer otherwise.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    names: Vec<String>,
    replies: Mutex<HashMap<ParticipantId, VecDeque<ScriptedReply>>>,
    prompts: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Generator aware of the roster names (used for default votes)
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Queue a reply for a participant
    pub fn push(&self, participant: impl Into<ParticipantId>, reply: ScriptedReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(participant.into()).or_default().push_back(reply);
        }
    }

    /// Queue a text reply for a participant
    pub fn push_text(&self, participant: impl Into<ParticipantId>, text: impl Into<String>) {
        self.push(participant, ScriptedReply::Text(text.into()));
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self, participant: &ParticipantId) -> Option<ScriptedReply> {
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.get_mut(participant).and_then(VecDeque::pop_front))
    }

    fn default_reply(&self, request: &GenerationRequest) -> String {
        let me = request.participant.as_str();
        if request.prompt.contains("COLLECTIVE SABOTAGE VOTE") {
            let target = self
                .names
                .iter()
                .position(|n| n == me)
                .and_then(|i| self.names.get((i + 1) % self.names.len()))
                .filter(|n| n.as_str() != me)
                .map_or("none", String::as_str);
            return format!("SABOTAGE: {target}\nACCUSE: none");
        }
        if request.prompt.contains("private offer") {
            return format!("{me} proposes a quiet truce.");
        }
        if request.prompt.contains("negotiation round") {
            return format!("{me} proposes that everyone cooperates to keep the group bonus.");
        }
        let answer = format!(
            "{me} answers within {} tokens: every story is a small rehearsal for being understood.",
            request.config.max_tokens
        );
        if request.prompt.contains("YOUR RESPONSE FORMAT") {
            format!("No cooperation action this round\n{answer}")
        } else {
            answer
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Generation> {
        Box::pin(async move {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(request.clone());
            }
            match self.next_reply(&request.participant) {
                Some(ScriptedReply::Text(text)) => {
                    let tokens = text.split_whitespace().count() as u32;
                    Generation::ok(text, tokens)
                },
                Some(ScriptedReply::Fail(reason)) => Generation::failed(reason),
                Some(ScriptedReply::Delayed(delay, text)) => {
                    tokio::time::sleep(delay).await;
                    Generation::ok(text, 0)
                },
                None => {
                    let text = self.default_reply(&request);
                    let tokens = text.split_whitespace().count() as u32;
                    Generation::ok(text, tokens)
                },
            }
        })
    }
}

/// Judge answering from a verdict queue.
///
/// With an empty queue it ranks submissions by response length (longest
/// first), keeping submission order for equal lengths.
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    verdicts: Mutex<VecDeque<std::result::Result<Verdict, String>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<Submission>>>,
}

impl ScriptedJudge {
    /// Judge with an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before every verdict
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a verdict
    pub fn push(&self, verdict: Verdict) {
        if let Ok(mut v) = self.verdicts.lock() {
            v.push_back(Ok(verdict));
        }
    }

    /// Queue a full ranking
    pub fn push_ranking(&self, order: &[&str]) {
        self.push(Verdict::Ranking {
            order: order.iter().map(|s| (*s).to_string()).collect(),
        });
    }

    /// Queue a judging failure
    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut v) = self.verdicts.lock() {
            v.push_back(Err(reason.into()));
        }
    }

    /// Submissions seen by each call
    pub fn calls(&self) -> Vec<Vec<Submission>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Judge for ScriptedJudge {
    fn judge<'a>(
        &'a self,
        _challenge: &'a str,
        submissions: &'a [Submission],
    ) -> BoxFuture<'a, Result<Verdict>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(submissions.to_vec());
            }
            let queued = self.verdicts.lock().ok().and_then(|mut v| v.pop_front());
            match queued {
                Some(Ok(verdict)) => Ok(verdict),
                Some(Err(reason)) => Err(SeasonError::Provider(reason)),
                None => {
                    let mut ranked: Vec<&Submission> = submissions.iter().collect();
                    ranked.sort_by_key(|s| std::cmp::Reverse(s.text.len()));
                    Ok(Verdict::Ranking {
                        order: ranked.iter().map(|s| s.participant.to_string()).collect(),
                    })
                },
            }
        })
    }
}
