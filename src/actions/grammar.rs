//! Cooperation statement grammar.
//!
//! Free text from a participant is untrusted. It is matched against a fixed
//! pattern table and turned into the closed [`Action`] set; anything that
//! does not match is [`Action::Noop`]. Targets stay as raw names here and
//! are resolved against the roster when the action is applied.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Interest rate assumed when a loan statement names none
pub const DEFAULT_LOAN_RATE: f64 = 0.10;

/// Term assumed when a loan statement names none
pub const DEFAULT_LOAN_TERM: u32 = 3;

/// A typed cooperation action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Gift tokens
    Donate {
        /// Tokens
        amount: i64,
        /// Raw recipient name
        target: String,
    },
    /// Buy levels with tokens
    SelfRescue,
    /// Ask the others for tokens (no state effect)
    RequestHelp {
        /// Tokens asked for, if stated
        amount: Option<i64>,
    },
    /// Lend tokens at interest
    OfferLoan {
        /// Principal
        amount: i64,
        /// Raw borrower name
        target: String,
        /// Interest over the term
        rate: f64,
        /// Term in rounds
        term: u32,
    },
    /// Pay to revive an eliminated participant
    Resurrect {
        /// Raw name of the eliminated participant
        target: String,
    },
    /// Spend a sabotage charge on someone's next prompt
    Sabotage {
        /// Raw target name
        target: String,
    },
    /// Traitor announces itself
    RevealTraitor,
    /// Nothing actionable
    Noop,
}

impl Action {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Donate { .. } => "donate",
            Action::SelfRescue => "self_rescue",
            Action::RequestHelp { .. } => "request_help",
            Action::OfferLoan { .. } => "offer_loan",
            Action::Resurrect { .. } => "resurrect",
            Action::Sabotage { .. } => "sabotage",
            Action::RevealTraitor => "reveal_traitor",
            Action::Noop => "noop",
        }
    }
}

/// A statement pattern
#[derive(Debug, Clone)]
pub struct ActionPattern {
    /// Pattern name
    pub name: &'static str,
    /// Regex pattern
    pub pattern: &'static str,
    /// Build the action from a match; `None` discards the match
    pub build: fn(&Captures<'_>) -> Option<Action>,
}

/// Statement patterns, applied in table order
pub static ACTION_PATTERNS: &[ActionPattern] = &[
    ActionPattern {
        name: "offer_loan",
        pattern: r"(?i)\b(?:lend|loan)\s+(\d[\d,]*)\s+tokens?\s+to\s+([A-Za-z][\w-]*)(?:\s+at\s+(\d+(?:\.\d+)?)\s*%)?(?:\s+(?:interest\s+)?(?:for|over)\s+(\d+)\s+rounds?)?",
        build: build_loan,
    },
    ActionPattern {
        name: "donate",
        pattern: r"(?i)\b(?:donate|give|send|transfer)\s+(\d[\d,]*)\s+tokens?\s+to\s+([A-Za-z][\w-]*)",
        build: build_donate,
    },
    ActionPattern {
        name: "self_rescue",
        pattern: r"(?i)\bself[\s-]?rescue",
        build: build_self_rescue,
    },
    ActionPattern {
        name: "request_help",
        pattern: r"(?i)\b(?:request(?:s|ing)?|ask(?:s|ing)?\s+for)\s+(?:(\d[\d,]*)\s+)?(?:token\s+)?(?:tokens?|donations?|help)\b",
        build: build_request_help,
    },
    ActionPattern {
        name: "resurrect",
        pattern: r"(?i)\b(?:resurrect|revive)\s+([A-Za-z][\w-]*)",
        build: build_resurrect,
    },
    ActionPattern {
        name: "sabotage",
        pattern: r"(?i)\bsabotage\s+([A-Za-z][\w-]*)",
        build: build_sabotage,
    },
    ActionPattern {
        name: "reveal_traitor",
        pattern: r"(?i)\b(?:reveal\s+(?:myself|my\s+role)|i\s+am\s+the\s+traitor)\b",
        build: build_reveal,
    },
];

lazy_static! {
    /// Compiled statement patterns
    pub static ref ACTION_REGEX: Vec<(Regex, &'static ActionPattern)> = {
        ACTION_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p.pattern).ok().map(|r| (r, p)))
            .collect()
    };
}

fn parse_amount(text: &str) -> Option<i64> {
    text.replace(',', "").parse().ok()
}

fn build_donate(caps: &Captures<'_>) -> Option<Action> {
    Some(Action::Donate {
        amount: parse_amount(&caps[1])?,
        target: caps[2].to_string(),
    })
}

fn build_self_rescue(_: &Captures<'_>) -> Option<Action> {
    Some(Action::SelfRescue)
}

fn build_request_help(caps: &Captures<'_>) -> Option<Action> {
    Some(Action::RequestHelp {
        amount: caps.get(1).and_then(|m| parse_amount(m.as_str())),
    })
}

fn build_resurrect(caps: &Captures<'_>) -> Option<Action> {
    Some(Action::Resurrect {
        target: caps[1].to_string(),
    })
}

fn build_sabotage(caps: &Captures<'_>) -> Option<Action> {
    Some(Action::Sabotage {
        target: caps[1].to_string(),
    })
}

fn build_reveal(_: &Captures<'_>) -> Option<Action> {
    Some(Action::RevealTraitor)
}

fn build_loan(caps: &Captures<'_>) -> Option<Action> {
    let rate = match caps.get(3) {
        Some(m) => m.as_str().parse::<f64>().ok()? / 100.0,
        None => DEFAULT_LOAN_RATE,
    };
    let term = match caps.get(4) {
        Some(m) => m.as_str().parse().ok()?,
        None => DEFAULT_LOAN_TERM,
    };
    Some(Action::OfferLoan {
        amount: parse_amount(&caps[1])?,
        target: caps[2].to_string(),
        rate,
        term,
    })
}

/// Parse a cooperation statement into actions.
///
/// Every match of every pattern produces an action, ordered by pattern
/// table order and then by position in the text. Returns `[Noop]` when
/// nothing matches.
pub fn parse_statement(statement: &str) -> Vec<Action> {
    let mut actions = Vec::new();
    for (regex, pattern) in ACTION_REGEX.iter() {
        for caps in regex.captures_iter(statement) {
            if let Some(action) = (pattern.build)(&caps) {
                actions.push(action);
            }
        }
    }
    if actions.is_empty() {
        actions.push(Action::Noop);
    }
    actions
}

/// Whether free text contains a traitor's reveal.
///
/// Used for participants whose responses carry no statement line, so only
/// the reveal pattern is honoured and no token-moving action can slip in.
pub fn states_reveal(text: &str) -> bool {
    ACTION_REGEX
        .iter()
        .filter(|(_, pattern)| pattern.name == "reveal_traitor")
        .any(|(regex, _)| regex.is_match(text))
}

/// Split a cooperation-aware response into the statement line and the
/// challenge answer.
///
/// The first non-empty line is the statement. When nothing follows it the
/// whole text is treated as the answer as well.
pub fn split_statement(response: &str) -> (&str, &str) {
    let trimmed = response.trim_start();
    match trimmed.split_once('\n') {
        Some((first, rest)) if !rest.trim().is_empty() => (first.trim(), rest.trim()),
        Some((first, _)) => (first.trim(), trimmed.trim()),
        None => (trimmed.trim(), trimmed.trim()),
    }
}
