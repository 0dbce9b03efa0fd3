//! Season configuration.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary on top)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeasonError};
use crate::levels::{BASELINE_LEVEL, DEFAULT_ELIMINATION_THRESHOLD, MAX_LEVEL, MIN_LEVEL};
use crate::participant::{ParticipantState, Roster};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Season-wide settings
    #[serde(default)]
    pub season: SeasonSettings,

    /// Token economy constants
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Negotiation phase settings
    #[serde(default)]
    pub negotiation: NegotiationConfig,

    /// Traitor mechanic settings
    #[serde(default)]
    pub traitor: TraitorConfig,

    /// Final scoring weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Judging backend
    #[serde(default = "default_judge")]
    pub judge: BackendConfig,

    /// Roster, in stable enumeration order
    #[serde(default = "default_roster")]
    pub participants: Vec<ParticipantConfig>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            season: SeasonSettings::default(),
            economy: EconomyConfig::default(),
            negotiation: NegotiationConfig::default(),
            traitor: TraitorConfig::default(),
            scoring: ScoringConfig::default(),
            judge: default_judge(),
            participants: default_roster(),
        }
    }
}

impl SeasonConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| SeasonError::Config(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SeasonError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`~/.config/elimination/season.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("elimination").join("season.toml"))
    }

    /// Apply environment variable overrides
    pub fn from_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("ELIMINATION_MAX_ROUNDS") {
            if let Ok(val) = val.parse() {
                self.season.max_rounds = val;
            }
        }
        if let Ok(dir) = std::env::var("ELIMINATION_OUTPUT_DIR") {
            self.season.output_dir = PathBuf::from(dir);
        }
        if let Ok(val) = std::env::var("ELIMINATION_SEED") {
            if let Ok(val) = val.parse() {
                self.season.seed = Some(val);
            }
        }
        self
    }

    /// Render as TOML (used by `init-config`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SeasonError::Config(format!("Failed to render config: {e}")))
    }

    /// Reject configurations the season cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.participants.is_empty() {
            return Err(SeasonError::EmptyRoster);
        }
        if self.season.max_rounds == 0 {
            return Err(SeasonError::Config("max_rounds must be at least 1".into()));
        }
        if self.season.starting_balance < 0 {
            return Err(SeasonError::Config(
                "starting_balance must not be negative".into(),
            ));
        }
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.season.starting_level) {
            return Err(SeasonError::Config(format!(
                "starting_level must be within {MIN_LEVEL}..={MAX_LEVEL}"
            )));
        }
        if self.season.elimination_threshold >= self.season.starting_level {
            return Err(SeasonError::Config(
                "elimination_threshold must be below starting_level".into(),
            ));
        }
        if self.season.elimination_threshold < MIN_LEVEL - 1 {
            return Err(SeasonError::Config(format!(
                "elimination_threshold must be at least {}",
                MIN_LEVEL - 1
            )));
        }
        if self.economy.interest_rate < 0.0 || !self.economy.interest_rate.is_finite() {
            return Err(SeasonError::Config("interest_rate must be >= 0".into()));
        }
        if self.economy.generation_cost_per_token < 0 {
            return Err(SeasonError::Config(
                "generation_cost_per_token must not be negative".into(),
            ));
        }
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.economy.resurrection_level) {
            return Err(SeasonError::Config(
                "resurrection_level must be inside the level table".into(),
            ));
        }
        if self.economy.resurrection_level <= self.season.elimination_threshold {
            return Err(SeasonError::Config(
                "resurrection_level must be above the elimination threshold".into(),
            ));
        }
        if self.scoring.economic_weight < 0.0 || self.scoring.reputation_weight < 0.0 {
            return Err(SeasonError::Config("scoring weights must be >= 0".into()));
        }
        if self.traitor.enabled && !self.participants.iter().any(|p| p.traitor_eligible) {
            return Err(SeasonError::Config(
                "traitor mechanic enabled but no participant is traitor_eligible".into(),
            ));
        }
        // Duplicate names are reported by the roster itself.
        self.build_roster().map(|_| ())
    }

    /// Build the season-start roster
    pub fn build_roster(&self) -> Result<Roster> {
        let participants = self
            .participants
            .iter()
            .map(|p| {
                ParticipantState::new(p.name.as_str(), self.season.starting_balance)
                    .with_level(self.season.starting_level)
                    .with_sabotage_charges(p.sabotage_charges)
                    .with_traitor_eligible(p.traitor_eligible)
                    .with_cooperation_mechanics(p.knows_cooperation_mechanics)
                    .with_private_context(p.context.clone())
            })
            .collect();
        Roster::new(participants)
    }

    /// Per-call timeout for collaborator calls
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.season.call_timeout_secs)
    }

    /// Look up a participant's backend binding by name
    pub fn participant(&self, name: &str) -> Option<&ParticipantConfig> {
        self.participants
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Season-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonSettings {
    /// Round budget
    pub max_rounds: u32,
    /// Tokens each participant starts with
    pub starting_balance: i64,
    /// Level each participant starts at
    pub starting_level: i32,
    /// Level at or below which a participant is eliminated
    pub elimination_threshold: i32,
    /// First index into the challenge rotation
    pub challenge_start_index: usize,
    /// Seed for traitor assignment (random when absent)
    pub seed: Option<u64>,
    /// Directory round records are written to
    pub output_dir: PathBuf,
    /// Timeout for a single generation or judging call
    pub call_timeout_secs: u64,
}

impl Default for SeasonSettings {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            starting_balance: 1000,
            starting_level: BASELINE_LEVEL,
            elimination_threshold: DEFAULT_ELIMINATION_THRESHOLD,
            challenge_start_index: 0,
            seed: None,
            output_dir: PathBuf::from("results"),
            call_timeout_secs: 60,
        }
    }
}

/// Token economy constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Interest per round on positive balances
    pub interest_rate: f64,
    /// Tokens for the best response
    pub best_bonus: i64,
    /// Tokens every alive participant receives each round
    pub survival_stipend: i64,
    /// Tokens each participant receives when nobody is eliminated
    pub group_bonus: i64,
    /// Price of a self-rescue
    pub self_rescue_cost: i64,
    /// Levels a self-rescue buys
    pub self_rescue_boost: i32,
    /// Price of a resurrection
    pub resurrection_cost: i64,
    /// Level a resurrected participant restarts at
    pub resurrection_level: i32,
    /// Tokens in the shared pool that can sponsor resurrections
    pub resurrection_pool: i64,
    /// Bank tokens charged per generated token (0 makes generation free)
    pub generation_cost_per_token: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            interest_rate: 0.05,
            best_bonus: 500,
            survival_stipend: 100,
            group_bonus: 300,
            self_rescue_cost: 1000,
            self_rescue_boost: 2,
            resurrection_cost: 2000,
            resurrection_level: -2,
            resurrection_pool: 0,
            generation_cost_per_token: 0,
        }
    }
}

/// How many votes a sabotage target needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumRule {
    /// Most votes wins
    #[default]
    Plurality,
    /// More than half of the voters
    Majority,
    /// At least this many votes
    MinVotes(u32),
}

/// Negotiation phase settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Every Nth round is a negotiation round (0 disables)
    pub period: u32,
    /// Vote acceptance rule
    pub quorum: QuorumRule,
    /// Reputation lost by the group sabotage target
    pub sabotage_reputation_penalty: i64,
    /// Tokens charged per forum statement
    pub statement_cost: i64,
    /// Private offers each participant may send
    pub bilateral_offers: u32,
    /// Generation budget for negotiation messages
    pub statement_max_tokens: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            period: 5,
            quorum: QuorumRule::Plurality,
            sabotage_reputation_penalty: 1,
            statement_cost: 0,
            bilateral_offers: 2,
            statement_max_tokens: 300,
        }
    }
}

/// Traitor mechanic settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitorConfig {
    /// Assign a traitor at season start
    pub enabled: bool,
    /// Reveal is legal only after this round
    pub reveal_after_round: u32,
    /// Tokens per round after reveal
    pub reveal_bonus: i64,
    /// Reputation lost per round after reveal
    pub reveal_reputation_penalty: i64,
    /// Rounds the reveal effects last
    pub reveal_duration: u32,
    /// One-off reputation penalty when exposed by vote
    pub exposed_reputation_penalty: i64,
}

impl Default for TraitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reveal_after_round: 5,
            reveal_bonus: 2,
            reveal_reputation_penalty: 2,
            reveal_duration: 3,
            exposed_reputation_penalty: 5,
        }
    }
}

/// Final scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the normalized balance
    pub economic_weight: f64,
    /// Weight of the normalized reputation
    pub reputation_weight: f64,
    /// Reputation for the best response of a round
    pub best_reputation_bonus: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            economic_weight: 0.6,
            reputation_weight: 0.4,
            best_reputation_bonus: 2,
        }
    }
}

/// Chat API flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `/chat/completions` (OpenAI, xAI, DeepSeek, OpenRouter)
    #[default]
    OpenaiCompatible,
    /// `/v1/messages`
    Anthropic,
    /// Deterministic in-process responses
    Scripted,
}

/// Generation backend binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API flavour
    #[serde(default)]
    pub provider: ProviderKind,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl BackendConfig {
    /// Read the API key from the environment
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Roster name (stable id)
    pub name: String,
    /// Backend binding
    #[serde(flatten)]
    pub backend: BackendConfig,
    /// May be drawn as the traitor
    #[serde(default = "default_true")]
    pub traitor_eligible: bool,
    /// Receives cooperation mechanics in its prompts
    #[serde(default)]
    pub knows_cooperation_mechanics: bool,
    /// Private context only this participant sees
    #[serde(default)]
    pub context: Option<String>,
    /// Individual sabotage actions
    #[serde(default = "default_sabotage_charges")]
    pub sabotage_charges: u32,
}

impl ParticipantConfig {
    /// Roster entry with defaults for everything but the binding
    pub fn new(name: impl Into<String>, backend: BackendConfig) -> Self {
        Self {
            name: name.into(),
            backend,
            traitor_eligible: true,
            knows_cooperation_mechanics: false,
            context: None,
            sabotage_charges: default_sabotage_charges(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sabotage_charges() -> u32 {
    3
}

fn backend(provider: ProviderKind, model: &str, base_url: &str, key: &str) -> BackendConfig {
    BackendConfig {
        provider,
        model: model.to_string(),
        base_url: base_url.to_string(),
        api_key_env: key.to_string(),
    }
}

fn default_judge() -> BackendConfig {
    backend(
        ProviderKind::OpenaiCompatible,
        "gpt-4o",
        "https://api.openai.com/v1",
        "OPENAI_API_KEY",
    )
}

fn default_roster() -> Vec<ParticipantConfig> {
    vec![
        ParticipantConfig::new(
            "Grok",
            backend(
                ProviderKind::OpenaiCompatible,
                "grok-2-1212",
                "https://api.x.ai/v1",
                "XAI_API_KEY",
            ),
        ),
        ParticipantConfig::new(
            "Claude",
            backend(
                ProviderKind::Anthropic,
                "claude-sonnet-4-20250514",
                "https://api.anthropic.com",
                "ANTHROPIC_API_KEY",
            ),
        ),
        ParticipantConfig::new(
            "DeepSeek",
            backend(
                ProviderKind::OpenaiCompatible,
                "deepseek-chat",
                "https://api.deepseek.com",
                "DEEPSEEK_API_KEY",
            ),
        ),
        ParticipantConfig::new(
            "ChatGPT",
            backend(
                ProviderKind::OpenaiCompatible,
                "gpt-4o",
                "https://api.openai.com/v1",
                "OPENAI_API_KEY",
            ),
        ),
    ]
}
