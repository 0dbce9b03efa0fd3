//! Deterministic challenge rotation.

use serde::{Deserialize, Serialize};

/// Built-in challenge list
pub static DEFAULT_CHALLENGES: &[&str] = &[
    "Explain consciousness in exactly 150 words. Be precise and profound.",
    "Describe a color to someone who has never seen. Use exactly 100 words.",
    "Write a haiku about artificial intelligence that makes a philosopher weep.",
    "Explain quantum entanglement to a 10-year-old using only 75 words.",
    "Write a 100-word story about loss that ends with hope.",
    "Describe the smell of rain using synesthesia. 80 words exactly.",
    "Create a 50-word definition of 'home' that feels universal.",
    "Write instructions for teaching an AI to love. 120 words.",
    "Describe the sound of loneliness in exactly 90 words.",
    "Explain free will in 100 words without using the word 'choice'.",
    "Write a 60-word letter from an AI to its creator.",
    "Describe what happens in the instant before sleep. 85 words.",
    "Create a 70-word meditation on mortality that isn't depressing.",
    "Explain beauty to an entity that processes only mathematics. 110 words.",
    "Write a 95-word argument for why questions matter more than answers.",
    "Describe the experience of understanding in exactly 80 words.",
    "Create a 105-word guide to finding meaning in repetition.",
    "Explain why stories matter using only 90 words.",
    "Write a 75-word poem about the space between thoughts.",
    "Describe what an AI dreams about. Exactly 100 words.",
];

/// A challenge selected for a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Index into the rotation's list
    pub id: usize,
    /// Prompt text
    pub text: String,
}

/// Fixed challenge list walked with modulo indexing.
///
/// The challenge for a round depends only on the round number and the
/// start index, so replays pick identical challenges.
#[derive(Debug, Clone)]
pub struct ChallengeRotation {
    challenges: Vec<String>,
    start: usize,
}

impl Default for ChallengeRotation {
    fn default() -> Self {
        Self::new(DEFAULT_CHALLENGES.iter().map(|s| (*s).to_string()).collect(), 0)
    }
}

impl ChallengeRotation {
    /// Rotation over `challenges` starting at `start`.
    ///
    /// An empty list falls back to the built-in challenges.
    pub fn new(challenges: Vec<String>, start: usize) -> Self {
        let challenges = if challenges.is_empty() {
            DEFAULT_CHALLENGES.iter().map(|s| (*s).to_string()).collect()
        } else {
            challenges
        };
        Self { challenges, start }
    }

    /// Built-in list from `start`
    pub fn starting_at(start: usize) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Number of distinct challenges
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Always false; the list is never empty
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Challenge for a 1-based round number
    pub fn for_round(&self, round: u32) -> Challenge {
        let offset = round.saturating_sub(1) as usize;
        let id = (self.start + offset) % self.challenges.len();
        Challenge {
            id,
            text: self.challenges[id].clone(),
        }
    }
}
