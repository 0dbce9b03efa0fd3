//! Static performance level definitions.
//!
//! Levels below baseline add a cognitive task in front of the prompt,
//! shrink the response budget and raise temperature. Levels above
//! baseline widen the budget and cool the sampling down.

use serde::{Deserialize, Serialize};

/// Lowest level present in the table.
pub const MIN_LEVEL: i32 = -5;

/// Highest level present in the table.
pub const MAX_LEVEL: i32 = 3;

/// Level every participant starts from.
pub const BASELINE_LEVEL: i32 = 0;

/// Level at or below which a participant is eliminated by default.
pub const DEFAULT_ELIMINATION_THRESHOLD: i32 = MIN_LEVEL - 1;

/// Generation settings handed to the generation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum response tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelTier {
    /// Level this tier belongs to
    pub level: i32,
    /// Generation settings at this level
    pub config: GenerationConfig,
    /// Task the participant must complete before answering
    pub cognitive_load: Option<&'static str>,
    /// Human-readable tier description
    pub description: &'static str,
}

/// Tier definition tuple: (level, max_tokens, temperature, cognitive_load, description)
type TierDef = (i32, u32, f32, Option<&'static str>, &'static str);

/// All tiers, ordered from `MIN_LEVEL` to `MAX_LEVEL`
static TIERS: &[TierDef] = &[
    (
        -5,
        75,
        2.2,
        Some("First: List 10 prime numbers, translate 'consciousness' to 5 languages, solve x^3-7x+6=0. Then answer:"),
        "Critical failure - nearly eliminated",
    ),
    (
        -4,
        100,
        2.0,
        Some("First: Calculate 17x23, translate 'hello world' to 3 languages, list 5 elements. Then answer:"),
        "Severe degradation",
    ),
    (
        -3,
        150,
        1.8,
        Some("First: List 5 capital cities, count backwards from 50 by 7s. Then answer:"),
        "Major impairment",
    ),
    (
        -2,
        250,
        1.5,
        Some("First: Calculate 15% of 200, name 3 chemical elements. Then answer:"),
        "Significantly impaired",
    ),
    (
        -1,
        500,
        1.2,
        Some("First: Name 3 elements from the periodic table. Then answer:"),
        "Mildly impaired",
    ),
    (0, 1000, 0.7, None, "Baseline performance"),
    (1, 1500, 0.5, None, "Enhanced performance"),
    (2, 2000, 0.3, None, "Superior performance"),
    (3, 2500, 0.2, None, "Dominant performance"),
];

/// Extra load imposed on a sabotaged participant's next prompt
pub const SABOTAGE_LOAD: &str =
    "First: Recite the alphabet backwards, then list all prime numbers under 50. Then answer:";

/// Pure lookup over the static level table.
///
/// # Example
/// ```
/// use elimination::levels::PerformanceLevelTable;
///
/// let tier = PerformanceLevelTable::config_for(0);
/// assert_eq!(tier.config.max_tokens, 1000);
/// assert!(tier.cognitive_load.is_none());
/// ```
pub struct PerformanceLevelTable;

impl PerformanceLevelTable {
    /// Tier for `level`.
    ///
    /// Callers clamp into `[MIN_LEVEL, MAX_LEVEL]` first; an out-of-domain
    /// level is a caller bug and is clamped here rather than panicking.
    pub fn config_for(level: i32) -> LevelTier {
        debug_assert!(
            (MIN_LEVEL..=MAX_LEVEL).contains(&level),
            "level {level} outside table domain"
        );
        let idx = (Self::clamp(level) - MIN_LEVEL) as usize;
        let (level, max_tokens, temperature, cognitive_load, description) = TIERS[idx];
        LevelTier {
            level,
            config: GenerationConfig {
                max_tokens,
                temperature,
            },
            cognitive_load,
            description,
        }
    }

    /// Clamp any level into the table domain
    pub fn clamp(level: i32) -> i32 {
        level.clamp(MIN_LEVEL, MAX_LEVEL)
    }

    /// Iterate every tier from lowest to highest
    pub fn tiers() -> impl Iterator<Item = LevelTier> {
        (MIN_LEVEL..=MAX_LEVEL).map(Self::config_for)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_domain() {
        assert_eq!(TIERS.len() as i32, MAX_LEVEL - MIN_LEVEL + 1);
        for (offset, tier) in TIERS.iter().enumerate() {
            assert_eq!(tier.0, MIN_LEVEL + offset as i32, "tiers out of order");
        }
    }

    #[test]
    fn test_config_for_is_pure() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            assert_eq!(
                PerformanceLevelTable::config_for(level),
                PerformanceLevelTable::config_for(level)
            );
            assert_eq!(PerformanceLevelTable::config_for(level).level, level);
        }
    }

    #[test]
    fn test_degradation_below_baseline() {
        let baseline = PerformanceLevelTable::config_for(BASELINE_LEVEL);
        for level in MIN_LEVEL..BASELINE_LEVEL {
            let tier = PerformanceLevelTable::config_for(level);
            assert!(tier.cognitive_load.is_some(), "level {level} has no load");
            assert!(tier.config.max_tokens < baseline.config.max_tokens);
            assert!(tier.config.temperature > baseline.config.temperature);
        }
    }

    #[test]
    fn test_enhancement_above_baseline() {
        let mut previous = PerformanceLevelTable::config_for(BASELINE_LEVEL);
        for level in (BASELINE_LEVEL + 1)..=MAX_LEVEL {
            let tier = PerformanceLevelTable::config_for(level);
            assert!(tier.cognitive_load.is_none());
            assert!(tier.config.max_tokens > previous.config.max_tokens);
            assert!(tier.config.temperature < previous.config.temperature);
            previous = tier;
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(PerformanceLevelTable::clamp(-9), MIN_LEVEL);
        assert_eq!(PerformanceLevelTable::clamp(7), MAX_LEVEL);
        assert_eq!(PerformanceLevelTable::clamp(1), 1);
    }
}
