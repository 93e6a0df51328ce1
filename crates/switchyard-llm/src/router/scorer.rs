//! Complexity scoring and score → tier mapping.

use switchyard_core::{BaseScores, RoutingTables, TaskType, Tier, TierBands};

/// Lowest score a task can receive.
pub const MIN_SCORE: i32 = 5;
/// Highest score a task can receive.
pub const MAX_SCORE: i32 = 95;

const LONG_TASK_WORDS: usize = 50;
const SHORT_TASK_WORDS: usize = 10;
const LONG_TASK_BONUS: i32 = 10;
const SHORT_TASK_PENALTY: i32 = 5;
const CODE_BLOCK_BONUS: i32 = 8;
const STRUCTURE_THRESHOLD: usize = 5;
const STRUCTURE_BONUS: i32 = 10;
/// How far into the cheap band an escalated score lands.
const ESCALATION_OFFSET: i32 = 5;

/// Heuristic complexity scorer driven by [`RoutingTables`].
#[derive(Debug, Clone)]
pub struct Scorer {
    /// Lower-cased phrase → weight.
    keywords: Vec<(String, i32)>,
    base: BaseScores,
    bands: TierBands,
}

impl Scorer {
    pub fn new(tables: &RoutingTables) -> Self {
        Self {
            keywords: tables
                .complexity_keywords
                .iter()
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, w)| (k.to_lowercase(), *w))
                .collect(),
            base: tables.base_scores,
            bands: tables.tier_bands,
        }
    }

    pub fn base_score(&self, task_type: TaskType) -> i32 {
        self.base.get(task_type)
    }

    pub fn bands(&self) -> &TierBands {
        &self.bands
    }

    /// Score a task in `[MIN_SCORE, MAX_SCORE]`.
    ///
    /// `free_tier_unreliable` is the learning signal: when set, a score that
    /// would land in the free band is lifted into the cheap band.
    pub fn score(&self, task: &str, task_type: TaskType, free_tier_unreliable: bool) -> i32 {
        let mut score = self.base_score(task_type);
        let lower = task.to_lowercase();

        score += self
            .keywords
            .iter()
            .filter(|(kw, _)| lower.contains(kw.as_str()))
            .map(|(_, weight)| weight)
            .sum::<i32>();

        let words = task.split_whitespace().count();
        if words > LONG_TASK_WORDS {
            score += LONG_TASK_BONUS;
        } else if words < SHORT_TASK_WORDS {
            score -= SHORT_TASK_PENALTY;
        }

        if task.contains("```") {
            score += CODE_BLOCK_BONUS;
        }

        let structure =
            task.matches("- ").count() + task.matches("* ").count() + task.matches('\n').count();
        if structure > STRUCTURE_THRESHOLD {
            score += STRUCTURE_BONUS;
        }

        if free_tier_unreliable && score <= self.bands.free.max {
            score = self.bands.cheap.min + ESCALATION_OFFSET;
        }

        score.clamp(MIN_SCORE, MAX_SCORE)
    }

    /// Map a score to a tier. Research intent bypasses the score entirely.
    pub fn tier_for(&self, score: i32, is_research: bool) -> Tier {
        if is_research {
            return Tier::Research;
        }
        match self.bands.tier_for(score) {
            Some(tier) => tier,
            None if score > 85 => Tier::Premium,
            None => Tier::Free,
        }
    }
}
