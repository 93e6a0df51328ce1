//! Routing tables: the tunable data behind classification and scoring.
//!
//! Everything here is plain data so it can be swapped or localized from
//! `switchyard.toml` without touching the scoring code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{TaskType, Tier};

/// Inclusive score range mapped to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub min: i32,
    pub max: i32,
}

impl Band {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: i32) -> bool {
        self.min <= score && score <= self.max
    }
}

/// Score bands for the four cost tiers. Research is assigned by intent, not score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierBands {
    pub free: Band,
    pub cheap: Band,
    pub standard: Band,
    pub premium: Band,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            free: Band::new(0, 25),
            cheap: Band::new(26, 45),
            standard: Band::new(46, 70),
            premium: Band::new(71, 100),
        }
    }
}

impl TierBands {
    pub fn band(&self, tier: Tier) -> Option<Band> {
        match tier {
            Tier::Free => Some(self.free),
            Tier::Cheap => Some(self.cheap),
            Tier::Standard => Some(self.standard),
            Tier::Premium => Some(self.premium),
            Tier::Research => None,
        }
    }

    /// The first ladder tier whose band contains `score`.
    pub fn tier_for(&self, score: i32) -> Option<Tier> {
        Tier::LADDER
            .into_iter()
            .find(|t| self.band(*t).is_some_and(|b| b.contains(score)))
    }

    /// Check that bands are ascending, contiguous and non-overlapping within 0..=100.
    pub fn check(&self) -> Result<(), String> {
        let bands = [self.free, self.cheap, self.standard, self.premium];
        for (tier, band) in Tier::LADDER.iter().zip(bands.iter()) {
            if band.min > band.max {
                return Err(format!("{tier} band is empty ({}..={})", band.min, band.max));
            }
            if band.min < 0 || band.max > 100 {
                return Err(format!(
                    "{tier} band {}..={} is outside 0..=100",
                    band.min, band.max
                ));
            }
        }
        for (tiers, bands) in Tier::LADDER.windows(2).zip(bands.windows(2)) {
            if bands[1].min != bands[0].max + 1 {
                return Err(format!(
                    "{} band must start at {} (right after {} ends), found {}",
                    tiers[1],
                    bands[0].max + 1,
                    tiers[0],
                    bands[1].min
                ));
            }
        }
        Ok(())
    }
}

/// Starting score per detected task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseScores {
    pub trivial: i32,
    pub simple: i32,
    pub content: i32,
    pub general: i32,
    pub code: i32,
    pub research: i32,
    pub analysis: i32,
    pub architect: i32,
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            trivial: 10,
            simple: 20,
            content: 35,
            general: 35,
            code: 50,
            research: 50,
            analysis: 60,
            architect: 80,
        }
    }
}

impl BaseScores {
    pub fn get(&self, task_type: TaskType) -> i32 {
        match task_type {
            TaskType::Trivial => self.trivial,
            TaskType::Simple => self.simple,
            TaskType::Content => self.content,
            TaskType::General => self.general,
            TaskType::Code => self.code,
            TaskType::Research => self.research,
            TaskType::Analysis => self.analysis,
            TaskType::Architect => self.architect,
        }
    }
}

/// All data the classifier and scorer consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingTables {
    /// Phrase → score delta. Matched as lower-case substrings; every match applies.
    pub complexity_keywords: BTreeMap<String, i32>,
    /// Any of these phrases marks a task as research.
    pub research_keywords: Vec<String>,
    pub base_scores: BaseScores,
    pub tier_bands: TierBands,
}

impl Default for RoutingTables {
    fn default() -> Self {
        Self {
            complexity_keywords: default_complexity_keywords(),
            research_keywords: DEFAULT_RESEARCH_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            base_scores: BaseScores::default(),
            tier_bands: TierBands::default(),
        }
    }
}

const DEFAULT_COMPLEXITY_KEYWORDS: &[(&str, i32)] = &[
    // EN, high complexity
    ("architect", 25),
    ("design system", 25),
    ("security audit", 25),
    ("refactor entire", 25),
    ("performance optimization", 20),
    ("rewrite", 20),
    ("migrate", 18),
    ("integrate", 15),
    ("complex", 15),
    ("analyze", 12),
    ("debug", 12),
    ("implement", 10),
    ("add feature", 10),
    ("create", 8),
    ("build", 8),
    ("fix bug", 6),
    ("update", 5),
    // EN, low complexity
    ("format", -10),
    ("rename", -10),
    ("typo", -15),
    ("comment", -8),
    ("simple", -15),
    ("quick", -10),
    ("trivial", -15),
    ("lint", -12),
    // RU, high complexity
    ("архитектур", 25),
    ("спроектир", 25),
    ("безопасност", 20),
    ("рефактор", 20),
    ("оптимизир", 15),
    ("мигрир", 18),
    ("интегрир", 15),
    ("сложн", 15),
    ("комплексн", 15),
    ("анализ", 12),
    ("отладк", 12),
    ("реализ", 10),
    ("создай подборк", 12),
    ("напиши статью", 10),
    ("создай", 8),
    ("напиши", 6),
    ("исправ", 5),
    ("обнов", 5),
    ("глубокий анализ", 20),
    ("техническ", 12),
    ("делегируй", 10),
    ("оркестрируй", 12),
    ("распараллель", 15),
    ("парс", 8),
    ("спарс", 8),
    ("seo", 10),
    ("перевед", 5),
    // RU, low complexity
    ("опечатк", -15),
    ("простой", -12),
    ("быстро", -10),
    ("мелк", -10),
];

const DEFAULT_RESEARCH_KEYWORDS: &[&str] = &[
    // EN
    "research",
    "find out",
    "search for",
    "compare",
    "alternatives",
    "what is",
    "how does",
    "explore",
    "investigate",
    "benchmark",
    "latest",
    "news",
    "look up",
    // RU
    "исследуй",
    "найди информацию",
    "сравни",
    "альтернатив",
    "что такое",
    "как работает",
    "изучи",
    "проанализируй рынок",
];

fn default_complexity_keywords() -> BTreeMap<String, i32> {
    DEFAULT_COMPLEXITY_KEYWORDS
        .iter()
        .map(|(k, w)| (k.to_string(), *w))
        .collect()
}
