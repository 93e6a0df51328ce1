use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A cost/capability bucket a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Cheap,
    Standard,
    Premium,
    Research,
}

impl Tier {
    /// Cost-ordered tiers, cheapest first. Research sits outside this ladder.
    pub const LADDER: [Tier; 4] = [Tier::Free, Tier::Cheap, Tier::Standard, Tier::Premium];

    /// Order in which tiers are retried when the scored tier has no eligible model.
    pub const ESCALATION: [Tier; 4] = [Tier::Cheap, Tier::Standard, Tier::Premium, Tier::Free];

    /// Every tier, in display order.
    pub const ALL: [Tier; 5] = [
        Tier::Free,
        Tier::Cheap,
        Tier::Standard,
        Tier::Premium,
        Tier::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Cheap => "cheap",
            Tier::Standard => "standard",
            Tier::Premium => "premium",
            Tier::Research => "research",
        }
    }

    /// Tiers strictly above this one on the cost ladder.
    pub fn above(&self) -> &'static [Tier] {
        match self {
            Tier::Free => &[Tier::Cheap, Tier::Standard, Tier::Premium],
            Tier::Cheap => &[Tier::Standard, Tier::Premium],
            Tier::Standard => &[Tier::Premium],
            Tier::Premium | Tier::Research => &[],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "cheap" => Ok(Tier::Cheap),
            "standard" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            "research" => Ok(Tier::Research),
            other => Err(format!(
                "unknown tier '{other}' (expected free, cheap, standard, premium or research)"
            )),
        }
    }
}

/// What a model can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Chat,
    Code,
    Vision,
    Reasoning,
    Search,
    LongContext,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::Code => "code",
            Capability::Vision => "vision",
            Capability::Reasoning => "reasoning",
            Capability::Search => "search",
            Capability::LongContext => "long_context",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Capability::Chat),
            "code" => Ok(Capability::Code),
            "vision" => Ok(Capability::Vision),
            "reasoning" => Ok(Capability::Reasoning),
            "search" => Ok(Capability::Search),
            "long_context" | "long-context" => Ok(Capability::LongContext),
            other => Err(format!("unknown capability '{other}'")),
        }
    }
}

/// Coarse intent of a task, detected from its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Trivial,
    Simple,
    Code,
    Content,
    Analysis,
    Architect,
    Research,
    General,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Trivial => "trivial",
            TaskType::Simple => "simple",
            TaskType::Code => "code",
            TaskType::Content => "content",
            TaskType::Analysis => "analysis",
            TaskType::Architect => "architect",
            TaskType::Research => "research",
            TaskType::General => "general",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a catalog entry may be routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    #[default]
    Active,
    Disabled,
}
