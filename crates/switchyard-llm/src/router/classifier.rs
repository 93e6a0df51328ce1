use regex::Regex;
use std::sync::LazyLock;

use switchyard_core::TaskType;

static RE_ARCHITECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"architect|design.*system|infrastructure").unwrap());
static RE_TRIVIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"typo|format|rename|lint").unwrap());
static RE_SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"simple|quick|trivial").unwrap());
static RE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"code|implement|function|class|module|api").unwrap());
static RE_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"write|article|content|blog|documentation").unwrap());
static RE_ANALYSIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"analyze|report|data|metrics").unwrap());

/// Maps a task description to a [`TaskType`].
///
/// Rules are checked in a fixed order and the first hit wins, so research and
/// architecture intent dominate incidental overlap with code/content wording.
#[derive(Debug, Clone)]
pub struct Classifier {
    research_keywords: Vec<String>,
}

impl Classifier {
    pub fn new(research_keywords: &[String]) -> Self {
        Self {
            research_keywords: research_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, task: &str) -> TaskType {
        let lower = task.to_lowercase();
        if self.research_keywords.iter().any(|kw| lower.contains(kw.as_str())) {
            return TaskType::Research;
        }

        let rules: [(&Regex, TaskType); 6] = [
            (&*RE_ARCHITECT, TaskType::Architect),
            (&*RE_TRIVIAL, TaskType::Trivial),
            (&*RE_SIMPLE, TaskType::Simple),
            (&*RE_CODE, TaskType::Code),
            (&*RE_CONTENT, TaskType::Content),
            (&*RE_ANALYSIS, TaskType::Analysis),
        ];
        rules
            .into_iter()
            .find(|(re, _)| re.is_match(&lower))
            .map(|(_, task_type)| task_type)
            .unwrap_or(TaskType::General)
    }
}
