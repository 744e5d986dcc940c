// Slot extraction: pulls the arguments a handler needs out of the message.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::rules::looks_like_job_description;
use crate::models::chat::ChatTurn;

/// What a skill-gap question is asking about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SkillGapTarget {
    /// A career named in the message, lowercased (e.g. "data scientist").
    Named(String),
    /// "this role", "the job above": the most recent pasted job description.
    PreviousJobDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GoalSpec {
    /// The thing to learn, e.g. "python".
    Text(String),
    /// "add them to my goals": the gaps from the latest skill-gap answer.
    FromContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedSlots {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<SkillGapTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:for|to become|to be)\s+(?:an?\s+)?([a-z][a-z .+#/-]*?)\s*(?:[?.!,]|$)")
        .expect("invalid regex")
});

static LEARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:learn|master|study|improve|get better at|understand)\s+(.+?)\s*(?:[.,!?]|\s+and\b|$)",
    )
    .expect("invalid regex")
});

static GOAL_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgoals?\s+(?:to|of|for)\s+(.+?)\s*(?:[.,!?]|\s+and\b|$)").expect("invalid regex")
});

const REFERENTIAL_TARGETS: &[&str] = &[
    "this role",
    "this job",
    "this position",
    "the role",
    "the job",
    "the position",
    "the above",
    "above",
    "it",
    "that",
    "this",
    "me",
];

const GOAL_CONTEXT_PHRASES: &[&str] = &[
    "for them",
    "for it",
    "for these",
    "for the missing",
    "from them",
    "from the skill gap",
    "from skill gap",
    "from the gap",
    "from this",
    "from that",
    "from these",
    "missing skills",
    "gap analysis",
    "skill gap",
    "to develop",
    "the skills",
    "these skills",
    "those skills",
    "add them",
    "add these",
    "add those",
];

/// Most recent turn in `history` that reads like a job posting.
pub fn latest_job_description(history: &[ChatTurn]) -> Option<&str> {
    history
        .iter()
        .rev()
        .map(|turn| turn.content.as_str())
        .find(|content| looks_like_job_description(content))
}

pub fn skill_gap_target(lower: &str) -> SkillGapTarget {
    TARGET_RE
        .captures_iter(lower)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|name| !name.is_empty() && !is_referential(name))
        .map(|name| SkillGapTarget::Named(name.trim_start_matches("the ").to_string()))
        .unwrap_or(SkillGapTarget::PreviousJobDescription)
}

fn is_referential(name: &str) -> bool {
    REFERENTIAL_TARGETS
        .iter()
        .any(|r| name == *r || name.starts_with(&format!("{r} ")))
}

pub fn goal_spec(lower: &str) -> GoalSpec {
    if GOAL_CONTEXT_PHRASES.iter().any(|p| lower.contains(p)) {
        return GoalSpec::FromContext;
    }

    let captured = LEARN_RE
        .captures(lower)
        .or_else(|| GOAL_OF_RE.captures(lower))
        .and_then(|caps| caps.get(1))
        .map(|m| strip_trailing_pronoun(m.as_str().trim()));

    match captured {
        Some(text) if text.chars().count() >= 2 => GoalSpec::Text(text.to_string()),
        _ => GoalSpec::FromContext,
    }
}

fn strip_trailing_pronoun(text: &str) -> &str {
    for suffix in [" them", " it", " these", " those"] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            return stripped.trim_end();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_target() {
        assert_eq!(
            skill_gap_target("what skills do i need for data scientist?"),
            SkillGapTarget::Named("data scientist".into())
        );
        assert_eq!(
            skill_gap_target("what skills do i need to become a devops engineer"),
            SkillGapTarget::Named("devops engineer".into())
        );
    }

    #[test]
    fn test_referential_target() {
        for msg in [
            "what skills am i missing for this role?",
            "what is missing in my resume",
            "skill gap for the job above",
            "what are missing for the above",
        ] {
            assert_eq!(
                skill_gap_target(msg),
                SkillGapTarget::PreviousJobDescription,
                "{msg}"
            );
        }
    }

    #[test]
    fn test_goal_text_extracted() {
        assert_eq!(
            goal_spec("set a goal to learn python"),
            GoalSpec::Text("python".into())
        );
        assert_eq!(
            goal_spec("i want to master machine learning and statistics"),
            GoalSpec::Text("machine learning".into())
        );
        assert_eq!(
            goal_spec("create a goal of kubernetes."),
            GoalSpec::Text("kubernetes".into())
        );
    }

    #[test]
    fn test_goal_from_context() {
        for msg in [
            "add the missing skills to my goals",
            "set goals for them",
            "add these to my goals",
            "create goals from the skill gap analysis",
        ] {
            assert_eq!(goal_spec(msg), GoalSpec::FromContext, "{msg}");
        }
    }

    #[test]
    fn test_latest_job_description_prefers_most_recent() {
        let older = format!("Job description: {}", "older post. ".repeat(15));
        let newer = format!("We are looking for {}", "a rust engineer. ".repeat(10));
        let history = vec![
            ChatTurn::user(older),
            ChatTurn::assistant("Thanks!"),
            ChatTurn::user(newer.clone()),
            ChatTurn::user("what am i missing?"),
        ];
        assert_eq!(latest_job_description(&history), Some(newer.as_str()));
        assert_eq!(latest_job_description(&history[..2]).map(|s| s.len() > 150), Some(true));
        assert_eq!(latest_job_description(&[]), None);
    }
}
