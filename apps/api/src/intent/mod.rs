//! Intent Router: picks exactly one handler category per message.
//!
//! Routing is a deterministic function of the message text, the attachment
//! flag and the last few conversation turns. The rule table in [`rules`] is
//! the whole decision procedure; this module only evaluates it and fills in
//! the slots the chosen handler needs.

use serde::Serialize;
use tracing::{debug, error};

use crate::errors::CoreError;
use crate::models::chat::{recent_turns, IncomingMessage};

pub mod rules;
pub mod slots;

pub use slots::{latest_job_description, ExtractedSlots, GoalSpec, SkillGapTarget};

use rules::{looks_like_job_description, Signals, RULES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Resume,
    JobFit,
    SkillGap,
    Recommend,
    GoalSet,
    GoalList,
    Qa,
    Fallback,
}

impl IntentCategory {
    /// Tie-break rank; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            IntentCategory::Resume => 0,
            IntentCategory::JobFit => 1,
            IntentCategory::SkillGap => 2,
            IntentCategory::Recommend => 3,
            IntentCategory::GoalSet => 4,
            IntentCategory::GoalList => 5,
            IntentCategory::Qa => 6,
            IntentCategory::Fallback => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentCategory::Resume => "resume",
            IntentCategory::JobFit => "job_fit",
            IntentCategory::SkillGap => "skill_gap",
            IntentCategory::Recommend => "recommend",
            IntentCategory::GoalSet => "goal_set",
            IntentCategory::GoalList => "goal_list",
            IntentCategory::Qa => "qa",
            IntentCategory::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentDecision {
    pub category: IntentCategory,
    pub confidence: Option<f32>,
    /// Name of the rule that fired.
    pub rule: &'static str,
    pub slots: ExtractedSlots,
}

#[derive(Debug, Clone)]
pub struct IntentRouter {
    recent_turn_limit: usize,
}

impl IntentRouter {
    pub fn new(recent_turn_limit: usize) -> Self {
        Self { recent_turn_limit }
    }

    pub fn route(&self, message: &IncomingMessage) -> IntentDecision {
        let history = recent_turns(&message.history, self.recent_turn_limit);
        let history_jd = latest_job_description(history);
        let signals = Signals::new(&message.text, message.has_attachment, history_jd.is_some());

        let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&signals)) else {
            let err = CoreError::RoutingAmbiguity(format!(
                "no routing rule matched a {}-char message",
                signals.chars
            ));
            error!("{err}");
            return IntentDecision {
                category: IntentCategory::Fallback,
                confidence: None,
                rule: "unmatched",
                slots: ExtractedSlots::default(),
            };
        };

        let slots = extract_slots(rule.category, &message.text, &signals.lower, history_jd);
        debug!(
            "Routed message to {} via rule '{}'",
            rule.category.as_str(),
            rule.name
        );
        IntentDecision {
            category: rule.category,
            confidence: rule.confidence,
            rule: rule.name,
            slots,
        }
    }
}

fn extract_slots(
    category: IntentCategory,
    text: &str,
    lower: &str,
    history_jd: Option<&str>,
) -> ExtractedSlots {
    let text = text.trim();
    match category {
        IntentCategory::Resume => ExtractedSlots {
            resume_text: Some(text.to_string()),
            ..Default::default()
        },
        IntentCategory::JobFit => {
            let job_description = if looks_like_job_description(text) {
                Some(text.to_string())
            } else {
                history_jd.map(str::to_string)
            };
            ExtractedSlots {
                job_description,
                ..Default::default()
            }
        }
        IntentCategory::SkillGap => ExtractedSlots {
            target: Some(slots::skill_gap_target(lower)),
            job_description: history_jd.map(str::to_string),
            ..Default::default()
        },
        IntentCategory::GoalSet => ExtractedSlots {
            goal: Some(slots::goal_spec(lower)),
            ..Default::default()
        },
        IntentCategory::Qa | IntentCategory::Fallback => ExtractedSlots {
            query: Some(text.to_string()),
            ..Default::default()
        },
        IntentCategory::Recommend | IntentCategory::GoalList => ExtractedSlots::default(),
    }
}
