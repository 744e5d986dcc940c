use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Career profile as held by the profile store collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub experience_summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Profile {
    /// Flattens the profile into the text that gets embedded for fit scoring
    /// and career recommendation.
    pub fn embedding_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            parts.push(format!("Name: {name}"));
        }
        if let Some(exp) = self
            .experience_summary
            .as_deref()
            .filter(|e| !e.trim().is_empty())
        {
            parts.push(format!("Experience: {exp}"));
        }
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        parts.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self
                .experience_summary
                .as_deref()
                .map_or(true, |e| e.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: Uuid,
    pub user_id: String,
    pub goal_text: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(user_id: &str, goal_text: impl Into<String>) -> Self {
        Self {
            goal_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            goal_text: goal_text.into(),
            status: GoalStatus::Active,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_joins_present_fields() {
        let profile = Profile {
            user_id: "u1".into(),
            name: Some("Asha".into()),
            email: None,
            experience_summary: Some("3 years of analytics".into()),
            skills: vec!["Python".into(), "SQL".into()],
        };
        assert_eq!(
            profile.embedding_text(),
            "Name: Asha\nExperience: 3 years of analytics\nSkills: Python, SQL"
        );
    }

    #[test]
    fn test_embedding_text_skips_blank_fields() {
        let profile = Profile {
            user_id: "u1".into(),
            name: Some("  ".into()),
            skills: vec!["Rust".into()],
            ..Default::default()
        };
        assert_eq!(profile.embedding_text(), "Skills: Rust");
    }

    #[test]
    fn test_profile_without_skills_or_experience_is_empty() {
        let profile = Profile {
            user_id: "u1".into(),
            name: Some("Asha".into()),
            ..Default::default()
        };
        assert!(profile.is_empty());
    }

    #[test]
    fn test_new_goal_is_active() {
        let goal = Goal::new("u1", "Learn Kubernetes");
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.goal_text, "Learn Kubernetes");
    }
}
