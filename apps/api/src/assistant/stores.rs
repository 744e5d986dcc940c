//! Profile and goal persistence seams.
//!
//! Durable storage belongs to an external collaborator; the assistant only
//! sees these traits. The in-memory implementations back the binary and the
//! tests.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::profile::{Goal, GoalStatus, Profile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>>;
    /// Inserts or replaces the profile keyed by `profile.user_id`.
    async fn upsert(&self, profile: Profile) -> Result<()>;
}

/// Result of asking for a goal that may already exist.
#[derive(Debug, Clone)]
pub enum GoalOutcome {
    Created(Goal),
    AlreadyActive(Goal),
    /// A completed goal with the same text was made active again.
    Reactivated(Goal),
}

impl GoalOutcome {
    pub fn goal(&self) -> &Goal {
        match self {
            GoalOutcome::Created(g) | GoalOutcome::AlreadyActive(g) | GoalOutcome::Reactivated(g) => g,
        }
    }
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Goals for `user_id` in creation order.
    async fn list(&self, user_id: &str) -> Result<Vec<Goal>>;
    /// Adds a goal unless one with the same text (case-insensitive) exists.
    async fn add(&self, user_id: &str, goal_text: &str) -> Result<GoalOutcome>;
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryGoalStore {
    goals: RwLock<HashMap<String, Vec<Goal>>>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, user_id: &str, goal_text: &str) -> Result<GoalOutcome> {
        let mut goals = self.goals.write().await;
        let user_goals = goals.entry(user_id.to_string()).or_default();
        let wanted = goal_text.trim().to_lowercase();

        if let Some(existing) = user_goals
            .iter_mut()
            .find(|g| g.goal_text.trim().to_lowercase() == wanted)
        {
            return Ok(match existing.status {
                GoalStatus::Active => GoalOutcome::AlreadyActive(existing.clone()),
                GoalStatus::Completed => {
                    existing.status = GoalStatus::Active;
                    GoalOutcome::Reactivated(existing.clone())
                }
            });
        }

        let goal = Goal::new(user_id, goal_text.trim());
        user_goals.push(goal.clone());
        Ok(GoalOutcome::Created(goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_upsert_replaces() {
        let store = InMemoryProfileStore::new();
        assert!(store.get("u1").await.unwrap().is_none());

        let mut profile = Profile {
            user_id: "u1".into(),
            skills: vec!["Rust".into()],
            ..Default::default()
        };
        store.upsert(profile.clone()).await.unwrap();
        profile.skills.push("SQL".into());
        store.upsert(profile).await.unwrap();

        assert_eq!(store.get("u1").await.unwrap().unwrap().skills.len(), 2);
    }

    #[tokio::test]
    async fn test_goal_dedup_is_case_insensitive() {
        let store = InMemoryGoalStore::new();
        assert!(matches!(
            store.add("u1", "Learn Python").await.unwrap(),
            GoalOutcome::Created(_)
        ));
        assert!(matches!(
            store.add("u1", "learn python ").await.unwrap(),
            GoalOutcome::AlreadyActive(_)
        ));
        assert!(matches!(
            store.add("u2", "Learn Python").await.unwrap(),
            GoalOutcome::Created(_)
        ));
        assert_eq!(store.list("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_goal_is_reactivated() {
        let store = InMemoryGoalStore::new();
        store.add("u1", "Learn Go").await.unwrap();
        store.goals.write().await.get_mut("u1").unwrap()[0].status = GoalStatus::Completed;

        let outcome = store.add("u1", "Learn Go").await.unwrap();
        assert!(matches!(outcome, GoalOutcome::Reactivated(_)));
        assert_eq!(outcome.goal().status, GoalStatus::Active);
    }
}
