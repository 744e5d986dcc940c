//! Reply text for the deterministic handlers.
//!
//! Replies use the same plain-text conventions the generation prompts ask
//! for: `**bold**` headings, `-` bullets, blank lines between sections.

use super::extraction::ParsedResume;
use super::stores::GoalOutcome;
use crate::knowledge::RetrievedChunk;
use crate::matching::{FitReport, SkillComparison};
use crate::models::profile::{Goal, GoalStatus};

pub const HAVE_HEADING: &str = "Skills You Have:";
/// Goal setting reads the gap list back from under this heading.
pub const GAP_HEADING: &str = "Skills You Need to Develop:";

pub const NEED_USER_ID: &str = "I need to know who you are to do that. Please sign in or include your user id, then ask again.";
pub const NEED_PROFILE: &str = "I don't have your profile yet. Please upload or paste your resume first so I can analyze your skills and experience.";
pub const NEED_RESUME_TEXT: &str = "Please paste the text of your resume (or attach it) and I'll extract your profile from it.";
pub const NEED_JOB_DESCRIPTION: &str = "I couldn't find a job description in our conversation. Please either:\n\n- paste a job description and ask again, or\n- name the role, e.g. \"What skills do I need for Data Scientist?\"";
pub const NEED_GOAL_TEXT: &str = "I couldn't find skills to turn into goals in our recent conversation. Try \"Set a goal to learn Python\", or run a skill gap analysis first.";
pub const NO_RECOMMENDATIONS: &str = "I couldn't find careers in my knowledge base that match your profile yet. Try adding more detail about your skills and experience.";

/// "data scientist" → "Data Scientist".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn resume_reply(parsed: &ParsedResume, saved: bool) -> String {
    let experience = parsed
        .experience
        .as_deref()
        .map(|e| truncate_chars(e, 200))
        .unwrap_or_else(|| "Not found".to_string());
    let skills = if parsed.skills.is_empty() {
        "Not found".to_string()
    } else {
        parsed.skills.iter().take(10).cloned().collect::<Vec<_>>().join(", ")
    };
    let next = if saved {
        "Your profile is saved. You can now ask me to:\n- recommend careers based on your profile\n- analyze your skill gaps for a role\n- score your fit for a job description"
    } else {
        "Sign in to save this profile so I can use it for recommendations and skill gap analysis."
    };

    format!(
        "**Resume Parsed Successfully!**\n\n\
         **Your Profile:**\n\
         - **Name:** {}\n\
         - **Email:** {}\n\
         - **Experience:** {experience}\n\
         - **Skills:** {skills}\n\n\
         **What's Next?**\n{next}",
        parsed.name.as_deref().unwrap_or("Not found"),
        parsed.email.as_deref().unwrap_or("Not found"),
    )
}

pub fn recommendations_reply(careers: &[RetrievedChunk]) -> String {
    let mut out = String::from("**Career Recommendations Based on Your Profile:**\n");
    for (i, career) in careers.iter().enumerate() {
        out.push_str(&format!(
            "\n**{}. {}** (match {:.0}%)\n",
            i + 1,
            career.title,
            career.similarity.clamp(0.0, 1.0) * 100.0
        ));
        if let Some(summary) = first_sentence(&career.text) {
            out.push_str(&format!("   {summary}\n"));
        }
        for line in career.text.lines().map(str::trim) {
            let lower = line.to_lowercase();
            if lower.starts_with("salary") || lower.starts_with("outlook") || lower.starts_with("job outlook") {
                out.push_str(&format!("   {line}\n"));
            }
        }
    }
    out.trim_end().to_string()
}

pub fn skill_gap_reply(title: &str, comparison: &SkillComparison) -> String {
    let matched = if comparison.matched.is_empty() {
        "None found".to_string()
    } else {
        comparison.matched_labels().join(", ")
    };
    let (gap, focus) = if comparison.gap.is_empty() {
        (
            "None! You have all the required skills.".to_string(),
            "You're well-prepared!".to_string(),
        )
    } else {
        (
            comparison.gap.join(", "),
            format!("Focus on developing: {}", top_three(&comparison.gap)),
        )
    };

    format!(
        "**Skill Gap Analysis for {title}**\n\n\
         **{HAVE_HEADING}**\n{matched}\n\n\
         **{GAP_HEADING}**\n{gap}\n\n\
         **Recommendation:**\n{focus}"
    )
}

pub fn job_fit_reply(report: &FitReport) -> String {
    let mut out = format!(
        "**Job Fit Analysis**\n\n**Fit Score: {}/100**\n",
        report.overall_score
    );
    if !report.matched.is_empty() || !report.gaps.is_empty() {
        let matched: Vec<&str> = report.matched.iter().map(|m| m.skill.as_str()).collect();
        let matched = if matched.is_empty() {
            "None found".to_string()
        } else {
            matched.join(", ")
        };
        let gaps = if report.gaps.is_empty() {
            "None! You have all the required skills.".to_string()
        } else {
            report.gaps.join(", ")
        };
        out.push_str(&format!(
            "\n**{HAVE_HEADING}**\n{matched}\n\n**{GAP_HEADING}**\n{gaps}\n"
        ));
    }
    out.push_str(&format!("\n**Insights:**\n{}", report.recommendation));
    out
}

pub fn goals_set_reply(outcomes: &[GoalOutcome]) -> String {
    let mut created = Vec::new();
    let mut reactivated = Vec::new();
    let mut existing = Vec::new();
    for outcome in outcomes {
        let text = outcome.goal().goal_text.as_str();
        match outcome {
            GoalOutcome::Created(_) => created.push(text),
            GoalOutcome::Reactivated(_) => reactivated.push(text),
            GoalOutcome::AlreadyActive(_) => existing.push(text),
        }
    }

    let mut sections = Vec::new();
    if !created.is_empty() {
        sections.push(format!(
            "**Goals Created ({}):**\n{}",
            created.len(),
            bullets(&created)
        ));
    }
    if !reactivated.is_empty() {
        sections.push(format!(
            "**Reactivated Goals ({}):**\n{}",
            reactivated.len(),
            bullets(&reactivated)
        ));
    }
    if !existing.is_empty() {
        sections.push(format!(
            "**Already Active ({}):**\n{}",
            existing.len(),
            bullets(&existing)
        ));
    }
    sections.push("Ask me \"What are my goals?\" to see all your goals.".to_string());
    sections.join("\n\n")
}

pub fn goal_list_reply(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return "You don't have any goals yet.\n\nSet one by saying \"Help me set a goal to learn Python\".".to_string();
    }
    let active: Vec<&str> = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active)
        .map(|g| g.goal_text.as_str())
        .collect();
    let completed: Vec<&str> = goals
        .iter()
        .filter(|g| g.status == GoalStatus::Completed)
        .map(|g| g.goal_text.as_str())
        .collect();

    let mut out = format!("**Your Goals ({} total):**", goals.len());
    if !active.is_empty() {
        out.push_str(&format!("\n\n**Active:**\n{}", bullets(&active)));
    }
    if !completed.is_empty() {
        out.push_str(&format!("\n\n**Completed:**\n{}", bullets(&completed)));
    }
    out
}

fn bullets(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn top_three(items: &[String]) -> String {
    items.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
}

fn first_sentence(text: &str) -> Option<&str> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    match line.find(". ") {
        Some(end) => Some(&line[..=end]),
        None => Some(line),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
