//! Structured extraction from free text: resumes, job descriptions, corpus
//! chunks and earlier assistant replies.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::GAP_HEADING;
use super::prompts::{CAREER_SKILLS_INSTRUCTIONS, JOB_SKILLS_INSTRUCTIONS, RESUME_PARSE_INSTRUCTIONS};
use crate::errors::CoreError;
use crate::llm_client::{call_json, GenerationGateway};
use crate::models::chat::{ChatTurn, Role};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("invalid regex")
});
static REQUIRED_SKILLS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*required skills\s*:\s*(.+?)\s*$").expect("invalid regex")
});
static GAP_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is){}\**\s*\n(.+?)(?:\n\s*\n|$)",
        regex::escape(GAP_HEADING)
    ))
    .expect("invalid regex")
});

/// Skills looked for verbatim when the model returns none.
const COMMON_SKILLS: &[&str] = &[
    "Python",
    "JavaScript",
    "TypeScript",
    "Java",
    "Rust",
    "Go",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "SQL",
    "PostgreSQL",
    "MongoDB",
    "Git",
    "Docker",
    "Kubernetes",
    "AWS",
    "Django",
    "Flask",
    "Spring",
    "Machine Learning",
    "Data Science",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ParsedResume {
    /// Trims fields, drops blanks and fills what the model missed from the
    /// raw text.
    fn normalize(mut self, resume_text: &str) -> Self {
        self.name = non_blank(self.name);
        self.email = non_blank(self.email)
            .or_else(|| EMAIL_RE.find(resume_text).map(|m| m.as_str().to_string()));
        self.experience = non_blank(self.experience);
        self.skills = dedup_skills(self.skills);
        if self.skills.is_empty() {
            self.skills = scan_common_skills(resume_text);
        }
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling.
pub fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().trim_matches(|c| c == '*' || c == '•' || c == '-').trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

fn scan_common_skills(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '+' || c == '#'))
        .map(|w| w.trim_end_matches('.').to_lowercase())
        .collect();
    let lower = text.to_lowercase();
    COMMON_SKILLS
        .iter()
        .filter(|skill| {
            let skill = skill.to_lowercase();
            if skill.contains(' ') {
                lower.contains(&skill)
            } else {
                words.iter().any(|w| *w == skill)
            }
        })
        .map(|s| s.to_string())
        .collect()
}

pub struct ResumeParser {
    generator: Arc<dyn GenerationGateway>,
}

impl ResumeParser {
    pub fn new(generator: Arc<dyn GenerationGateway>) -> Self {
        Self { generator }
    }

    pub async fn parse(&self, resume_text: &str) -> Result<ParsedResume, CoreError> {
        let parsed: ParsedResume = call_json(
            self.generator.as_ref(),
            RESUME_PARSE_INSTRUCTIONS,
            &format!("Resume:\n{resume_text}"),
        )
        .await?;
        let parsed = parsed.normalize(resume_text);
        debug!("Parsed resume with {} skills", parsed.skills.len());
        Ok(parsed)
    }
}

pub async fn job_skills_from_description(
    generator: &dyn GenerationGateway,
    job_description: &str,
) -> Result<Vec<String>, CoreError> {
    let skills: Vec<String> = call_json(
        generator,
        JOB_SKILLS_INSTRUCTIONS,
        &format!("Job Description:\n{job_description}\n\nExtract all skills and return them as a JSON array."),
    )
    .await?;
    Ok(dedup_skills(skills))
}

pub async fn career_skills_from_model(
    generator: &dyn GenerationGateway,
    career: &str,
) -> Result<Vec<String>, CoreError> {
    let skills: Vec<String> =
        call_json(generator, CAREER_SKILLS_INSTRUCTIONS, &format!("Career: {career}")).await?;
    Ok(dedup_skills(skills))
}

/// Skills listed on a corpus chunk's `Required skills: a, b, c` line.
pub fn required_skills_line(text: &str) -> Option<Vec<String>> {
    let caps = REQUIRED_SKILLS_RE.captures(text)?;
    let skills = dedup_skills(
        caps[1]
            .trim_end_matches('.')
            .split(',')
            .map(str::to_string)
            .collect(),
    );
    (!skills.is_empty()).then_some(skills)
}

/// The gap list from the most recent assistant skill-gap reply.
///
/// `Some(vec![])` means a reply was found but it listed no gaps.
pub fn gap_skills_from_history(history: &[ChatTurn]) -> Option<Vec<String>> {
    history
        .iter()
        .rev()
        .filter(|turn| turn.role == Role::Assistant)
        .find_map(|turn| GAP_SECTION_RE.captures(&turn.content))
        .map(|caps| {
            let section = caps[1].trim();
            if section.to_lowercase().starts_with("none") {
                return Vec::new();
            }
            dedup_skills(section.split(',').map(str::to_string).collect())
                .into_iter()
                .filter(|s| s.chars().count() > 1)
                .collect()
        })
}
