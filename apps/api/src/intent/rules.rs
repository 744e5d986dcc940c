//! The routing table: `(predicate, category)` pairs evaluated top to bottom.
//!
//! Precedence is the table order, and the table is grouped by category in the
//! fixed priority order resume > job_fit > skill_gap > recommend > goal_set >
//! goal_list > qa > fallback. Within a category, stronger evidence comes first
//! so the reported confidence reflects the rule that fired.

use std::sync::LazyLock;

use regex::Regex;

use super::IntentCategory;

/// Long pastes are classified by structure before any command phrase is
/// considered.
const RESUME_MIN_CHARS: usize = 200;
const JOB_DESCRIPTION_MIN_CHARS: usize = 100;
/// A history turn must be at least this long to count as a pasted job post.
const HISTORY_JOB_DESCRIPTION_MIN_CHARS: usize = 150;

const RESUME_MARKERS: &[&str] = &[
    "objective",
    "summary",
    "work history",
    "professional summary",
    "career objective",
    "professional experience",
    "work experience",
    "education",
    "academic background",
    "projects",
    "achievements",
    "certifications",
];

const JOB_DESCRIPTION_MARKERS: &[&str] = &[
    "job description",
    "job posting",
    "we are looking for",
    "we are seeking",
    "apply now",
    "about the role",
    "about this position",
    "position summary",
    "required qualifications",
    "required skills",
    "skills required",
    "must have",
    "nice to have",
    "key responsibilities",
    "primary responsibilities",
    "responsibilities",
    "what you'll do",
    "what you will do",
    "role overview",
    "company overview",
    "location:",
    "salary range",
    "benefits package",
    "employment type",
    "years of experience required",
    "experience level",
];

const QA_KEYWORDS: &[&str] = &[
    "job outlook",
    "salary",
    "day to day",
    "what is",
    "tell me about",
    "career in",
    "become",
    "how to",
    "outlook for",
    "future of",
];

const QA_OPENERS: &[&str] = &["what", "how", "why", "when", "where", "tell me", "explain"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid regex"))
        .collect()
}

static RESUME_COMMAND_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:parse|analy[sz]e|upload|read|process|review)\s+(?:my|the|this)\s+(?:resume|cv|curriculum vitae)\b",
        r"\b(?:here|this)\s+is\s+my\s+(?:resume|cv)\b",
        r"\b(?:resume|cv)\s+(?:below|attached|here)\b",
        r"\bmy\s+(?:resume|cv)\s+(?:is\s+below|is\s+attached|below|attached)\b",
    ])
});

static JOB_FIT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:do|would|will)\s+i\s+fit\s+(?:this|for|the|in)\b",
        r"\b(?:job|role|position)\s+(?:fit|match)\b",
        r"\b(?:analy[sz]e|check|assess)\s+(?:this|my fit for|my match for)\s+(?:job|role|position)\b",
        r"\b(?:fit|match)\s+score\b",
    ])
});

static SKILL_GAP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:what|which)\s+skills?\s+(?:do|would|should)\s+i\s+need\b",
        r"\b(?:analy[sz]e|check|compare)\s+my\s+skills?\s+(?:for|against|with)\b",
        r"\bskills?\s+gaps?\b",
        r"\b(?:what|which)\s+(?:am|do)\s+i\s+(?:missing|lacking|lack)\b",
        r"\b(?:what|which)\s+(?:skills?\s+)?(?:is|are)\s+(?:missing|lacking)\s+(?:in|from)\s+(?:my\s+|the\s+)?(?:resume|cv|profile)\b",
        r"\bskills?\s+(?:are\s+)?missing\s+(?:from|in|for)\b",
        r"\b(?:what|which)\s+(?:is|are)\s+(?:missing|needed|required)\s+(?:for|to apply for)\b",
        r"\bmissing\s+(?:from|in)\s+(?:my\s+|the\s+)?(?:resume|cv)\b",
    ])
});

static GAP_FOLLOW_UP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:missing|lacking|gaps?)\b").expect("invalid regex"));

static RECOMMEND_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:what|which)\s+(?:careers?|career paths?|jobs?|roles?)\s+(?:are|would be|should i|suit|fit)\b",
        r"\b(?:what|which)\s+(?:should|can)\s+i\s+(?:do|become|pursue)\b",
        r"\b(?:career|job)\s+(?:recommendations?|suggestions?|advice)\b",
        r"\b(?:based on|according to)\s+my\s+(?:profile|skills|experience|resume)\b",
        r"\b(?:recommend|suggest)\s+(?:some\s+|a\s+)?(?:careers?|career paths?|jobs?|roles?)\b",
    ])
});

static GOAL_SET_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:set|create|add|make)\s+(?:a\s+|me\s+a\s+|my\s+|up\s+|new\s+)?goals?\b",
        r"\b(?:add|put)\s+.*?\s+(?:to|as|into|in)\s+(?:my\s+)?goals?\b",
        r"\b(?:help me|i want to|i need to)\s+(?:learn|master|improve|develop)\b",
        r"\bgoal\s+(?:to|of)\b",
    ])
});

static GOAL_LIST_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:show|list|tell me|what are|view|see|track)\s+(?:me\s+)?(?:my\s+|the\s+|all\s+)?goals?\b",
        r"^(?:my|all(?:\s+my)?)\s+(?:current\s+|active\s+)?goals?\s*[?.!]*$",
    ])
});

static GOAL_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgoals?\b").expect("invalid regex"));
static GOAL_VERB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:add|set|create|put)\b").expect("invalid regex"));

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

fn count_markers(lower: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| lower.contains(*m)).count()
}

/// A one-line message phrased as a question, however many posting words it
/// mentions.
fn is_single_line_question(lower: &str) -> bool {
    !lower.contains('\n')
        && (lower.ends_with('?') || QA_OPENERS.iter().any(|o| lower.starts_with(o)))
}

/// Whether `text` reads like a pasted job posting.
pub fn looks_like_job_description(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.chars().count() > HISTORY_JOB_DESCRIPTION_MIN_CHARS
        && count_markers(&lower, JOB_DESCRIPTION_MARKERS) > 0
        && !is_single_line_question(&lower)
}

/// Everything a predicate may look at, computed once per message.
pub(crate) struct Signals {
    pub lower: String,
    pub chars: usize,
    pub has_attachment: bool,
    pub resume_markers: usize,
    pub job_description_markers: usize,
    pub history_has_job_description: bool,
}

impl Signals {
    pub fn new(text: &str, has_attachment: bool, history_has_job_description: bool) -> Self {
        let lower = text.trim().to_lowercase();
        Self {
            chars: lower.chars().count(),
            resume_markers: count_markers(&lower, RESUME_MARKERS),
            job_description_markers: count_markers(&lower, JOB_DESCRIPTION_MARKERS),
            lower,
            has_attachment,
            history_has_job_description,
        }
    }

    /// "add X to my goals", "set a goal ..." and the like. Verbs count only as
    /// whole words, so "datasets" or "computer" do not qualify.
    fn is_goal_command(&self) -> bool {
        GOAL_WORD_RE.is_match(&self.lower) && GOAL_VERB_RE.is_match(&self.lower)
    }

    /// Posting structure: several posting markers, or one spread over
    /// multiple lines. Never a one-line question.
    fn is_structured_job_description(&self) -> bool {
        let structured = self.job_description_markers >= 2
            || (self.job_description_markers == 1 && self.lower.contains('\n'));
        self.chars > JOB_DESCRIPTION_MIN_CHARS && structured && !is_single_line_question(&self.lower)
    }
}

pub(crate) struct Rule {
    pub name: &'static str,
    pub category: IntentCategory,
    pub confidence: Option<f32>,
    pub matches: fn(&Signals) -> bool,
}

pub(crate) static RULES: &[Rule] = &[
    Rule {
        name: "attachment",
        category: IntentCategory::Resume,
        confidence: Some(0.95),
        matches: |s| s.has_attachment,
    },
    Rule {
        name: "resume_command",
        category: IntentCategory::Resume,
        confidence: Some(0.9),
        matches: |s| any_match(&RESUME_COMMAND_RES, &s.lower),
    },
    Rule {
        name: "resume_structure",
        category: IntentCategory::Resume,
        confidence: Some(0.75),
        matches: |s| {
            s.chars > RESUME_MIN_CHARS
                && s.resume_markers > 0
                && s.resume_markers > s.job_description_markers
        },
    },
    Rule {
        name: "job_fit_command",
        category: IntentCategory::JobFit,
        confidence: Some(0.9),
        matches: |s| any_match(&JOB_FIT_RES, &s.lower),
    },
    Rule {
        name: "job_description_structure",
        category: IntentCategory::JobFit,
        confidence: Some(0.75),
        matches: |s| s.is_structured_job_description(),
    },
    Rule {
        name: "skill_gap_question",
        category: IntentCategory::SkillGap,
        confidence: Some(0.85),
        matches: |s| !s.is_goal_command() && any_match(&SKILL_GAP_RES, &s.lower),
    },
    Rule {
        name: "skill_gap_follow_up",
        category: IntentCategory::SkillGap,
        confidence: Some(0.6),
        matches: |s| {
            s.history_has_job_description
                && !s.is_goal_command()
                && s.chars <= HISTORY_JOB_DESCRIPTION_MIN_CHARS
                && GAP_FOLLOW_UP_RE.is_match(&s.lower)
        },
    },
    Rule {
        name: "recommend_request",
        category: IntentCategory::Recommend,
        confidence: Some(0.85),
        matches: |s| !s.is_goal_command() && any_match(&RECOMMEND_RES, &s.lower),
    },
    Rule {
        name: "goal_set_command",
        category: IntentCategory::GoalSet,
        confidence: Some(0.85),
        matches: |s| any_match(&GOAL_SET_RES, &s.lower),
    },
    Rule {
        name: "goal_list_request",
        category: IntentCategory::GoalList,
        confidence: Some(0.85),
        matches: |s| any_match(&GOAL_LIST_RES, &s.lower),
    },
    Rule {
        name: "career_question",
        category: IntentCategory::Qa,
        confidence: Some(0.6),
        matches: |s| {
            QA_KEYWORDS.iter().any(|k| s.lower.contains(k))
                || s.lower.ends_with('?')
                || QA_OPENERS.iter().any(|o| s.lower.starts_with(o))
        },
    },
    Rule {
        name: "fallback",
        category: IntentCategory::Fallback,
        confidence: None,
        matches: |_| true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_respects_category_priority() {
        assert!(RULES
            .windows(2)
            .all(|w| w[0].category.priority() <= w[1].category.priority()));
    }

    #[test]
    fn test_table_ends_with_catch_all() {
        let last = RULES.last().unwrap();
        assert_eq!(last.category, IntentCategory::Fallback);
        assert!((last.matches)(&Signals::new("", false, false)));
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_marker_counts() {
        let s = Signals::new(
            "Professional Summary ... Work Experience ... Education ... Projects",
            false,
            false,
        );
        assert_eq!(s.resume_markers, 5);
        assert_eq!(s.job_description_markers, 0);
    }

    #[test]
    fn test_generic_seniority_words_are_not_job_markers() {
        let s = Signals::new("Senior full-time junior mid-level", false, false);
        assert_eq!(s.job_description_markers, 0);
    }

    #[test]
    fn test_goal_verbs_match_whole_words_only() {
        let s = Signals::new("my goal is to work with datasets on a computer", false, false);
        assert!(!s.is_goal_command());
        let s = Signals::new("put python in my goals", false, false);
        assert!(s.is_goal_command());
    }

    #[test]
    fn test_one_line_question_is_not_a_posting() {
        let question = "What are the typical responsibilities and salary range of a data engineer \
                        working at a large fintech company in Bangalore?";
        let s = Signals::new(question, false, false);
        assert_eq!(s.job_description_markers, 2);
        assert!(!s.is_structured_job_description());
        assert!(!looks_like_job_description(&format!("{question} {question}")));
    }

    #[test]
    fn test_single_marker_needs_line_structure() {
        let one_line = format!("About the role: {}", "build services. ".repeat(8));
        assert!(!Signals::new(&one_line, false, false).is_structured_job_description());
        let multi_line = format!("About the role:\n{}", "build services. ".repeat(8));
        assert!(Signals::new(&multi_line, false, false).is_structured_job_description());
    }

    #[test]
    fn test_looks_like_job_description() {
        let jd = format!("About the role: {}", "build services. ".repeat(12));
        assert!(looks_like_job_description(&jd));
        assert!(!looks_like_job_description("About the role: short"));
    }
}
