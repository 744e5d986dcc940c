//! BUILD_CONTEXT: turns ranked hits into source-tagged, budget-bounded snippets.

use crate::knowledge::RetrievedChunk;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetedContext {
    /// Prompt-ready snippets, same order as `kept`.
    pub snippets: Vec<String>,
    /// The hits that made it into the prompt.
    pub kept: Vec<RetrievedChunk>,
}

impl BudgetedContext {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.snippets.iter().map(|s| s.chars().count()).sum()
    }
}

pub fn format_snippet(chunk: &RetrievedChunk) -> String {
    format!("Career: {}\n{}", chunk.title, chunk.text.trim())
}

/// Keeps the best hits whose snippets fit within `char_budget` characters.
///
/// `hits` must be sorted by descending similarity, so dropping from the tail
/// drops the lowest-similarity snippets first. When the best snippet alone is
/// over budget it is truncated (on a char boundary) rather than dropped.
pub fn fit_to_budget(hits: &[RetrievedChunk], char_budget: usize) -> BudgetedContext {
    let mut kept: Vec<RetrievedChunk> = hits.to_vec();
    let mut snippets: Vec<String> = kept.iter().map(format_snippet).collect();
    let mut total: usize = snippets.iter().map(|s| s.chars().count()).sum();

    while total > char_budget && snippets.len() > 1 {
        if let Some(dropped) = snippets.pop() {
            total -= dropped.chars().count();
            kept.pop();
        }
    }

    if total > char_budget {
        if let Some(only) = snippets.first_mut() {
            *only = only.chars().take(char_budget).collect();
        }
    }

    if snippets.first().is_some_and(|s| s.trim().is_empty()) {
        return BudgetedContext::default();
    }
    BudgetedContext { snippets, kept }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, text: &str, similarity: f32) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: id.into(),
            title: id.to_uppercase(),
            text: text.into(),
            similarity,
        }
    }

    #[test]
    fn test_snippet_is_tagged_with_title() {
        let snippet = format_snippet(&hit("ds", "  Analyzes data.  ", 0.9));
        assert_eq!(snippet, "Career: DS\nAnalyzes data.");
    }

    #[test]
    fn test_everything_fits() {
        let hits = vec![hit("a", "one", 0.9), hit("b", "two", 0.5)];
        let ctx = fit_to_budget(&hits, 1000);
        assert_eq!(ctx.snippets.len(), 2);
        assert_eq!(ctx.kept, hits);
    }

    #[test]
    fn test_lowest_similarity_dropped_first() {
        let hits = vec![
            hit("a", &"x".repeat(40), 0.9),
            hit("b", &"y".repeat(40), 0.7),
            hit("c", &"z".repeat(40), 0.5),
        ];
        // each snippet is "Career: A\n" (10 chars) + 40
        let ctx = fit_to_budget(&hits, 110);
        let ids: Vec<&str> = ctx.kept.iter().map(|h| h.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(ctx.char_len() <= 110);
    }

    #[test]
    fn test_single_oversized_snippet_truncated_on_char_boundary() {
        let hits = vec![hit("a", &"é".repeat(100), 0.9)];
        let ctx = fit_to_budget(&hits, 20);
        assert_eq!(ctx.snippets.len(), 1);
        assert_eq!(ctx.char_len(), 20);
        assert!(ctx.snippets[0].starts_with("Career: A\n"));
    }

    #[test]
    fn test_zero_budget_yields_empty_context() {
        let ctx = fit_to_budget(&[hit("a", "text", 0.9)], 0);
        assert!(ctx.is_empty());
        assert!(ctx.kept.is_empty());
    }

    #[test]
    fn test_no_hits() {
        assert!(fit_to_budget(&[], 100).is_empty());
    }
}
