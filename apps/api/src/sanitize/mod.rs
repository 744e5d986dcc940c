//! Output sanitizer: deterministic cleanup of generated text.
//!
//! Generation prompts forbid markup, yet models still emit `<br>`, `<small>`
//! source footers and entity escapes. [`sanitize`] strips them with an ordered
//! pipeline of small stages:
//!
//! 1. [`strip_source_blocks`]: "Sources" footers, removed whole, nesting included
//! 2. [`breaks_to_newlines`]: `<br>`, `<br/>`, `<br />` → `\n`
//! 3. [`strip_tags`]: every remaining `<...>` tag
//! 4. [`decode_entities`]: `&amp;`, `&#39;`, `&#x27;`, ...
//! 5. [`collapse_blank_lines`]: three or more line breaks → two
//! 6. [`strip_tag_fragments`]: unterminated tags and undecodable entities
//!
//! Step 1 must precede step 3: a generic tag strip would leave the footer's
//! inner text ("Sources: ...") behind as prose.
//!
//! Every stage only ever deletes or shortens text, so re-running the pipeline
//! until nothing changes terminates; that fixed point makes [`sanitize`]
//! idempotent even when entity decoding reveals new markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SOURCE_BLOCK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<br\s*/?>\s*<br\s*/?>\s*<small[^>]*>[^<]*?\bsources?\b.*?</small>",
        r"(?is)<small[^>]*>[^<]*?\bsources?\b.*?</small>",
        r"(?is)<[a-z][a-z0-9]*[^>]*>[^<]*?\bsources?\s*:.*?</[a-z][a-z0-9]*\s*>",
        r"(?i)📚\s*sources?[:\s]*[^<\n]*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid regex"))
    .collect()
});
static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("invalid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("invalid regex")
});
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("invalid regex"));
static TAG_FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</[^<>\n]*>?|<[A-Za-z!][^<>\n]*>?").expect("invalid regex"));
static NAMED_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[A-Za-z][A-Za-z0-9]*;").expect("invalid regex"));

/// Produces markup-free text. Pure and idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = run_stages(text);
    loop {
        let next = run_stages(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn run_stages(text: &str) -> String {
    let text = strip_source_blocks(text);
    let text = breaks_to_newlines(&text);
    let text = strip_tags(&text);
    let text = decode_entities(&text);
    let text = collapse_blank_lines(&text);
    let text = strip_tag_fragments(&text);
    text.trim().to_string()
}

pub fn strip_source_blocks(text: &str) -> String {
    SOURCE_BLOCK_RES
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

pub fn breaks_to_newlines(text: &str) -> String {
    BREAK_RE.replace_all(text, "\n").into_owned()
}

pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Decodes named and numeric character references. Unknown names are left
/// untouched for [`strip_tag_fragments`].
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(|c| c.to_string());
    }
    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "bull" => "•",
        "middot" => "·",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "rarr" => "→",
        "larr" => "←",
        "times" => "×",
        "deg" => "°",
        "euro" => "€",
        "pound" => "£",
        _ => return None,
    };
    Some(decoded.to_string())
}

pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}

/// Removes what the earlier passes cannot: a tag opener that never closes
/// (`<div class="x` up to end of line), tags revealed by entity decoding, and
/// named entities nobody could decode. A lone `<` that does not start a tag,
/// as in `x < 5`, is left alone.
pub fn strip_tag_fragments(text: &str) -> String {
    let text = TAG_FRAGMENT_RE.replace_all(text, "");
    NAMED_ENTITY_RE.replace_all(&text, "").into_owned()
}
