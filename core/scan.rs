//! Pattern-based scanning of the questionnaire source text.
//!
//! The source is a TypeScript file holding module and question object
//! literals. Nothing here parses TypeScript; module literals are located by a
//! fixed field-order pattern and question literals by their hyphenated
//! upper-case `id`, then bounded by brace depth.

use crate::model::{ModuleGroup, ModulePosition};
use log;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MODULE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bid:\s*'([^']+)',\s*code:\s*'([^']+)',\s*name:\s*'((?:[^'\\]|\\.)*)',\s*description:\s*'(?:[^'\\]|\\.)*',\s*group:\s*'([^']+)'",
    )
    .expect("module pattern is valid")
});

static QUESTION_START_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bid:\s*'([A-Z0-9]+(?:-[A-Z0-9]+)+)'").expect("question pattern is valid"));

static ID_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bid:\s*'([^']+)'").expect("id pattern is valid"));
static TEXT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\btext:\s*'((?:[^'\\]|\\.)*)'").expect("text pattern is valid")
});
static HELP_TEXT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bhelpText:\s*'((?:[^'\\]|\\.)*)'").expect("helpText pattern is valid")
});
static REVIEW_MODE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\breviewMode:\s*'([^']+)'").expect("reviewMode pattern is valid"));
static IMPACT_LEVEL_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimpactLevel:\s*'([^']+)'").expect("impactLevel pattern is valid"));

/// How the end of a question literal is located inside its search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BraceMatching {
    /// Every `{` and `}` counts, including those inside string literals.
    Naive,
    /// Braces inside quoted strings and comments are ignored.
    #[default]
    QuoteAware,
}

/// Finds every module literal, in source order.
pub fn scan_modules(source: &str) -> Vec<ModulePosition> {
    let modules: Vec<ModulePosition> = MODULE_PATTERN
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ModulePosition {
                id: caps[1].to_string(),
                code: caps[2].to_string(),
                name: clean_text(&caps[3]),
                group: ModuleGroup::from_source_key(&caps[4]),
                position: whole.start(),
            })
        })
        .collect();
    log::debug!("Found {} module literals.", modules.len());
    modules
}

/// Offsets and ids of every `id: 'XX-NN'` occurrence, in source order.
pub fn scan_question_starts(source: &str) -> Vec<(usize, String)> {
    let starts: Vec<(usize, String)> = QUESTION_START_PATTERN
        .captures_iter(source)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps[1].to_string())))
        .collect();
    log::debug!("Found {} question candidates.", starts.len());
    starts
}

/// Returns the body of the object literal that `offset` points into.
///
/// At most `window_size` characters are examined. When the literal does not
/// close inside the window the whole window is returned.
pub fn block_at(source: &str, offset: usize, window_size: usize, mode: BraceMatching) -> &str {
    let tail = source.get(offset..).unwrap_or_default();
    let window_end = tail
        .char_indices()
        .nth(window_size)
        .map_or(tail.len(), |(idx, _)| idx);
    let window = &tail[..window_end];
    match closing_brace(window, mode) {
        Some(end) => &window[..end],
        None => {
            log::trace!(
                "No closing brace within {} characters of offset {}.",
                window_size,
                offset
            );
            window
        }
    }
}

#[derive(Clone, Copy)]
enum Lexeme {
    Code,
    Str { quote: char, escaped: bool },
    LineComment,
    BlockComment,
}

// Depth starts at 1: the window begins inside the literal.
fn closing_brace(window: &str, mode: BraceMatching) -> Option<usize> {
    let mut depth = 1usize;
    let mut state = Lexeme::Code;
    let mut chars = window.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match state {
            Lexeme::Str { quote, escaped } => {
                state = if escaped {
                    Lexeme::Str {
                        quote,
                        escaped: false,
                    }
                } else if c == '\\' {
                    Lexeme::Str {
                        quote,
                        escaped: true,
                    }
                } else if c == quote {
                    Lexeme::Code
                } else {
                    continue;
                };
            }
            Lexeme::LineComment => {
                if c == '\n' {
                    state = Lexeme::Code;
                }
            }
            Lexeme::BlockComment => {
                if c == '*' && chars.next_if(|&(_, next)| next == '/').is_some() {
                    state = Lexeme::Code;
                }
            }
            Lexeme::Code => match c {
                '\'' | '"' | '`' if mode == BraceMatching::QuoteAware => {
                    state = Lexeme::Str {
                        quote: c,
                        escaped: false,
                    };
                }
                '/' if mode == BraceMatching::QuoteAware => match chars.peek() {
                    Some(&(_, '/')) => state = Lexeme::LineComment,
                    Some(&(_, '*')) => {
                        chars.next();
                        state = Lexeme::BlockComment;
                    }
                    _ => {}
                },
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Field values captured from one question literal, still escaped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawQuestion<'a> {
    pub id: Option<&'a str>,
    pub text: Option<&'a str>,
    pub help_text: Option<&'a str>,
    pub review_mode: Option<&'a str>,
    pub impact_level: Option<&'a str>,
}

impl<'a> RawQuestion<'a> {
    pub fn capture(block: &'a str) -> Self {
        let field = |pattern: &Regex| {
            pattern
                .captures(block)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        };
        Self {
            id: field(&ID_FIELD),
            text: field(&TEXT_FIELD),
            help_text: field(&HELP_TEXT_FIELD),
            review_mode: field(&REVIEW_MODE_FIELD),
            impact_level: field(&IMPACT_LEVEL_FIELD),
        }
    }

    /// Names of required fields that were not found. `helpText` is optional.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("id", self.id.is_none()),
            ("text", self.text.is_none()),
            ("reviewMode", self.review_mode.is_none()),
            ("impactLevel", self.impact_level.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Unescapes `\'` and turns every literal `\n` into a single space.
pub fn clean_text(raw: &str) -> String {
    raw.replace("\\'", "'").replace("\\n", " ")
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// 1-based line number of a byte offset.
pub fn line_of(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .map_or(0, |prefix| prefix.matches('\n').count())
        + 1
}
