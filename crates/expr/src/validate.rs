//! Pre-parse safety pass and surface normalization.
//!
//! The blocklist is defense-in-depth: expressions are only ever interpreted
//! by the AST evaluator in this crate, never handed to a host-language
//! interpreter. The patterns mirror the classic dangerous-construct list so
//! hostile text is refused loudly before parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExpressionError;

static DANGEROUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b__\w+__\b",    // dunders like __import__, __class__
        r"\bexec\s*\(",
        r"\beval\s*\(",
        r"\bcompile\s*\(",
        r"\bopen\s*\(",
        r"\bimport\s",
        r"\bos\.\w+",
        r"\bsys\.\w+",
        r"\bsubprocess",
        r"\bglobals\s*\(",
        r"\blocals\s*\(",
        r"\bgetattr\s*\(",
        r"\bsetattr\s*\(",
        r"\bdelattr\s*\(",
        r"\b__builtins__",
        r"\blambda\s",
    ]
    .iter()
    .map(|p| {
        Regex::new(&format!("(?i){p}")).unwrap_or_else(|e| panic!("bad blocklist pattern {p}: {e}"))
    })
    .collect()
});

/// Reject empty expressions and anything matching the blocklist.
pub fn validate(expression: &str) -> Result<(), ExpressionError> {
    if expression.trim().is_empty() {
        return Err(ExpressionError::Empty);
    }
    for pattern in DANGEROUS_PATTERNS.iter() {
        if pattern.is_match(expression) {
            let shown = pattern.as_str().trim_start_matches("(?i)");
            return Err(ExpressionError::Forbidden(shown.to_string()));
        }
    }
    Ok(())
}

/// Text-level rewrites applied once before parsing: C-style logical
/// operators become keywords and whitespace is collapsed.
pub fn normalize(expression: &str) -> String {
    let expr = expression.replace("&&", " and ").replace("||", " or ");

    // `!` becomes `not`, except in `!=`.
    let mut rewritten = String::with_capacity(expr.len());
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '!' && chars.peek() != Some(&'=') {
            rewritten.push_str(" not ");
        } else {
            rewritten.push(c);
        }
    }

    rewritten.split_whitespace().collect::<Vec<_>>().join(" ")
}
