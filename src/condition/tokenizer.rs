//! Condition string tokenizer
//!
//! Splits a data condition such as `A.grade > 8 and A.name in (marco, polo)` into
//! merged atoms, connectives and parentheses.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::condition::node::Connective;
use crate::error::{ConditionError, ParenIssue, Result};

/// Symbolic comparison operators, longest first
pub const COMPARISON_OPERATORS: [&str; 6] = [">=", "<=", "!=", ">", "<", "="];

/// Membership keywords as they appear in merged atoms
pub const IN_KEYWORD: &str = "in";
pub const NOT_IN_KEYWORD: &str = "not_in";

/// Splits symbolic operators away from their operands so they become standalone words
static OPERATOR_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(>=|<=|!=|>|<|=)\s*").expect("operator pattern is valid"));

/// A single unit of the condition token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Merged comparison (`A.x>=2`) or membership test (`A.x in (1,2)`)
    Atom(String),
    And,
    Or,
    Open,
    Close,
}

impl Token {
    /// Textual form of the token
    pub fn as_str(&self) -> &str {
        match self {
            Token::Atom(text) => text,
            Token::And => "and",
            Token::Or => "or",
            Token::Open => "(",
            Token::Close => ")",
        }
    }

    pub fn connective(&self) -> Option<Connective> {
        match self {
            Token::And => Some(Connective::And),
            Token::Or => Some(Connective::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokenize a condition string, merging comparisons and membership tests into atoms
pub fn tokenize(condition: &str) -> Result<Vec<Token>> {
    let words = normalize_tokens(condition);
    let mut tokens = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let word = words[i].as_str();
        match word {
            "and" => tokens.push(Token::And),
            "or" => tokens.push(Token::Or),
            "(" => tokens.push(Token::Open),
            ")" => tokens.push(Token::Close),
            IN_KEYWORD | NOT_IN_KEYWORD => {
                let (atom, next) = merge_membership(&words, i, &mut tokens)?;
                tokens.push(Token::Atom(atom));
                i = next;
                continue;
            }
            _ => tokens.push(Token::Atom(word.to_string())),
        }
        i += 1;
    }

    Ok(tokens)
}

/// Normalize a condition into whitespace-free words without merging membership lists
///
/// Parentheses become standalone words, `is`/`is not` are folded to `=`/`!=`,
/// symbolic comparisons are glued to their operands and `not in` becomes `not_in`.
/// Words inside a membership list are kept as written.
pub fn normalize_tokens(condition: &str) -> Vec<String> {
    let spaced = condition.replace('(', " ( ").replace(')', " ) ");
    let words: Vec<&str> = spaced.split_whitespace().collect();

    let mut out: Vec<String> = Vec::with_capacity(words.len());
    let mut start = 0;
    let mut i = 0;

    while i < words.len() {
        if words[i] == IN_KEYWORD && words.get(i + 1) == Some(&"(") {
            fold_comparisons(&words[start..i + 2], &mut out);

            let list_start = i + 2;
            let close = words[list_start..]
                .iter()
                .position(|w| *w == ")")
                .map_or(words.len(), |offset| list_start + offset);
            out.extend(words[list_start..close].iter().map(|w| w.to_string()));

            start = close;
            i = close;
            continue;
        }
        i += 1;
    }
    fold_comparisons(&words[start..], &mut out);

    out
}

/// Fold keywords and glue comparisons for one stretch of words outside membership lists
fn fold_comparisons(segment: &[&str], out: &mut Vec<String>) {
    let joined = segment.join(" ");
    let spaced = OPERATOR_SPACING.replace_all(&joined, " $1 ");
    let words: Vec<&str> = spaced.split_whitespace().collect();
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        let next = words.get(i + 1).copied();
        let operator = match word {
            "is" if next == Some("not") => {
                i += 1;
                Some("!=")
            }
            "is" => Some("="),
            "not" if next == Some(IN_KEYWORD) => {
                out.push(NOT_IN_KEYWORD.to_string());
                i += 2;
                continue;
            }
            w if COMPARISON_OPERATORS.contains(&w) => Some(w),
            _ => None,
        };
        i += 1;

        match operator {
            Some(op) => {
                let left = if out.last().map_or(false, |prev| is_operand(prev)) {
                    out.pop().unwrap_or_default()
                } else {
                    String::new()
                };
                let right = match words.get(i) {
                    Some(w) if is_operand(w) => {
                        i += 1;
                        *w
                    }
                    _ => "",
                };
                out.push(format!("{}{}{}", left, op, right));
            }
            None => out.push(word.to_string()),
        }
    }
}

fn is_operand(word: &str) -> bool {
    !matches!(word, "(" | ")" | "and" | "or" | IN_KEYWORD | NOT_IN_KEYWORD)
}

/// Merge `<attr> in ( v1, v2 )` into one atom; returns the atom and the index after `)`
fn merge_membership(words: &[String], at: usize, tokens: &mut Vec<Token>) -> Result<(String, usize)> {
    let keyword = words[at].as_str();

    let attribute = match tokens.pop() {
        Some(Token::Atom(attr)) => attr,
        _ => {
            return Err(ConditionError::MissingAttribute {
                keyword: keyword.to_string(),
                position: at,
            })
        }
    };

    match words.get(at + 1).map(String::as_str) {
        Some("(") => {}
        found => {
            return Err(ConditionError::MembershipSyntax {
                keyword: keyword.to_string(),
                position: at,
                found: found.unwrap_or("end of input").to_string(),
            })
        }
    }

    let list_start = at + 2;
    let close = words[list_start..]
        .iter()
        .position(|w| w == ")")
        .map(|offset| list_start + offset)
        .ok_or(ConditionError::UnbalancedParentheses {
            position: at + 1,
            kind: ParenIssue::UnclosedOpen,
        })?;

    let items = compact_list(&words[list_start..close]);
    Ok((format!("{} {} ({})", attribute, keyword, items), close + 1))
}

/// Join list words and drop the spacing around commas: `["2,", "3,", "x"]` -> `2,3,x`
fn compact_list(words: &[String]) -> String {
    words
        .join(" ")
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
}
