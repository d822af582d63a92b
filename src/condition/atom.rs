//! Decoding of merged atoms into attribute, operator and value

use serde::Serialize;
use std::fmt;

use crate::condition::node::ConditionNode;
use crate::condition::tokenizer::{COMPARISON_OPERATORS, IN_KEYWORD, NOT_IN_KEYWORD};
use crate::error::{ConditionError, Result};

/// Decoded comparison or membership test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    pub attribute: AttributeRef,
    pub operator: Operator,
    pub value: ConditionValue,
}

/// Dotted attribute reference such as `A.grade`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeRef {
    /// Prefix before the first dot (`A` for activation, `T` for target)
    pub scope: Option<String>,
    pub name: String,
}

/// Comparison and membership operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Equal (=, is)
    Equal,
    /// Not equal (!=, is not)
    NotEqual,
    /// Member of list (in)
    In,
    /// Not a member of list (not in)
    NotIn,
}

/// Literal on the right-hand side of an atom
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    List(Vec<ConditionValue>),
}

impl AttributeRef {
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((scope, name)) => Self {
                scope: Some(scope.to_string()),
                name: name.to_string(),
            },
            None => Self {
                scope: None,
                name: text.to_string(),
            },
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}.{}", scope, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterEqual),
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessEqual),
            "=" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            IN_KEYWORD => Some(Operator::In),
            NOT_IN_KEYWORD => Some(Operator::NotIn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::In => IN_KEYWORD,
            Operator::NotIn => NOT_IN_KEYWORD,
        }
    }

    pub fn is_membership(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Atom {
    /// Decode a merged atom such as `A.x>=2` or `A.x not_in (a,b)`
    pub fn parse(text: &str) -> Result<Self> {
        if let Some(atom) = parse_membership(text)? {
            return Ok(atom);
        }
        parse_comparison(text)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_membership() {
            write!(f, "{} {} ({})", self.attribute, self.operator, self.value)
        } else {
            write!(f, "{}{}{}", self.attribute, self.operator, self.value)
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Integer(i) => write!(f, "{}", i),
            ConditionValue::Float(x) => write!(f, "{}", x),
            ConditionValue::Boolean(b) => write!(f, "{}", b),
            ConditionValue::String(s) => f.write_str(s),
            ConditionValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl ConditionNode {
    /// Decode every leaf atom, left to right
    pub fn parse_atoms(&self) -> Result<Vec<Atom>> {
        self.atoms().map(Atom::parse).collect()
    }
}

fn parse_membership(text: &str) -> Result<Option<Atom>> {
    for (keyword, operator) in [(NOT_IN_KEYWORD, Operator::NotIn), (IN_KEYWORD, Operator::In)] {
        let separator = format!(" {} ", keyword);
        let Some((attribute, list)) = text.split_once(separator.as_str()) else {
            continue;
        };

        let inner = list
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| {
                ConditionError::InvalidAtom(format!("membership list must be parenthesised: {}", text))
            })?;

        let items = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(parse_scalar).collect()
        };

        return Ok(Some(Atom {
            attribute: parse_attribute(attribute, text)?,
            operator,
            value: ConditionValue::List(items),
        }));
    }

    Ok(None)
}

fn parse_comparison(text: &str) -> Result<Atom> {
    let pos = text
        .find(|c| matches!(c, '>' | '<' | '=' | '!'))
        .ok_or_else(|| ConditionError::InvalidAtom(format!("No operator found in: {}", text)))?;

    let symbol = COMPARISON_OPERATORS
        .iter()
        .find(|op| text[pos..].starts_with(*op))
        .ok_or_else(|| ConditionError::InvalidAtom(format!("Unknown operator in: {}", text)))?;

    let operator = Operator::from_symbol(symbol)
        .ok_or_else(|| ConditionError::InvalidAtom(format!("Unknown operator in: {}", text)))?;

    let value = text[pos + symbol.len()..].trim();
    if value.is_empty() {
        return Err(ConditionError::InvalidAtom(format!("Missing value in: {}", text)));
    }

    Ok(Atom {
        attribute: parse_attribute(&text[..pos], text)?,
        operator,
        value: parse_scalar(value),
    })
}

fn parse_attribute(attribute: &str, text: &str) -> Result<AttributeRef> {
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(ConditionError::InvalidAtom(format!(
            "Missing attribute in: {}",
            text
        )));
    }
    Ok(AttributeRef::parse(attribute))
}

fn parse_scalar(value: &str) -> ConditionValue {
    let value = value.trim();

    if let Ok(i) = value.parse::<i64>() {
        return ConditionValue::Integer(i);
    }

    // `nan` and `inf` stay strings
    if value.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(x) = value.parse::<f64>() {
            return ConditionValue::Float(x);
        }
    }

    if value.eq_ignore_ascii_case("true") {
        return ConditionValue::Boolean(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return ConditionValue::Boolean(false);
    }

    ConditionValue::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parse_to_logic_tree;

    #[test]
    fn test_parse_all_comparisons() {
        let operators = [
            ("A.grade>8", Operator::Greater),
            ("A.grade>=8", Operator::GreaterEqual),
            ("A.grade<8", Operator::Less),
            ("A.grade<=8", Operator::LessEqual),
            ("A.grade=8", Operator::Equal),
            ("A.grade!=8", Operator::NotEqual),
        ];

        for (text, expected) in operators {
            let atom = Atom::parse(text).unwrap();
            assert_eq!(atom.operator, expected, "Failed for: {}", text);
            assert_eq!(atom.attribute.scope.as_deref(), Some("A"));
            assert_eq!(atom.attribute.name, "grade");
            assert_eq!(atom.value, ConditionValue::Integer(8));
            assert_eq!(atom.to_string(), text);
        }
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Atom::parse("A.x=2.5").unwrap().value, ConditionValue::Float(2.5));
        assert_eq!(Atom::parse("A.x=-3").unwrap().value, ConditionValue::Integer(-3));
        assert_eq!(Atom::parse("A.x=True").unwrap().value, ConditionValue::Boolean(true));
        assert_eq!(
            Atom::parse("A.x=nan").unwrap().value,
            ConditionValue::String("nan".to_string())
        );
        assert_eq!(
            Atom::parse("T.org:group=A").unwrap(),
            Atom {
                attribute: AttributeRef {
                    scope: Some("T".to_string()),
                    name: "org:group".to_string(),
                },
                operator: Operator::Equal,
                value: ConditionValue::String("A".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_membership() {
        let atom = Atom::parse("A.name in (marco,polo,3)").unwrap();
        assert_eq!(atom.operator, Operator::In);
        assert_eq!(atom.attribute.to_string(), "A.name");
        assert_eq!(
            atom.value,
            ConditionValue::List(vec![
                ConditionValue::String("marco".to_string()),
                ConditionValue::String("polo".to_string()),
                ConditionValue::Integer(3),
            ])
        );
        assert_eq!(atom.to_string(), "A.name in (marco,polo,3)");

        let atom = Atom::parse("A.name not_in (x)").unwrap();
        assert_eq!(atom.operator, Operator::NotIn);
        assert_eq!(atom.value, ConditionValue::List(vec![ConditionValue::String("x".to_string())]));

        let atom = Atom::parse("A.name in ()").unwrap();
        assert_eq!(atom.value, ConditionValue::List(Vec::new()));
    }

    #[test]
    fn test_invalid_atoms() {
        for text in ["grade", "A.x!", "=5", "A.x=", "A.x in 1,2"] {
            assert!(
                matches!(Atom::parse(text), Err(ConditionError::InvalidAtom(_))),
                "Failed for: {}",
                text
            );
        }
    }

    #[test]
    fn test_parse_atoms_of_tree() {
        let tree =
            parse_to_logic_tree("A.grade > 8 and (A.point >= 5 and A.name in (marco, polo, franco))")
                .unwrap();
        let atoms = tree.parse_atoms().unwrap();
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0].operator, Operator::Greater);
        assert_eq!(atoms[1].attribute.name, "point");
        assert_eq!(atoms[2].operator, Operator::In);
    }
}
