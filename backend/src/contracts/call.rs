//! # Call Descriptions
//!
//! A [`CallDescription`] names one contract method and carries its
//! arguments in declaration order. Handlers build one per request from
//! the parsed body; the pipeline consumes it and drops it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One positional argument of a contract call.
///
/// Request bodies arrive as loosely typed JSON, so an argument keeps the
/// JSON shape it came in with. It is only coerced to a Solidity value
/// when encoded against the method's declared parameter type.
///
/// ## Example JSON
///
/// ```json
/// ["0xabc...", "100", 3, true, [1, 2, 3, false]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallArg {
    /// `true` / `false`.
    Bool(bool),

    /// A JSON integer. Amounts beyond `i64` must be sent as strings.
    Integer(i64),

    /// Address, decimal amount, or free text.
    Text(String),

    /// Components of a tuple or elements of an array parameter.
    List(Vec<CallArg>),
}

impl CallArg {
    /// Whether the argument counts as absent for a required field.
    ///
    /// The empty string, the integer zero and `false` are treated like a
    /// missing field, which matches how the API has always screened
    /// request bodies. Whitespace and empty lists count as present.
    ///
    /// Fields where `false` is meaningful (`isCall`) are checked for
    /// presence only and never go through this.
    pub fn is_blank(&self) -> bool {
        match self {
            CallArg::Bool(value) => !*value,
            CallArg::Integer(value) => *value == 0,
            CallArg::Text(text) => text.is_empty(),
            CallArg::List(_) => false,
        }
    }
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Bool(value) => write!(f, "{}", value),
            CallArg::Integer(value) => write!(f, "{}", value),
            CallArg::Text(value) => f.write_str(value),
            CallArg::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for CallArg {
    fn from(value: bool) -> Self {
        CallArg::Bool(value)
    }
}

impl From<i64> for CallArg {
    fn from(value: i64) -> Self {
        CallArg::Integer(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        CallArg::Text(value.to_string())
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        CallArg::Text(value)
    }
}

impl From<Vec<CallArg>> for CallArg {
    fn from(items: Vec<CallArg>) -> Self {
        CallArg::List(items)
    }
}

/// A contract method name plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescription {
    method: String,
    args: Vec<CallArg>,
}

impl CallDescription {
    /// Describe a call to `method` with `args` in declaration order.
    pub fn new(method: impl Into<String>, args: Vec<CallArg>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Describe a call that takes no arguments.
    pub fn no_args(method: impl Into<String>) -> Self {
        Self::new(method, Vec::new())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[CallArg] {
        &self.args
    }
}

impl fmt::Display for CallDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shapes() {
        let args: Vec<CallArg> =
            serde_json::from_str(r#"["0xabc", "100", 7, true, [1, "2", false]]"#).unwrap();

        assert_eq!(
            args,
            vec![
                CallArg::from("0xabc"),
                CallArg::from("100"),
                CallArg::Integer(7),
                CallArg::Bool(true),
                CallArg::List(vec![1i64.into(), "2".into(), false.into()]),
            ]
        );
    }

    #[test]
    fn test_blank_arguments() {
        assert!(CallArg::from("").is_blank());
        assert!(CallArg::Integer(0).is_blank());
        assert!(CallArg::Bool(false).is_blank());

        assert!(!CallArg::from("  ").is_blank());
        assert!(!CallArg::from("0").is_blank());
        assert!(!CallArg::Integer(5).is_blank());
        assert!(!CallArg::Bool(true).is_blank());
        assert!(!CallArg::List(vec![]).is_blank());
    }

    #[test]
    fn test_display_renders_call() {
        let call = CallDescription::new(
            "initialize",
            vec![
                CallArg::List(vec![1i64.into(), 2i64.into(), false.into()]),
                "Token".into(),
            ],
        );
        assert_eq!(call.to_string(), "initialize((1,2,false), Token)");
    }
}
