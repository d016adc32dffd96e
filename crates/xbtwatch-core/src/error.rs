use thiserror::Error;

/// Validation and contract errors exposed by `xbtwatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },
    #[error("field '{field}' is out of range")]
    TooLarge { field: &'static str },

    #[error("rule line is empty")]
    EmptyRule,
    #[error("rule must start with > or <, found '{ch}'")]
    UnknownOperator { ch: char },
    #[error("rule must contain a valid price: '{value}'")]
    InvalidThreshold { value: String },
    #[error("rules file line {line}: {source}")]
    RuleLine {
        line: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid policy '{value}', expected one of threshold, rules")]
    InvalidPolicy { value: String },
    #[error("config field '{field}' cannot be empty")]
    EmptyConfigField { field: &'static str },
}
