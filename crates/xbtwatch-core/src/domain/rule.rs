use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::price::validate_positive;
use crate::{Direction, Price, ValidationError};

/// Comparison applied by a threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
}

impl ComparisonOperator {
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '>' => Some(Self::GreaterThan),
            '<' => Some(Self::LessThan),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::GreaterThan => '>',
            Self::LessThan => '<',
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Self::GreaterThan => Direction::Above,
            Self::LessThan => Direction::Below,
        }
    }

    pub const fn word(self) -> &'static str {
        self.direction().word()
    }

    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
        }
    }
}

/// One-shot price rule parsed from a single rules-file line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub operator: ComparisonOperator,
    pub threshold: Price,
    /// Line text as it appeared in the rules file, trimmed.
    pub line: String,
}

impl Rule {
    /// Parse a rule line such as `> 45,000` or `<38000.50`.
    ///
    /// The first non-whitespace character selects the operator. Everything
    /// after it is reduced to ASCII digits and `.` before parsing, so currency
    /// symbols, separators and spaces are ignored.
    pub fn parse(line: &str) -> Result<Self, ValidationError> {
        let trimmed = line.trim();
        let mut chars = trimmed.chars();
        let first = chars.next().ok_or(ValidationError::EmptyRule)?;
        let operator = ComparisonOperator::from_symbol(first)
            .ok_or(ValidationError::UnknownOperator { ch: first })?;

        let digits: String = chars
            .filter(|ch| ch.is_ascii_digit() || *ch == '.')
            .collect();
        let value = digits
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidThreshold {
                value: trimmed[first.len_utf8()..].trim().to_owned(),
            })?;
        validate_positive("threshold", value)?;

        Ok(Self {
            operator,
            threshold: Price::new(value)?,
            line: trimmed.to_owned(),
        })
    }

    pub fn matches(&self, price: Price) -> bool {
        self.operator.compare(price.value(), self.threshold.value())
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator.symbol(), self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: f64) -> Price {
        Price::new(value).expect("valid price")
    }

    #[test]
    fn parses_operator_and_threshold() {
        let rule = Rule::parse(">45000").expect("rule should parse");
        assert_eq!(rule.operator, ComparisonOperator::GreaterThan);
        assert_eq!(rule.threshold.value(), 45_000.0);

        let rule = Rule::parse("  < 38000.5 \n").expect("rule should parse");
        assert_eq!(rule.operator, ComparisonOperator::LessThan);
        assert_eq!(rule.threshold.value(), 38_000.5);
        assert_eq!(rule.line, "< 38000.5");
    }

    #[test]
    fn ignores_noise_in_numeric_part() {
        let rule = Rule::parse("> €45,000").expect("rule should parse");
        assert_eq!(rule.threshold.value(), 45_000.0);

        let rule = Rule::parse("<EUR 1_000 ").expect("rule should parse");
        assert_eq!(rule.threshold.value(), 1_000.0);
    }

    #[test]
    fn rejects_lines_without_known_operator() {
        assert_eq!(
            Rule::parse("=45000"),
            Err(ValidationError::UnknownOperator { ch: '=' })
        );
        assert_eq!(
            Rule::parse("45000"),
            Err(ValidationError::UnknownOperator { ch: '4' })
        );
        assert_eq!(Rule::parse("   "), Err(ValidationError::EmptyRule));
    }

    #[test]
    fn rejects_missing_or_non_positive_threshold() {
        assert!(matches!(
            Rule::parse(">"),
            Err(ValidationError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            Rule::parse("> abc"),
            Err(ValidationError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            Rule::parse("> 1.2.3"),
            Err(ValidationError::InvalidThreshold { .. })
        ));
        assert_eq!(
            Rule::parse("<0"),
            Err(ValidationError::NonPositiveValue { field: "threshold" })
        );
    }

    #[test]
    fn matches_follows_numeric_comparison() {
        let above = Rule::parse(">100").expect("rule should parse");
        assert!(above.matches(price(150.0)));
        assert!(!above.matches(price(50.0)));
        assert!(!above.matches(price(100.0)));

        let below = Rule::parse("<100").expect("rule should parse");
        assert!(below.matches(price(50.0)));
        assert!(!below.matches(price(150.0)));
    }

    #[test]
    fn operator_words_follow_direction() {
        assert_eq!(ComparisonOperator::GreaterThan.word(), "above");
        assert_eq!(ComparisonOperator::LessThan.word(), "below");
        assert_eq!(ComparisonOperator::from_symbol('!'), None);
    }
}
