//! # Domain Models
//!
//! Canonical domain types for xbtwatch.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Price`] | Validated non-negative quote-currency amount |
//! | [`Direction`] | `above` / `below` wording for notifications |
//! | [`ComparisonOperator`] | `>` / `<` comparison used by rules |
//! | [`Rule`] | One-shot threshold rule parsed from a rules-file line |
//!
//! ## Validation
//!
//! ```rust
//! use xbtwatch_core::{ComparisonOperator, Price, Rule};
//!
//! let rule = Rule::parse("> €45,000").unwrap();
//! assert_eq!(rule.operator, ComparisonOperator::GreaterThan);
//! assert!(rule.matches(Price::new(45_001.0).unwrap()));
//! assert!(Price::new(-1.0).is_err());
//! ```

mod price;
mod rule;

pub(crate) use price::validate_positive;
pub use price::{Direction, Price};
pub use rule::{ComparisonOperator, Rule};
