//! Notification policies.
//!
//! A policy looks at the freshly fetched price and the last notified price and
//! decides whether this run fires. Two strategies exist:
//!
//! | Policy | Fires when |
//! |--------|------------|
//! | [`ThresholdCrossingPolicy`] | the price moved more than `min_distance` away; reports the nearest round threshold |
//! | [`RuleFilePolicy`] | the first rule in the rules file matches and the move exceeds `min_distance`; the rule is then deleted |

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{RuleStore, StoreError};
use crate::{Direction, Price, Rule, ValidationError};

/// Default minimum move, in quote currency, before anything fires.
pub const DEFAULT_MIN_DISTANCE: f64 = 250.0;
/// Default rounding step for computed thresholds.
pub const DEFAULT_THRESHOLD_STEP: f64 = 1_000.0;

/// Which strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Threshold,
    Rules,
}

impl PolicyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Rules => "rules",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "threshold" => Ok(Self::Threshold),
            "rules" => Ok(Self::Rules),
            _ => Err(ValidationError::InvalidPolicy {
                value: input.to_owned(),
            }),
        }
    }
}

impl Display for PolicyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the two prices are strictly more than `min_distance` apart.
pub fn is_safe_distance(price: Price, previous: Price, min_distance: f64) -> bool {
    price.distance(previous) > min_distance
}

/// Round-number boundary crossed while moving from `previous` to `current`.
///
/// Rising prices report the current price floored to `step` (`above`);
/// falling prices report it ceiled to `step` (`below`).
pub fn compute_threshold(current: Price, previous: Price, step: f64) -> (Direction, Price) {
    let value = current.value();
    if current > previous {
        (Direction::Above, round_to_step(value, step, f64::floor))
    } else {
        (Direction::Below, round_to_step(value, step, f64::ceil))
    }
}

fn round_to_step(value: f64, step: f64, round: fn(f64) -> f64) -> Price {
    let rounded = round(value / step) * step;
    Price::new(rounded).unwrap_or(Price::ZERO)
}

/// What a policy reports when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub direction: Direction,
    pub threshold: Price,
    pub price: Price,
    pub previous: Price,
    /// The rule that fired, for rule-file policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

/// Error raised while a policy evaluates or commits.
pub type PolicyError = StoreError;

/// Strategy deciding whether a run notifies.
pub trait NotificationPolicy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    /// `Ok(None)` when nothing should fire.
    fn evaluate(&self, price: Price, previous: Price) -> Result<Option<Trigger>, PolicyError>;

    /// Record that `trigger` was delivered.
    fn commit(&self, trigger: &Trigger) -> Result<(), PolicyError>;
}

/// Significant-move detector with computed round-number thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdCrossingPolicy {
    min_distance: f64,
    step: f64,
}

impl Default for ThresholdCrossingPolicy {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            step: DEFAULT_THRESHOLD_STEP,
        }
    }
}

impl ThresholdCrossingPolicy {
    pub fn new(min_distance: f64, step: f64) -> Result<Self, ValidationError> {
        crate::domain::validate_positive("min_distance", min_distance)?;
        crate::domain::validate_positive("threshold_step", step)?;
        Ok(Self { min_distance, step })
    }
}

impl NotificationPolicy for ThresholdCrossingPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Threshold
    }

    fn evaluate(&self, price: Price, previous: Price) -> Result<Option<Trigger>, PolicyError> {
        if !is_safe_distance(price, previous, self.min_distance) {
            debug!(
                price = price.value(),
                previous = previous.value(),
                min_distance = self.min_distance,
                "move below minimum distance"
            );
            return Ok(None);
        }

        let (direction, threshold) = compute_threshold(price, previous, self.step);
        Ok(Some(Trigger {
            direction,
            threshold,
            price,
            previous,
            rule: None,
        }))
    }

    fn commit(&self, _trigger: &Trigger) -> Result<(), PolicyError> {
        Ok(())
    }
}

/// Static one-shot rules loaded from a [`RuleStore`].
#[derive(Clone)]
pub struct RuleFilePolicy {
    store: Arc<dyn RuleStore>,
    min_distance: f64,
}

impl RuleFilePolicy {
    pub fn new(store: Arc<dyn RuleStore>, min_distance: f64) -> Result<Self, ValidationError> {
        crate::domain::validate_positive("min_distance", min_distance)?;
        Ok(Self {
            store,
            min_distance,
        })
    }
}

impl NotificationPolicy for RuleFilePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Rules
    }

    fn evaluate(&self, price: Price, previous: Price) -> Result<Option<Trigger>, PolicyError> {
        let rules = self.store.load_rules()?;
        let safe = is_safe_distance(price, previous, self.min_distance);
        debug!(rules = rules.len(), safe, "evaluating rules");

        let fired = rules.into_iter().find(|rule| rule.matches(price) && safe);
        Ok(fired.map(|rule| Trigger {
            direction: rule.operator.direction(),
            threshold: rule.threshold,
            price,
            previous,
            rule: Some(rule),
        }))
    }

    fn commit(&self, trigger: &Trigger) -> Result<(), PolicyError> {
        let Some(fired) = &trigger.rule else {
            return Ok(());
        };

        let mut rules = self.store.load_rules()?;
        if let Some(index) = rules.iter().position(|rule| rule == fired) {
            rules.remove(index);
            self.store.save_rules(&rules)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{parse_rules, MemoryRuleStore};

    fn price(value: f64) -> Price {
        Price::new(value).expect("valid price")
    }

    #[test]
    fn safe_distance_is_strict() {
        assert!(!is_safe_distance(price(43_250.0), price(43_000.0), 250.0));
        assert!(is_safe_distance(price(43_250.5), price(43_000.0), 250.0));
        assert!(!is_safe_distance(price(43_100.0), price(43_000.0), 250.0));
        assert!(is_safe_distance(price(42_700.0), price(43_000.0), 250.0));
    }

    #[test]
    fn threshold_rounds_toward_previous_price() {
        assert_eq!(
            compute_threshold(price(43_500.0), price(43_000.0), 1_000.0),
            (Direction::Above, price(43_000.0))
        );
        assert_eq!(
            compute_threshold(price(42_500.0), price(43_000.0), 1_000.0),
            (Direction::Below, price(43_000.0))
        );
        assert_eq!(
            compute_threshold(price(42_000.0), price(43_000.0), 1_000.0),
            (Direction::Below, price(42_000.0))
        );
    }

    #[test]
    fn threshold_policy_fires_only_past_min_distance() {
        let policy = ThresholdCrossingPolicy::default();

        assert_eq!(
            policy.evaluate(price(40_250.0), price(40_000.0)).expect("evaluate"),
            None
        );

        let trigger = policy
            .evaluate(price(40_251.0), price(40_000.0))
            .expect("evaluate")
            .expect("should fire");
        assert_eq!(trigger.direction, Direction::Above);
        assert_eq!(trigger.threshold, price(40_000.0));
        assert_eq!(trigger.rule, None);
    }

    #[test]
    fn threshold_policy_rejects_non_positive_settings() {
        assert!(ThresholdCrossingPolicy::new(0.0, 1_000.0).is_err());
        assert!(ThresholdCrossingPolicy::new(250.0, -1.0).is_err());
    }

    #[test]
    fn rule_policy_fires_first_matching_rule_in_file_order() {
        let store = Arc::new(MemoryRuleStore::new(
            parse_rules(">50000\n>44000\n>43000\n").expect("valid"),
        ));
        let policy = RuleFilePolicy::new(store.clone(), 250.0).expect("valid policy");

        let trigger = policy
            .evaluate(price(45_000.0), price(43_500.0))
            .expect("evaluate")
            .expect("should fire");
        assert_eq!(trigger.threshold, price(44_000.0));
        assert_eq!(trigger.direction, Direction::Above);
    }

    #[test]
    fn rule_policy_requires_safe_distance() {
        let store = Arc::new(MemoryRuleStore::new(parse_rules("<40000\n").expect("valid")));
        let policy = RuleFilePolicy::new(store, 250.0).expect("valid policy");

        assert_eq!(
            policy.evaluate(price(39_900.0), price(40_100.0)).expect("evaluate"),
            None
        );
    }

    #[test]
    fn committing_a_rule_deletes_only_that_rule() {
        let store = Arc::new(MemoryRuleStore::new(
            parse_rules("<40000\n>45000\n<40000\n").expect("valid"),
        ));
        let policy = RuleFilePolicy::new(store.clone(), 250.0).expect("valid policy");

        let trigger = policy
            .evaluate(price(39_000.0), price(41_000.0))
            .expect("evaluate")
            .expect("should fire");
        policy.commit(&trigger).expect("commit");

        let remaining: Vec<String> = store.snapshot().into_iter().map(|r| r.line).collect();
        assert_eq!(remaining, vec![">45000", "<40000"]);
    }

    #[test]
    fn policy_kind_parses_case_insensitively() {
        assert_eq!(PolicyKind::parse("Rules"), Ok(PolicyKind::Rules));
        assert_eq!(PolicyKind::parse(" threshold "), Ok(PolicyKind::Threshold));
        assert!(PolicyKind::parse("percent").is_err());
    }
}
