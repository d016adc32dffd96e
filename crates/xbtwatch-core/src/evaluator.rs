//! One evaluation run: fetch → compare → notify → persist.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::http_client::HttpClient;
use crate::notifier::{
    Notifier, NotifyError, RecordingNotifier, WebhookEndpoint, WebhookNotifier, WebhookPayload,
};
use crate::policy::{
    NotificationPolicy, PolicyKind, RuleFilePolicy, ThresholdCrossingPolicy, Trigger,
};
use crate::source::{FetchError, KrakenTicker, PriceSource};
use crate::store::{FilePriceStore, FileRuleStore, PriceStore, StoreError};
use crate::Price;

/// Failure of a single run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No previous price existed; the fetched price became the baseline.
    Seeded { price: Price },
    /// No previous price existed and the run was dry; nothing was stored.
    NoBaseline { price: Price },
    /// The policy did not fire.
    Quiet { price: Price, previous: Price },
    /// Notification sent and state updated.
    Notified {
        trigger: Trigger,
        payload: WebhookPayload,
    },
    /// The policy fired but nothing was sent, persisted or deleted.
    DryRun {
        trigger: Trigger,
        payload: WebhookPayload,
    },
}

impl RunOutcome {
    pub const fn fired(&self) -> bool {
        matches!(self, Self::Notified { .. })
    }
}

/// Orchestrates one run against injected collaborators.
pub struct Evaluator {
    source: Arc<dyn PriceSource>,
    price_store: Arc<dyn PriceStore>,
    policy: Arc<dyn NotificationPolicy>,
    notifier: Arc<dyn Notifier>,
    currency_symbol: String,
    dry_run: bool,
}

impl Evaluator {
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub async fn run(&self) -> Result<RunOutcome, EvaluateError> {
        let price = self.source.fetch_price().await?;

        let Some(previous) = self.price_store.load_last_price()? else {
            if self.dry_run {
                warn!(price = price.value(), "no previous price recorded; dry run leaves store untouched");
                return Ok(RunOutcome::NoBaseline { price });
            }
            warn!(price = price.value(), "no previous price recorded; seeding baseline");
            self.price_store.save_last_price(price)?;
            return Ok(RunOutcome::Seeded { price });
        };

        let Some(trigger) = self.policy.evaluate(price, previous)? else {
            info!(
                policy = %self.policy.kind(),
                price = price.value(),
                previous = previous.value(),
                "no notification"
            );
            return Ok(RunOutcome::Quiet { price, previous });
        };

        let payload = WebhookPayload::from_trigger(&trigger, &self.currency_symbol);
        if self.dry_run {
            info!(policy = %self.policy.kind(), message = %payload.value1, "dry run; would notify");
            return Ok(RunOutcome::DryRun { trigger, payload });
        }

        self.notifier.send(&payload).await?;
        // Persist only after delivery so a failed send leaves the baseline untouched.
        self.price_store.save_last_price(price)?;
        self.policy.commit(&trigger)?;
        info!(
            policy = %self.policy.kind(),
            message = %payload.value1,
            price = price.value(),
            "notified"
        );

        Ok(RunOutcome::Notified { trigger, payload })
    }
}

/// Missing collaborator when building an [`Evaluator`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("evaluator is missing its {0}")]
pub struct MissingComponent(pub &'static str);

#[derive(Default)]
pub struct EvaluatorBuilder {
    source: Option<Arc<dyn PriceSource>>,
    price_store: Option<Arc<dyn PriceStore>>,
    policy: Option<Arc<dyn NotificationPolicy>>,
    notifier: Option<Arc<dyn Notifier>>,
    currency_symbol: Option<String>,
    dry_run: bool,
}

impl EvaluatorBuilder {
    /// Wire the production collaborators described by `config`.
    ///
    /// A webhook key is only required when the run may actually notify.
    pub fn from_config(
        config: &Config,
        http_client: Arc<dyn HttpClient>,
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let source = KrakenTicker::new(http_client.clone(), &config.ticker_url, &config.pair_key)
            .with_timeout_ms(config.timeout_ms);

        let policy: Arc<dyn NotificationPolicy> = match config.policy {
            PolicyKind::Threshold => Arc::new(ThresholdCrossingPolicy::new(
                config.min_distance,
                config.threshold_step,
            )?),
            PolicyKind::Rules => Arc::new(RuleFilePolicy::new(
                Arc::new(FileRuleStore::new(&config.rules_path)),
                config.min_distance,
            )?),
        };

        let notifier: Arc<dyn Notifier> = match (config.require_webhook_key(), dry_run) {
            (Ok(key), _) => Arc::new(
                WebhookNotifier::new(
                    http_client,
                    WebhookEndpoint::new(&config.webhook_base_url, &config.webhook_event, key),
                )
                .with_timeout_ms(config.timeout_ms),
            ),
            (Err(_), true) => Arc::new(RecordingNotifier::default()),
            (Err(error), false) => return Err(error),
        };

        Ok(Self::default()
            .source(Arc::new(source))
            .price_store(Arc::new(FilePriceStore::new(&config.previous_price_path)))
            .policy(policy)
            .notifier(notifier)
            .currency_symbol(&config.currency_symbol)
            .dry_run(dry_run))
    }

    pub fn source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn price_store(mut self, store: Arc<dyn PriceStore>) -> Self {
        self.price_store = Some(store);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn NotificationPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = Some(symbol.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<Evaluator, MissingComponent> {
        Ok(Evaluator {
            source: self.source.ok_or(MissingComponent("price source"))?,
            price_store: self.price_store.ok_or(MissingComponent("price store"))?,
            policy: self.policy.ok_or(MissingComponent("notification policy"))?,
            notifier: self.notifier.ok_or(MissingComponent("notifier"))?,
            currency_symbol: self
                .currency_symbol
                .unwrap_or_else(|| String::from(crate::config::DEFAULT_CURRENCY_SYMBOL)),
            dry_run: self.dry_run,
        })
    }
}
