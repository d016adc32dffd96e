//! # xbtwatch Core
//!
//! Price-alert engine behind the `xbtwatch` CLI.
//!
//! ## Overview
//!
//! Each invocation performs one run:
//!
//! 1. fetch the current ask price from a ticker endpoint,
//! 2. load the last notified price,
//! 3. ask the configured [`NotificationPolicy`] whether the move is worth a notification,
//! 4. post a webhook, persist the new price and commit the policy.
//!
//! Scheduling is external (cron, systemd timers); the engine never loops.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration structure and TOML loading |
//! | [`domain`] | `Price`, `Direction`, `ComparisonOperator`, `Rule` |
//! | [`error`] | Validation errors |
//! | [`evaluator`] | Run orchestration and outcomes |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`notifier`] | Webhook payloads and delivery |
//! | [`policy`] | Threshold-crossing and rule-file policies |
//! | [`source`] | Ticker price source |
//! | [`store`] | Last-price and rules persistence |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌────────────────────┐     ┌───────────┐
//! │ PriceSource │────▶│  Evaluator  │────▶│ NotificationPolicy │────▶│ RuleStore │
//! └─────────────┘     └──────┬──────┘     └────────────────────┘     └───────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!       ┌────────────┐              ┌────────────┐     ┌────────────┐
//!       │ PriceStore │              │  Notifier  │────▶│ HttpClient │
//!       └────────────┘              └────────────┘     └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use xbtwatch_core::{
//!     Evaluator, MemoryPriceStore, Price, RecordingNotifier, StaticPrice,
//!     ThresholdCrossingPolicy,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let notifier = Arc::new(RecordingNotifier::default());
//! let evaluator = Evaluator::builder()
//!     .source(Arc::new(StaticPrice(Price::new(40_251.0).unwrap())))
//!     .price_store(Arc::new(MemoryPriceStore::new(Some(Price::new(40_000.0).unwrap()))))
//!     .policy(Arc::new(ThresholdCrossingPolicy::default()))
//!     .notifier(notifier.clone())
//!     .build()
//!     .unwrap();
//!
//! assert!(evaluator.run().await.unwrap().fired());
//! assert_eq!(notifier.sent()[0].value1, "above €40,000.00");
//! # });
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod http_client;
pub mod notifier;
pub mod policy;
pub mod source;
pub mod store;

// Configuration
pub use config::{Config, ConfigError};

// Domain models
pub use domain::{ComparisonOperator, Direction, Price, Rule};

// Error types
pub use error::ValidationError;

// Evaluation
pub use evaluator::{EvaluateError, Evaluator, EvaluatorBuilder, MissingComponent, RunOutcome};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Notification
pub use notifier::{
    Notifier, NotifyError, RecordingNotifier, WebhookEndpoint, WebhookNotifier, WebhookPayload,
};

// Policies
pub use policy::{
    compute_threshold, is_safe_distance, NotificationPolicy, PolicyKind, RuleFilePolicy,
    ThresholdCrossingPolicy, Trigger,
};

// Price sources
pub use source::{parse_ask_price, FetchError, KrakenTicker, PriceSource, StaticPrice};

// Stores
pub use store::{
    parse_rules, FilePriceStore, FileRuleStore, MemoryPriceStore, MemoryRuleStore, PriceStore,
    RuleStore, StoreError,
};
