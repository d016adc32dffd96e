//! Behavior tests for the threshold-crossing policy, wired end to end
//! against file stores in a temporary directory.

use std::sync::Arc;

use xbtwatch_tests::{
    config_in, read_trimmed, run_once, PolicyKind, Price, RunOutcome, ScriptedHttpClient,
    WEBHOOK_BASE_URL, WEBHOOK_KEY,
};

fn price(value: f64) -> Price {
    Price::new(value).expect("valid price")
}

// =============================================================================
// Significant moves
// =============================================================================

#[tokio::test]
async fn when_price_moves_past_min_distance_user_is_notified_with_crossed_threshold() {
    // Given: a last notified price of 40,000 and a ticker answering 40,251
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path(), PolicyKind::Threshold);
    std::fs::write(&config.previous_price_path, "40000\n").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("40251.00000"));

    // When: one run is performed
    let outcome = run_once(&config, http.clone(), false).await.expect("run succeeds");

    // Then: exactly one webhook is posted describing the crossed threshold
    assert!(outcome.fired());
    let posts = http.webhook_posts();
    assert_eq!(posts.len(), 1);
    let (url, payload) = &posts[0];
    assert_eq!(
        url,
        &format!("{WEBHOOK_BASE_URL}/trigger/xbt_price_alert/with/key/{WEBHOOK_KEY}")
    );
    assert_eq!(payload.value1, "above €40,000.00");
    assert_eq!(payload.value2, "€40,251.00");

    // And: the new price becomes the baseline
    assert_eq!(read_trimmed(&config.previous_price_path), "40251");
}

#[tokio::test]
async fn when_price_falls_user_is_notified_below_the_ceiling_threshold() {
    // Given: a last notified price of 43,000 and a drop to 42,500
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path(), PolicyKind::Threshold);
    std::fs::write(&config.previous_price_path, "43000").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("42500.0"));

    // When
    run_once(&config, http.clone(), false).await.expect("run succeeds");

    // Then: the message reports the round threshold the price fell below
    let posts = http.webhook_posts();
    assert_eq!(posts[0].1.value1, "below €43,000.00");
    assert_eq!(read_trimmed(&config.previous_price_path), "42500");
}

// =============================================================================
// Insignificant moves
// =============================================================================

#[tokio::test]
async fn when_move_equals_min_distance_nothing_is_sent_or_persisted() {
    // Given: a move of exactly 250
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path(), PolicyKind::Threshold);
    std::fs::write(&config.previous_price_path, "40000").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("40250"));

    // When
    let outcome = run_once(&config, http.clone(), false).await.expect("run succeeds");

    // Then: the run stays quiet and the baseline is unchanged
    assert_eq!(
        outcome,
        RunOutcome::Quiet {
            price: price(40_250.0),
            previous: price(40_000.0)
        }
    );
    assert!(http.webhook_posts().is_empty());
    assert_eq!(read_trimmed(&config.previous_price_path), "40000");
}

#[tokio::test]
async fn repeated_runs_without_movement_notify_only_once() {
    // Given: a price that has just been notified
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path(), PolicyKind::Threshold);
    std::fs::write(&config.previous_price_path, "40000").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("41000"));

    // When: the scheduler runs twice at the same price
    let first = run_once(&config, http.clone(), false).await.expect("first run");
    let second = run_once(&config, http.clone(), false).await.expect("second run");

    // Then: only the first run notifies
    assert!(first.fired());
    assert!(!second.fired());
    assert_eq!(http.webhook_posts().len(), 1);
}

// =============================================================================
// First run and dry run
// =============================================================================

#[tokio::test]
async fn first_run_seeds_baseline_without_notifying() {
    // Given: no previous-price file
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path(), PolicyKind::Threshold);
    let http = Arc::new(ScriptedHttpClient::with_ask("43123.4"));

    // When
    let outcome = run_once(&config, http.clone(), false).await.expect("run succeeds");

    // Then: the fetched price is stored and nothing is sent
    assert_eq!(outcome, RunOutcome::Seeded { price: price(43_123.4) });
    assert!(http.webhook_posts().is_empty());
    assert_eq!(read_trimmed(&config.previous_price_path), "43123.4");
}

#[tokio::test]
async fn dry_run_reports_the_message_but_leaves_everything_untouched() {
    // Given: a significant move and no webhook key
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), PolicyKind::Threshold);
    config.webhook_key = None;
    std::fs::write(&config.previous_price_path, "40000").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("45000"));

    // When
    let outcome = run_once(&config, http.clone(), true).await.expect("run succeeds");

    // Then: the would-be payload is reported, nothing is posted or persisted
    match outcome {
        RunOutcome::DryRun { payload, .. } => assert_eq!(payload.value1, "above €45,000.00"),
        other => panic!("expected dry run, got {other:?}"),
    }
    assert!(http.webhook_posts().is_empty());
    assert_eq!(read_trimmed(&config.previous_price_path), "40000");
}

#[tokio::test]
async fn currency_symbol_is_configurable() {
    // Given: a dollar-denominated configuration
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), PolicyKind::Threshold);
    config.currency_symbol = String::from("$");
    std::fs::write(&config.previous_price_path, "60000").expect("seed price");
    let http = Arc::new(ScriptedHttpClient::with_ask("61234.5"));

    // When
    run_once(&config, http.clone(), false).await.expect("run succeeds");

    // Then
    let (_, payload) = &http.webhook_posts()[0];
    assert_eq!(payload.value1, "above $61,000.00");
    assert_eq!(payload.value2, "$61,234.50");
}
