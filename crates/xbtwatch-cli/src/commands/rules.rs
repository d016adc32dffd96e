use serde_json::json;
use xbtwatch_core::{Config, FileRuleStore, RuleStore};

use crate::error::CliError;
use crate::output::Report;

pub fn run(config: &Config) -> Result<Report, CliError> {
    let store = FileRuleStore::new(&config.rules_path);
    let rules = store.load_rules()?;

    let mut report = Report::new(
        "rules",
        json!({
            "path": config.rules_path,
            "rules": rules,
        }),
    );
    if rules.is_empty() {
        report = report.with_line(format!("no rules in {}", config.rules_path.display()));
    }
    for rule in &rules {
        report = report.with_line(format!(
            "{}  {} {}",
            rule.line,
            rule.operator.word(),
            rule.threshold.format_with(&config.currency_symbol)
        ));
    }
    Ok(report)
}
