//! Unit tests for config loading into a pattern registry

use docsift::config::ReportFormat;
use docsift::{Config, ConfigurationError, PatternRegistry};

#[test]
fn default_tiers_compile() {
    let config = Config::default();
    let registry = PatternRegistry::load(&config.pattern_config()).unwrap();
    let labels: Vec<_> = registry.tiers().iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["priority_1", "priority_2", "priority_3", "priority_4"]);
    assert!(registry.pattern_count() > 10);
}

#[test]
fn explicit_priorities_reorder_tiers() {
    let config: Config = toml::from_str(
        r#"
[[priority_tiers]]
label = "routine"
priority = 2
patterns = ['\bminutes\b']

[[priority_tiers]]
label = "urgent"
priority = 1
patterns = ['\bfraud\b']
"#,
    )
    .unwrap();

    let registry = PatternRegistry::load(&config.pattern_config()).unwrap();
    assert_eq!(registry.tier(1).unwrap().label, "urgent");
    assert_eq!(registry.tier(2).unwrap().label, "routine");
}

#[test]
fn invalid_regex_names_tier_and_pattern() {
    let config: Config = toml::from_str(
        r#"
[[priority_tiers]]
label = "broken"
patterns = ['\bfine\b', '([unclosed']
"#,
    )
    .unwrap();

    let err = PatternRegistry::load(&config.pattern_config()).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    let message = err.to_string();
    assert!(message.contains("broken"));
    assert!(message.contains("([unclosed"));
}

#[test]
fn empty_tier_list_is_rejected() {
    let config: Config = toml::from_str("priority_tiers = []").unwrap();
    let err = PatternRegistry::load(&config.pattern_config()).unwrap_err();
    assert!(matches!(err, ConfigurationError::NoTiers));
}

#[test]
fn case_sensitivity_follows_matching_section() {
    let config: Config = toml::from_str(
        r#"
[matching]
case_insensitive = false

[[priority_tiers]]
label = "exact"
patterns = ['Budget']
"#,
    )
    .unwrap();
    let registry = PatternRegistry::load(&config.pattern_config()).unwrap();
    let pattern = &registry.patterns_for(1).unwrap()[0];
    assert!(pattern.regex.is_match("Budget"));
    assert!(!pattern.regex.is_match("budget"));
}

#[test]
fn output_section_parses_formats() {
    let config: Config = toml::from_str(
        r#"
[output]
directory = "out"
formats = ["summary"]
"#,
    )
    .unwrap();
    assert_eq!(config.output.directory, "out");
    assert_eq!(config.output.formats, vec![ReportFormat::Summary]);
}
