//! Compiled, validated pattern set grouped by priority tier.
//!
//! The registry is built once from a [`PatternConfig`] and never changes
//! afterwards. Every error a configuration can contain is reported by
//! [`PatternRegistry::load`], before any document is opened.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

use crate::config::{MatchingConfig, PatternConfig};
use crate::error::ConfigurationError;

/// A priority tier; rank 1 is the highest priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub rank: u8,
    pub label: String,
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub tier: u8,
    /// Position within the tier, in declaration order
    pub index: usize,
    pub label: String,
    pub regex: Regex,
}

impl Pattern {
    /// The regex source as configured.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }
}

/// Immutable mapping of tier rank to ordered patterns.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    tiers: Vec<Tier>,
    /// Indexed by `rank - 1`
    patterns: Vec<Vec<Pattern>>,
}

impl PatternRegistry {
    /// Validate and compile a pattern configuration.
    pub fn load(config: &PatternConfig) -> Result<Self, ConfigurationError> {
        if config.tiers.is_empty() {
            return Err(ConfigurationError::NoTiers);
        }
        if config.tiers.len() > u8::MAX as usize {
            return Err(ConfigurationError::TooManyTiers {
                count: config.tiers.len(),
            });
        }

        let ranks = assign_ranks(config)?;

        let mut seen_labels = HashSet::new();
        for tier in &config.tiers {
            if !seen_labels.insert(tier.label.as_str()) {
                return Err(ConfigurationError::DuplicateTierLabel {
                    label: tier.label.clone(),
                });
            }
        }

        let mut slots: Vec<Option<(Tier, Vec<Pattern>)>> = vec![None; config.tiers.len()];
        for (tier_config, rank) in config.tiers.iter().zip(ranks) {
            if tier_config.patterns.is_empty() {
                return Err(ConfigurationError::EmptyTier {
                    label: tier_config.label.clone(),
                });
            }

            let mut compiled = Vec::with_capacity(tier_config.patterns.len());
            for (index, spec) in tier_config.patterns.iter().enumerate() {
                let regex = compile(spec.regex(), &config.matching).map_err(|source| {
                    ConfigurationError::InvalidPattern {
                        tier: tier_config.label.clone(),
                        pattern: spec.regex().to_string(),
                        source,
                    }
                })?;
                if matches_empty_span(&regex) {
                    return Err(ConfigurationError::EmptyMatchPattern {
                        tier: tier_config.label.clone(),
                        pattern: spec.regex().to_string(),
                    });
                }
                compiled.push(Pattern {
                    tier: rank,
                    index,
                    label: spec.label().to_string(),
                    regex,
                });
            }

            let tier = Tier {
                rank,
                label: tier_config.label.clone(),
            };
            slots[rank as usize - 1] = Some((tier, compiled));
        }

        let mut tiers = Vec::with_capacity(slots.len());
        let mut patterns = Vec::with_capacity(slots.len());
        for (tier, compiled) in slots.into_iter().flatten() {
            tiers.push(tier);
            patterns.push(compiled);
        }

        tracing::debug!(
            tiers = tiers.len(),
            patterns = patterns.iter().map(Vec::len).sum::<usize>(),
            "Pattern registry loaded"
        );

        Ok(Self { tiers, patterns })
    }

    /// Tiers in ascending rank order.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Patterns of a tier in declaration order.
    pub fn patterns_for(&self, rank: u8) -> Option<&[Pattern]> {
        if rank == 0 {
            return None;
        }
        self.patterns.get(rank as usize - 1).map(Vec::as_slice)
    }

    pub fn tier(&self, rank: u8) -> Option<&Tier> {
        if rank == 0 {
            return None;
        }
        self.tiers.get(rank as usize - 1)
    }

    /// Total number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.iter().map(Vec::len).sum()
    }
}

/// Short texts covering word boundaries, line edges and text edges.
const EMPTY_SPAN_PROBES: &[&str] = &["", "a", " a ", "0_ x", "a\nb", "\n"];

/// True when the pattern can produce a zero-length hit.
///
/// Assertion-only patterns (`\b`, `^`, `$`) and alternations with an
/// assertion-only branch never match `""` alone but hit empty spans next to
/// word or line boundaries.
fn matches_empty_span(regex: &Regex) -> bool {
    EMPTY_SPAN_PROBES
        .iter()
        .any(|text| regex.find_iter(text).any(|m| m.is_empty()))
}

fn compile(source: &str, matching: &MatchingConfig) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(matching.case_insensitive)
        .dot_matches_new_line(matching.dot_matches_newline)
        .build()
}

/// Resolve the rank of every tier.
///
/// Tiers without an explicit priority take the lowest rank not claimed by
/// an explicit one, in declaration order. Ranks always form `1..=N`.
fn assign_ranks(config: &PatternConfig) -> Result<Vec<u8>, ConfigurationError> {
    let max = config.tiers.len();
    let mut claimed = HashSet::new();

    for tier in &config.tiers {
        if let Some(priority) = tier.priority {
            if priority == 0 || priority as usize > max {
                return Err(ConfigurationError::PriorityOutOfRange {
                    label: tier.label.clone(),
                    priority,
                    max,
                });
            }
            if !claimed.insert(priority) {
                return Err(ConfigurationError::DuplicatePriority { priority });
            }
        }
    }

    let mut next_free = (1..=max as u8).filter(|rank| !claimed.contains(rank));
    config
        .tiers
        .iter()
        .map(|tier| match tier.priority {
            Some(priority) => Ok(priority),
            // Counts match: N tiers, N ranks, explicit ones removed from the pool
            None => next_free.next().ok_or(ConfigurationError::NoTiers),
        })
        .collect()
}
