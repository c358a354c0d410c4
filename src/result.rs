//! Thread-safe collection of result records.
//!
//! This module provides:
//! - `ResultAggregator` - accepts records from any worker, finalizes into a deterministic order
//! - `FailedDocumentInfo` - a document that produced no records because it could not be processed
//!
//! # Ordering
//!
//! Records arrive in whatever order workers finish. `finalize()` sorts them
//! by document index, page number, tier rank and start offset, with pattern
//! index and end offset as tie-breakers, so the output depends only on the
//! set of records and never on scheduling.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::InvalidStateError;
use crate::registry::PatternRegistry;
use crate::types::{ContextualMatch, DocumentMetadata, ResultRecord};

/// Information about a failed document for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocumentInfo {
    pub document_index: usize,
    pub source_filename: String,
    /// `unreadable` or `timed_out`
    pub kind: String,
    /// Error message describing the failure
    pub error: String,
}

enum State {
    Open(Vec<ResultRecord>),
    Finalized(Vec<ResultRecord>),
}

/// Collects `ResultRecord`s from concurrent workers.
///
/// `Open` until the first `finalize()`; adding afterwards is a contract
/// violation reported as `InvalidStateError`.
pub struct ResultAggregator {
    tiers: Vec<u8>,
    state: Mutex<State>,
}

impl ResultAggregator {
    /// Create an aggregator that reports counts for the given tier ranks.
    pub fn new(tiers: impl IntoIterator<Item = u8>) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
            state: Mutex::new(State::Open(Vec::new())),
        }
    }

    /// Create an aggregator for every tier declared by `registry`.
    pub fn for_registry(registry: &PatternRegistry) -> Self {
        Self::new(registry.tiers().iter().map(|t| t.rank))
    }

    /// Record a contextual match together with its document metadata.
    pub fn add(
        &self,
        matched: ContextualMatch,
        metadata: &DocumentMetadata,
    ) -> Result<(), InvalidStateError> {
        let mut state = self.lock();
        match &mut *state {
            State::Open(records) => {
                records.push(ResultRecord::new(matched, metadata));
                Ok(())
            }
            State::Finalized(_) => Err(InvalidStateError::AddAfterFinalize),
        }
    }

    /// Freeze the collection and return it in its canonical order.
    ///
    /// Calling it again returns the same sequence.
    pub fn finalize(&self) -> Vec<ResultRecord> {
        let mut state = self.lock();
        if let State::Open(records) = &mut *state {
            let mut records = std::mem::take(records);
            records.sort_by_key(ResultRecord::order_key);
            *state = State::Finalized(records);
        }
        match &*state {
            State::Finalized(records) => records.clone(),
            State::Open(_) => Vec::new(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(&*self.lock(), State::Finalized(_))
    }

    /// Records collected so far.
    pub fn len(&self) -> usize {
        match &*self.lock() {
            State::Open(records) | State::Finalized(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records per tier rank; every declared tier is present.
    pub fn counts_by_tier(&self) -> BTreeMap<u8, usize> {
        let mut counts: BTreeMap<u8, usize> = self.tiers.iter().map(|&rank| (rank, 0)).collect();
        match &*self.lock() {
            State::Open(records) | State::Finalized(records) => {
                for record in records {
                    *counts.entry(record.raw().tier).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking worker leaves the record list intact
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
