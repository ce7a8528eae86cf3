//! Parallel batch valuation.
//!
//! Instruments are valued independently against one shared, read-only
//! [`ValuationContext`]; a failure is reported per item and never aborts the
//! rest of the batch.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use switchback_bonds::Instrument;

use crate::error::AnalyticsResult;
use crate::pricing::ValuationContext;
use crate::valuation::{value, ValuationReport};

/// One instrument to value, with an optional clean price per 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Instrument terms.
    pub instrument: Instrument,
    /// Market clean price; the curve price is used when absent.
    #[serde(default)]
    pub clean_price: Option<f64>,
}

impl BatchItem {
    /// Creates an item valued at the curve price.
    #[must_use]
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            clean_price: None,
        }
    }

    /// Sets the market clean price.
    #[must_use]
    pub fn with_clean_price(mut self, clean_price: f64) -> Self {
        self.clean_price = Some(clean_price);
        self
    }
}

/// Outcome of a batch, in input order.
#[derive(Debug)]
pub struct BatchResult {
    /// One result per input item.
    pub outputs: Vec<AnalyticsResult<ValuationReport>>,
    /// Number of items valued.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Wall-clock time of the batch.
    pub elapsed_ms: u128,
}

impl BatchResult {
    /// Successful reports, skipping failures.
    pub fn reports(&self) -> impl Iterator<Item = &ValuationReport> {
        self.outputs.iter().filter_map(|r| r.as_ref().ok())
    }
}

/// Values every item in parallel.
pub fn value_all(items: &[BatchItem], ctx: &ValuationContext) -> BatchResult {
    let start = Instant::now();

    let outputs: Vec<_> = items
        .par_iter()
        .map(|item| {
            let result = value(&item.instrument, item.clean_price, ctx);
            if let Err(e) = &result {
                tracing::warn!(instrument = item.instrument.id(), error = %e, "valuation failed");
            }
            result
        })
        .collect();

    let failed = outputs.iter().filter(|r| r.is_err()).count();
    let result = BatchResult {
        succeeded: outputs.len() - failed,
        failed,
        outputs,
        elapsed_ms: start.elapsed().as_millis(),
    };
    tracing::info!(
        items = items.len(),
        succeeded = result.succeeded,
        failed = result.failed,
        elapsed_ms = result.elapsed_ms as u64,
        "batch valued"
    );
    result
}
