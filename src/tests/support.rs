use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::data::Symbol;
use crate::error::{TrackerError, TrackerResult};
use crate::pricing::PriceSource;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn prices(btc: &str, eth: &str) -> BTreeMap<Symbol, Decimal> {
    [(Symbol::BTC, dec(btc)), (Symbol::ETH, dec(eth))]
        .into_iter()
        .collect()
}

/// Price source that replays queued responses and counts requests
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<TrackerResult<BTreeMap<Symbol, Decimal>>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, prices: BTreeMap<Symbol, Decimal>) {
        self.responses.lock().unwrap().push_back(Ok(prices));
    }

    pub fn push_err(&self, err: TrackerError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch_prices(&self) -> TrackerResult<BTreeMap<Symbol, Decimal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TrackerError::Network("no scripted response left".into())))
    }
}
