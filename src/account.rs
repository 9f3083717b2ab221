//! Per-account state: the position map and persistent scalars.

use crate::decimal::Decimal4;
use std::collections::HashMap;

/// Ticker-to-balance mapping where absent tickers read as zero.
///
/// Balances are signed; the reserved `CASH` ticker is an ordinary key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positions {
    balances: HashMap<String, Decimal4>,
}

impl Positions {
    /// Creates an empty position map.
    pub fn new() -> Self {
        Positions {
            balances: HashMap::new(),
        }
    }

    /// Returns the balance for `ticker`, defaulting to zero if unseen.
    pub fn get(&self, ticker: &str) -> Decimal4 {
        self.balances
            .get(ticker)
            .copied()
            .unwrap_or(Decimal4::ZERO)
    }

    /// Adds `amt` to the balance for `ticker`, creating the entry if needed.
    pub fn add(&mut self, ticker: &str, amt: Decimal4) {
        *self
            .balances
            .entry(ticker.to_string())
            .or_insert(Decimal4::ZERO) += amt;
    }

    /// Iterates over `(ticker, balance)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal4)> {
        self.balances.iter().map(|(t, b)| (t.as_str(), *b))
    }

    /// Number of tickers with an entry (including explicit zeroes).
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Returns `true` if no ticker has an entry.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FromIterator<(String, Decimal4)> for Positions {
    fn from_iter<I: IntoIterator<Item = (String, Decimal4)>>(iter: I) -> Self {
        Positions {
            balances: iter.into_iter().collect(),
        }
    }
}

/// Durable per-account state, owned by the driver across the whole run.
///
/// Created with defaults the first time an account is seen, then loaded,
/// mutated via a full pipeline run, and stored back once per partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountState {
    /// Count of `T` events cleared for this account, across all runs.
    pub t_count: u64,

    /// Ticker-to-balance positions.
    pub posns: Positions,
}

impl AccountState {
    /// Creates a fresh account state: zero counter, no positions.
    pub fn new() -> Self {
        AccountState::default()
    }

    /// Creates an account state with prior scalars and positions.
    pub fn with(t_count: u64, posns: Positions) -> Self {
        AccountState { t_count, posns }
    }
}
