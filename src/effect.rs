//! The `Effect` value type.
//!
//! Every event type is ETL'd into effects, and effects are folded into
//! account positions. Keeping a single intermediate type means the folding
//! step never needs to know which event produced a given balance change.

use crate::decimal::Decimal4;

/// Reserved ticker for the cash leg of a trade.
pub const CASH_TICKER: &str = "CASH";

/// An immutable record of one atomic balance change for one
/// (ticker, account) at one point in time.
///
/// Effects are values: equality is structural and an effect is never
/// mutated after construction. A single input event may produce zero, one,
/// or many effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    /// Ticker whose balance changes (including the reserved `CASH` ticker).
    pub ticker: String,

    /// Signed balance delta.
    pub amt: Decimal4,

    /// Account the change applies to.
    pub acct_id: u32,

    /// Timestamp of the originating event.
    pub ts: u64,
}

impl Effect {
    /// Creates a new effect.
    pub fn new(ticker: impl Into<String>, amt: Decimal4, acct_id: u32, ts: u64) -> Self {
        Effect {
            ticker: ticker.into(),
            amt,
            acct_id,
            ts,
        }
    }
}
