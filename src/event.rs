//! Raw event records as read from CSV.
//!
//! Events are open-ended key-value rows; only the common fields plus any
//! handler-specific fields are typed here. Fields beyond `acct_id` are
//! optional at the parse layer so that a missing field surfaces as a
//! `MissingField` error at dispatch time rather than a CSV-shape error.

use crate::decimal::Decimal4;
use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::str::FromStr;

/// One logged occurrence, to be ETL'd into effects.
///
/// CSV columns: `type,acct_id,ticker,amt,price,ts`. The `price` column is
/// only meaningful for trade events and is left empty otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    /// Event type tag used for handler dispatch.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Account the event belongs to. Required: the driver partitions by it.
    pub acct_id: u32,

    /// Ticker the event refers to.
    pub ticker: Option<String>,

    /// Event amount, parsed lazily so empty cells become `MissingField`.
    pub amt: Option<String>,

    /// Trade price (trade events only).
    pub price: Option<String>,

    /// Event timestamp. Events within one account must arrive in `ts` order.
    pub ts: Option<u64>,
}

impl EventRecord {
    /// Returns the event type tag, or `MissingField` if the cell was empty.
    pub fn event_type(&self) -> Result<&str> {
        let tag = self.event_type.trim();
        if tag.is_empty() {
            return Err(EngineError::MissingField { field: "type" });
        }
        Ok(tag)
    }

    /// Returns the ticker, or `MissingField` if absent.
    pub fn ticker(&self) -> Result<&str> {
        match self.ticker.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(EngineError::MissingField { field: "ticker" }),
        }
    }

    /// Returns the parsed amount.
    pub fn amt(&self) -> Result<Decimal4> {
        parse_decimal_field("amt", self.amt.as_deref())
    }

    /// Returns the parsed trade price.
    pub fn price(&self) -> Result<Decimal4> {
        parse_decimal_field("price", self.price.as_deref())
    }

    /// Returns the timestamp, or `MissingField` if absent.
    pub fn ts(&self) -> Result<u64> {
        self.ts.ok_or(EngineError::MissingField { field: "ts" })
    }

    /// Extracts the common fields every handler needs:
    /// `(ticker, amt, acct_id, ts)`.
    pub fn common_fields(&self) -> Result<(String, Decimal4, u32, u64)> {
        Ok((
            self.ticker()?.to_string(),
            self.amt()?,
            self.acct_id,
            self.ts()?,
        ))
    }
}

fn parse_decimal_field(field: &'static str, value: Option<&str>) -> Result<Decimal4> {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(EngineError::MissingField { field }),
    };

    Decimal4::from_str(raw).map_err(|_| EngineError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}
