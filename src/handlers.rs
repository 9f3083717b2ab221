//! Domain handlers: the ETL step from event records to effects.

use crate::decimal::Decimal4;
use crate::effect::{Effect, CASH_TICKER};
use crate::error::Result;
use crate::event::EventRecord;
use crate::pipeline::ScratchState;

/// Handles independent trade events (`buy` and `sell`).
///
/// A buy increases the ticker position by `amt` and decreases cash by
/// `amt * price`; a sell mirrors both signs. Emits exactly two effects,
/// ticker leg first.
pub fn trade_handler(event: &EventRecord) -> Result<Vec<Effect>> {
    let (ticker, amt, acct_id, ts) = event.common_fields()?;
    let price = event.price()?;

    let signed_amt = if event.event_type()? == "sell" {
        -amt
    } else {
        amt
    };

    Ok(vec![
        Effect::new(ticker, signed_amt, acct_id, ts),
        Effect::new(CASH_TICKER, -(signed_amt * price), acct_id, ts),
    ])
}

/// Handles stateful clearing events (`T`).
///
/// The amount that clears is the larger of the requested amount and the
/// count of `T` events already processed for this account, a monotonic
/// floor that grows by one per `T` event regardless of `amt`. The counter
/// is read before this event and incremented after.
pub fn clearing_handler(scratch: &mut ScratchState, event: &EventRecord) -> Result<Vec<Effect>> {
    let (ticker, amt, acct_id, ts) = event.common_fields()?;

    let floor = Decimal4::from(scratch.t_count);
    scratch.t_count += 1;

    Ok(vec![Effect::new(ticker, floor.max(amt), acct_id, ts)])
}
