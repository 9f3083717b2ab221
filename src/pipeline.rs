//! The effect pipeline: ordered event records in, lazy effect stream out.
//!
//! One pipeline instance serves exactly one account for one run. Stateful
//! handlers read and mutate the pipeline's scratch state, which the driver
//! syncs with the durable `AccountState` before and after the run.

use crate::account::AccountState;
use crate::effect::Effect;
use crate::error::Result;
use crate::event::EventRecord;
use crate::registry::{Handler, HandlerRegistry};
use log::debug;
use std::collections::VecDeque;

/// Pipeline-local scratch state available to stateful handlers.
///
/// Every field a handler may read or write is declared here; there is no
/// implicit shared-attribute convention between pipeline and handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScratchState {
    /// Count of `T` events cleared so far for the current account.
    pub t_count: u64,
}

/// ETL pipeline turning one account's event records into effects.
pub struct EffPipeline<'r> {
    registry: &'r HandlerRegistry,
    scratch: ScratchState,
}

impl<'r> EffPipeline<'r> {
    /// Creates a pipeline with zeroed scratch state.
    pub fn new(registry: &'r HandlerRegistry) -> Self {
        EffPipeline {
            registry,
            scratch: ScratchState::default(),
        }
    }

    /// Copies the persistent scalar state of `acct` into this pipeline.
    pub fn load_scratch(&mut self, acct: &AccountState) {
        self.scratch.t_count = acct.t_count;
    }

    /// Copies this pipeline's scalar state back into `acct`.
    pub fn store_scratch(&self, acct: &mut AccountState) {
        acct.t_count = self.scratch.t_count;
    }

    /// Returns the current scratch state.
    pub fn scratch(&self) -> &ScratchState {
        &self.scratch
    }

    /// Runs the pipeline over `events`, yielding effects lazily.
    ///
    /// Events must belong to a single account and be ordered by timestamp;
    /// the stateful clearing counter makes same-account order significant.
    /// Effects are yielded in event order, then handler-registration order,
    /// then within-handler emission order. The stream ends after yielding
    /// its first error.
    pub fn run<'a>(&'a mut self, events: &'a [EventRecord]) -> EffectStream<'a> {
        EffectStream {
            registry: self.registry,
            scratch: &mut self.scratch,
            events: events.iter(),
            buffer: VecDeque::new(),
            failed: false,
        }
    }
}

/// Lazy iterator over the effects produced by one pipeline run.
pub struct EffectStream<'a> {
    registry: &'a HandlerRegistry,
    scratch: &'a mut ScratchState,
    events: std::slice::Iter<'a, EventRecord>,
    buffer: VecDeque<Effect>,
    failed: bool,
}

impl EffectStream<'_> {
    /// Dispatches one event to its registered handlers, buffering every
    /// effect they emit.
    fn dispatch(&mut self, event: &EventRecord) -> Result<()> {
        let event_type = event.event_type()?;
        let handlers = self.registry.lookup(event_type);

        if handlers.is_empty() {
            debug!(
                "No handlers for event type '{}' (acct {}), no effects",
                event_type, event.acct_id
            );
        }

        for handler in handlers {
            let effects = match handler {
                Handler::Stateless(f) => f(event)?,
                Handler::Stateful(f) => f(self.scratch, event)?,
            };
            self.buffer.extend(effects);
        }

        Ok(())
    }
}

impl Iterator for EffectStream<'_> {
    type Item = Result<Effect>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(effect) = self.buffer.pop_front() {
                return Some(Ok(effect));
            }
            if self.failed {
                return None;
            }

            let event = self.events.next()?;
            if let Err(e) = self.dispatch(event) {
                // Drop anything buffered by earlier handlers of the failing
                // event: nothing is yielded after the error.
                self.buffer.clear();
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal4;
    use crate::error::EngineError;
    use crate::registry::Handler;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal4 {
        Decimal4::from_str(s).unwrap()
    }

    fn event(event_type: &str, ticker: &str, amt: &str, ts: u64) -> EventRecord {
        EventRecord {
            event_type: event_type.to_string(),
            acct_id: 1,
            ticker: Some(ticker.to_string()),
            amt: Some(amt.to_string()),
            price: None,
            ts: Some(ts),
        }
    }

    fn collect(pipeline: &mut EffPipeline, events: &[EventRecord]) -> Vec<Effect> {
        pipeline
            .run(events)
            .collect::<Result<Vec<_>>>()
            .expect("pipeline run failed")
    }

    #[test]
    fn test_unknown_event_type_yields_no_effects() {
        let registry = HandlerRegistry::with_default_handlers();
        let mut pipeline = EffPipeline::new(&registry);

        let events = vec![event("split", "GOOG", "2", 1)];
        assert!(collect(&mut pipeline, &events).is_empty());
    }

    #[test]
    fn test_missing_type_fails_the_run() {
        let registry = HandlerRegistry::with_default_handlers();
        let mut pipeline = EffPipeline::new(&registry);

        let events = vec![event("", "GOOG", "2", 1)];
        let results: Vec<_> = pipeline.run(&events).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(EngineError::MissingField { field: "type" })
        ));
    }

    #[test]
    fn test_stateful_counter_advances_across_events() {
        let registry = HandlerRegistry::with_default_handlers();
        let mut pipeline = EffPipeline::new(&registry);
        pipeline.scratch.t_count = 4;

        let events = vec![
            event("T", "AAPL", "5", 1),
            event("T", "AAPL", "30", 2),
            event("T", "AAPL", "4", 3),
        ];
        let effects = collect(&mut pipeline, &events);

        assert_eq!(
            effects,
            vec![
                Effect::new("AAPL", dec("5"), 1, 1),
                Effect::new("AAPL", dec("30"), 1, 2),
                Effect::new("AAPL", dec("6"), 1, 3),
            ]
        );
        assert_eq!(pipeline.scratch().t_count, 7);
    }

    #[test]
    fn test_effects_follow_registration_order() {
        fn first(event: &EventRecord) -> Result<Vec<Effect>> {
            Ok(vec![Effect::new("FIRST", event.amt()?, 1, 1)])
        }
        fn second(event: &EventRecord) -> Result<Vec<Effect>> {
            Ok(vec![Effect::new("SECOND", event.amt()?, 1, 1)])
        }

        let mut registry = HandlerRegistry::new();
        registry.register("x", Handler::Stateless(first));
        registry.register("x", Handler::Stateless(second));

        let mut pipeline = EffPipeline::new(&registry);
        let events = vec![event("x", "ignored", "1", 1)];
        let effects = collect(&mut pipeline, &events);

        assert_eq!(effects[0].ticker, "FIRST");
        assert_eq!(effects[1].ticker, "SECOND");
    }

    #[test]
    fn test_stream_ends_at_first_error() {
        fn emit_ok(event: &EventRecord) -> Result<Vec<Effect>> {
            Ok(vec![Effect::new("OK", event.amt()?, 1, 1)])
        }
        fn needs_price(event: &EventRecord) -> Result<Vec<Effect>> {
            event.price()?;
            Ok(vec![])
        }

        let mut registry = HandlerRegistry::new();
        registry.register("x", Handler::Stateless(emit_ok));
        registry.register("x", Handler::Stateless(needs_price));

        let mut pipeline = EffPipeline::new(&registry);
        let events = vec![event("x", "ignored", "1", 1)];
        let results: Vec<_> = pipeline.run(&events).collect();

        // The first handler's buffered effect must not leak out after the
        // second handler's failure; the error is the only item yielded.
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(EngineError::MissingField { field: "price" })
        ));
    }

    #[test]
    fn test_duplicate_handler_runs_twice() {
        fn emit(event: &EventRecord) -> Result<Vec<Effect>> {
            Ok(vec![Effect::new("X", event.amt()?, 1, 1)])
        }

        let mut registry = HandlerRegistry::new();
        registry.register("x", Handler::Stateless(emit));
        registry.register("x", Handler::Stateless(emit));

        let mut pipeline = EffPipeline::new(&registry);
        let events = vec![event("x", "ignored", "1", 1)];

        assert_eq!(collect(&mut pipeline, &events).len(), 2);
    }

    #[test]
    fn test_scratch_sync_with_account_state() {
        let registry = HandlerRegistry::with_default_handlers();
        let mut pipeline = EffPipeline::new(&registry);

        let mut acct = AccountState {
            t_count: 3,
            ..Default::default()
        };

        pipeline.load_scratch(&acct);
        assert_eq!(pipeline.scratch().t_count, 3);

        pipeline.scratch.t_count = 9;
        pipeline.store_scratch(&mut acct);
        assert_eq!(acct.t_count, 9);
    }
}
