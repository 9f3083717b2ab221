//! Core effects processing driver.
//!
//! Partitions a multi-account event log into per-account runs and executes
//! Pipeline -> Folder -> Account State update for each partition. The engine
//! uses streaming CSV processing and keeps only per-account state in memory.

use crate::account::AccountState;
use crate::error::Result;
use crate::event::EventRecord;
use crate::fold;
use crate::pipeline::EffPipeline;
use crate::registry::HandlerRegistry;
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::mem;

/// The effects processing engine.
///
/// Owns the handler registry and every account's state for the lifetime of
/// the run. Input must arrive grouped by account and ordered by timestamp
/// within each account; the engine partitions on contiguous account runs and
/// never sorts. An account reappearing in a later partition resumes from its
/// stored state.
///
/// # Output Ordering
///
/// Final positions are output sorted by account ID, then ticker, to ensure
/// deterministic, reproducible output.
pub struct EffectsEngine {
    /// Handler registry, fully populated before any partition runs.
    registry: HandlerRegistry,

    /// Account states indexed by account ID.
    accounts: HashMap<u32, AccountState>,
}

impl EffectsEngine {
    /// Creates an engine with the built-in domain handlers.
    pub fn new() -> Self {
        EffectsEngine::with_registry(HandlerRegistry::with_default_handlers())
    }

    /// Creates an engine with a caller-supplied registry.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        EffectsEngine {
            registry,
            accounts: HashMap::new(),
        }
    }

    /// Installs prior state for an account, replacing any existing state.
    ///
    /// Supports resuming a fold from balances produced by an earlier run.
    pub fn seed_account(&mut self, acct_id: u32, state: AccountState) {
        self.accounts.insert(acct_id, state);
    }

    /// Returns a reference to an account's state, if it has been seen.
    pub fn account(&self, acct_id: u32) -> Option<&AccountState> {
        self.accounts.get(&acct_id)
    }

    /// Processes event records from a CSV reader in streaming fashion.
    ///
    /// Rows are buffered only until the current account's contiguous run of
    /// events ends, then that partition is executed. Any error aborts the
    /// run: skipping a bad row would silently corrupt account balances.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut partition: Vec<EventRecord> = Vec::new();

        for result in csv_reader.deserialize::<EventRecord>() {
            let record = result?;

            if let Some(last) = partition.last() {
                if last.acct_id != record.acct_id {
                    let events = mem::take(&mut partition);
                    self.run_partition(&events)?;
                }
            }
            partition.push(record);
        }

        self.run_partition(&partition)
    }

    /// Processes an in-memory event log, partitioning on contiguous
    /// same-account runs exactly like [`process_csv`](Self::process_csv).
    pub fn process_events(&mut self, events: &[EventRecord]) -> Result<()> {
        let mut start = 0;
        for i in 1..=events.len() {
            if i == events.len() || events[i].acct_id != events[start].acct_id {
                self.run_partition(&events[start..i])?;
                start = i;
            }
        }
        Ok(())
    }

    /// Runs one account's partition: load scratch state into a fresh
    /// pipeline, fold the resulting effect stream into the account's
    /// positions, and store the scratch state back.
    fn run_partition(&mut self, events: &[EventRecord]) -> Result<()> {
        let acct_id = match events.first() {
            Some(event) => event.acct_id,
            None => return Ok(()),
        };

        let registry = &self.registry;
        let acct = self.accounts.entry(acct_id).or_default();

        let mut pipeline = EffPipeline::new(registry);
        pipeline.load_scratch(acct);
        fold::fold_into(&mut acct.posns, pipeline.run(events))?;
        pipeline.store_scratch(acct);

        debug!(
            "Account {}: processed {} events, {} tickers, t_count {}",
            acct_id,
            events.len(),
            acct.posns.len(),
            acct.t_count
        );

        Ok(())
    }

    /// Writes final per-account positions to CSV.
    ///
    /// One row per (account, ticker), sorted by account ID then ticker, with
    /// balances formatted to exactly 4 decimal places.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["acct_id", "t_count", "ticker", "balance"])?;

        // Sort by account ID then ticker for deterministic output
        let mut accounts: Vec<_> = self.accounts.iter().collect();
        accounts.sort_by_key(|(id, _)| **id);

        for (acct_id, state) in accounts {
            let mut posns: Vec<_> = state.posns.iter().collect();
            posns.sort_by(|(a, _), (b, _)| a.cmp(b));

            for (ticker, balance) in posns {
                csv_writer.write_record([
                    acct_id.to_string(),
                    state.t_count.to_string(),
                    ticker.to_string(),
                    balance.to_string(),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for EffectsEngine {
    fn default() -> Self {
        Self::new()
    }
}
