//! # Effects Engine
//!
//! A streaming ETL processor that turns timestamped account event records
//! into typed effects and folds them into per-account position state.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: Uses 4 decimal places via `rust_decimal`
//! - **Explicit dispatch**: Handlers carry a `Stateless`/`Stateful` kind tag;
//!   calling conventions are never inferred from a failed call
//! - **Lazy effects**: The pipeline yields effects as a pull-based stream,
//!   consumed immediately by the folder
//! - **Deterministic output**: Positions sorted by account ID, then ticker
//!
//! ## Example
//!
//! ```no_run
//! use effects_engine::EffectsEngine;
//! use std::io::Cursor;
//!
//! let csv = "type,acct_id,ticker,amt,price,ts\nbuy,1,GOOG,4,640,1\n";
//! let mut engine = EffectsEngine::new();
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! engine.write_output(std::io::stdout()).unwrap();
//! ```

pub mod account;
pub mod decimal;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod fold;
pub mod handlers;
pub mod pipeline;
pub mod registry;

pub use account::{AccountState, Positions};
pub use decimal::Decimal4;
pub use effect::{Effect, CASH_TICKER};
pub use engine::EffectsEngine;
pub use error::{EngineError, Result};
pub use event::EventRecord;
pub use fold::{fold, fold_into};
pub use pipeline::{EffPipeline, EffectStream, ScratchState};
pub use registry::{Handler, HandlerRegistry};
