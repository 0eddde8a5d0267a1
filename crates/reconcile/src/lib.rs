//! # Reconcile
//!
//! Keeps a remote membership list in line with a reference set.
//!
//! Every cycle fetches both sets, computes what is missing on each side,
//! and issues at most one batch add and one batch remove. Nothing is kept
//! between cycles: a cycle that fails halfway is corrected by the next one.
//!
//! ## Core Concepts
//!
//! - **divide**: one-directional set difference, order and duplicates kept
//! - **Diff**: additions (`friends \ members`) and removals (`members \ friends`)
//! - **ListGateway**: fetch/apply primitives against the remote service
//! - **Reconciler**: one fetch, diff, apply pass with per-direction fault isolation
//! - **Scheduler**: runs the reconciler now and on every tick until cancelled
//!
//! ## Example
//!
//! ```
//! use reconcile::{CancelToken, MockGateway, Reconciler, Scheduler};
//! use std::time::Duration;
//!
//! let gateway = MockGateway::new(vec![1, 2, 3], vec![1, 2]);
//! let reconciler = Reconciler::new(&gateway, 42);
//!
//! // a single cycle
//! let result = reconciler.run_cycle();
//! assert_eq!(result.additions_succeeded(), 1);
//!
//! // or forever, until the token is cancelled
//! let cancel = CancelToken::new();
//! let stop = cancel.clone();
//! let mut scheduler = Scheduler::new(Duration::from_secs(60));
//! let report = scheduler.run(&reconciler, &cancel, |_| stop.cancel());
//! assert_eq!(report.cycles, 1);
//! ```

pub mod diff;
pub mod error;
pub mod gateway;
pub mod reconciler;
pub mod scheduler;
pub mod types;

// Re-export main types at crate root
pub use diff::{Diff, DiffSummary, divide};
pub use error::{ApplyError, FetchError, GatewayError};
pub use gateway::{GatewayCall, ListGateway, MockGateway};
pub use reconciler::Reconciler;
pub use scheduler::{
    CancelToken, Clock, IntervalTicker, MAX_INTERVAL, Scheduler, SchedulerReport, SystemClock, TickWait,
    Ticker, format_interval,
};
pub use types::{
    ApplyOutcome, ApplyStatus, CycleResult, Direction, Identifier, IdentifierSet, ListId,
    ReconcileOptions,
};
