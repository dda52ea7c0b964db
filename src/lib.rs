//! # drrsim — Deficit Round Robin link simulator
//!
//! A discrete-event model of one output link shared by several
//! independently arriving flows and arbitrated by Deficit Round Robin.
//! No async, no threads, no wall-clock time: a single loop driven by a
//! simulated clock and a seeded RNG.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          Simulator            │ ← event loop, owns simulated time
//! │  ┌───────────┐ ┌───────────┐ │
//! │  │ EventQueue│ │ FlowModel │ │ ← pending events / arrival processes
//! │  └───────────┘ └───────────┘ │
//! │  ┌───────────┐ ┌───────────┐ │
//! │  │ QueueBank │ │    DRR    │ │ ← per-flow FIFOs / eligibility pass
//! │  └───────────┘ └───────────┘ │
//! │  ┌─────────────────────────┐ │
//! │  │   StatisticsCollector   │ │ ← time-weighted accumulators
//! │  └─────────────────────────┘ │
//! └──────────────────────────────┘
//!        ▲                 │
//!   ScenarioBuilder   SimulationReport
//! ```

pub mod drr;
pub mod error;
pub mod event;
pub mod flow;
pub mod queue;
pub mod report;
pub mod scenario;
pub mod scheduler;
pub mod simulation;
pub mod stats;
pub mod time;

// Re-exports for convenience.
pub use drr::DeficitRoundRobin;
pub use error::{SimError, SimResult};
pub use event::{Event, EventKind};
pub use flow::{FlowKind, FlowModel, FlowSpec, LINK_SPEED_BPS, PACKET_SIZE_BITS};
pub use queue::{Packet, QueueBank};
pub use report::{FlowReport, SimulationReport};
pub use scenario::{Scenario, ScenarioBuilder};
pub use scheduler::EventQueue;
pub use simulation::Simulator;
pub use stats::{FlowStats, StatisticsCollector};
pub use time::SimTime;
