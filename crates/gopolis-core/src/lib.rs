//! Gopolis Core -- a tiny city economy and the dispatcher that drives it.
//!
//! Gophers live in residentials, work in commercials and industrials, and
//! buy goods. Buildings hold capacity-bounded worker rosters and produce
//! along a fixed supply chain:
//!
//! ```text
//!   Industrial ──products──▶ Commercial ──goods──▶ Gopher
//! ```
//!
//! # Daily Cycle
//!
//! Each call to [`driver::Simulation::step_day`] runs:
//!
//! 1. **Shuffle** -- re-shuffle the agent order with the seeded generator.
//! 2. **Shop** -- agents buy goods, pulling production through the chain.
//! 3. **Work** -- agents that have not worked yet look for a shift.
//! 4. **Sleep** -- happiness settles and daily flags reset.
//!
//! # Message Routing
//!
//! Input and timing arrive as [`event::Message`]s flagged with
//! [`kind::EventKind`] bits. A handler registered under a mask fires for
//! every message whose flags contain that mask:
//!
//! ```rust
//! use gopolis_core::event::{Dispatcher, Message};
//! use gopolis_core::kind::EventKind;
//!
//! let mut dispatcher = Dispatcher::<Vec<&str>>::new();
//! dispatcher.subscribe(EventKind::POSITION, |log, _| log.push("position"));
//!
//! let mut log = Vec::new();
//! dispatcher.publish(&mut log, Message::signal(EventKind::ADD | EventKind::POSITION));
//! assert_eq!(log, ["position"]);
//! ```
//!
//! # Key Types
//!
//! - [`economy::Economy`] -- population arena, buildings, hiring and
//!   production.
//! - [`driver::Simulation`] -- seeded day driver with state hashing.
//! - [`event::Dispatcher`] -- mask-routed publish/subscribe.
//! - [`session::Session`] -- dispatcher context for interactive runs.
//! - [`event_loop::EventLoop`] -- single-consumer channel loop with ticks.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`serialize`] -- versioned snapshots via bitcode.

pub mod agent;
pub mod building;
pub mod config;
pub mod driver;
pub mod economy;
pub mod event;
pub mod event_loop;
pub mod fixed;
pub mod id;
pub mod input;
pub mod kind;
pub mod query;
pub mod registry;
pub mod rng;
pub mod serialize;
pub mod session;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
