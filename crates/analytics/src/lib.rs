//! # Media Forecast Analytics Engine
//!
//! This crate turns a campaign's input tuple into the funnel metrics it
//! implies: impressions, clicks, orders, revenue, ROAS and acquisition cost.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   terminal, files or configuration. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `ForecastEngine::derive` is a pure function of
//!   the inputs. The only state is `ForecastState`, an explicit value that keeps
//!   the current snapshot and the one before it for percentage deltas.
//!
//! ## Public API
//!
//! - `ForecastEngine`: the ten-formula derivation.
//! - `percent_change`: the delta comparator.
//! - `ForecastState`: current/previous snapshot pair driven by input changes.
//! - `ForecastReport` / `MetricDeltas`: the serializable result of a forecast.
//! - `sweep`: one-input sensitivity tables.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod state;
pub mod sweep;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{percent_change, ForecastEngine};
pub use error::AnalyticsError;
pub use report::{ForecastReport, MetricDeltas};
pub use state::ForecastState;
pub use sweep::{sweep, SweepPoint, SweepRange, MAX_SWEEP_POINTS};
