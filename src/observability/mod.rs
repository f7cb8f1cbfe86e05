//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding pipeline produces:
//!     → tracing events (debug per stage, warn for out-of-band failures)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Host installs:
//!     → logging.rs (tracing-subscriber registry)
//!     → a metrics recorder/exporter of its choice
//! ```
//!
//! # Design Decisions
//! - The core never logs-and-swallows a returned error; the host decides
//! - Metrics are cheap no-ops until the host installs a recorder

pub mod logging;
pub mod metrics;
