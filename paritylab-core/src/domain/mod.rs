//! Domain types for ParityLab

pub mod fixed_point;
pub mod ids;
pub mod signal;
pub mod trace;

pub use fixed_point::FixedPoint;
pub use ids::{ReportHash, Tick};
pub use signal::Signal;
pub use trace::Trace;
