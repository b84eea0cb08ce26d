//! Ice Core Stack
//!
//! Resampling and grouped statistics for vertically-resolved ice-core
//! measurements. Irregularly-sampled per-core profiles (step-type
//! section measurements like salinity, continuous-type point
//! measurements like temperature) are normalized onto a common
//! vertical datum, resampled onto a shared depth grid without
//! violating conservation of the measured quantity, and reduced to
//! per-bin descriptive statistics with contributor provenance.
//!
//! The engine is purely in-memory and single-threaded: an external
//! importer produces [`profile::Profile`] values, and the plotting or
//! export layer consumes the resampled rows and statistics cells.

pub mod orientation;
pub mod profile;
pub mod resampler;
pub mod stack;
pub mod stats;
pub mod utils;
