//! Focusing of time-of-flight spectra onto a new nominal geometry.
//!
//! A monitor on the beam line is resampled onto an angular bank through
//! [`BankRatios`]; a detector spectrum is relabelled in place by a single
//! [`FocusMode`] factor applied to its x scale.

pub mod builder;
pub mod transform;

pub use builder::{AppliedFocus, BankFocus, FocusRequest, FocusedSpectrum, FocusedSpectrumBuilder};
pub use transform::{BankRatios, FocusMode, bank_source_intervals, focused_difc};
