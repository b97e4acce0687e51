//! Histogram binning and time-of-flight focusing for neutron-scattering
//! data reduction.
//!
//! The crate is a pure numerical core: every operation takes immutable
//! inputs and returns freshly allocated boundaries, values and errors.

pub mod binning;
pub mod common;
pub mod domain;
pub mod focus;
pub mod resample;

pub use binning::{Histogram, UniformXScale, VariableXScale, XScale};
pub use common::{FocusConfig, FocusConfigError, load_focus_config};
pub use domain::{
    CalibrationConstant, DetectorGeometry, DetectorPosition, FocusError, FocusErrorCategory,
    FocusResult, FocusTarget, SpectrumMetadata,
};
pub use focus::{
    AppliedFocus, BankFocus, FocusMode, FocusRequest, FocusedSpectrum, FocusedSpectrumBuilder,
};
pub use resample::{ResampleInput, ResampleOutput};
