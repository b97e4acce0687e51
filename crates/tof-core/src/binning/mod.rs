pub mod histogram;
pub mod xscale;

pub use histogram::Histogram;
pub use xscale::{UniformXScale, VariableXScale, XScale};

pub(crate) use xscale::containing_bin_in;
