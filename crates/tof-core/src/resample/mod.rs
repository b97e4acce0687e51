//! Fractional-overlap redistribution of histogram bins onto arbitrary
//! source-space intervals.
//!
//! Each destination bin is described by the interval `[lo, hi]` it covers in
//! the source x units. The partially covered source bins at either end
//! contribute the covered fraction of their content, fully covered bins
//! contribute everything, and the total is divided by the number of
//! equivalent source bins. That normalisation counts bins rather than x-width,
//! so it is exact for evenly spaced sources and approximate otherwise.
//! An interval that starts and ends inside one source bin copies that bin
//! unscaled. Intervals that leave the source coverage produce `0`.

use crate::binning::{XScale, containing_bin_in};
use crate::domain::{FocusError, FocusResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleInput<'a> {
    pub x_scale: &'a XScale,
    pub values: &'a [f32],
    pub intervals: &'a [(f32, f32)],
}

impl<'a> ResampleInput<'a> {
    pub fn new(x_scale: &'a XScale, values: &'a [f32], intervals: &'a [(f32, f32)]) -> Self {
        Self {
            x_scale,
            values,
            intervals,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResampleOutput {
    pub values: Vec<f32>,
    /// Destination bins set to zero because their interval left the source.
    pub out_of_coverage: usize,
}

/// Source bins touched by one destination interval.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Overlap {
    min_bin: usize,
    max_bin: usize,
    first_fraction: f32,
    last_fraction: f32,
}

impl Overlap {
    fn locate(boundaries: &[f32], lo: f32, hi: f32) -> Option<Self> {
        let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        let min_bin = containing_bin_in(boundaries, lo)?;
        let max_bin = containing_bin_in(boundaries, hi)?;

        let first_fraction = (boundaries[min_bin + 1] - lo)
            / (boundaries[min_bin + 1] - boundaries[min_bin]);
        let last_fraction =
            (hi - boundaries[max_bin]) / (boundaries[max_bin + 1] - boundaries[max_bin]);

        Some(Self {
            min_bin,
            max_bin,
            first_fraction,
            last_fraction,
        })
    }

    fn is_single_bin(&self) -> bool {
        self.min_bin == self.max_bin
    }

    fn equivalent_bins(&self) -> f32 {
        self.first_fraction + (self.max_bin - self.min_bin - 1) as f32 + self.last_fraction
    }

    fn apportion(&self, values: &[f32]) -> f32 {
        if self.is_single_bin() {
            return values[self.min_bin];
        }
        let interior: f32 = values[self.min_bin + 1..self.max_bin].iter().sum();
        let total = self.first_fraction * values[self.min_bin]
            + interior
            + self.last_fraction * values[self.max_bin];
        total / self.equivalent_bins()
    }

    fn apportion_in_quadrature(&self, errors: &[f32]) -> f32 {
        if self.is_single_bin() {
            return errors[self.min_bin];
        }
        let interior: f32 = errors[self.min_bin + 1..self.max_bin]
            .iter()
            .map(|error| error * error)
            .sum();
        let first = self.first_fraction * errors[self.min_bin];
        let last = self.last_fraction * errors[self.max_bin];
        (first * first + interior + last * last).sqrt() / self.equivalent_bins()
    }
}

/// Computes one value per interval from the source histogram.
pub fn resample_intervals(input: ResampleInput<'_>) -> FocusResult<ResampleOutput> {
    let boundaries = histogram_boundaries(input.x_scale, input.values, "values")?;
    Ok(apply(&boundaries, input.intervals, |overlap| {
        overlap.apportion(input.values)
    }))
}

/// Error counterpart of [`resample_intervals`]: the same overlap weights,
/// combined in quadrature.
pub fn resample_errors(input: ResampleInput<'_>) -> FocusResult<ResampleOutput> {
    let boundaries = histogram_boundaries(input.x_scale, input.values, "errors")?;
    Ok(apply(&boundaries, input.intervals, |overlap| {
        overlap.apportion_in_quadrature(input.values)
    }))
}

/// Resamples onto the bins of `destination`, each bin serving as its own
/// source interval.
pub fn resample_onto(
    x_scale: &XScale,
    values: &[f32],
    destination: &XScale,
) -> FocusResult<ResampleOutput> {
    let intervals = bin_intervals(destination);
    resample_intervals(ResampleInput::new(x_scale, values, &intervals))
}

pub fn bin_intervals(x_scale: &XScale) -> Vec<(f32, f32)> {
    x_scale
        .boundaries()
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

fn histogram_boundaries(
    x_scale: &XScale,
    values: &[f32],
    field: &'static str,
) -> FocusResult<Vec<f32>> {
    let points = x_scale.count();
    if values.len() + 1 != points {
        return Err(FocusError::LengthMismatch {
            field,
            actual: values.len(),
            points,
        });
    }
    Ok(x_scale.boundaries())
}

fn apply(
    boundaries: &[f32],
    intervals: &[(f32, f32)],
    mut combine: impl FnMut(&Overlap) -> f32,
) -> ResampleOutput {
    let mut out_of_coverage = 0;
    let values = intervals
        .iter()
        .map(|&(lo, hi)| match Overlap::locate(boundaries, lo, hi) {
            Some(overlap) => combine(&overlap),
            None => {
                out_of_coverage += 1;
                0.0
            }
        })
        .collect();

    ResampleOutput {
        values,
        out_of_coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::{Overlap, ResampleInput, resample_errors, resample_intervals, resample_onto};
    use crate::binning::XScale;
    use crate::domain::FocusError;

    fn source() -> (XScale, Vec<f32>) {
        (
            XScale::variable(&[0.0, 1.0, 2.0, 3.0, 4.0]).expect("source scale"),
            vec![10.0, 20.0, 30.0, 40.0],
        )
    }

    #[test]
    fn spanning_interval_normalises_by_equivalent_bins() {
        let (scale, values) = source();
        let output = resample_intervals(ResampleInput::new(&scale, &values, &[(0.5, 2.5)]))
            .expect("resample");
        assert_eq!(output.values, vec![22.5]);
        assert_eq!(output.out_of_coverage, 0);
    }

    #[test]
    fn reversed_interval_is_reordered() {
        let (scale, values) = source();
        let output = resample_intervals(ResampleInput::new(&scale, &values, &[(2.5, 0.5)]))
            .expect("resample");
        assert_eq!(output.values, vec![22.5]);
    }

    #[test]
    fn interval_inside_one_bin_copies_it_unscaled() {
        let (scale, values) = source();
        let output = resample_intervals(ResampleInput::new(&scale, &values, &[(1.2, 1.3)]))
            .expect("resample");
        assert_eq!(output.values, vec![20.0]);
    }

    #[test]
    fn intervals_leaving_coverage_are_zero() {
        let (scale, values) = source();
        let intervals = [(-1.0, 0.5), (3.5, 4.5), (5.0, 6.0), (1.0, 2.0)];
        let output =
            resample_intervals(ResampleInput::new(&scale, &values, &intervals)).expect("resample");
        assert_eq!(output.values[..3], [0.0, 0.0, 0.0]);
        assert_eq!(output.values[3], 20.0);
        assert_eq!(output.out_of_coverage, 3);
    }

    #[test]
    fn resampling_onto_own_scale_is_identity() {
        let scales = [
            XScale::uniform(100.0, 200.0, 11).expect("uniform"),
            XScale::variable(&[1.0, 1.5, 3.0, 3.25, 7.0, 9.0]).expect("variable"),
        ];
        for scale in scales {
            let values: Vec<f32> = (0..scale.count() - 1)
                .map(|bin| (bin * bin) as f32 + 0.5)
                .collect();
            let output = resample_onto(&scale, &values, &scale).expect("resample");
            assert_eq!(output.values, values);
        }
    }

    #[test]
    fn errors_combine_in_quadrature() {
        let (scale, _) = source();
        let errors = [3.0, 4.0, 2.0, 1.0];
        let intervals = [(0.5, 2.5), (3.1, 3.2)];
        let output =
            resample_errors(ResampleInput::new(&scale, &errors, &intervals)).expect("resample");

        let expected = (1.5_f32 * 1.5 + 16.0 + 1.0).sqrt() / 2.0;
        assert!((output.values[0] - expected).abs() < 1.0e-6);
        assert_eq!(output.values[1], 1.0);
    }

    #[test]
    fn function_data_is_rejected() {
        let (scale, _) = source();
        let error = resample_intervals(ResampleInput::new(&scale, &[1.0; 5], &[(0.0, 1.0)]))
            .expect_err("function data cannot be resampled");
        assert!(matches!(error, FocusError::LengthMismatch { .. }));
    }

    #[test]
    fn overlap_reports_fractions_of_end_bins() {
        let boundaries = [0.0, 1.0, 2.0, 3.0, 4.0];
        let overlap = Overlap::locate(&boundaries, 0.5, 2.5).expect("inside coverage");
        assert_eq!((overlap.min_bin, overlap.max_bin), (0, 2));
        assert_eq!(overlap.first_fraction, 0.5);
        assert_eq!(overlap.last_fraction, 0.5);
        assert_eq!(overlap.equivalent_bins(), 2.0);
    }
}
