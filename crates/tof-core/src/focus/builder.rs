use super::transform::{BankRatios, FocusMode, bank_source_intervals};
use crate::binning::{Histogram, XScale};
use crate::common::FocusConfig;
use crate::domain::{
    DetectorGeometry, DetectorPosition, FocusError, FocusResult, FocusTarget, GeometryAttribute,
    SpectrumMetadata,
};
use crate::resample::{ResampleInput, resample_errors, resample_intervals};

/// Destination bank of a monitor-to-bank focus. Without an explicit
/// destination scale the monitor's own binning is reused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankFocus<'a> {
    pub geometry: DetectorGeometry,
    pub destination: Option<&'a XScale>,
}

impl<'a> BankFocus<'a> {
    pub fn new(geometry: DetectorGeometry) -> Self {
        Self {
            geometry,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: &'a XScale) -> Self {
        self.destination = Some(destination);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRequest<'a> {
    pub spectrum: &'a Histogram,
    pub metadata: &'a SpectrumMetadata,
    pub target: FocusTarget,
    pub bank: Option<BankFocus<'a>>,
}

impl<'a> FocusRequest<'a> {
    pub fn new(
        spectrum: &'a Histogram,
        metadata: &'a SpectrumMetadata,
        target: FocusTarget,
    ) -> Self {
        Self {
            spectrum,
            metadata,
            target,
            bank: None,
        }
    }

    pub fn with_bank(mut self, bank: BankFocus<'a>) -> Self {
        self.bank = Some(bank);
        self
    }
}

/// Which transform produced a focused spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppliedFocus {
    Bank {
        ratios: BankRatios,
        out_of_coverage: usize,
    },
    Relabel {
        mode: FocusMode,
        factor: f64,
    },
}

/// A focused histogram together with the metadata the caller stores back
/// on the new spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedSpectrum {
    pub histogram: Histogram,
    pub metadata: SpectrumMetadata,
    pub applied: AppliedFocus,
}

#[derive(Debug, Clone, Default)]
pub struct FocusedSpectrumBuilder {
    config: FocusConfig,
}

impl FocusedSpectrumBuilder {
    pub fn new(config: FocusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Focuses one spectrum. A calibrated spectrum is always relabelled;
    /// otherwise a request carrying a bank is resampled onto it and anything
    /// else is relabelled from its geometry.
    pub fn build(&self, request: FocusRequest<'_>) -> FocusResult<FocusedSpectrum> {
        match request.bank {
            Some(bank) if request.metadata.calibration.is_none() => self.focus_to_bank(
                request.spectrum,
                request.metadata,
                &request.target,
                bank,
            ),
            _ => self.relabel(request.spectrum, request.metadata, &request.target),
        }
    }

    /// Rescales the x scale of `spectrum` onto the target geometry. Values and
    /// errors are carried over unchanged.
    pub fn relabel(
        &self,
        spectrum: &Histogram,
        metadata: &SpectrumMetadata,
        target: &FocusTarget,
    ) -> FocusResult<FocusedSpectrum> {
        target.validate()?;
        let (position, initial_path) = required_geometry(spectrum, metadata)?;

        let mode = FocusMode::select(
            &position,
            initial_path,
            metadata.calibration,
            target,
            self.config.difc_constant,
        );
        let factor = mode.relabel_factor(target, initial_path);
        tracing::debug!(
            group_id = spectrum.group_id(),
            mode = mode.name(),
            factor,
            "relabelling spectrum"
        );

        let x_scale = spectrum.x_scale().scaled(factor)?;
        let histogram = Histogram::new(
            x_scale,
            spectrum.values().to_vec(),
            spectrum.errors().map(<[f32]>::to_vec),
            target.new_group_id,
        )?;

        Ok(FocusedSpectrum {
            histogram,
            metadata: focused_metadata(initial_path, target),
            applied: AppliedFocus::Relabel { mode, factor },
        })
    }

    /// Resamples a beam-line monitor spectrum onto an angular bank.
    pub fn focus_to_bank(
        &self,
        spectrum: &Histogram,
        metadata: &SpectrumMetadata,
        target: &FocusTarget,
        bank: BankFocus<'_>,
    ) -> FocusResult<FocusedSpectrum> {
        target.validate()?;
        bank.geometry.validate()?;
        if !spectrum.is_histogram() {
            return Err(FocusError::LengthMismatch {
                field: "values",
                actual: spectrum.values().len(),
                points: spectrum.x_scale().count(),
            });
        }
        let (position, initial_path) = required_geometry(spectrum, metadata)?;

        let distance = position.off_axis_distance();
        let tolerance = self.config.beam_axis_tolerance;
        if distance.is_nan() || distance > tolerance {
            return Err(FocusError::OffBeamAxis {
                group_id: spectrum.group_id(),
                distance,
                tolerance,
            });
        }

        let monitor_path = initial_path + position.x;
        if monitor_path.is_nan() || monitor_path <= 0.0 {
            return Err(FocusError::invalid_range(format!(
                "monitor flight path for group {} must be positive, got {monitor_path}",
                spectrum.group_id()
            )));
        }

        let destination = bank.destination.unwrap_or(spectrum.x_scale());
        let ratios = BankRatios::new(monitor_path, &bank.geometry);
        let intervals = bank_source_intervals(destination, &ratios);

        let values = resample_intervals(ResampleInput::new(
            spectrum.x_scale(),
            spectrum.values(),
            &intervals,
        ))?;
        let errors = spectrum
            .errors()
            .map(|errors| {
                resample_errors(ResampleInput::new(spectrum.x_scale(), errors, &intervals))
            })
            .transpose()?
            .map(|output| output.values);

        tracing::debug!(
            group_id = spectrum.group_id(),
            monitor_path,
            bins = intervals.len(),
            out_of_coverage = values.out_of_coverage,
            "focused monitor onto bank"
        );

        let histogram = Histogram::new(
            destination.clone(),
            values.values,
            errors,
            target.new_group_id,
        )?;

        Ok(FocusedSpectrum {
            histogram,
            metadata: focused_metadata(initial_path, target),
            applied: AppliedFocus::Bank {
                ratios,
                out_of_coverage: values.out_of_coverage,
            },
        })
    }
}

fn required_geometry(
    spectrum: &Histogram,
    metadata: &SpectrumMetadata,
) -> FocusResult<(DetectorPosition, f32)> {
    let position = metadata
        .detector_position
        .ok_or(FocusError::MissingGeometry {
            attribute: GeometryAttribute::DetectorPosition,
            group_id: spectrum.group_id(),
        })?;
    let initial_path = metadata
        .initial_path_length
        .ok_or(FocusError::MissingGeometry {
            attribute: GeometryAttribute::InitialPath,
            group_id: spectrum.group_id(),
        })?;
    Ok((position, initial_path))
}

// The source calibration no longer describes the focused spectrum.
fn focused_metadata(initial_path: f32, target: &FocusTarget) -> SpectrumMetadata {
    SpectrumMetadata::default()
        .with_position(DetectorPosition::in_scattering_plane(
            target.final_path_length,
            target.final_angle_deg,
        ))
        .with_initial_path(initial_path)
}
