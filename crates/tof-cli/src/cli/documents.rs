use super::CliError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tof_core::{
    CalibrationConstant, DetectorGeometry, DetectorPosition, FocusResult, FocusedSpectrum,
    Histogram, SpectrumMetadata, XScale,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SpectrumDocument {
    pub(super) group_id: i32,
    pub(super) boundaries: Vec<f32>,
    pub(super) values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) errors: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) initial_path: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) position: Option<PositionDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) difc: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub(super) struct PositionDocument {
    pub(super) x: f32,
    pub(super) y: f32,
    pub(super) z: f32,
}

/// Angular bank in degrees. `boundaries` optionally rebins the output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BankDocument {
    pub(super) total_path_length: f32,
    pub(super) scattering_angle: f32,
    pub(super) theta_min: f32,
    pub(super) theta_max: f32,
    #[serde(default)]
    pub(super) boundaries: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScaleSummary {
    pub(super) group_id: i32,
    pub(super) variant: &'static str,
    pub(super) start: f32,
    pub(super) end: f32,
    pub(super) points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) step: Option<f32>,
    pub(super) histogram: bool,
    pub(super) summary: String,
}

impl SpectrumDocument {
    pub(super) fn to_histogram(&self, uniform_tolerance: f32) -> FocusResult<Histogram> {
        let x_scale = XScale::from_points_with_tolerance(&self.boundaries, uniform_tolerance)?;
        Histogram::new(
            x_scale,
            self.values.clone(),
            self.errors.clone(),
            self.group_id,
        )
    }

    pub(super) fn metadata(&self) -> SpectrumMetadata {
        SpectrumMetadata {
            detector_position: self
                .position
                .map(|position| DetectorPosition::new(position.x, position.y, position.z)),
            initial_path_length: self.initial_path,
            calibration: self.difc.map(CalibrationConstant::new),
        }
    }

    pub(super) fn from_focused(focused: &FocusedSpectrum) -> Result<Self, CliError> {
        let histogram = &focused.histogram;
        let group_id = histogram.group_id();
        let boundaries = histogram.x_scale().boundaries();

        ensure_finite(group_id, "boundaries", &boundaries)?;
        ensure_finite(group_id, "values", histogram.values())?;
        if let Some(errors) = histogram.errors() {
            ensure_finite(group_id, "errors", errors)?;
        }

        Ok(Self {
            group_id,
            boundaries,
            values: histogram.values().to_vec(),
            errors: histogram.errors().map(<[f32]>::to_vec),
            initial_path: focused.metadata.initial_path_length,
            position: focused
                .metadata
                .detector_position
                .map(|position| PositionDocument {
                    x: position.x,
                    y: position.y,
                    z: position.z,
                }),
            difc: focused
                .metadata
                .calibration
                .map(|calibration| calibration.difc),
        })
    }
}

impl BankDocument {
    pub(super) fn geometry(&self) -> DetectorGeometry {
        DetectorGeometry::new(
            self.total_path_length,
            self.scattering_angle,
            self.theta_min,
            self.theta_max,
        )
    }

    pub(super) fn destination(&self, uniform_tolerance: f32) -> FocusResult<Option<XScale>> {
        self.boundaries
            .as_deref()
            .map(|points| XScale::from_points_with_tolerance(points, uniform_tolerance))
            .transpose()
    }
}

impl ScaleSummary {
    pub(super) fn of(histogram: &Histogram) -> Self {
        let x_scale = histogram.x_scale();
        let (variant, step) = match x_scale {
            XScale::Uniform(uniform) => ("uniform", Some(uniform.step())),
            XScale::Variable(_) => ("variable", None),
        };
        Self {
            group_id: histogram.group_id(),
            variant,
            start: x_scale.start(),
            end: x_scale.end(),
            points: x_scale.count(),
            step,
            histogram: histogram.is_histogram(),
            summary: x_scale.to_string(),
        }
    }
}

fn ensure_finite(group_id: i32, field: &'static str, data: &[f32]) -> Result<(), CliError> {
    if data.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(CliError::NonFinite { group_id, field })
    }
}

pub(super) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| CliError::Document {
        path: path.to_path_buf(),
        source,
    })
}
