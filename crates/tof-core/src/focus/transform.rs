use crate::binning::XScale;
use crate::domain::{CalibrationConstant, DetectorGeometry, DetectorPosition, FocusTarget};

/// Multiplicative factors that map a destination bank bin centre back onto
/// the time axis of a monitor spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankRatios {
    pub path_ratio: f64,
    pub theta_min_ratio: f64,
    pub theta_max_ratio: f64,
}

impl BankRatios {
    /// `source_path` is the monitor's total flight path. Bank angles are 2θ
    /// in degrees, so each ratio uses the half angle.
    pub fn new(source_path: f32, bank: &DetectorGeometry) -> Self {
        let half_sin = |angle_deg: f32| (f64::from(angle_deg).to_radians() / 2.0).sin();
        let centre = half_sin(bank.scattering_angle_deg);

        Self {
            path_ratio: f64::from(source_path) / f64::from(bank.total_path_length),
            theta_min_ratio: half_sin(bank.theta_min_deg) / centre,
            theta_max_ratio: half_sin(bank.theta_max_deg) / centre,
        }
    }

    /// Source interval feeding a destination bin centred at `centre`.
    pub fn interval(&self, centre: f32) -> (f32, f32) {
        let centre = f64::from(centre);
        (
            (self.path_ratio * self.theta_min_ratio * centre) as f32,
            (self.path_ratio * self.theta_max_ratio * centre) as f32,
        )
    }
}

pub fn bank_source_intervals(destination: &XScale, ratios: &BankRatios) -> Vec<(f32, f32)> {
    destination
        .bin_centers()
        .into_iter()
        .map(|centre| ratios.interval(centre))
        .collect()
}

/// DIFC of a detector at `final_path` from the sample with half scattering
/// angle `half_angle_rad`, for a source `initial_path` upstream.
pub fn focused_difc(
    difc_constant: f64,
    half_angle_rad: f64,
    final_path: f32,
    initial_path: f32,
) -> f64 {
    2.0 * difc_constant * half_angle_rad.sin() * (f64::from(final_path) + f64::from(initial_path))
}

/// How a single spectrum is relabelled onto a new nominal geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusMode {
    Geometric {
        old_total_path: f64,
        old_theta_rad: f64,
    },
    Calibrated {
        old_difc: f64,
        new_difc: f64,
    },
}

impl FocusMode {
    /// A calibration constant takes precedence over the detector geometry.
    pub fn select(
        position: &DetectorPosition,
        initial_path: f32,
        calibration: Option<CalibrationConstant>,
        target: &FocusTarget,
        difc_constant: f64,
    ) -> Self {
        match calibration {
            Some(calibration) => Self::Calibrated {
                old_difc: calibration.difc,
                new_difc: focused_difc(
                    difc_constant,
                    target.half_angle_rad(),
                    target.final_path_length,
                    initial_path,
                ),
            },
            None => Self::Geometric {
                old_total_path: f64::from(initial_path) + f64::from(position.distance()),
                old_theta_rad: f64::from(position.scattering_angle()) / 2.0,
            },
        }
    }

    /// Factor applied to every boundary of the source x scale.
    pub fn relabel_factor(&self, target: &FocusTarget, initial_path: f32) -> f64 {
        match *self {
            Self::Geometric {
                old_total_path,
                old_theta_rad,
            } => {
                let new_total_path =
                    f64::from(target.final_path_length) + f64::from(initial_path);
                (new_total_path * target.half_angle_rad().sin())
                    / (old_total_path * old_theta_rad.sin())
            }
            Self::Calibrated { old_difc, new_difc } => new_difc / old_difc,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Geometric { .. } => "geometric",
            Self::Calibrated { .. } => "calibrated",
        }
    }
}
