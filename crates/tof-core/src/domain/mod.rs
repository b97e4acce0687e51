pub mod errors;

pub use errors::{
    FocusError, FocusErrorCategory, FocusResult, GeometryAttribute, TargetQuantity,
};

use crate::common::constants::DEG_TO_RAD;
use std::f32::consts::FRAC_PI_2;

/// Detector position in instrument coordinates: beam along `+x`, `z` up,
/// sample at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl DetectorPosition {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// `azimuth` is measured from the beam in the horizontal plane, `polar`
    /// from the vertical axis.
    pub fn from_spherical(radius: f32, azimuth_rad: f32, polar_rad: f32) -> Self {
        let horizontal = radius * polar_rad.sin();
        Self {
            x: horizontal * azimuth_rad.cos(),
            y: horizontal * azimuth_rad.sin(),
            z: radius * polar_rad.cos(),
        }
    }

    /// Position in the horizontal scattering plane at `distance` and
    /// scattering angle `two_theta_deg`.
    pub fn in_scattering_plane(distance: f32, two_theta_deg: f32) -> Self {
        Self::from_spherical(distance, two_theta_deg * DEG_TO_RAD, FRAC_PI_2)
    }

    pub fn distance(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scattering angle 2θ in radians, measured from the incident beam.
    pub fn scattering_angle(&self) -> f32 {
        let distance = self.distance();
        if distance == 0.0 {
            return 0.0;
        }
        (self.x / distance).clamp(-1.0, 1.0).acos()
    }

    pub fn off_axis_distance(&self) -> f32 {
        (self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Linear TOF-to-d-spacing calibration constant of a detector pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConstant {
    pub difc: f64,
}

impl CalibrationConstant {
    pub const fn new(difc: f64) -> Self {
        Self { difc }
    }
}

/// Per-spectrum geometry metadata. Every field is optional because the
/// caller's attribute store may not carry it; focusing validates the fields
/// it needs before computing anything.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectrumMetadata {
    pub detector_position: Option<DetectorPosition>,
    pub initial_path_length: Option<f32>,
    pub calibration: Option<CalibrationConstant>,
}

impl SpectrumMetadata {
    pub fn with_position(mut self, position: DetectorPosition) -> Self {
        self.detector_position = Some(position);
        self
    }

    pub fn with_initial_path(mut self, initial_path_length: f32) -> Self {
        self.initial_path_length = Some(initial_path_length);
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationConstant) -> Self {
        self.calibration = Some(calibration);
        self
    }
}

/// Angular bank a spectrum was measured at or is focused onto. Angles are
/// 2θ scattering angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorGeometry {
    pub total_path_length: f32,
    pub scattering_angle_deg: f32,
    pub theta_min_deg: f32,
    pub theta_max_deg: f32,
}

impl DetectorGeometry {
    pub const fn new(
        total_path_length: f32,
        scattering_angle_deg: f32,
        theta_min_deg: f32,
        theta_max_deg: f32,
    ) -> Self {
        Self {
            total_path_length,
            scattering_angle_deg,
            theta_min_deg,
            theta_max_deg,
        }
    }

    pub(crate) fn validate(&self) -> FocusResult<()> {
        for angle in [
            self.scattering_angle_deg,
            self.theta_min_deg,
            self.theta_max_deg,
        ] {
            if !is_valid_scattering_angle(angle) {
                return Err(FocusError::InvalidTarget {
                    quantity: TargetQuantity::BankAngle,
                    value: angle,
                });
            }
        }
        if !is_positive_length(self.total_path_length) {
            return Err(FocusError::InvalidTarget {
                quantity: TargetQuantity::BankPath,
                value: self.total_path_length,
            });
        }
        Ok(())
    }
}

/// Destination geometry and identity of a focusing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub final_path_length: f32,
    pub final_angle_deg: f32,
    pub new_group_id: i32,
}

impl FocusTarget {
    pub const fn new(final_path_length: f32, final_angle_deg: f32, new_group_id: i32) -> Self {
        Self {
            final_path_length,
            final_angle_deg,
            new_group_id,
        }
    }

    pub fn validate(&self) -> FocusResult<()> {
        if !is_valid_scattering_angle(self.final_angle_deg) {
            return Err(FocusError::InvalidTarget {
                quantity: TargetQuantity::Angle,
                value: self.final_angle_deg,
            });
        }
        if !is_positive_length(self.final_path_length) {
            return Err(FocusError::InvalidTarget {
                quantity: TargetQuantity::FinalPath,
                value: self.final_path_length,
            });
        }
        Ok(())
    }

    /// Half of the destination scattering angle, in radians.
    pub fn half_angle_rad(&self) -> f64 {
        f64::from(self.final_angle_deg).to_radians() / 2.0
    }
}

// NaN fails every comparison below.
fn is_valid_scattering_angle(angle_deg: f32) -> bool {
    angle_deg > 0.0 && angle_deg < 180.0
}

fn is_positive_length(length: f32) -> bool {
    length > 0.0
}
