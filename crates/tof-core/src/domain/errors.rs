use std::fmt::{Display, Formatter};

pub type FocusResult<T> = Result<T, FocusError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
}

impl FocusErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
        }
    }
}

impl Display for FocusErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Metadata a focusing operation looks up on the source spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryAttribute {
    DetectorPosition,
    InitialPath,
}

impl Display for GeometryAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DetectorPosition => f.write_str("Detector Position"),
            Self::InitialPath => f.write_str("Initial Path"),
        }
    }
}

/// Destination quantity rejected by target validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetQuantity {
    Angle,
    FinalPath,
    BankAngle,
    BankPath,
}

impl Display for TargetQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Angle => f.write_str("angle"),
            Self::FinalPath => f.write_str("final path"),
            Self::BankAngle => f.write_str("bank angle"),
            Self::BankPath => f.write_str("bank path"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FocusError {
    #[error("{message}")]
    InvalidRange { message: String },
    #[error("No {attribute} attribute for group {group_id}")]
    MissingGeometry {
        attribute: GeometryAttribute,
        group_id: i32,
    },
    #[error(
        "Monitor for group {group_id} is not on the beam axis: off-axis distance {distance} exceeds {tolerance}"
    )]
    OffBeamAxis {
        group_id: i32,
        distance: f32,
        tolerance: f32,
    },
    #[error("Invalid {quantity} {value}")]
    InvalidTarget { quantity: TargetQuantity, value: f32 },
    #[error("{field} has {actual} entries, which does not fit an x scale with {points} points")]
    LengthMismatch {
        field: &'static str,
        actual: usize,
        points: usize,
    },
}

impl FocusError {
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    pub const fn category(&self) -> FocusErrorCategory {
        FocusErrorCategory::InputValidationError
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "INPUT.INVALID_RANGE",
            Self::MissingGeometry { .. } => "INPUT.MISSING_GEOMETRY",
            Self::OffBeamAxis { .. } => "INPUT.OFF_BEAM_AXIS",
            Self::InvalidTarget { .. } => "INPUT.INVALID_TARGET",
            Self::LengthMismatch { .. } => "INPUT.LENGTH_MISMATCH",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
