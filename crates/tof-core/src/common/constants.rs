//! Physical and numerical constants shared by the binning and focusing code.

/// Neutron `h / m_n` in µs·Å⁻¹·m⁻¹; scales `sin(θ) * L` to a DIFC value.
pub const DIFC_CONSTANT: f64 = 252.816;

/// Largest off-axis distance, in metres, at which a monitor still counts as
/// sitting on the beam line.
pub const BEAM_AXIS_TOLERANCE: f32 = 0.01;

/// Largest `eps` for which `1 + eps == 1` in single precision.
pub const MACHINE_EPSILON_F32: f32 = 5.960_464_5e-8;
pub const TWO_MACHINE_EPSILON_F32: f32 = 2.0 * MACHINE_EPSILON_F32;

pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

#[cfg(test)]
mod tests {
    use super::{
        BEAM_AXIS_TOLERANCE, DEG_TO_RAD, DIFC_CONSTANT, MACHINE_EPSILON_F32,
        TWO_MACHINE_EPSILON_F32,
    };

    #[test]
    fn constants_match_expected_relationships() {
        assert_eq!(TWO_MACHINE_EPSILON_F32, 2.0 * MACHINE_EPSILON_F32);
        assert!((DEG_TO_RAD * 180.0 - std::f32::consts::PI).abs() <= f32::EPSILON);
        assert!(1.0_f32 + MACHINE_EPSILON_F32 == 1.0);
    }

    #[test]
    fn physical_constants_remain_finite_and_positive() {
        assert!(DIFC_CONSTANT.is_finite() && DIFC_CONSTANT > 0.0);
        assert!(BEAM_AXIS_TOLERANCE > 0.0);
    }
}
