//! Tunable focusing parameters, loadable from a JSON document.
//!
//! Every field is optional in the document; missing fields keep the
//! defaults from [`crate::common::constants`].

use super::constants::{BEAM_AXIS_TOLERANCE, DIFC_CONSTANT, TWO_MACHINE_EPSILON_F32};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusConfig {
    pub beam_axis_tolerance: f32,
    pub difc_constant: f64,
    pub uniform_tolerance: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            beam_axis_tolerance: BEAM_AXIS_TOLERANCE,
            difc_constant: DIFC_CONSTANT,
            uniform_tolerance: TWO_MACHINE_EPSILON_F32,
        }
    }
}

impl FocusConfig {
    pub fn validate(&self) -> Result<(), FocusConfigError> {
        if !self.beam_axis_tolerance.is_finite() || self.beam_axis_tolerance < 0.0 {
            return Err(FocusConfigError::Invalid {
                field: "beamAxisTolerance",
                value: f64::from(self.beam_axis_tolerance),
            });
        }
        if !self.difc_constant.is_finite() || self.difc_constant <= 0.0 {
            return Err(FocusConfigError::Invalid {
                field: "difcConstant",
                value: self.difc_constant,
            });
        }
        if !self.uniform_tolerance.is_finite() || self.uniform_tolerance < 0.0 {
            return Err(FocusConfigError::Invalid {
                field: "uniformTolerance",
                value: f64::from(self.uniform_tolerance),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FocusConfigError {
    #[error("failed to read focus config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse focus config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("focus config field '{field}' is out of range, got {value}")]
    Invalid { field: &'static str, value: f64 },
}

pub fn load_focus_config(config_path: impl AsRef<Path>) -> Result<FocusConfig, FocusConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| FocusConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: FocusConfig =
        serde_json::from_str(&source).map_err(|source| FocusConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{FocusConfig, FocusConfigError, load_focus_config};
    use crate::common::constants::{BEAM_AXIS_TOLERANCE, DIFC_CONSTANT};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("focus.json");
        fs::write(&path, r#"{ "beamAxisTolerance": 0.05 }"#).expect("config should be written");

        let config = load_focus_config(&path).expect("config should load");
        assert_eq!(config.beam_axis_tolerance, 0.05);
        assert_eq!(config.difc_constant, DIFC_CONSTANT);
        assert_eq!(FocusConfig::default().beam_axis_tolerance, BEAM_AXIS_TOLERANCE);
    }

    #[test]
    fn unreadable_config_reports_path() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("missing.json");

        let error = load_focus_config(&path).expect_err("missing file should fail");
        assert!(matches!(error, FocusConfigError::Read { .. }));
        assert!(error.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_and_invalid_configs_are_rejected() {
        let temp = TempDir::new().expect("tempdir should be created");
        let malformed = temp.path().join("malformed.json");
        fs::write(&malformed, "{ not json").expect("config should be written");
        assert!(matches!(
            load_focus_config(&malformed),
            Err(FocusConfigError::Parse { .. })
        ));

        let invalid = temp.path().join("invalid.json");
        fs::write(&invalid, r#"{ "difcConstant": -1.0 }"#).expect("config should be written");
        let error = load_focus_config(&invalid).expect_err("negative constant should fail");
        assert!(matches!(
            error,
            FocusConfigError::Invalid {
                field: "difcConstant",
                ..
            }
        ));
    }
}
