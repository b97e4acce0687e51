use super::XScale;
use crate::domain::{FocusError, FocusResult};

/// An x scale paired with its values and optional errors. Histogram data has
/// one value per bin, function data one value per point.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    x_scale: XScale,
    values: Vec<f32>,
    errors: Option<Vec<f32>>,
    group_id: i32,
}

impl Histogram {
    pub fn new(
        x_scale: XScale,
        values: Vec<f32>,
        errors: Option<Vec<f32>>,
        group_id: i32,
    ) -> FocusResult<Self> {
        let points = x_scale.count();
        if values.len() + 1 != points && values.len() != points {
            return Err(FocusError::LengthMismatch {
                field: "values",
                actual: values.len(),
                points,
            });
        }
        if let Some(errors) = &errors {
            if errors.len() != values.len() {
                return Err(FocusError::LengthMismatch {
                    field: "errors",
                    actual: errors.len(),
                    points,
                });
            }
        }

        Ok(Self {
            x_scale,
            values,
            errors,
            group_id,
        })
    }

    pub fn x_scale(&self) -> &XScale {
        &self.x_scale
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn errors(&self) -> Option<&[f32]> {
        self.errors.as_deref()
    }

    pub const fn group_id(&self) -> i32 {
        self.group_id
    }

    pub fn is_histogram(&self) -> bool {
        self.values.len() + 1 == self.x_scale.count()
    }
}
