use crate::common::constants::TWO_MACHINE_EPSILON_F32;
use crate::domain::{FocusError, FocusResult};
use std::fmt::{Display, Formatter};

/// Evenly spaced boundaries described by `(start, end, count)`. Boundary `i`
/// is `start + i * step`; nothing is materialised until asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformXScale {
    start: f32,
    end: f32,
    count: usize,
}

impl UniformXScale {
    pub fn new(start: f32, end: f32, count: usize) -> FocusResult<Self> {
        if count < 1 {
            return Err(FocusError::invalid_range(
                "uniform x scale requires at least one point",
            ));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(FocusError::invalid_range(format!(
                "uniform x scale bounds must be finite, got [{start},{end}]"
            )));
        }
        if count == 1 {
            return Ok(Self {
                start,
                end: start,
                count,
            });
        }
        if end <= start {
            return Err(FocusError::invalid_range(format!(
                "uniform x scale with {count} points needs end > start, got [{start},{end}]"
            )));
        }

        let scale = Self { start, end, count };
        let collapsed = (1..count).find(|&index| scale.point(index) <= scale.point(index - 1));
        if let Some(index) = collapsed {
            return Err(FocusError::invalid_range(format!(
                "uniform x scale [{start},{end}] with {count} points is finer than single \
                 precision, point {index} does not exceed point {}",
                index - 1
            )));
        }
        Ok(scale)
    }

    pub const fn start(&self) -> f32 {
        self.start
    }

    pub const fn end(&self) -> f32 {
        self.end
    }

    pub const fn count(&self) -> usize {
        self.count
    }

    pub fn step(&self) -> f32 {
        if self.count > 1 {
            (self.end - self.start) / (self.count - 1) as f32
        } else {
            0.0
        }
    }

    pub fn at(&self, index: usize) -> Option<f32> {
        (index < self.count).then(|| self.point(index))
    }

    // The last point is exactly `end`.
    fn point(&self, index: usize) -> f32 {
        if index + 1 >= self.count {
            return self.end;
        }
        let span = f64::from(self.end) - f64::from(self.start);
        (f64::from(self.start) + span * index as f64 / (self.count - 1) as f64) as f32
    }

    /// Closed-form least-upper-bound lookup, corrected against the computed
    /// boundaries so rounding in the division never skips or repeats a point.
    pub fn index_of(&self, x: f32) -> usize {
        if self.count == 1 {
            return if x <= self.start { 0 } else { 1 };
        }
        if x <= self.start {
            return 0;
        }

        let last = self.count - 1;
        if x > self.point(last) {
            return self.count;
        }

        let mut position = (((x - self.start) / self.step()).ceil() as usize).min(last);
        while position < last && self.point(position) < x {
            position += 1;
        }
        while position > 0 && self.point(position - 1) >= x {
            position -= 1;
        }
        position
    }

    /// Covers both scales with this scale's variant, taking the larger point
    /// count. The step generally changes.
    pub fn expand(&self, other: &XScale) -> FocusResult<Self> {
        Self::new(
            self.start.min(other.start()),
            self.end.max(other.end()),
            self.count.max(other.count()),
        )
    }

    /// Covers both scales while keeping this scale's step, so every existing
    /// division point is still a division point of the result.
    pub fn extend(&self, other: &XScale) -> FocusResult<Self> {
        if self.count == 1 {
            return self.expand(other);
        }

        let step = f64::from(self.step());
        let start = f64::from(self.start);
        let end = f64::from(self.end);

        let mut new_start = start;
        if f64::from(other.start()) < start {
            let steps_back = ((start - f64::from(other.start())) / step).ceil();
            new_start = start - steps_back * step;
        }

        let mut new_end = end;
        if f64::from(other.end()) > end {
            let steps_forward = ((f64::from(other.end()) - end) / step).ceil();
            new_end = end + steps_forward * step;
        }

        let count = ((new_end - new_start) / step).round() as usize + 1;
        Self::new(new_start as f32, new_end as f32, count)
    }
}

/// Explicit, strictly increasing boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableXScale {
    boundaries: Vec<f32>,
}

impl VariableXScale {
    pub fn new(boundaries: Vec<f32>) -> FocusResult<Self> {
        validate_boundaries(&boundaries)?;
        Ok(Self { boundaries })
    }

    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    pub fn index_of(&self, x: f32) -> usize {
        self.boundaries.partition_point(|boundary| *boundary < x)
    }

    /// Union of the two scales: points of `other` are only borrowed where
    /// this scale does not reach.
    pub fn extend(&self, other: &XScale) -> FocusResult<Self> {
        let start = self.boundaries[0];
        let end = self.boundaries[self.boundaries.len() - 1];
        let other_points = other.boundaries();

        let mut merged: Vec<f32> = other_points
            .iter()
            .copied()
            .filter(|point| *point < start)
            .collect();
        merged.extend_from_slice(&self.boundaries);
        merged.extend(other_points.iter().copied().filter(|point| *point > end));
        Self::new(merged)
    }
}

/// Ordered bin boundaries of a histogram (`N - 1` bins) or the sample points
/// of function data (`N` points).
#[derive(Debug, Clone)]
pub enum XScale {
    Uniform(UniformXScale),
    Variable(VariableXScale),
}

impl XScale {
    pub fn uniform(start: f32, end: f32, count: usize) -> FocusResult<Self> {
        UniformXScale::new(start, end, count).map(Self::Uniform)
    }

    pub fn variable(boundaries: &[f32]) -> FocusResult<Self> {
        VariableXScale::new(boundaries.to_vec()).map(Self::Variable)
    }

    /// Picks the cheapest variant that reproduces `points`: a uniform scale
    /// when every point lies within single-precision tolerance of the
    /// matching uniform point, a variable scale otherwise.
    pub fn from_points(points: &[f32]) -> FocusResult<Self> {
        Self::from_points_with_tolerance(points, TWO_MACHINE_EPSILON_F32)
    }

    pub fn from_points_with_tolerance(points: &[f32], tolerance: f32) -> FocusResult<Self> {
        validate_boundaries(points)?;
        let variable = || {
            Self::Variable(VariableXScale {
                boundaries: points.to_vec(),
            })
        };
        let Ok(uniform) = UniformXScale::new(points[0], points[points.len() - 1], points.len())
        else {
            return Ok(variable());
        };

        if points.len() > 2 {
            for (index, point) in points.iter().copied().enumerate() {
                let candidate = uniform.point(index);
                let reference = if point != 0.0 { point } else { candidate };
                if reference != 0.0 && ((candidate - point) / reference).abs() > tolerance {
                    return Ok(variable());
                }
            }
        }

        Ok(Self::Uniform(uniform))
    }

    pub fn start(&self) -> f32 {
        match self {
            Self::Uniform(scale) => scale.start,
            Self::Variable(scale) => scale.boundaries[0],
        }
    }

    pub fn end(&self) -> f32 {
        match self {
            Self::Uniform(scale) => scale.end,
            Self::Variable(scale) => scale.boundaries[scale.boundaries.len() - 1],
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Uniform(scale) => scale.count,
            Self::Variable(scale) => scale.boundaries.len(),
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }

    pub fn in_range(&self, x: f32) -> bool {
        x >= self.start() && x <= self.end()
    }

    pub fn boundaries(&self) -> Vec<f32> {
        match self {
            Self::Uniform(scale) => (0..scale.count).map(|index| scale.point(index)).collect(),
            Self::Variable(scale) => scale.boundaries.clone(),
        }
    }

    pub fn at(&self, index: usize) -> Option<f32> {
        match self {
            Self::Uniform(scale) => scale.at(index),
            Self::Variable(scale) => scale.boundaries.get(index).copied(),
        }
    }

    /// Index of the least upper bound of `x`: the smallest `i` with
    /// `boundary[i] >= x`. Returns `0` below the scale and `count()` above it.
    pub fn index_of(&self, x: f32) -> usize {
        match self {
            Self::Uniform(scale) => scale.index_of(x),
            Self::Variable(scale) => scale.index_of(x),
        }
    }

    /// Index of the greatest lower bound of `x`, or `None` below the scale.
    pub fn index_glb(&self, x: f32) -> Option<usize> {
        let position = self.index_of(x);
        match self.at(position) {
            Some(boundary) if boundary == x => Some(position),
            _ => position.checked_sub(1),
        }
    }

    /// Bin `k` with `boundary[k] <= x < boundary[k + 1]`; the last boundary
    /// belongs to the last bin. `None` outside the scale.
    pub fn containing_bin(&self, x: f32) -> Option<usize> {
        match self {
            Self::Variable(scale) => containing_bin_in(&scale.boundaries, x),
            Self::Uniform(scale) => {
                if scale.count < 2 || !(x >= scale.start && x <= scale.point(scale.count - 1)) {
                    return None;
                }
                self.index_glb(x).map(|bin| bin.min(scale.count - 2))
            }
        }
    }

    pub fn bin_centers(&self) -> Vec<f32> {
        self.boundaries()
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }

    pub fn expand(&self, other: &XScale) -> FocusResult<Self> {
        match self {
            Self::Uniform(scale) => scale.expand(other).map(Self::Uniform),
            Self::Variable(_) => Err(FocusError::invalid_range(
                "expand is only defined for uniform x scales",
            )),
        }
    }

    pub fn extend(&self, other: &XScale) -> FocusResult<Self> {
        match self {
            Self::Uniform(scale) => scale.extend(other).map(Self::Uniform),
            Self::Variable(scale) => scale.extend(other).map(Self::Variable),
        }
    }

    /// Restricts the scale to the points inside `[lo, hi]`. The result starts
    /// at the least upper bound of `lo` and ends at the greatest lower bound
    /// of `hi`; `None` when no point of the scale falls in the interval.
    pub fn restrict(&self, lo: f32, hi: f32) -> Option<Self> {
        if lo.is_nan() || hi.is_nan() || lo > hi || hi < self.start() || lo > self.end() {
            return None;
        }

        let first = self.index_of(lo);
        let last = self.index_glb(hi)?;
        if first > last || first >= self.count() {
            return None;
        }

        match self {
            Self::Uniform(scale) => {
                UniformXScale::new(scale.point(first), scale.point(last), last - first + 1)
                    .ok()
                    .map(Self::Uniform)
            }
            Self::Variable(scale) => Some(Self::Variable(VariableXScale {
                boundaries: scale.boundaries[first..=last].to_vec(),
            })),
        }
    }

    /// Multiplies every boundary by `factor`, keeping the variant.
    pub fn scaled(&self, factor: f64) -> FocusResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(FocusError::invalid_range(format!(
                "x scale factor must be finite and positive, got {factor}"
            )));
        }

        let scale = |value: f32| (f64::from(value) * factor) as f32;
        match self {
            Self::Uniform(uniform) => {
                UniformXScale::new(scale(uniform.start), scale(uniform.end), uniform.count)
                    .map(Self::Uniform)
            }
            Self::Variable(variable) => {
                VariableXScale::new(variable.boundaries.iter().copied().map(scale).collect())
                    .map(Self::Variable)
            }
        }
    }
}

impl PartialEq for XScale {
    fn eq(&self, other: &Self) -> bool {
        if self.start() != other.start()
            || self.end() != other.end()
            || self.count() != other.count()
        {
            return false;
        }
        match (self, other) {
            (Self::Uniform(_), Self::Uniform(_)) => true,
            _ => self.boundaries() == other.boundaries(),
        }
    }
}

impl Display for XScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{},{}] in {} steps",
            self.start(),
            self.end(),
            self.count()
        )
    }
}

pub(crate) fn containing_bin_in(boundaries: &[f32], x: f32) -> Option<usize> {
    let count = boundaries.len();
    if count < 2 || !(x >= boundaries[0] && x <= boundaries[count - 1]) {
        return None;
    }
    let upper = boundaries.partition_point(|boundary| *boundary <= x);
    Some((upper - 1).min(count - 2))
}

fn validate_boundaries(boundaries: &[f32]) -> FocusResult<()> {
    if boundaries.is_empty() {
        return Err(FocusError::invalid_range(
            "x scale requires at least one boundary",
        ));
    }
    for (index, value) in boundaries.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(FocusError::invalid_range(format!(
                "x scale boundary {index} must be finite, got {value}"
            )));
        }
        if index > 0 && value <= boundaries[index - 1] {
            return Err(FocusError::invalid_range(format!(
                "x scale boundaries must be strictly increasing, index {index} has {value} after {}",
                boundaries[index - 1]
            )));
        }
    }
    Ok(())
}
