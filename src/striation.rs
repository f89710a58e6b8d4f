//! Elevation-band height remapping ("striations").
//!
//! A [`StriationBand`] owns an open height interval and a [`HeightCurve`]
//! defined on `[0, 1]`. Any height strictly inside the interval is normalized
//! into the band, pushed through the curve, and scaled back out. Bands are
//! applied in declaration order, each seeing the output of the previous one.

use std::fmt;
use std::sync::Arc;

use bevy::math::curve::{Curve, EaseFunction, EasingCurve, UnevenSampleAutoCurve};
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// A `[0, 1] → ℝ` remapping curve.
#[derive(Clone)]
pub enum HeightCurve {
    /// Identity; the band leaves heights untouched.
    Linear,
    /// One of Bevy's easing functions from `0.0` to `1.0`.
    Eased(EasingCurve<f32>),
    /// Linearly interpolated keyframes `(t, value)`.
    Sampled(UnevenSampleAutoCurve<f32>),
    /// Arbitrary user function.
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl HeightCurve {
    pub fn eased(ease: EaseFunction) -> Self {
        Self::Eased(EasingCurve::new(0.0, 1.0, ease))
    }

    /// Builds a keyframed curve. Needs at least two keyframes with distinct,
    /// finite times.
    pub fn keyframes(points: impl IntoIterator<Item = (f32, f32)>) -> Result<Self, TerrainError> {
        UnevenSampleAutoCurve::new(points)
            .map(Self::Sampled)
            .map_err(|e| TerrainError::config(format!("invalid striation keyframes: {e}")))
    }

    pub fn from_fn(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Evaluates the curve at `t`, clamping `t` into the curve's domain.
    pub fn sample(&self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::Eased(curve) => curve.sample_clamped(t),
            Self::Sampled(curve) => curve.sample_clamped(t),
            Self::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for HeightCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::Eased(curve) => f.debug_tuple("Eased").field(curve).finish(),
            Self::Sampled(curve) => f.debug_tuple("Sampled").field(curve).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Serializable description of a [`HeightCurve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveShape {
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineInOut,
    Keyframes { points: Vec<[f32; 2]> },
}

impl TryFrom<CurveShape> for HeightCurve {
    type Error = TerrainError;

    fn try_from(shape: CurveShape) -> Result<Self, Self::Error> {
        let ease = match shape {
            CurveShape::Linear => return Ok(Self::Linear),
            CurveShape::Keyframes { points } => {
                return Self::keyframes(points.into_iter().map(|[t, v]| (t, v)));
            }
            CurveShape::QuadraticIn => EaseFunction::QuadraticIn,
            CurveShape::QuadraticOut => EaseFunction::QuadraticOut,
            CurveShape::QuadraticInOut => EaseFunction::QuadraticInOut,
            CurveShape::CubicIn => EaseFunction::CubicIn,
            CurveShape::CubicOut => EaseFunction::CubicOut,
            CurveShape::CubicInOut => EaseFunction::CubicInOut,
            CurveShape::SineInOut => EaseFunction::SineInOut,
        };
        Ok(Self::eased(ease))
    }
}

/// On-disk shape of a band, validated into a [`StriationBand`].
#[derive(Clone, Debug, Deserialize)]
struct StriationBandDef {
    start_height: f32,
    end_height: f32,
    #[serde(default = "linear_shape")]
    curve: CurveShape,
}

fn linear_shape() -> CurveShape {
    CurveShape::Linear
}

/// A validated height band with its remapping curve.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "StriationBandDef")]
pub struct StriationBand {
    start_height: f32,
    end_height: f32,
    curve: HeightCurve,
}

impl StriationBand {
    /// Rejects bands whose end is not strictly above their start.
    pub fn new(start_height: f32, end_height: f32, curve: HeightCurve) -> Result<Self, TerrainError> {
        // Negated so NaN bounds are rejected too.
        if !(end_height > start_height) {
            return Err(TerrainError::config(format!(
                "striation band end ({end_height}) must be above its start ({start_height})"
            )));
        }
        Ok(Self {
            start_height,
            end_height,
            curve,
        })
    }

    pub fn start_height(&self) -> f32 {
        self.start_height
    }

    pub fn end_height(&self) -> f32 {
        self.end_height
    }

    pub fn curve(&self) -> &HeightCurve {
        &self.curve
    }

    /// Whether `y` lies strictly inside the band.
    #[inline]
    pub fn contains(&self, y: f32) -> bool {
        y > self.start_height && y < self.end_height
    }

    /// Remaps `y` if it lies inside the band, otherwise returns it unchanged.
    #[inline]
    pub fn remap(&self, y: f32) -> f32 {
        if !self.contains(y) {
            return y;
        }
        let size = self.end_height - self.start_height;
        self.curve.sample((y - self.start_height) / size) * size + self.start_height
    }
}

impl TryFrom<StriationBandDef> for StriationBand {
    type Error = TerrainError;

    fn try_from(def: StriationBandDef) -> Result<Self, Self::Error> {
        Self::new(def.start_height, def.end_height, def.curve.try_into()?)
    }
}

/// Runs `y` through every band in order.
pub fn apply_striations(bands: &[StriationBand], y: f32) -> f32 {
    bands.iter().fold(y, |y, band| band.remap(y))
}
