//! Strongly-typed numeric primitives and orientation frames.
//!
//! Style quantities are `Length`s in drawing units. Geometry is plain
//! `glam::DVec3` once it enters the layout math.

use std::fmt;

use glam::{DVec2, DVec3, dvec3};

/// Tolerance for direction and angle comparisons
pub const EPSILON: f64 = 1e-8;

/// Tolerance for "pointing straight down" in view space
pub const DOWNWARD_TOLERANCE: f64 = 1e-4;

/// Smallest magnitude accepted as a divisor before it is clamped
pub const SAFE_DIVISOR: f64 = 1e-12;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Length in drawing units
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Length {
    /// Create a Length (const-friendly, unchecked).
    /// Use `try_new` for values coming from collaborators.
    #[inline]
    pub const fn units(val: f64) -> Length {
        Length(val)
    }

    /// Create a Length with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(val: f64) -> Result<Length, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else {
            Ok(Length(val))
        }
    }

    /// Create a non-negative Length with validation
    #[inline]
    pub fn try_non_negative(val: f64) -> Result<Length, NumericError> {
        let len = Length::try_new(val)?;
        if len.0 < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(len)
        }
    }

    /// Get the raw value (layout math works in f64)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Angle in radians
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Angle(pub f64);

impl Angle {
    #[inline]
    pub fn radians(self) -> f64 {
        self.0
    }

    /// Wrap into `[0, 2π)`
    pub fn normalized(self) -> Angle {
        let tau = std::f64::consts::TAU;
        let a = self.0 % tau;
        if a < 0.0 { Angle(a + tau) } else { Angle(a) }
    }
}

// ============================================================================
// Orientation frames
// ============================================================================

/// Orthonormal orientation frame.
///
/// Used both for the dimension rotation (local to world) and for the view
/// (world to screen). For a view frame the axes are the screen axes expressed
/// in world coordinates, so `to_local` maps a world vector into view space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub x: DVec3,
    pub y: DVec3,
    pub z: DVec3,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::IDENTITY
    }
}

impl Frame {
    pub const IDENTITY: Frame = Frame {
        x: DVec3::X,
        y: DVec3::Y,
        z: DVec3::Z,
    };

    pub fn new(x: DVec3, y: DVec3, z: DVec3) -> Self {
        Frame { x, y, z }
    }

    /// Build a right-handed frame whose x axis is `x` and whose xy plane
    /// contains `in_plane`. Returns `None` when the two are parallel.
    pub fn from_x_and_plane(x: DVec3, in_plane: DVec3) -> Option<Frame> {
        let x = x.try_normalize()?;
        let z = x.cross(in_plane).try_normalize()?;
        let y = z.cross(x);
        Some(Frame { x, y, z })
    }

    /// Same frame mirrored across its xz plane, keeping it right-handed
    pub fn flipped_y(&self) -> Frame {
        Frame {
            x: self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Local coordinates to world
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// World vector to local coordinates
    #[inline]
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        dvec3(world.dot(self.x), world.dot(self.y), world.dot(self.z))
    }

    /// Unit direction at `angle` in the frame's xy plane
    #[inline]
    pub fn direction_at(&self, angle: f64) -> DVec3 {
        self.x * angle.cos() + self.y * angle.sin()
    }

    /// Counter-clockwise tangent at `angle` in the frame's xy plane
    #[inline]
    pub fn tangent_at(&self, angle: f64) -> DVec3 {
        -self.x * angle.sin() + self.y * angle.cos()
    }
}

// ============================================================================
// Direction helpers
// ============================================================================

/// Apply the reading rule: text never runs right-to-left or straight down in
/// view space. Returns the direction to use and whether it was reversed.
pub fn reading_direction(dir: DVec3, view: &Frame) -> (DVec3, bool) {
    let in_view = view.to_local(dir);
    if in_view.x < -EPSILON || (in_view.y + 1.0).abs() < DOWNWARD_TOLERANCE {
        (-dir, true)
    } else {
        (dir, false)
    }
}

/// Division guarded against a vanishing divisor
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den.abs() < SAFE_DIVISOR {
        num / SAFE_DIVISOR.copysign(den)
    } else {
        num / den
    }
}

/// Text box size as (width, height)
pub type Size2 = DVec2;
