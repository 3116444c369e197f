use super::error::ModelError;
use nalgebra::{Point3, Vector3};

/// An origin-centered, axis-aligned sampling box in the box-local frame.
///
/// The box is described by its half-extents `(Lx, Ly, Lz)`; a point is inside
/// when `-L <= p <= L` holds on every axis (faces included).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingBox {
    half_extents: Vector3<f64>,
}

impl SamplingBox {
    /// Creates a box from its half-extents.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidHalfExtents`] if any extent is not a
    /// positive finite number.
    pub fn new(lx: f64, ly: f64, lz: f64) -> Result<Self, ModelError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(lx) && valid(ly) && valid(lz)) {
            return Err(ModelError::InvalidHalfExtents(lx, ly, lz));
        }
        Ok(Self {
            half_extents: Vector3::new(lx, ly, lz),
        })
    }

    pub fn from_array(dimensions: [f64; 3]) -> Result<Self, ModelError> {
        Self::new(dimensions[0], dimensions[1], dimensions[2])
    }

    #[inline]
    pub fn half_extents(&self) -> &Vector3<f64> {
        &self.half_extents
    }

    /// Returns `true` if `point` lies inside the box or on its boundary.
    #[inline]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let l = &self.half_extents;
        (-l.x..=l.x).contains(&point.x)
            && (-l.y..=l.y).contains(&point.y)
            && (-l.z..=l.z).contains(&point.z)
    }

    /// Single-precision containment test used by the batched propagator.
    #[inline]
    pub fn contains_f32(&self, point: &[f32; 3]) -> bool {
        let l = self.half_extents_f32();
        (-l[0]..=l[0]).contains(&point[0])
            && (-l[1]..=l[1]).contains(&point[1])
            && (-l[2]..=l[2]).contains(&point[2])
    }

    #[inline]
    pub fn half_extents_f32(&self) -> [f32; 3] {
        [
            self.half_extents.x as f32,
            self.half_extents.y as f32,
            self.half_extents.z as f32,
        ]
    }

    /// Norm of the half-extent vector, i.e. the center-to-corner distance.
    pub fn half_diagonal(&self) -> f64 {
        self.half_extents.norm()
    }

    /// The longest streamline worth tracing: `round(2 * |(Lx, Ly, Lz)| / step_size)`.
    pub fn max_steps(&self, step_size: f64) -> usize {
        (2.0 * self.half_diagonal() / step_size).round() as usize
    }
}
