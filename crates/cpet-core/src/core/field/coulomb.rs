use crate::core::models::charges::ChargeSet;
use nalgebra::{Point3, Vector3};

/// Coulomb constant in eV·Å/e².
pub const COULOMB_CONSTANT: f64 = 14.3996451;
pub const COULOMB_CONSTANT_F32: f32 = COULOMB_CONSTANT as f32;

/// Evaluates the electrostatic field of a fixed charge set.
///
/// The evaluator only borrows the charges; any number of evaluators may share
/// one `ChargeSet` across threads.
///
/// `E(x0) = k_e * sum_i Q_i * (x0 - x_i) / |x0 - x_i|^3`
///
/// The returned vector is not normalized. A query point that coincides with a
/// charge divides zero by zero and yields non-finite components; this is left
/// to propagate.
#[derive(Debug, Clone, Copy)]
pub struct FieldEvaluator<'a> {
    charges: &'a ChargeSet,
}

impl<'a> FieldEvaluator<'a> {
    pub fn new(charges: &'a ChargeSet) -> Self {
        Self { charges }
    }

    #[inline]
    pub fn charges(&self) -> &'a ChargeSet {
        self.charges
    }

    /// Field vector at a single point.
    pub fn field_at(&self, point: &Point3<f64>) -> Vector3<f64> {
        let mut field = Vector3::zeros();
        for (position, q) in self.charges.iter() {
            let r = point - position;
            let r_sq = r.norm_squared();
            let r_cube = r_sq * r_sq.sqrt();
            field += r * (q / r_cube);
        }
        field * COULOMB_CONSTANT
    }

    /// Field vectors at many points, returned in input order.
    pub fn field_at_points(&self, points: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| self.field_at(p)).collect()
    }

    /// One explicit Euler step along the field: `p + h * E(p)`.
    #[inline]
    pub fn step(&self, point: &Point3<f64>, step_size: f64) -> Point3<f64> {
        point + self.field_at(point) * step_size
    }
}

/// Single-precision field at `point` for flattened charge buffers.
///
/// `positions` holds `[x0, y0, z0, x1, ...]`; `charges` holds one value per
/// charge. All arithmetic is done in `f32`.
#[inline]
pub fn field_at_f32(point: &[f32; 3], positions: &[f32], charges: &[f32]) -> [f32; 3] {
    let mut e = [0.0f32; 3];
    for (xyz, &q) in positions.chunks_exact(3).zip(charges) {
        let rx = point[0] - xyz[0];
        let ry = point[1] - xyz[1];
        let rz = point[2] - xyz[2];
        let r_sq = rx * rx + ry * ry + rz * rz;
        let scale = q / (r_sq * r_sq.sqrt());
        e[0] += rx * scale;
        e[1] += ry * scale;
        e[2] += rz * scale;
    }
    [
        e[0] * COULOMB_CONSTANT_F32,
        e[1] * COULOMB_CONSTANT_F32,
        e[2] * COULOMB_CONSTANT_F32,
    ]
}
