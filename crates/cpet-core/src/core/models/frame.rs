use super::charges::ChargeSet;
use super::error::ModelError;
use nalgebra::{Matrix3, Point3, Vector3};

const MIN_AXIS_LENGTH: f64 = 1e-10;

/// An orthonormal box frame anchored at a center point.
///
/// The frame is built from three global-frame points: the box center, a point
/// along the desired x axis, and a point roughly along the desired y axis. The
/// y axis is re-orthogonalized against x, and z completes a right-handed basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    center: Point3<f64>,
    /// Rows are the local x, y and z unit vectors expressed in the global frame.
    basis: Matrix3<f64>,
}

impl BoxFrame {
    /// The identity frame: local and global coordinates coincide.
    pub fn identity() -> Self {
        Self {
            center: Point3::origin(),
            basis: Matrix3::identity(),
        }
    }

    /// Builds the frame from a center and two axis-defining points.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DegenerateFrame`] if either axis point coincides
    /// with the center or the two axes are parallel.
    pub fn from_axis_points(
        center: Point3<f64>,
        x_point: Point3<f64>,
        y_point: Point3<f64>,
    ) -> Result<Self, ModelError> {
        let x = x_point - center;
        let y = y_point - center;
        if x.norm() < MIN_AXIS_LENGTH {
            return Err(ModelError::DegenerateFrame("x-axis point coincides with center"));
        }
        if y.norm() < MIN_AXIS_LENGTH {
            return Err(ModelError::DegenerateFrame("y-axis point coincides with center"));
        }

        let x_unit = x.normalize();
        let y_unit = y.normalize();
        let z = x_unit.cross(&y_unit);
        if z.norm() < MIN_AXIS_LENGTH {
            return Err(ModelError::DegenerateFrame("x and y axes are parallel"));
        }
        let z_unit = z.normalize();
        let y_unit = z_unit.cross(&x_unit).normalize();

        Ok(Self {
            center,
            basis: Matrix3::from_rows(&[
                x_unit.transpose(),
                y_unit.transpose(),
                z_unit.transpose(),
            ]),
        })
    }

    #[inline]
    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    #[inline]
    pub fn basis(&self) -> &Matrix3<f64> {
        &self.basis
    }

    /// Maps a global-frame point into the box-local frame.
    #[inline]
    pub fn to_local(&self, global: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.basis * (global - self.center))
    }

    /// Maps a box-local point back into the global frame.
    #[inline]
    pub fn to_global(&self, local: &Point3<f64>) -> Point3<f64> {
        self.center + self.basis.transpose() * local.coords
    }

    /// Rotates a local-frame vector (e.g. a field vector) into the global frame.
    #[inline]
    pub fn vector_to_global(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.basis.transpose() * local
    }

    /// Re-expresses every charge position of a global-frame set in this frame.
    pub fn localize(&self, charges: &ChargeSet) -> ChargeSet {
        charges.map_positions(|p| self.to_local(p))
    }
}

impl Default for BoxFrame {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn points_close(a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() < TOLERANCE
    }

    #[test]
    fn axis_aligned_points_give_translation_only() {
        let c = Point3::new(10.0, 20.0, 30.0);
        let frame =
            BoxFrame::from_axis_points(c, c + Vector3::x(), c + Vector3::y()).unwrap();
        assert!((frame.basis() - Matrix3::identity()).norm() < TOLERANCE);
        assert!(points_close(
            &frame.to_local(&Point3::new(11.0, 20.0, 30.0)),
            &Point3::new(1.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn rotated_axes_map_x_point_onto_local_x() {
        let c = Point3::origin();
        let frame = BoxFrame::from_axis_points(
            c,
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(-1.0, 0.3, 0.0),
        )
        .unwrap();
        assert!(points_close(
            &frame.to_local(&Point3::new(0.0, 2.0, 0.0)),
            &Point3::new(2.0, 0.0, 0.0)
        ));
        assert!(points_close(
            &frame.to_local(&Point3::new(-1.0, 0.0, 0.0)),
            &Point3::new(0.0, 1.0, 0.0)
        ));
        assert!(points_close(
            &frame.to_local(&Point3::new(0.0, 0.0, 1.0)),
            &Point3::new(0.0, 0.0, 1.0)
        ));
    }

    #[test]
    fn to_global_inverts_to_local() {
        let frame = BoxFrame::from_axis_points(
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(2.0, -1.0, 0.5),
            Point3::new(1.0, -2.0, 3.0),
        )
        .unwrap();
        let p = Point3::new(0.3, 4.0, -7.0);
        assert!(points_close(&frame.to_global(&frame.to_local(&p)), &p));
    }

    #[test]
    fn parallel_axes_are_rejected() {
        let c = Point3::origin();
        let result =
            BoxFrame::from_axis_points(c, Point3::new(1.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0));
        assert!(matches!(result, Err(ModelError::DegenerateFrame(_))));
    }

    #[test]
    fn localize_keeps_charge_values() {
        let c = Point3::new(5.0, 5.0, 5.0);
        let frame =
            BoxFrame::from_axis_points(c, c + Vector3::x(), c + Vector3::y()).unwrap();
        let global =
            ChargeSet::new(vec![Point3::new(6.0, 5.0, 5.0)], vec![-0.8]).unwrap();
        let local = frame.localize(&global);
        assert_eq!(local.charges(), &[-0.8]);
        assert!(points_close(&local.positions()[0], &Point3::new(1.0, 0.0, 0.0)));
    }
}
