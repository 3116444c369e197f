use crate::core::models::charges::ChargeSet;
use crate::core::models::frame::BoxFrame;
use crate::core::models::region::SamplingBox;
use nalgebra::Vector3;
use tracing::{debug, info, instrument};

/// How raw charges are filtered and moved into the box-local frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChargePreparation {
    pub frame: BoxFrame,
    /// Keep only charges within this distance of the box center.
    pub filter_radius: Option<f64>,
    /// Drop charges strictly inside the sampling box.
    pub filter_in_box: bool,
    /// Offset subtracted from every local position after the frame change.
    pub box_shift: Vector3<f64>,
}

/// Applies the radius filter in the global frame, moves the survivors into the
/// box frame, then applies the in-box filter and the shift there.
#[instrument(skip_all, name = "charge_preparation")]
pub fn prepare_charges(
    global: &ChargeSet,
    preparation: &ChargePreparation,
    region: &SamplingBox,
) -> ChargeSet {
    let center = *preparation.frame.center();
    let mut charges = global.clone();

    if let Some(radius) = preparation.filter_radius {
        charges = charges.retain_by(|p, _| (p - center).norm() <= radius);
        debug!(radius, kept = charges.len(), "Applied radius filter.");
    }

    let mut local = preparation.frame.localize(&charges);

    if preparation.filter_in_box {
        local = filter_in_box(&local, region);
        debug!(kept = local.len(), "Removed charges inside the sampling box.");
    }

    if preparation.box_shift != Vector3::zeros() {
        let shift = preparation.box_shift;
        local = local.map_positions(|p| p - shift);
    }

    info!(
        input = global.len(),
        kept = local.len(),
        net_charge = local.net_charge(),
        "Charges prepared in the box frame."
    );
    local
}

/// Removes charges that lie strictly inside `region`. Charges on a face are kept.
pub fn filter_in_box(local: &ChargeSet, region: &SamplingBox) -> ChargeSet {
    let l = region.half_extents();
    local.retain_by(|p, _| !(p.x.abs() < l.x && p.y.abs() < l.y && p.z.abs() < l.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn sample_charges() -> ChargeSet {
        ChargeSet::new(
            vec![
                Point3::new(10.5, 0.0, 0.0),
                Point3::new(11.0, 0.0, 0.0),
                Point3::new(13.0, 0.0, 0.0),
                Point3::new(10.0, 25.0, 0.0),
            ],
            vec![1.0, -1.0, 0.5, 2.0],
        )
        .unwrap()
    }

    fn shifted_frame() -> BoxFrame {
        BoxFrame::from_axis_points(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(11.0, 0.0, 0.0),
            Point3::new(10.0, 1.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn filter_in_box_keeps_face_and_outside_charges() {
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let local = ChargeSet::new(
            vec![
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, -3.0, 0.0),
            ],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();

        let kept = filter_in_box(&local, &region);

        assert_eq!(kept.charges(), &[2.0, 3.0]);
    }

    #[test]
    fn preparation_recenters_and_filters() {
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let preparation = ChargePreparation {
            frame: shifted_frame(),
            filter_radius: Some(5.0),
            filter_in_box: true,
            box_shift: Vector3::zeros(),
        };

        let local = prepare_charges(&sample_charges(), &preparation, &region);

        assert_eq!(local.charges(), &[-1.0, 0.5]);
        assert!((local.positions()[0] - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((local.positions()[1] - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn box_shift_moves_local_positions() {
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let preparation = ChargePreparation {
            frame: shifted_frame(),
            box_shift: Vector3::new(0.5, 0.0, 0.0),
            ..ChargePreparation::default()
        };

        let local = prepare_charges(&sample_charges(), &preparation, &region);

        assert_eq!(local.len(), 4);
        assert!((local.positions()[0] - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn input_charges_are_left_untouched() {
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let global = sample_charges();
        let before = global.clone();
        let preparation = ChargePreparation {
            frame: shifted_frame(),
            filter_in_box: true,
            ..ChargePreparation::default()
        };

        let _ = prepare_charges(&global, &preparation, &region);

        assert_eq!(global, before);
    }
}
