use crate::core::field::coulomb::FieldEvaluator;
use crate::core::models::region::SamplingBox;
use crate::core::models::seed::Seed;
use crate::core::models::topology::{Endtype, TopologyRecord};
use crate::core::utils::geometry::{PointTriple, curvature_and_distance};
use nalgebra::Point3;

/// The six points that survive a streamline: three consecutive Euler points
/// from the seed and three from the retained final point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamlineEnds {
    pub init: PointTriple,
    pub last: PointTriple,
    pub endtype: Endtype,
}

impl StreamlineEnds {
    pub fn record(&self) -> TopologyRecord {
        curvature_and_distance(&self.init, &self.last)
    }
}

/// Traces one field line from `seed` with fixed-step Euler integration.
///
/// After every step the new point is tested against the box; the first point
/// outside it ends the line and is kept as the final point. Otherwise the line
/// ends after `seed.max_steps` steps. The two look-ahead points of each triple
/// ignore the box.
pub fn trace(
    field: &FieldEvaluator<'_>,
    region: &SamplingBox,
    seed: &Seed,
    step_size: f64,
) -> StreamlineEnds {
    let mut point = seed.position;
    let mut endtype = Endtype::MaxStepsReached;

    for _ in 0..seed.max_steps {
        point = field.step(&point, step_size);
        if !region.contains(&point) {
            endtype = Endtype::ExitedBox;
            break;
        }
    }

    StreamlineEnds {
        init: look_ahead(field, seed.position, step_size),
        last: look_ahead(field, point, step_size),
        endtype,
    }
}

fn look_ahead(field: &FieldEvaluator<'_>, start: Point3<f64>, step_size: f64) -> PointTriple {
    let next = field.step(&start, step_size);
    let after = field.step(&next, step_size);
    [start, next, after]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::charges::ChargeSet;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn empty_field_stays_put_until_budget_runs_out() {
        let charges = ChargeSet::empty();
        let field = FieldEvaluator::new(&charges);
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let seed = Seed::new(Point3::new(0.2, -0.3, 0.1), 5);

        let ends = trace(&field, &region, &seed, 0.1);

        assert_eq!(ends.endtype, Endtype::MaxStepsReached);
        assert_eq!(ends.last[0], seed.position);
        let record = ends.record();
        assert_eq!(record.distance, 0.0);
        assert!(record.mean_curvature.is_nan());
    }

    #[test]
    fn uniform_push_exits_at_first_outside_point() {
        // A far-away charge gives an almost uniform field along -x at the origin.
        let charges = ChargeSet::new(vec![Point3::new(1.0e4, 0.0, 0.0)], vec![1.0e8]).unwrap();
        let field = FieldEvaluator::new(&charges);
        let e = field.field_at(&Point3::origin()).x;
        assert!(e < 0.0);

        let step_size = 0.5 / e.abs();
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let seed = Seed::new(Point3::origin(), 100);

        let ends = trace(&field, &region, &seed, step_size);

        assert_eq!(ends.endtype, Endtype::ExitedBox);
        assert!(!region.contains(&ends.last[0]));
        assert!(ends.last[0].x < -1.0 && ends.last[0].x > -1.6);
        assert!(f64_approx_equal(ends.record().distance, ends.last[0].x.abs()));
    }

    #[test]
    fn exit_freezes_the_streamline_regardless_of_remaining_budget() {
        let charges = ChargeSet::new(
            vec![Point3::new(3.0, 0.5, 0.0), Point3::new(-2.5, -1.0, 0.5)],
            vec![-1.0, 0.8],
        )
        .unwrap();
        let field = FieldEvaluator::new(&charges);
        let region = SamplingBox::new(1.0, 1.0, 1.0).unwrap();
        let seed = |budget| Seed::new(Point3::new(0.2, 0.1, -0.1), budget);

        let reference = trace(&field, &region, &seed(500), 0.05);
        assert_eq!(reference.endtype, Endtype::ExitedBox);

        for budget in [600, 1_000, 5_000] {
            assert_eq!(trace(&field, &region, &seed(budget), 0.05), reference);
        }
    }

    #[test]
    fn straight_line_has_zero_mean_curvature() {
        let charges = ChargeSet::new(vec![Point3::new(-50.0, 0.0, 0.0)], vec![1.0]).unwrap();
        let field = FieldEvaluator::new(&charges);
        let region = SamplingBox::new(5.0, 5.0, 5.0).unwrap();
        let seed = Seed::new(Point3::origin(), 10);

        let ends = trace(&field, &region, &seed, 0.1);

        assert_eq!(ends.endtype, Endtype::MaxStepsReached);
        assert!(f64_approx_equal(ends.record().mean_curvature, 0.0));
        assert!(ends.record().distance > 0.0);
    }

    #[test]
    fn one_step_budget_takes_exactly_one_step() {
        let charges = ChargeSet::new(vec![Point3::new(0.0, 0.0, 20.0)], vec![-2.0]).unwrap();
        let field = FieldEvaluator::new(&charges);
        let region = SamplingBox::new(5.0, 5.0, 5.0).unwrap();
        let seed = Seed::new(Point3::new(1.0, 1.0, 1.0), 1);

        let ends = trace(&field, &region, &seed, 0.1);

        assert_eq!(ends.last[0], ends.init[1]);
        assert_eq!(ends.endtype, Endtype::MaxStepsReached);
    }
}
