use super::prepare::{ChargePreparation, prepare_charges};
use crate::core::field::coulomb::FieldEvaluator;
use crate::core::models::charges::ChargeSet;
use crate::core::models::region::SamplingBox;
use nalgebra::{Point3, Vector3};
use tracing::{info, instrument};

/// The electric field at the box center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointField {
    /// Field vector along the box axes, in V/Angstrom.
    pub local: Vector3<f64>,
    /// The same vector along the global axes.
    pub global: Vector3<f64>,
    pub magnitude: f64,
}

/// Evaluates the field of the prepared charges at the center of the box.
#[instrument(skip_all, name = "point_field_workflow")]
pub fn point_field(
    global_charges: &ChargeSet,
    preparation: &ChargePreparation,
    region: &SamplingBox,
) -> PointField {
    let charges = prepare_charges(global_charges, preparation, region);
    let local = FieldEvaluator::new(&charges).field_at(&Point3::origin());
    let field = PointField {
        local,
        global: preparation.frame.vector_to_global(&local),
        magnitude: local.norm(),
    };
    info!(magnitude = field.magnitude, "Point field evaluated.");
    field
}
