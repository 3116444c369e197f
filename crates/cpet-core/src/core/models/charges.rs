use super::error::ModelError;
use nalgebra::Point3;

/// An immutable collection of point charges expressed in the box-local frame.
///
/// Positions and charge magnitudes are stored as parallel arrays. Once built, a
/// `ChargeSet` is only ever borrowed, so every streamline of a run sees exactly
/// the same charges.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeSet {
    positions: Vec<Point3<f64>>,
    charges: Vec<f64>,
}

impl ChargeSet {
    /// Creates a charge set from parallel position and charge arrays.
    ///
    /// # Arguments
    ///
    /// * `positions` - Charge locations in Angstroms, box-local frame.
    /// * `charges` - Signed charge magnitudes in elementary charge units.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ChargeLengthMismatch`] if the arrays differ in length.
    pub fn new(positions: Vec<Point3<f64>>, charges: Vec<f64>) -> Result<Self, ModelError> {
        if positions.len() != charges.len() {
            return Err(ModelError::ChargeLengthMismatch {
                positions: positions.len(),
                charges: charges.len(),
            });
        }
        Ok(Self { positions, charges })
    }

    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            charges: Vec::new(),
        }
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.charges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    /// Iterates over `(position, charge)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Point3<f64>, f64)> + '_ {
        self.positions.iter().zip(self.charges.iter().copied())
    }

    /// Sum of all charge magnitudes, in elementary charge units.
    pub fn net_charge(&self) -> f64 {
        self.charges.iter().sum()
    }

    /// Returns a new set keeping only the charges for which `keep` returns `true`.
    pub fn retain_by<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Point3<f64>, f64) -> bool,
    {
        let (positions, charges) = self
            .iter()
            .filter(|(p, q)| keep(p, *q))
            .map(|(p, q)| (*p, q))
            .unzip();
        Self { positions, charges }
    }

    /// Returns a new set with every position passed through `f`; charges are unchanged.
    pub fn map_positions<F>(&self, f: F) -> Self
    where
        F: FnMut(&Point3<f64>) -> Point3<f64>,
    {
        Self {
            positions: self.positions.iter().map(f).collect(),
            charges: self.charges.clone(),
        }
    }

    /// Flattens positions into an `[x0, y0, z0, x1, ...]` single-precision buffer.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    pub fn charges_f32(&self) -> Vec<f32> {
        self.charges.iter().map(|&q| q as f32).collect()
    }
}

impl Default for ChargeSet {
    fn default() -> Self {
        Self::empty()
    }
}
