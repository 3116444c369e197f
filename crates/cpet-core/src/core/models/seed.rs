use super::error::ModelError;
use nalgebra::Point3;

/// A streamline starting point paired with its maximum number of advancing steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    /// Starting point in the box-local frame, in Angstroms.
    pub position: Point3<f64>,
    /// Maximum number of Euler steps this streamline may take. Always positive.
    pub max_steps: usize,
}

impl Seed {
    pub fn new(position: Point3<f64>, max_steps: usize) -> Self {
        Self {
            position,
            max_steps,
        }
    }
}

/// An ordered, validated list of seeds.
///
/// Result tables produced from a `SeedSet` are always order-matched to it: row
/// `i` of the output belongs to `seeds()[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSet {
    seeds: Vec<Seed>,
}

impl SeedSet {
    /// Pairs starting points with step budgets.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SeedLengthMismatch`] if the two lists differ in
    /// length, or [`ModelError::ZeroStepBudget`] if any budget is zero. Both
    /// are checked before any propagation can begin.
    pub fn from_parts(points: Vec<Point3<f64>>, budgets: Vec<usize>) -> Result<Self, ModelError> {
        if points.len() != budgets.len() {
            return Err(ModelError::SeedLengthMismatch {
                points: points.len(),
                budgets: budgets.len(),
            });
        }
        let seeds = points
            .into_iter()
            .zip(budgets)
            .map(|(p, n)| Seed::new(p, n))
            .collect();
        Self::new(seeds)
    }

    pub fn new(seeds: Vec<Seed>) -> Result<Self, ModelError> {
        if let Some(index) = seeds.iter().position(|s| s.max_steps == 0) {
            return Err(ModelError::ZeroStepBudget { index });
        }
        Ok(Self { seeds })
    }

    #[inline]
    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Seed> {
        self.seeds.iter()
    }

    /// The largest step budget in the set, or `0` for an empty set.
    pub fn longest_budget(&self) -> usize {
        self.seeds.iter().map(|s| s.max_steps).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a SeedSet {
    type Item = &'a Seed;
    type IntoIter = std::slice::Iter<'a, Seed>;

    fn into_iter(self) -> Self::IntoIter {
        self.seeds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let result = SeedSet::from_parts(vec![Point3::origin(); 3], vec![1, 2]);
        assert_eq!(
            result,
            Err(ModelError::SeedLengthMismatch {
                points: 3,
                budgets: 2
            })
        );
    }

    #[test]
    fn from_parts_rejects_zero_budget() {
        let result = SeedSet::from_parts(vec![Point3::origin(); 3], vec![4, 0, 1]);
        assert_eq!(result, Err(ModelError::ZeroStepBudget { index: 1 }));
    }

    #[test]
    fn empty_seed_set_is_valid() {
        let set = SeedSet::from_parts(Vec::new(), Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.longest_budget(), 0);
    }

    #[test]
    fn from_parts_preserves_order() {
        let set = SeedSet::from_parts(
            vec![Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
            vec![7, 3],
        )
        .unwrap();
        let xs: Vec<f64> = set.iter().map(|s| s.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
        assert_eq!(set.longest_budget(), 7);
    }
}
