use crate::core::models::error::ModelError;
use crate::core::models::region::SamplingBox;
use crate::core::models::seed::SeedSet;
use nalgebra::Point3;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Seed used for step budgets when they are requested to be reproducible.
pub const FIXED_BUDGET_SEED: u64 = 42;

/// How seed positions are laid out inside the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Initializer {
    /// Independent uniform draws over the whole box.
    #[default]
    Random,
    /// A regular interior grid with the same number of points on every axis.
    Uniform,
}

/// How per-seed step budgets are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetInit {
    /// Fresh randomness on every run (or the plan's `rng_seed`, if set).
    #[default]
    TrueRand,
    /// Budgets drawn from a generator seeded with [`FIXED_BUDGET_SEED`].
    FixedRand,
}

impl FromStr for Initializer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Initializer::Random),
            "uniform" => Ok(Initializer::Uniform),
            other => Err(format!(
                "unknown initializer '{}', expected 'random' or 'uniform'",
                other
            )),
        }
    }
}

impl FromStr for BudgetInit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "true-rand" => Ok(BudgetInit::TrueRand),
            "fixed-rand" => Ok(BudgetInit::FixedRand),
            other => Err(format!(
                "unknown step budget mode '{}', expected 'true-rand' or 'fixed-rand'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedingPlan {
    pub initializer: Initializer,
    pub budget_init: BudgetInit,
    /// Seeds the position generator (and the budget generator for `TrueRand`).
    pub rng_seed: Option<u64>,
}

impl SeedingPlan {
    /// Draws the seed population for one run.
    ///
    /// Budgets are uniform in `[1, max_steps)` (or exactly `1` when
    /// `max_steps <= 1`). The uniform grid rounds `n_samples` up to the next
    /// perfect cube, so the returned set may be larger than requested.
    #[instrument(skip_all, name = "seed_generation", fields(initializer = ?self.initializer))]
    pub fn generate(
        &self,
        region: &SamplingBox,
        n_samples: usize,
        max_steps: usize,
    ) -> Result<SeedSet, ModelError> {
        let mut position_rng = self.make_rng(self.rng_seed);
        let points = match self.initializer {
            Initializer::Random => random_points(region, n_samples, &mut position_rng),
            Initializer::Uniform => grid_points(region, n_samples),
        };

        let mut budget_rng = match self.budget_init {
            BudgetInit::TrueRand => position_rng,
            BudgetInit::FixedRand => self.make_rng(Some(FIXED_BUDGET_SEED)),
        };
        let budgets = random_budgets(points.len(), max_steps, &mut budget_rng);

        debug!(seeds = points.len(), max_steps, "Seed population drawn.");
        SeedSet::from_parts(points, budgets)
    }

    fn make_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}

/// Uniform random points over the box, one per sample.
pub fn random_points(region: &SamplingBox, n: usize, rng: &mut impl Rng) -> Vec<Point3<f64>> {
    let l = region.half_extents();
    (0..n)
        .map(|_| {
            Point3::new(
                rng.gen_range(-l.x..l.x),
                rng.gen_range(-l.y..l.y),
                rng.gen_range(-l.z..l.z),
            )
        })
        .collect()
}

/// Number of grid points per axis needed to hold at least `n` points.
pub fn points_per_axis(n: usize) -> usize {
    let mut k = (n as f64).cbrt().round() as usize;
    if k.pow(3) < n {
        k += 1;
    }
    k
}

/// An interior grid of `k^3` points, `k = points_per_axis(n)`.
///
/// Spacing along each axis is `2L / (k + 1)`, so no point lies on a face.
pub fn grid_points(region: &SamplingBox, n: usize) -> Vec<Point3<f64>> {
    let k = points_per_axis(n);
    let l = region.half_extents();
    let spacing = l * 2.0 / (k as f64 + 1.0);
    let coord = |half: f64, step: f64, i: usize| -half + step * (i as f64 + 1.0);

    let mut points = Vec::with_capacity(k.pow(3));
    for i in 0..k {
        for j in 0..k {
            for m in 0..k {
                points.push(Point3::new(
                    coord(l.x, spacing.x, i),
                    coord(l.y, spacing.y, j),
                    coord(l.z, spacing.z, m),
                ));
            }
        }
    }
    points
}

pub fn random_budgets(n: usize, max_steps: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n)
        .map(|_| {
            if max_steps > 1 {
                rng.gen_range(1..max_steps)
            } else {
                1
            }
        })
        .collect()
}
