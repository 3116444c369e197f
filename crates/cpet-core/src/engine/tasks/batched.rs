use crate::core::field::coulomb::field_at_f32;
use crate::core::models::region::SamplingBox;
use crate::core::models::seed::SeedSet;
use crate::core::models::topology::{Endtype, TopologyRecord, TopologyResult};
use crate::core::utils::geometry::curvature_and_distance_batch;
use crate::engine::context::RunContext;
use crate::engine::device::{DeviceBuffer, DeviceContext};
use crate::engine::error::EngineError;
use crate::engine::integrator::FieldIntegrator;
use crate::engine::progress::Progress;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type Row = [f32; 3];

/// Advances every seed at once in single precision, in chunks of
/// `batch_frequency` rows, retiring samples as soon as they stop.
///
/// The path tensor holds `window` rows of `n` points. Rows 0 and 1 of each
/// chunk are the last two rows of the previous one, so every chunk advances
/// `window - 2` global steps and the look-ahead points of any checked row are
/// always in the same chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedPropagator;

/// Cumulative number of retired samples after each chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkLog {
    dumped_after_chunk: Vec<usize>,
}

impl ChunkLog {
    pub fn chunks(&self) -> usize {
        self.dumped_after_chunk.len()
    }

    pub fn counts(&self) -> &[usize] {
        &self.dumped_after_chunk
    }

    pub fn total_dumped(&self) -> usize {
        self.dumped_after_chunk.last().copied().unwrap_or(0)
    }

    fn record(&mut self, dumped: usize) {
        self.dumped_after_chunk.push(dumped);
    }
}

/// Retired samples, packed in retirement order.
struct DumpArena {
    /// `[init, init+1, init+2, final, final+1, final+2]`, one slot per sample.
    columns: [DeviceBuffer<Row>; 6],
    sample: DeviceBuffer<usize>,
    exited: DeviceBuffer<bool>,
    cursor: usize,
}

impl DumpArena {
    fn new(device: &mut DeviceContext, n: usize) -> Result<Self, EngineError> {
        Ok(Self {
            columns: [
                device.alloc(n)?,
                device.alloc(n)?,
                device.alloc(n)?,
                device.alloc(n)?,
                device.alloc(n)?,
                device.alloc(n)?,
            ],
            sample: device.alloc(n)?,
            exited: device.alloc(n)?,
            cursor: 0,
        })
    }

    fn push(&mut self, init: [Row; 3], last: [Row; 3], sample: usize, endtype: Endtype) {
        let slot = self.cursor;
        for k in 0..3 {
            self.columns[k][slot] = init[k];
            self.columns[k + 3][slot] = last[k];
        }
        self.sample[slot] = sample;
        self.exited[slot] = endtype == Endtype::ExitedBox;
        self.cursor += 1;
    }

    fn is_full(&self) -> bool {
        self.cursor == self.sample.len()
    }
}

/// Shape of one run: sample count, window height and the step horizon.
#[derive(Debug, Clone, Copy)]
struct Plan {
    n: usize,
    window: usize,
    horizon: usize,
}

impl Plan {
    #[inline]
    fn stride(&self) -> usize {
        self.window - 2
    }

    /// Fused steps performed by the chunk starting at global step `base`.
    #[inline]
    fn steps_in_chunk(&self, base: usize) -> usize {
        self.stride().min(self.horizon - base + 1)
    }

    /// Highest row tested by the filter in the chunk starting at `base`.
    #[inline]
    fn last_checked_row(&self, base: usize) -> usize {
        (self.window - 3).min(self.horizon - base)
    }
}

impl FieldIntegrator for BatchedPropagator {
    fn name(&self) -> &'static str {
        "batched"
    }

    fn integrate(
        &self,
        context: &RunContext<'_>,
        seeds: &SeedSet,
    ) -> Result<TopologyResult, EngineError> {
        self.propagate(context, seeds).map(|(result, _)| result)
    }
}

impl BatchedPropagator {
    /// Runs the chunked propagation and also returns the per-chunk retirement log.
    #[instrument(skip_all, name = "batched_propagation", fields(seeds = seeds.len(), window = context.config.batch_frequency))]
    pub fn propagate(
        &self,
        context: &RunContext<'_>,
        seeds: &SeedSet,
    ) -> Result<(TopologyResult, ChunkLog), EngineError> {
        let n = seeds.len();
        let mut log = ChunkLog::default();
        if n == 0 {
            return Ok((TopologyResult::default(), log));
        }

        let plan = Plan {
            n,
            window: context.config.batch_frequency,
            horizon: context.config.max_steps().max(seeds.longest_budget()),
        };
        if plan.window < 3 {
            return Err(EngineError::Internal(format!(
                "batch window of {} rows cannot hold a point triple",
                plan.window
            )));
        }
        info!(
            samples = n,
            horizon = plan.horizon,
            charges = context.charges.len(),
            "Starting batched propagation."
        );

        let mut device = DeviceContext::acquire(context.config.device_memory_limit);
        let positions = device.upload(&context.charges.positions_f32())?;
        let charges = device.upload(&context.charges.charges_f32())?;
        let budgets = device.upload(&seeds.iter().map(|s| s.max_steps).collect::<Vec<_>>())?;
        let mut path = device.alloc::<Row>(plan.window * n)?;
        let mut init: [DeviceBuffer<Row>; 3] =
            [device.alloc(n)?, device.alloc(n)?, device.alloc(n)?];
        let mut active = device.alloc_filled(n, true)?;
        let mut arena = DumpArena::new(&mut device, n)?;
        debug!(bytes = device.allocated(), "Device buffers allocated.");

        let step_size = context.step_size() as f32;
        let advance = |path: &mut [Row], active: &[bool], row: usize| {
            fused_step(path, active, row, n, &positions, &charges, step_size)
        };

        for (slot, seed) in path[..n].iter_mut().zip(seeds.iter()) {
            let p = seed.position;
            *slot = [p.x as f32, p.y as f32, p.z as f32];
        }
        advance(&mut path, &active, 1);

        context.reporter.report(Progress::TaskStart { total: n as u64 });

        let region = context.region();
        let mut base = 0;
        let mut chunk = 0;
        while base <= plan.horizon && !arena.is_full() {
            if chunk > 0 {
                path.copy_within((plan.window - 2) * n..plan.window * n, 0);
            }

            let steps = plan.steps_in_chunk(base);
            for row in 2..2 + steps {
                advance(&mut path, &active, row);
            }

            if chunk == 0 {
                for (k, column) in init.iter_mut().enumerate() {
                    column.copy_from_slice(&path[k * n..(k + 1) * n]);
                }
            }

            let before = arena.cursor;
            let stops = find_stops(&path, &active, &budgets, region, &plan, base);
            for (sample, stop) in stops.into_iter().enumerate() {
                let Some((row, endtype)) = stop else { continue };
                let at = |r: usize| path[r * n + sample];
                arena.push(
                    [init[0][sample], init[1][sample], init[2][sample]],
                    [at(row), at(row + 1), at(row + 2)],
                    sample,
                    endtype,
                );
                active[sample] = false;
            }

            let retired = arena.cursor - before;
            log.record(arena.cursor);
            context.reporter.report(Progress::TaskAdvance(retired as u64));
            debug!(chunk, base, steps, retired, dumped = arena.cursor, "Chunk filtered.");

            base += plan.stride();
            chunk += 1;
        }
        context.reporter.report(Progress::TaskFinish);

        let result = reduce_arena(&arena, n)?;
        info!(
            chunks = log.chunks(),
            exited = result.count_endtype(Endtype::ExitedBox),
            "Batched propagation finished."
        );
        Ok((result, log))
    }
}

/// Computes row `row` from row `row - 1` for every sample. Inactive samples
/// are copied forward unchanged and cost no field evaluation.
fn fused_step(
    path: &mut [Row],
    active: &[bool],
    row: usize,
    n: usize,
    positions: &[f32],
    charges: &[f32],
    step_size: f32,
) {
    let (head, tail) = path.split_at_mut(row * n);
    let prev = &head[(row - 1) * n..];
    let next = &mut tail[..n];

    let step = |(out, (p, &live)): (&mut Row, (&Row, &bool))| {
        *out = if live {
            let e = field_at_f32(p, positions, charges);
            [
                p[0] + step_size * e[0],
                p[1] + step_size * e[1],
                p[2] + step_size * e[2],
            ]
        } else {
            *p
        };
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = next.iter_mut().zip(prev.iter().zip(active.iter()));

    #[cfg(feature = "parallel")]
    let iterator = next
        .par_iter_mut()
        .zip(prev.par_iter().zip(active.par_iter()));

    iterator.for_each(step);
}

/// For every still-active sample, the first checked row at which it stops.
///
/// A row stops a sample when its point is outside the box or when its global
/// step equals the sample's budget; leaving the box takes precedence.
fn find_stops(
    path: &[Row],
    active: &[bool],
    budgets: &[usize],
    region: &SamplingBox,
    plan: &Plan,
    base: usize,
) -> Vec<Option<(usize, Endtype)>> {
    let n = plan.n;
    let last_row = plan.last_checked_row(base);
    let check = |sample: usize| -> Option<(usize, Endtype)> {
        if !active[sample] {
            return None;
        }
        (0..=last_row)
            .filter(|&r| base + r >= 1)
            .find_map(|r| {
                if !region.contains_f32(&path[r * n + sample]) {
                    Some((r, Endtype::ExitedBox))
                } else if base + r == budgets[sample] {
                    Some((r, Endtype::MaxStepsReached))
                } else {
                    None
                }
            })
    };

    #[cfg(not(feature = "parallel"))]
    let stops = (0..n).map(check).collect();

    #[cfg(feature = "parallel")]
    let stops = (0..n).into_par_iter().map(check).collect();

    stops
}

/// Reduces the whole arena in one vectorized pass and scatters the records
/// back into seed order.
fn reduce_arena(arena: &DumpArena, n: usize) -> Result<TopologyResult, EngineError> {
    let used = arena.cursor;
    let [c0, c1, c2, c3, c4, c5] = &arena.columns;
    let (distances, curvatures) = curvature_and_distance_batch([
        &c0[..used],
        &c1[..used],
        &c2[..used],
        &c3[..used],
        &c4[..used],
        &c5[..used],
    ]);

    let mut slots: Vec<Option<(TopologyRecord, Endtype)>> = vec![None; n];
    for k in 0..used {
        let endtype = if arena.exited[k] {
            Endtype::ExitedBox
        } else {
            Endtype::MaxStepsReached
        };
        let record = TopologyRecord::new(distances[k] as f64, curvatures[k] as f64);
        slots[arena.sample[k]] = Some((record, endtype));
    }

    let mut result = TopologyResult::with_capacity(n);
    for (sample, slot) in slots.into_iter().enumerate() {
        let (record, endtype) = slot.ok_or_else(|| {
            EngineError::Internal(format!("sample {} was never retired", sample))
        })?;
        result.push(record, endtype);
    }
    Ok(result)
}
