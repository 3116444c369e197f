use std::fmt;

/// Why a streamline stopped advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endtype {
    /// The last advancing step left the sampling box.
    ExitedBox,
    /// The seed's step budget ran out while still inside the box.
    MaxStepsReached,
}

impl fmt::Display for Endtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endtype::ExitedBox => write!(f, "exited_box"),
            Endtype::MaxStepsReached => write!(f, "max_steps_reached"),
        }
    }
}

/// The two scalar descriptors of one streamline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopologyRecord {
    /// Euclidean distance between the seed and the retained final point.
    pub distance: f64,
    /// Mean of the curvatures at the start and at the end of the streamline.
    pub mean_curvature: f64,
}

impl TopologyRecord {
    pub fn new(distance: f64, mean_curvature: f64) -> Self {
        Self {
            distance,
            mean_curvature,
        }
    }
}

/// Per-seed output of a topology run, order-matched to the input seeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyResult {
    pub records: Vec<TopologyRecord>,
    pub endtypes: Vec<Endtype>,
}

impl TopologyResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
            endtypes: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, record: TopologyRecord, endtype: Endtype) {
        self.records.push(record);
        self.endtypes.push(endtype);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_endtype(&self, endtype: Endtype) -> usize {
        self.endtypes.iter().filter(|&&e| e == endtype).count()
    }
}
