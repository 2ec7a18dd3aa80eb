// THEORY:
// The `Cluster` module holds the output of the spatial grouping stage. A `Cluster`
// is one maximal 4-connected region of foreground cells, and a `ClusterCollection`
// is every cluster found in a mask, in the order their seed cells were reached by
// a row-major scan.
//
// Key architectural principles:
// 1.  **Stateless Data Container**: Like `Pixel`, a `Cluster` is a "dumb" container.
//     It is produced once by the cluster finder, read once by the recolorer, and is
//     never mutated in between.
// 2.  **Order is for determinism only**: The order of coordinates inside a cluster
//     depends on the traversal strategy. Only the membership *set* is meaningful;
//     `member_set` is the canonical form for comparisons.
// 3.  **Cheap summaries**: Size and bounding box are derived on demand rather than
//     cached, since the recolorer only needs the size once.

use std::collections::BTreeSet;

/// A `(row, col)` grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether `other` is exactly one step away along one axis.
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// A non-empty, 4-connected set of foreground coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Coordinates in claim order.
    cells: Vec<Coord>,
}

impl Cluster {
    /// Wraps claimed cells. Returns `None` for an empty claim list, which happens
    /// when a seed had already been absorbed by an earlier cluster.
    pub fn from_cells(cells: Vec<Coord>) -> Option<Self> {
        if cells.is_empty() { None } else { Some(Self { cells }) }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// The first claimed cell.
    pub fn seed(&self) -> Coord {
        self.cells[0]
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        self.cells.contains(coord)
    }

    /// Membership as an ordered set, independent of traversal order.
    pub fn member_set(&self) -> BTreeSet<Coord> {
        self.cells.iter().copied().collect()
    }

    /// Top-left and bottom-right corners (inclusive).
    pub fn bounding_box(&self) -> (Coord, Coord) {
        let mut min = self.cells[0];
        let mut max = self.cells[0];
        for cell in &self.cells {
            min.row = min.row.min(cell.row);
            min.col = min.col.min(cell.col);
            max.row = max.row.max(cell.row);
            max.col = max.col.max(cell.col);
        }
        (min, max)
    }
}

/// Every cluster found in one labeling run, in seed discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterCollection {
    clusters: Vec<Cluster>,
    /// `(width, height)` of the mask the clusters were labeled on. `None` for
    /// collections assembled by hand.
    dimensions: Option<(usize, usize)>,
}

impl ClusterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty collection tied to a `width` x `height` mask.
    pub fn with_dimensions(width: usize, height: usize) -> Self {
        Self {
            clusters: Vec::new(),
            dimensions: Some((width, height)),
        }
    }

    /// `(width, height)` of the source mask, if known.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    pub fn push(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(Cluster::size).collect()
    }

    /// Total number of cells across all clusters.
    pub fn total_cells(&self) -> usize {
        self.clusters.iter().map(Cluster::size).sum()
    }

    /// Each cluster's membership set, sorted so two collections can be compared
    /// regardless of discovery order.
    pub fn partition(&self) -> BTreeSet<BTreeSet<Coord>> {
        self.clusters.iter().map(Cluster::member_set).collect()
    }
}

impl<'a> IntoIterator for &'a ClusterCollection {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

impl IntoIterator for ClusterCollection {
    type Item = Cluster;
    type IntoIter = std::vec::IntoIter<Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.into_iter()
    }
}
