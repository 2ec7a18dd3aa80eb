// THEORY:
// The `ClusterFinder` is the engine of the spatial grouping stage. It performs
// connected-component labeling on the foreground mask and returns every maximal
// 4-connected region as a `Cluster`.
//
// Key architectural principles & algorithm steps:
// 1.  **Row-major seeding**: Every cell is a candidate seed. A seed that is still
//     `true` starts a new cluster with a worklist holding just that seed.
// 2.  **Claim on pop**: A popped coordinate is claimed through `Mask::claim`. Only a
//     successful claim adds the cell to the cluster and pushes its four neighbors.
//     Neighbors are pushed unconditionally; duplicates and off-grid entries fall out
//     on their own when the claim fails.
// 3.  **Explicit worklist**: The flood fill never recurses, so stack usage does not
//     grow with cluster size. The worklist is a `VecDeque` so the same loop can run
//     depth-first (LIFO) or breadth-first (FIFO). Membership is identical either way;
//     only the order of cells inside a cluster changes.
// 4.  **Destructive visitation**: The mask is borrowed mutably for the whole run and
//     is all `false` when labeling returns. Labeling it again yields nothing.

use crate::core_modules::cluster::{Cluster, ClusterCollection, Coord};
use crate::core_modules::mask::Mask;

pub mod cluster_finder {
    use super::*; // Make the mask and cluster types available.
    use std::collections::VecDeque;
    use tracing::debug;

    /// The order in which pending coordinates are taken off the worklist.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Traversal {
        /// Depth-first: newest entry first.
        #[default]
        Lifo,
        /// Breadth-first: oldest entry first.
        Fifo,
    }

    /// The order in which cells are considered as seeds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ScanOrder {
        #[default]
        RowMajor,
        /// Bottom-right to top-left.
        ReverseRowMajor,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LabelOptions {
        pub traversal: Traversal,
        pub scan: ScanOrder,
    }

    /// Labels every 4-connected foreground region of `mask`, leaving it all `false`.
    pub fn label(mask: &mut Mask) -> ClusterCollection {
        label_with(mask, LabelOptions::default())
    }

    /// Labels `mask` with an explicit traversal and scan order.
    pub fn label_with(mask: &mut Mask, options: LabelOptions) -> ClusterCollection {
        let width = mask.width();
        let height = mask.height();
        let total = width * height;

        let mut clusters = ClusterCollection::with_dimensions(width, height);
        let mut worklist: VecDeque<(isize, isize)> = VecDeque::new();

        for step in 0..total {
            let index = match options.scan {
                ScanOrder::RowMajor => step,
                ScanOrder::ReverseRowMajor => total - 1 - step,
            };
            let seed = Coord::new(index / width, index % width);
            if !mask.get(seed.row, seed.col) {
                continue;
            }

            let cells = flood_from(mask, seed, options.traversal, &mut worklist);
            if let Some(cluster) = Cluster::from_cells(cells) {
                clusters.push(cluster);
            }
        }

        debug!(
            width,
            height,
            clusters = clusters.len(),
            cells = clusters.total_cells(),
            traversal = ?options.traversal,
            "Labeled mask"
        );
        clusters
    }

    /// Claims every cell reachable from `seed` and returns them in claim order.
    /// `worklist` is scratch space reused across seeds; it is empty on return.
    fn flood_from(
        mask: &mut Mask,
        seed: Coord,
        traversal: Traversal,
        worklist: &mut VecDeque<(isize, isize)>,
    ) -> Vec<Coord> {
        let mut cells = Vec::new();
        worklist.push_back((seed.row as isize, seed.col as isize));

        loop {
            let next = match traversal {
                Traversal::Lifo => worklist.pop_back(),
                Traversal::Fifo => worklist.pop_front(),
            };
            let Some((row, col)) = next else {
                break;
            };

            if !mask.claim(row, col) {
                continue;
            }
            cells.push(Coord::new(row as usize, col as usize));

            // Check all 4 direct neighbors (not diagonals).
            for (dr, dc) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                worklist.push_back((row + dr, col + dc));
            }
        }

        cells
    }
}

#[cfg(test)]
mod tests {
    use super::cluster_finder::*;
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::{BTreeSet, HashMap, VecDeque};

    fn random_mask(rng: &mut StdRng, width: usize, height: usize, density: f64) -> Mask {
        Mask::from_fn(width, height, |_, _| rng.random_bool(density))
    }

    /// Whether every member of `cells` can reach every other through `cells` alone.
    fn is_connected(cells: &BTreeSet<Coord>) -> bool {
        let Some(&start) = cells.iter().next() else {
            return false;
        };
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for cell in cells {
                if current.is_adjacent(cell) && seen.insert(*cell) {
                    queue.push_back(*cell);
                }
            }
        }
        seen.len() == cells.len()
    }

    #[test]
    fn plus_shape_is_one_cluster() {
        let mut mask = Mask::from_rows(&[".....", "..#..", ".###.", "..#..", "....."]);
        let clusters = label(&mut mask);

        assert_eq!(clusters.len(), 1);
        let expected: BTreeSet<Coord> = [(2, 1), (2, 2), (2, 3), (1, 2), (3, 2)]
            .into_iter()
            .map(|(r, c)| Coord::new(r, c))
            .collect();
        assert_eq!(clusters.iter().next().unwrap().member_set(), expected);
    }

    #[test]
    fn empty_mask_has_no_clusters() {
        let mut mask = Mask::new(6, 4);
        let clusters = label(&mut mask);
        assert!(clusters.is_empty());
        assert_eq!(clusters.dimensions(), Some((6, 4)));
    }

    #[test]
    fn zero_sized_mask_has_no_clusters() {
        let mut mask = Mask::new(0, 0);
        assert!(label(&mut mask).is_empty());
    }

    #[test]
    fn isolated_cell_is_a_cluster_of_one() {
        let mut mask = Mask::from_rows(&["...", ".#.", "..."]);
        let clusters = label(&mut mask);
        assert_eq!(clusters.sizes(), vec![1]);
        assert_eq!(clusters.iter().next().unwrap().seed(), Coord::new(1, 1));
    }

    #[test]
    fn diagonal_neighbors_are_separate_clusters() {
        let mut mask = Mask::from_rows(&["#.", ".#"]);
        assert_eq!(label(&mut mask).sizes(), vec![1, 1]);
    }

    #[test]
    fn clusters_follow_seed_discovery_order() {
        let mut mask = Mask::from_rows(&["..##", "#...", "#..#"]);
        let clusters = label(&mut mask);
        let seeds: Vec<Coord> = clusters.iter().map(Cluster::seed).collect();
        assert_eq!(seeds, vec![Coord::new(0, 2), Coord::new(1, 0), Coord::new(2, 3)]);
        assert_eq!(clusters.sizes(), vec![2, 2, 1]);
    }

    #[test]
    fn two_rectangles_in_a_ten_by_ten_grid() {
        let mut mask = Mask::from_fn(10, 10, |row, col| {
            let big = (1..4).contains(&row) && (1..5).contains(&col);
            let small = row == 7 && (6..9).contains(&col);
            big || small
        });
        let clusters = label(&mut mask);
        assert_eq!(clusters.sizes(), vec![12, 3]);
    }

    #[test]
    fn touching_grid_edges_is_fine() {
        let mut mask = Mask::from_rows(&["###", "#.#", "###"]);
        let clusters = label(&mut mask);
        assert_eq!(clusters.sizes(), vec![8]);
    }

    #[test]
    fn large_solid_mask_does_not_exhaust_the_stack() {
        let mut mask = Mask::from_fn(500, 500, |_, _| true);
        let clusters = label(&mut mask);
        assert_eq!(clusters.sizes(), vec![250_000]);
        assert!(mask.is_exhausted());
    }

    #[test]
    fn labeling_exhausts_the_mask_and_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mask = random_mask(&mut rng, 40, 30, 0.55);
        let first = label(&mut mask);
        assert!(!first.is_empty());
        assert!(mask.is_exhausted());
        assert!(label(&mut mask).is_empty());
    }

    #[test]
    fn clusters_partition_the_foreground() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut mask = random_mask(&mut rng, 25, 17, 0.5);
            let original: BTreeSet<Coord> = mask.foreground().into_iter().collect();

            let clusters = label(&mut mask);

            let mut owner: HashMap<Coord, usize> = HashMap::new();
            for (id, cluster) in clusters.iter().enumerate() {
                for cell in cluster.cells() {
                    assert!(owner.insert(*cell, id).is_none(), "{cell:?} claimed twice");
                }
            }
            let covered: BTreeSet<Coord> = owner.keys().copied().collect();
            assert_eq!(covered, original);
        }
    }

    #[test]
    fn clusters_are_connected_and_maximal() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..20 {
            let mut mask = random_mask(&mut rng, 20, 20, 0.45);
            let clusters = label(&mut mask);

            let mut owner: HashMap<Coord, usize> = HashMap::new();
            for (id, cluster) in clusters.iter().enumerate() {
                assert!(is_connected(&cluster.member_set()));
                owner.extend(cluster.cells().iter().map(|cell| (*cell, id)));
            }

            // No foreground cell touches a foreground cell from another cluster.
            for (cell, id) in &owner {
                for (other, other_id) in &owner {
                    if cell.is_adjacent(other) {
                        assert_eq!(id, other_id);
                    }
                }
            }
        }
    }

    #[test]
    fn membership_ignores_traversal_and_scan_order() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let mask = random_mask(&mut rng, 30, 22, 0.5);

            let baseline = label(&mut mask.clone()).partition();
            for traversal in [Traversal::Lifo, Traversal::Fifo] {
                for scan in [ScanOrder::RowMajor, ScanOrder::ReverseRowMajor] {
                    let options = LabelOptions { traversal, scan };
                    let partition = label_with(&mut mask.clone(), options).partition();
                    assert_eq!(partition, baseline, "{options:?}");
                }
            }
        }
    }

    #[test]
    fn fifo_visits_cells_breadth_first() {
        let mut mask = Mask::from_rows(&["####"]);
        let options = LabelOptions {
            traversal: Traversal::Fifo,
            ..LabelOptions::default()
        };
        let clusters = label_with(&mut mask, options);
        let cells = clusters.iter().next().unwrap().cells().to_vec();
        assert_eq!(
            cells,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2), Coord::new(0, 3)]
        );
    }
}
