//! The heightfield map: patch assembly, the padded mirror, and
//! egocentric window extraction.
//!
//! The padded mirror doubles the map on each axis with a zero border so
//! window crops near the arena edge never need per-cell bounds checks:
//! 4× the memory for branchless extraction, a deliberate trade.

use quarry_core::{SimState, TerrainError};
use rand_chacha::ChaCha8Rng;

use crate::patch::TerrainKind;

/// Default number of patches along each side of the heightfield.
pub const DEFAULT_PATCHES_PER_SIDE: usize = 3;

/// Default real-world side length of the terrain quad, meters.
pub const DEFAULT_REAL_LENGTH: f64 = 12.0;

/// Default side length of the egocentric observation window, cells.
pub const DEFAULT_VIEW_DISTANCE: usize = 20;

/// Name of the terrain geometry whose render/collision flags are reset
/// on regeneration.
const TERRAIN_GEOM: &str = "terrain";

/// Color applied to the terrain geometry when it becomes active.
const TERRAIN_RGBA: [f32; 4] = [0.2, 0.3, 0.4, 1.0];

/// Patch-based procedural heightfield with a padded observation mirror.
///
/// Owns no elevation data of record: the simulation's heightfield
/// buffer is authoritative, and [`regenerate`](HeightField::regenerate)
/// rewrites it wholesale. The padded mirror is a read-optimized copy
/// for [`window`](HeightField::window).
#[derive(Debug)]
pub struct HeightField {
    nrow: usize,
    ncol: usize,
    patches_per_side: usize,
    patch_size: usize,
    real_length: f64,
    view_distance: usize,
    padded: Vec<f32>,
}

impl HeightField {
    /// Create a heightfield layout.
    ///
    /// `patch_size` is `nrow / patches_per_side`, truncated; trailing
    /// rows and columns that do not fit a whole patch keep their zero
    /// elevation, matching the source model's quad.
    ///
    /// # Errors
    ///
    /// Rejects empty or non-square heightfields, patch counts that do
    /// not fit, and odd (or zero) view distances — the crop must be
    /// symmetric around the agent's map cell.
    pub fn new(
        nrow: usize,
        ncol: usize,
        patches_per_side: usize,
        real_length: f64,
        view_distance: usize,
    ) -> Result<Self, TerrainError> {
        if nrow == 0 || ncol == 0 {
            return Err(TerrainError::EmptyHeightfield);
        }
        // Patch rows and columns both stride by nrow / patches_per_side;
        // on a rectangular grid the column writes would wrap into the
        // next row instead of failing.
        if nrow != ncol {
            return Err(TerrainError::NonSquareHeightfield { nrow, ncol });
        }
        if patches_per_side == 0 || patches_per_side > nrow.min(ncol) {
            return Err(TerrainError::InvalidPatchCount {
                configured: patches_per_side,
            });
        }
        if view_distance == 0 || view_distance % 2 != 0 {
            return Err(TerrainError::OddViewDistance {
                configured: view_distance,
            });
        }
        Ok(Self {
            nrow,
            ncol,
            patches_per_side,
            patch_size: nrow / patches_per_side,
            real_length,
            view_distance,
            padded: vec![0.0; 4 * nrow * ncol],
        })
    }

    /// Layout with the default patch count, quad length, and window.
    pub fn with_defaults(nrow: usize, ncol: usize) -> Result<Self, TerrainError> {
        Self::new(
            nrow,
            ncol,
            DEFAULT_PATCHES_PER_SIDE,
            DEFAULT_REAL_LENGTH,
            DEFAULT_VIEW_DISTANCE,
        )
    }

    /// Heightfield rows.
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Heightfield columns.
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// Side length of the egocentric window, cells.
    pub fn view_distance(&self) -> usize {
        self.view_distance
    }

    /// Regenerate the whole terrain: fill every patch with an
    /// independently sampled kind, write the result into the
    /// simulation's heightfield buffer, mirror it into the padded map,
    /// re-activate the terrain geometry, and notify the renderer.
    ///
    /// Regeneration is authoritative; there is no incremental update.
    ///
    /// # Errors
    ///
    /// [`TerrainError::MissingTerrainGeom`] if the simulation does not
    /// expose the terrain geometry.
    pub fn regenerate<S: SimState>(
        &mut self,
        sim: &mut S,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), TerrainError> {
        let ps = self.patch_size;
        for i in 0..self.patches_per_side {
            for j in 0..self.patches_per_side {
                let kind = TerrainKind::sample(rng);
                let data = kind.fill(ps, rng);
                let hfield = sim.hfield_mut();
                for r in 0..ps {
                    let dst = (i * ps + r) * self.ncol + j * ps;
                    hfield[dst..dst + ps].copy_from_slice(&data[r * ps..(r + 1) * ps]);
                }
            }
        }

        let activated = sim.set_geom_rgba(TERRAIN_GEOM, TERRAIN_RGBA)
            && sim.set_geom_pos(TERRAIN_GEOM, [0.0, 0.0, 0.0])
            && sim.set_geom_collision(TERRAIN_GEOM, true);
        if !activated {
            return Err(TerrainError::MissingTerrainGeom);
        }

        self.mirror(sim);
        sim.refresh_heightfield();
        Ok(())
    }

    /// Copy the simulation's heightfield into the center of the padded
    /// mirror. The zero border is never written after construction.
    pub fn mirror<S: SimState>(&mut self, sim: &S) {
        let src = sim.hfield();
        let pad_cols = 2 * self.ncol;
        let (row0, col0) = (self.nrow / 2, self.ncol / 2);
        for r in 0..self.nrow {
            let dst = (row0 + r) * pad_cols + col0;
            self.padded[dst..dst + self.ncol].copy_from_slice(&src[r * self.ncol..(r + 1) * self.ncol]);
        }
    }

    /// Map world coordinates to a cell of the padded mirror.
    ///
    /// A fixed linear scale (`real_length / nrow` per row,
    /// `real_length / ncol` per column) plus the padded-map half-size
    /// offset. The result is clamped so a full window around it stays
    /// inside the mirror.
    pub fn cart_to_map(&self, pos: [f64; 2]) -> (usize, usize) {
        let dr = self.real_length / self.nrow as f64;
        let dc = self.real_length / self.ncol as f64;
        let spacing = (self.view_distance / 2) as isize;
        let row = (pos[0] / dr + self.nrow as f64) as isize;
        let col = (pos[1] / dc + self.ncol as f64) as isize;
        let row = row.clamp(spacing, 2 * self.nrow as isize - spacing) as usize;
        let col = col.clamp(spacing, 2 * self.ncol as isize - spacing) as usize;
        (row, col)
    }

    /// Extract the egocentric observation window around a world
    /// position, flattened row-major to `view_distance²` samples.
    ///
    /// Crops that extend past the heightfield proper read the padded
    /// mirror's zero border; no bounds check is ever needed.
    pub fn window(&self, pos: [f64; 2]) -> Vec<f32> {
        let (row, col) = self.cart_to_map(pos);
        let spacing = self.view_distance / 2;
        let pad_cols = 2 * self.ncol;
        let mut out = Vec::with_capacity(self.view_distance * self.view_distance);
        for r in row - spacing..row + spacing {
            let base = r * pad_cols;
            out.extend_from_slice(&self.padded[base + col - spacing..base + col + spacing]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_test_utils::MockSim;
    use rand::SeedableRng;

    fn field() -> HeightField {
        HeightField::with_defaults(100, 100).unwrap()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn rejects_empty_heightfield() {
        assert_eq!(
            HeightField::with_defaults(0, 100).unwrap_err(),
            TerrainError::EmptyHeightfield
        );
    }

    #[test]
    fn rejects_rectangular_heightfield() {
        // A 100×50 grid would let patch columns wrap into the next
        // row during regeneration; it must fail at construction.
        assert_eq!(
            HeightField::with_defaults(100, 50).unwrap_err(),
            TerrainError::NonSquareHeightfield {
                nrow: 100,
                ncol: 50
            }
        );
    }

    #[test]
    fn rejects_zero_or_oversized_patch_count() {
        assert!(matches!(
            HeightField::new(100, 100, 0, 12.0, 20),
            Err(TerrainError::InvalidPatchCount { configured: 0 })
        ));
        assert!(matches!(
            HeightField::new(10, 10, 11, 12.0, 20),
            Err(TerrainError::InvalidPatchCount { configured: 11 })
        ));
    }

    #[test]
    fn rejects_odd_view_distance() {
        assert!(matches!(
            HeightField::new(100, 100, 3, 12.0, 21),
            Err(TerrainError::OddViewDistance { configured: 21 })
        ));
    }

    // ---------------------------------------------------------------
    // Regeneration
    // ---------------------------------------------------------------

    #[test]
    fn regenerate_activates_terrain_and_refreshes_renderer() {
        let mut sim = MockSim::pursuit();
        let mut hf = field();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        hf.regenerate(&mut sim, &mut rng).unwrap();

        let geom = sim.geom("terrain").unwrap();
        assert!(geom.collision, "collision must be re-enabled");
        assert_eq!(geom.rgba[3], 1.0, "terrain must be visible");
        assert_eq!(geom.pos, [0.0, 0.0, 0.0]);
        assert_eq!(sim.refresh_count(), 1);
    }

    #[test]
    fn regenerate_without_terrain_geom_errors() {
        let mut sim = MockSim::new(35, 34, 100, 100);
        let mut hf = field();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            hf.regenerate(&mut sim, &mut rng).unwrap_err(),
            TerrainError::MissingTerrainGeom
        );
    }

    #[test]
    fn regenerate_is_deterministic_per_seed() {
        let run = |seed: u64| -> Vec<f32> {
            let mut sim = MockSim::pursuit();
            let mut hf = field();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            hf.regenerate(&mut sim, &mut rng).unwrap();
            sim.hfield().to_vec()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn regenerate_respects_patch_bounds() {
        // Every cell of every patch must come from one of the three
        // kinds, so the global range is the union of their ranges.
        let mut sim = MockSim::pursuit();
        let mut hf = field();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        hf.regenerate(&mut sim, &mut rng).unwrap();
        for &v in sim.hfield() {
            assert!((-0.02 - 1e-6..=0.23 + 1e-6).contains(&(v as f64)), "cell {v} out of range");
        }
    }

    // ---------------------------------------------------------------
    // Windowing
    // ---------------------------------------------------------------

    #[test]
    fn map_center_lands_on_padded_center() {
        let hf = field();
        assert_eq!(hf.cart_to_map([0.0, 0.0]), (100, 100));
    }

    #[test]
    fn window_center_matches_marked_map_cell() {
        let mut sim = MockSim::pursuit();
        let mut hf = field();
        // Single nonzero marker at the full map's center cell.
        let mut data = vec![0.0f32; 100 * 100];
        data[50 * 100 + 50] = 0.75;
        sim.set_hfield(data);
        hf.mirror(&sim);

        let window = hf.window([0.0, 0.0]);
        assert_eq!(window.len(), 400);
        let spacing = hf.view_distance() / 2;
        let center = spacing * hf.view_distance() + spacing;
        assert_eq!(window[center], 0.75);
        assert_eq!(window.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn edge_window_reads_zero_border() {
        let mut sim = MockSim::pursuit();
        let mut hf = field();
        sim.set_hfield(vec![1.0; 100 * 100]);
        hf.mirror(&sim);

        // At the arena corner the crop hangs past the map proper and
        // must pick up zeros from the border, not an index error.
        let window = hf.window([-6.0, -6.0]);
        assert_eq!(window.len(), 400);
        assert!(window.iter().any(|&v| v == 0.0));
        assert!(window.iter().any(|&v| v == 1.0));
    }

    #[test]
    fn far_out_of_bounds_position_is_clamped() {
        let hf = field();
        let window = hf.window([-1e6, 1e6]);
        assert_eq!(window.len(), 400);
        assert!(window.iter().all(|&v| v == 0.0));
    }
}
