//! Terrain system - deterministic heightmap and voxel occupancy.
//!
//! The natural terrain is a pure function of the integer column coordinates.
//! On top of it the player can stack blocks. The [`VoxelWorld`] resource keeps
//! two disjoint partitions: cells produced by world generation (fixed once
//! generated) and cells placed by the player (add-only within a session).

use bevy_ecs::prelude::*;
use glam::{IVec2, IVec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Terrain elevation of column `(x, z)`.
///
/// Pure and allocation-free; identical inputs give identical outputs across
/// runs, so the world looks the same every session.
#[inline]
pub fn terrain_height(x: i32, z: i32) -> i32 {
    let (xf, zf) = (x as f64, z as f64);
    let wave_a = (xf * 0.12).sin() * 2.2;
    let wave_b = (zf * 0.08).cos() * 1.7;
    let wave_c = ((xf + zf) * 0.05).sin() * 1.3;
    (2.0 + wave_a + wave_b + wave_c).floor() as i32
}

/// Integer column containing a continuous world position.
#[inline]
pub fn column_of(x: f32, z: f32) -> IVec2 {
    IVec2::new(x.floor() as i32, z.floor() as i32)
}

/// Sparse registry of solid cells.
///
/// A solid cell at `y` defines a walkable surface at `y + 1`.
#[derive(Resource, Debug, Clone)]
pub struct VoxelWorld {
    radius: i32,
    generated: HashSet<IVec3>,
    built: HashSet<IVec3>,
    /// Built cells in placement order.
    built_order: Vec<IVec3>,
    /// Highest built cell per column, updated on every placement.
    column_tops: HashMap<IVec2, i32>,
}

impl VoxelWorld {
    /// Generate the terrain partition for the square `[-radius, radius]²`.
    pub fn generate(radius: i32) -> Self {
        let generated = Self::generate_cells(radius);
        tracing::debug!(radius, cells = generated.len(), "generated terrain");
        Self {
            radius,
            generated,
            built: HashSet::new(),
            built_order: Vec::new(),
            column_tops: HashMap::new(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn generate_cells(radius: i32) -> HashSet<IVec3> {
        (-radius..=radius)
            .flat_map(|x| (-radius..=radius).map(move |z| IVec3::new(x, terrain_height(x, z), z)))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn generate_cells(radius: i32) -> HashSet<IVec3> {
        let cells: Vec<IVec3> = (-radius..=radius)
            .into_par_iter()
            .flat_map_iter(|x| (-radius..=radius).map(move |z| IVec3::new(x, terrain_height(x, z), z)))
            .collect();
        cells.into_iter().collect()
    }

    /// Generation radius in cells.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Natural terrain height of a column.
    pub fn generated_height(&self, x: i32, z: i32) -> i32 {
        terrain_height(x, z)
    }

    /// Highest built cell in a column, if any.
    pub fn highest_built(&self, x: i32, z: i32) -> Option<i32> {
        self.column_tops.get(&IVec2::new(x, z)).copied()
    }

    /// Surface height a body standing in column `(x, z)` rests on: one above
    /// the higher of the natural terrain and the tallest built block.
    pub fn ground_height_at(&self, x: i32, z: i32) -> i32 {
        let natural = self.generated_height(x, z) + 1;
        match self.highest_built(x, z) {
            Some(top) => natural.max(top + 1),
            None => natural,
        }
    }

    /// [`Self::ground_height_at`] for a continuous position.
    pub fn ground_height_at_pos(&self, x: f32, z: f32) -> i32 {
        let column = column_of(x, z);
        self.ground_height_at(column.x, column.y)
    }

    /// True if the cell is solid in either partition.
    pub fn is_occupied(&self, cell: IVec3) -> bool {
        self.generated.contains(&cell) || self.built.contains(&cell)
    }

    /// Add a player-built cell. Returns false (and changes nothing) if the
    /// cell is already solid.
    pub fn place(&mut self, cell: IVec3) -> bool {
        if self.is_occupied(cell) {
            return false;
        }
        self.built.insert(cell);
        self.built_order.push(cell);
        let top = self.column_tops.entry(IVec2::new(cell.x, cell.z)).or_insert(cell.y);
        *top = (*top).max(cell.y);
        true
    }

    /// Drop every player-built cell. Generated terrain is untouched.
    pub fn clear_built(&mut self) {
        self.built.clear();
        self.built_order.clear();
        self.column_tops.clear();
    }

    /// Player-built cells in placement order.
    pub fn built_cells(&self) -> &[IVec3] {
        &self.built_order
    }

    pub fn built_count(&self) -> usize {
        self.built_order.len()
    }

    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }
}

/// Generated terrain for the renderer (sent once per world).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub radius: i32,
    /// Column heights, row-major with x outer, both from `-radius` to `radius`.
    pub heights: Vec<i32>,
}

impl TerrainSnapshot {
    pub fn from_world(world: &VoxelWorld) -> Self {
        let r = world.radius();
        let heights = (-r..=r)
            .flat_map(|x| (-r..=r).map(move |z| terrain_height(x, z)))
            .collect();
        Self { radius: r, heights }
    }

    /// Height stored for column `(x, z)`, if inside the generated square.
    pub fn height(&self, x: i32, z: i32) -> Option<i32> {
        let r = self.radius;
        if x.abs() > r || z.abs() > r {
            return None;
        }
        let side = (2 * r + 1) as usize;
        let index = (x + r) as usize * side + (z + r) as usize;
        self.heights.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_is_pure() {
        for x in -50..50 {
            for z in [-37, -1, 0, 5, 44] {
                assert_eq!(terrain_height(x, z), terrain_height(x, z));
            }
        }
        // floor(2 + 0 + 1.7 + 0)
        assert_eq!(terrain_height(0, 0), 3);
    }

    #[test]
    fn test_generation_one_cell_per_column() {
        let world = VoxelWorld::generate(4);
        assert_eq!(world.generated_count(), 81);
        assert!(world.is_occupied(IVec3::new(2, terrain_height(2, -3), -3)));
        assert!(!world.is_occupied(IVec3::new(2, terrain_height(2, -3) + 1, -3)));
    }

    #[test]
    fn test_ground_height_tracks_stacked_blocks() {
        let mut world = VoxelWorld::generate(6);
        let base = terrain_height(1, 1);
        assert_eq!(world.ground_height_at(1, 1), base + 1);

        assert!(world.place(IVec3::new(1, base + 1, 1)));
        assert_eq!(world.ground_height_at(1, 1), base + 2);

        assert!(world.place(IVec3::new(1, base + 2, 1)));
        assert_eq!(world.ground_height_at(1, 1), base + 3);

        // A lower block placed later does not pull the surface down.
        assert!(world.place(IVec3::new(1, base - 3, 1)));
        assert_eq!(world.ground_height_at(1, 1), base + 3);
        assert!(world.ground_height_at(1, 1) >= world.generated_height(1, 1) + 1);
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut world = VoxelWorld::generate(3);
        let terrain_cell = IVec3::new(0, terrain_height(0, 0), 0);
        assert!(!world.place(terrain_cell));

        let above = terrain_cell + IVec3::Y;
        assert!(world.place(above));
        assert!(!world.place(above));
        assert_eq!(world.built_count(), 1);
    }

    #[test]
    fn test_clear_built_restores_terrain_surface() {
        let mut world = VoxelWorld::generate(3);
        let base = terrain_height(-2, 2);
        world.place(IVec3::new(-2, base + 1, 2));
        world.clear_built();
        assert_eq!(world.built_count(), 0);
        assert_eq!(world.ground_height_at(-2, 2), base + 1);
    }

    #[test]
    fn test_terrain_snapshot_layout() {
        let world = VoxelWorld::generate(5);
        let snapshot = TerrainSnapshot::from_world(&world);
        assert_eq!(snapshot.heights.len(), 121);
        assert_eq!(snapshot.height(-5, 3), Some(terrain_height(-5, 3)));
        assert_eq!(snapshot.height(6, 0), None);
    }
}
