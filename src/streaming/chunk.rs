//! Per-chunk terrain state
//!
//! A chunk is one square terrain tile keyed by integer grid coordinate.
//! Chunks are created when they first enter the viewer's radius and
//! cached forever afterwards; streaming only toggles their visibility.

use std::sync::Arc;

use crate::core::types::Vec2;
use crate::generation::heightmap::HeightMap;
use crate::math::Rect;
use crate::mesh::MeshData;
use crate::mesh::settings::MeshSettings;

/// Integer grid coordinate identifying one terrain chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate of the chunk containing a world position
    pub fn from_world(position: Vec2, world_size: f32) -> Self {
        Self {
            x: (position.x / world_size).round() as i32,
            y: (position.y / world_size).round() as i32,
        }
    }

    /// World-space center of this chunk
    pub fn world_center(&self, world_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * world_size
    }
}

/// One detail level's mesh slot: requested at most once, filled at most once
#[derive(Clone, Debug, Default)]
pub(crate) struct LodMeshSlot {
    pub requested: bool,
    pub mesh: Option<Arc<MeshData>>,
}

/// Runtime state of one terrain chunk
#[derive(Debug)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
    pub(crate) sample_center: Vec2,
    pub(crate) bounds: Rect,
    pub(crate) height_map: Option<Arc<HeightMap>>,
    pub(crate) lod_meshes: Vec<LodMeshSlot>,
    pub(crate) active_lod: Option<usize>,
    pub(crate) visible: bool,
    pub(crate) collider_set: bool,
}

impl TerrainChunk {
    pub(crate) fn new(coord: ChunkCoord, mesh_settings: &MeshSettings, level_count: usize) -> Self {
        let world_size = mesh_settings.world_size();
        let position = coord.world_center(world_size);
        Self {
            coord,
            sample_center: position / mesh_settings.scale,
            bounds: Rect::from_center_size(position, Vec2::splat(world_size)),
            height_map: None,
            lod_meshes: vec![LodMeshSlot::default(); level_count],
            active_lod: None,
            visible: false,
            collider_set: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_height_map(&self) -> bool {
        self.height_map.is_some()
    }

    /// Detail-level index of the mesh currently shown, if any
    pub fn active_lod(&self) -> Option<usize> {
        self.active_lod
    }

    pub fn has_collider(&self) -> bool {
        self.collider_set
    }

    /// Whether a mesh build is or was in flight for a detail level
    pub fn mesh_requested(&self, lod_index: usize) -> bool {
        self.lod_meshes
            .get(lod_index)
            .is_some_and(|slot| slot.requested)
    }

    /// Completed mesh for a detail level, if built
    pub fn mesh(&self, lod_index: usize) -> Option<&Arc<MeshData>> {
        self.lod_meshes.get(lod_index).and_then(|slot| slot.mesh.as_ref())
    }
}
