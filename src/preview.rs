//! Synchronous single-chunk preview
//!
//! Editor-style entry point: build one chunk's height map and mesh
//! immediately on the calling thread, with no streaming or background
//! work involved.

use crate::core::types::Vec2;
use crate::generation::falloff::FalloffMap;
use crate::generation::heightmap::{HeightMap, HeightMapSettings, generate_height_map};
use crate::mesh::builder::{MeshData, generate_terrain_mesh};
use crate::mesh::settings::MeshSettings;

/// Generate one chunk's height map and mesh for immediate feedback
pub fn generate_preview(
    height_map_settings: &HeightMapSettings,
    mesh_settings: &MeshSettings,
    center: Vec2,
    lod: u32,
) -> (HeightMap, MeshData) {
    let size = mesh_settings.num_verts_per_line();
    let falloff = height_map_settings
        .use_falloff
        .then(|| FalloffMap::generate(size));
    let height_map = generate_height_map(size, height_map_settings, center, falloff.as_ref());
    let mesh = generate_terrain_mesh(&height_map, height_map_settings, mesh_settings, lod);
    (height_map, mesh)
}
