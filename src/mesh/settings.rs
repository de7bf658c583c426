//! Mesh configuration and supported chunk sizes
//!
//! Chunk sizes are restricted to multiples of 24 so that every LOD
//! increment (1, 2, 4, 6, 8) divides the grid evenly; flat-shaded
//! meshes duplicate vertices per triangle and therefore use a smaller
//! size table to stay within renderer vertex limits.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::types::Result;

/// Number of supported LOD levels (lod 0..=4)
pub const NUM_SUPPORTED_LODS: u32 = 5;

/// Supported smooth-shaded chunk sizes (cells per side)
pub const SUPPORTED_CHUNK_SIZES: [u32; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

/// Supported flat-shaded chunk sizes (cells per side)
pub const SUPPORTED_FLAT_CHUNK_SIZES: [u32; 3] = [48, 72, 96];

/// Grid step for a LOD level: full detail at lod 0, `lod * 2` beyond
#[inline]
pub fn lod_increment(lod: u32) -> u32 {
    if lod == 0 { 1 } else { lod * 2 }
}

/// Mesh construction parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Index into the active chunk-size table
    pub chunk_size_index: usize,
    /// Duplicate vertices per triangle with per-face normals
    pub flat_shading: bool,
    /// World units per grid cell
    pub scale: f32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            chunk_size_index: 8,
            flat_shading: false,
            scale: 2.0,
        }
    }
}

impl MeshSettings {
    fn size_table(&self) -> &'static [u32] {
        if self.flat_shading {
            &SUPPORTED_FLAT_CHUNK_SIZES
        } else {
            &SUPPORTED_CHUNK_SIZES
        }
    }

    /// Cells per side of the configured chunk size
    pub fn chunk_size(&self) -> u32 {
        self.size_table()[self.chunk_size_index]
    }

    /// Vertices per line of the bordered height grid at lod 0
    ///
    /// Includes the two border vertices used for normal baking but
    /// excluded from the final mesh.
    pub fn num_verts_per_line(&self) -> usize {
        self.chunk_size() as usize + 1
    }

    /// World-space side length of one chunk's renderable mesh
    pub fn world_size(&self) -> f32 {
        (self.num_verts_per_line() as f32 - 3.0) * self.scale
    }

    pub fn validate(&self) -> Result<()> {
        let supported = self.size_table().len();
        if self.chunk_size_index >= supported {
            return Err(ConfigError::ChunkSizeIndexOutOfRange {
                index: self.chunk_size_index,
                supported,
            });
        }
        Ok(())
    }
}
