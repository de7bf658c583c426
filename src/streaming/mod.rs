//! Chunk streaming and LOD management

pub mod chunk;
pub mod lod;
pub mod streamer;

pub use chunk::{ChunkCoord, TerrainChunk};
pub use lod::{LodLevel, select_lod};
pub use streamer::{
    COLLIDER_APPLY_DISTANCE, StreamerConfig, TerrainObserver, TerrainStreamer,
    VIEWER_MOVE_THRESHOLD,
};
