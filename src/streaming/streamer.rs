//! Endless-terrain chunk streaming
//!
//! [`TerrainStreamer`] owns every chunk and drives the whole pipeline
//! from a single-threaded [`update`](TerrainStreamer::update) tick:
//! drain completed background jobs, recompute the visible chunk set
//! when the viewer has moved far enough, promote collision meshes, and
//! notify observers. All generation (height maps, meshes) runs on
//! worker threads through [`WorkQueue`]; the tick is the only place
//! chunk state is ever mutated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::types::{Result, Vec2};
use crate::generation::falloff::FalloffCache;
use crate::generation::heightmap::{HeightMap, HeightMapSettings, generate_height_map};
use crate::mesh::builder::{MeshData, generate_terrain_mesh};
use crate::mesh::settings::{MeshSettings, NUM_SUPPORTED_LODS, lod_increment};
use crate::streaming::chunk::{ChunkCoord, TerrainChunk};
use crate::streaming::lod::{LodLevel, select_lod};
use crate::worker::WorkQueue;

/// Viewer displacement that triggers a visible-set recompute
pub const VIEWER_MOVE_THRESHOLD: f32 = 25.0;
const SQR_VIEWER_MOVE_THRESHOLD: f32 = VIEWER_MOVE_THRESHOLD * VIEWER_MOVE_THRESHOLD;

/// Distance at which a built collider mesh is applied to a chunk
pub const COLLIDER_APPLY_DISTANCE: f32 = 5.0;
const SQR_COLLIDER_APPLY_DISTANCE: f32 = COLLIDER_APPLY_DISTANCE * COLLIDER_APPLY_DISTANCE;

/// Full configuration for a terrain streamer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamerConfig {
    pub height_map: HeightMapSettings,
    pub mesh: MeshSettings,
    /// Detail ladder, strictly increasing by visible distance
    pub detail_levels: Vec<LodLevel>,
    /// Index of the detail level promoted to the collision mesh
    pub collider_lod_index: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            height_map: HeightMapSettings::default(),
            mesh: MeshSettings::default(),
            detail_levels: vec![
                LodLevel::new(0, 200.0),
                LodLevel::new(1, 400.0),
                LodLevel::new(4, 600.0),
            ],
            collider_lod_index: 0,
        }
    }
}

impl StreamerConfig {
    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reject structurally invalid configurations
    ///
    /// Runs before any generation starts; the streaming and generation
    /// paths assume a validated configuration throughout.
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;

        if self.height_map.height_curve.is_empty() {
            return Err(ConfigError::EmptyHeightCurve);
        }
        if self.detail_levels.is_empty() {
            return Err(ConfigError::EmptyDetailLevels);
        }

        let mut previous = f32::NEG_INFINITY;
        for (index, level) in self.detail_levels.iter().enumerate() {
            if level.lod >= NUM_SUPPORTED_LODS {
                return Err(ConfigError::UnsupportedLod {
                    index,
                    lod: level.lod,
                    max: NUM_SUPPORTED_LODS - 1,
                });
            }
            if level.visible_distance <= previous {
                return Err(ConfigError::NonIncreasingDistance {
                    index,
                    distance: level.visible_distance,
                    previous,
                });
            }
            previous = level.visible_distance;

            let increment = lod_increment(level.lod);
            let size = self.mesh.chunk_size();
            if size % increment != 0 {
                return Err(ConfigError::IndivisibleChunkSize {
                    size,
                    lod: level.lod,
                    increment,
                });
            }
        }

        if self.collider_lod_index >= self.detail_levels.len() {
            return Err(ConfigError::ColliderIndexOutOfRange {
                index: self.collider_lod_index,
                levels: self.detail_levels.len(),
            });
        }
        Ok(())
    }
}

/// Receiver for streamer output events
///
/// Observers are invoked in registration order, always from the driver
/// thread at the end of a tick. The renderer collaborator turns these
/// into draw and collision objects; the streamer never touches
/// rendering itself.
pub trait TerrainObserver {
    /// A chunk swapped its active mesh
    fn on_mesh_ready(&mut self, _coord: ChunkCoord, _lod: u32, _mesh: &Arc<MeshData>) {}
    /// A chunk crossed into or out of visibility
    fn on_visibility_changed(&mut self, _coord: ChunkCoord, _visible: bool) {}
    /// A chunk's collision mesh is ready to apply (fires once per chunk)
    fn on_collider_ready(&mut self, _coord: ChunkCoord, _mesh: &Arc<MeshData>) {}
}

enum TerrainEvent {
    MeshReady {
        coord: ChunkCoord,
        lod: u32,
        mesh: Arc<MeshData>,
    },
    VisibilityChanged {
        coord: ChunkCoord,
        visible: bool,
    },
    ColliderReady {
        coord: ChunkCoord,
        mesh: Arc<MeshData>,
    },
}

enum MeshAction {
    None,
    Swap(usize, Arc<MeshData>),
    Request(usize),
}

/// Streams terrain chunks around a moving viewer
pub struct TerrainStreamer {
    config: StreamerConfig,
    max_view_distance: f32,
    world_size: f32,
    chunks_in_view_radius: i32,

    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible: Vec<ChunkCoord>,

    viewer_position: Vec2,
    last_update_position: Option<Vec2>,

    jobs: WorkQueue<TerrainStreamer>,
    falloff: FalloffCache,

    events: Vec<TerrainEvent>,
    observers: Vec<Box<dyn TerrainObserver>>,
}

impl TerrainStreamer {
    /// Create a streamer from a validated configuration
    pub fn new(mut config: StreamerConfig) -> Result<Self> {
        config.validate()?;
        config.height_map.noise = config.height_map.noise.clone().sanitized();

        let max_view_distance = config
            .detail_levels
            .last()
            .map(|level| level.visible_distance)
            .ok_or(ConfigError::EmptyDetailLevels)?;
        let world_size = config.mesh.world_size();
        let chunks_in_view_radius = (max_view_distance / world_size).round() as i32;

        log::info!(
            "terrain streamer: {} detail levels, chunk world size {:.1}, view radius {} chunks",
            config.detail_levels.len(),
            world_size,
            chunks_in_view_radius
        );

        Ok(Self {
            config,
            max_view_distance,
            world_size,
            chunks_in_view_radius,
            chunks: HashMap::new(),
            visible: Vec::new(),
            viewer_position: Vec2::ZERO,
            last_update_position: None,
            jobs: WorkQueue::new(),
            falloff: FalloffCache::new(),
            events: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Register an observer; invoked in registration order
    pub fn add_observer(&mut self, observer: Box<dyn TerrainObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// World-space side length of one chunk
    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// Coordinates of every currently visible chunk
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible
    }

    /// Drive one tick of the streamer
    ///
    /// Drains completed background jobs (the single mutation point for
    /// their results), recomputes the visible set once the viewer has
    /// moved past the hysteresis threshold, promotes collision meshes
    /// for visible chunks, and dispatches buffered events.
    pub fn update(&mut self, viewer_position: Vec2) {
        self.viewer_position = viewer_position;

        let jobs = self.jobs.clone();
        jobs.process(self);

        let moved = match self.last_update_position {
            None => true,
            Some(previous) => {
                previous.distance_squared(viewer_position) > SQR_VIEWER_MOVE_THRESHOLD
            }
        };
        if moved {
            self.last_update_position = Some(viewer_position);
            self.update_visible_chunks();
        }

        // Collision promotion runs every tick, more often than detail
        // re-evaluation.
        for coord in self.visible.clone() {
            self.update_collision(coord);
        }

        self.dispatch_events();
    }

    fn update_visible_chunks(&mut self) {
        let mut already_updated = HashSet::new();
        for coord in self.visible.clone().into_iter().rev() {
            already_updated.insert(coord);
            self.update_chunk(coord);
        }

        let current = ChunkCoord::from_world(self.viewer_position, self.world_size);
        let radius = self.chunks_in_view_radius;
        for y_offset in -radius..=radius {
            for x_offset in -radius..=radius {
                let coord = ChunkCoord::new(current.x + x_offset, current.y + y_offset);
                if already_updated.contains(&coord) {
                    continue;
                }
                if self.chunks.contains_key(&coord) {
                    self.update_chunk(coord);
                } else {
                    self.create_chunk(coord);
                }
            }
        }
    }

    /// Create a chunk and request its height map (at most once, here)
    fn create_chunk(&mut self, coord: ChunkCoord) {
        let chunk = TerrainChunk::new(coord, &self.config.mesh, self.config.detail_levels.len());
        let sample_center = chunk.sample_center;
        self.chunks.insert(coord, chunk);
        log::debug!("created chunk ({}, {})", coord.x, coord.y);

        let size = self.config.mesh.num_verts_per_line();
        let settings = self.config.height_map.clone();
        let falloff = settings.use_falloff.then(|| self.falloff.get(size));
        self.jobs.submit(
            move || generate_height_map(size, &settings, sample_center, falloff.as_deref()),
            move |streamer: &mut TerrainStreamer, height_map| {
                streamer.on_height_map_ready(coord, height_map);
            },
        );
    }

    fn on_height_map_ready(&mut self, coord: ChunkCoord, height_map: HeightMap) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.height_map.is_some() {
            return;
        }
        chunk.height_map = Some(Arc::new(height_map));
        self.update_chunk(coord);
    }

    /// Re-evaluate one chunk's visibility and detail level
    ///
    /// Meaningful only once the chunk's height map is ready; before
    /// that the chunk stays hidden.
    fn update_chunk(&mut self, coord: ChunkCoord) {
        let (was_visible, visible, action) = {
            let Some(chunk) = self.chunks.get(&coord) else {
                return;
            };
            if chunk.height_map.is_none() {
                return;
            }
            let distance = chunk.bounds.sqr_distance(self.viewer_position).sqrt();
            let visible = distance <= self.max_view_distance;

            let mut action = MeshAction::None;
            if visible {
                let lod_index = select_lod(&self.config.detail_levels, distance);
                if chunk.active_lod != Some(lod_index) {
                    let slot = &chunk.lod_meshes[lod_index];
                    if let Some(mesh) = &slot.mesh {
                        action = MeshAction::Swap(lod_index, mesh.clone());
                    } else if !slot.requested {
                        action = MeshAction::Request(lod_index);
                    }
                }
            }
            (chunk.visible, visible, action)
        };

        match action {
            MeshAction::Swap(lod_index, mesh) => {
                if let Some(chunk) = self.chunks.get_mut(&coord) {
                    chunk.active_lod = Some(lod_index);
                }
                let lod = self.config.detail_levels[lod_index].lod;
                self.events.push(TerrainEvent::MeshReady { coord, lod, mesh });
            }
            MeshAction::Request(lod_index) => self.request_mesh(coord, lod_index),
            MeshAction::None => {}
        }

        if was_visible != visible {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.visible = visible;
            }
            if visible {
                self.visible.push(coord);
            } else {
                self.visible.retain(|c| *c != coord);
            }
            log::trace!("chunk ({}, {}) visible: {}", coord.x, coord.y, visible);
            self.events
                .push(TerrainEvent::VisibilityChanged { coord, visible });
        }
    }

    /// Request a mesh build for one (chunk, detail level) pair
    ///
    /// A second request while one is pending or after completion is a
    /// no-op, as is a request before the height map exists (a benign
    /// race with async completion).
    fn request_mesh(&mut self, coord: ChunkCoord, lod_index: usize) {
        let Some(level) = self.config.detail_levels.get(lod_index).copied() else {
            return;
        };
        let height_settings = self.config.height_map.clone();
        let mesh_settings = self.config.mesh.clone();

        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let Some(height_map) = chunk.height_map.clone() else {
            return;
        };
        let Some(slot) = chunk.lod_meshes.get_mut(lod_index) else {
            return;
        };
        if slot.requested || slot.mesh.is_some() {
            return;
        }
        slot.requested = true;
        log::trace!(
            "chunk ({}, {}): requesting lod {} mesh",
            coord.x,
            coord.y,
            level.lod
        );

        self.jobs.submit(
            move || generate_terrain_mesh(&height_map, &height_settings, &mesh_settings, level.lod),
            move |streamer: &mut TerrainStreamer, mesh| {
                streamer.on_mesh_ready(coord, lod_index, mesh);
            },
        );
    }

    fn on_mesh_ready(&mut self, coord: ChunkCoord, lod_index: usize, mesh: MeshData) {
        {
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                return;
            };
            let Some(slot) = chunk.lod_meshes.get_mut(lod_index) else {
                return;
            };
            if slot.mesh.is_some() {
                return;
            }
            slot.mesh = Some(Arc::new(mesh));
        }

        self.update_chunk(coord);
        if lod_index == self.config.collider_lod_index {
            self.update_collision(coord);
        }
    }

    /// Promote the collider-level mesh once the viewer is close enough
    ///
    /// Requests the mesh inside the collider level's visible distance
    /// and applies it inside [`COLLIDER_APPLY_DISTANCE`]; the applied
    /// collider is terminal, so this becomes a no-op afterwards.
    fn update_collision(&mut self, coord: ChunkCoord) {
        let collider_index = self.config.collider_lod_index;
        let (needs_request, within_apply_range) = {
            let Some(chunk) = self.chunks.get(&coord) else {
                return;
            };
            if chunk.collider_set || chunk.height_map.is_none() {
                return;
            }
            let sqr_distance = chunk.bounds.sqr_distance(self.viewer_position);
            let slot = &chunk.lod_meshes[collider_index];
            let needs_request = sqr_distance
                < self.config.detail_levels[collider_index].sqr_visible_distance()
                && !slot.requested
                && slot.mesh.is_none();
            (needs_request, sqr_distance < SQR_COLLIDER_APPLY_DISTANCE)
        };

        if needs_request {
            self.request_mesh(coord, collider_index);
        }

        if within_apply_range
            && let Some(chunk) = self.chunks.get_mut(&coord)
            && let Some(mesh) = chunk.lod_meshes[collider_index].mesh.clone()
        {
            chunk.collider_set = true;
            log::debug!("chunk ({}, {}): collider applied", coord.x, coord.y);
            self.events.push(TerrainEvent::ColliderReady { coord, mesh });
        }
    }

    fn dispatch_events(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.events);
        if self.observers.is_empty() {
            return;
        }
        for event in &events {
            for observer in &mut self.observers {
                match event {
                    TerrainEvent::MeshReady { coord, lod, mesh } => {
                        observer.on_mesh_ready(*coord, *lod, mesh);
                    }
                    TerrainEvent::VisibilityChanged { coord, visible } => {
                        observer.on_visibility_changed(*coord, *visible);
                    }
                    TerrainEvent::ColliderReady { coord, mesh } => {
                        observer.on_collider_ready(*coord, mesh);
                    }
                }
            }
        }
    }
}
