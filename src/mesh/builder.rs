//! Terrain mesh construction with LOD decimation and seam-correct normals
//!
//! The height grid carries a one-cell border on every side. Border
//! vertices are assigned negative indices (encoded `-(borderIndex + 1)`
//! so index 0 stays unambiguous) and are never emitted into the final
//! mesh; the triangles touching them exist only to donate face normals
//! to the interior edge vertices. The result is that normals along a
//! chunk edge come out identical to what one merged mesh would produce,
//! which is what keeps lighting seamless between independently
//! generated chunks.

use crate::core::types::{Vec2, Vec3};
use crate::generation::heightmap::{HeightMap, HeightMapSettings};
use crate::mesh::settings::{MeshSettings, lod_increment};

/// Renderable mesh for one (chunk, LOD) pair
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    triangles: Vec<u32>,
    normals: Vec<Vec3>,

    // Border ring, consumed by normal baking and then irrelevant
    border_vertices: Vec<Vec3>,
    border_triangles: Vec<i32>,
}

impl MeshData {
    fn with_capacity(verts_per_line: usize) -> Self {
        let interior = verts_per_line * verts_per_line;
        Self {
            vertices: Vec::with_capacity(interior),
            uvs: Vec::with_capacity(interior),
            triangles: Vec::with_capacity((verts_per_line - 1) * (verts_per_line - 1) * 6),
            normals: Vec::new(),
            border_vertices: Vec::with_capacity(verts_per_line * 4 + 4),
            border_triangles: Vec::with_capacity(24 * verts_per_line),
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Interior triangle indices, three per triangle
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    fn add_vertex(&mut self, position: Vec3, uv: Vec2, index: i32) {
        if index < 0 {
            debug_assert_eq!((-index - 1) as usize, self.border_vertices.len());
            self.border_vertices.push(position);
        } else {
            debug_assert_eq!(index as usize, self.vertices.len());
            self.vertices.push(position);
            self.uvs.push(uv);
        }
    }

    fn add_triangle(&mut self, a: i32, b: i32, c: i32) {
        if a < 0 || b < 0 || c < 0 {
            self.border_triangles.extend([a, b, c]);
        } else {
            self.triangles.extend([a as u32, b as u32, c as u32]);
        }
    }

    #[inline]
    fn position(&self, index: i32) -> Vec3 {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize]
        } else {
            self.vertices[index as usize]
        }
    }

    fn face_normal(&self, a: i32, b: i32, c: i32) -> Vec3 {
        let pa = self.position(a);
        let side_ab = self.position(b) - pa;
        let side_ac = self.position(c) - pa;
        side_ab.cross(side_ac).normalize_or_zero()
    }

    /// Accumulate face normals into every interior vertex they touch
    ///
    /// Border triangles contribute only to their interior vertices; the
    /// border-only accumulations are discarded.
    fn bake_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for triangle in self.triangles.chunks_exact(3) {
            let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
            let normal = self.face_normal(a as i32, b as i32, c as i32);
            normals[a as usize] += normal;
            normals[b as usize] += normal;
            normals[c as usize] += normal;
        }

        for triangle in self.border_triangles.chunks_exact(3) {
            let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
            let normal = self.face_normal(a, b, c);
            for index in [a, b, c] {
                if index >= 0 {
                    normals[index as usize] += normal;
                }
            }
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Duplicate vertices per triangle and assign per-face normals
    fn flat_shade(&mut self) {
        let mut vertices = Vec::with_capacity(self.triangles.len());
        let mut uvs = Vec::with_capacity(self.triangles.len());
        let mut normals = Vec::with_capacity(self.triangles.len());

        for triangle in self.triangles.chunks_exact(3) {
            let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
            let normal = self.face_normal(a as i32, b as i32, c as i32);
            for index in [a, b, c] {
                vertices.push(self.vertices[index as usize]);
                uvs.push(self.uvs[index as usize]);
                normals.push(normal);
            }
        }

        self.triangles = (0..vertices.len() as u32).collect();
        self.vertices = vertices;
        self.uvs = uvs;
        self.normals = normals;
        self.border_vertices.clear();
        self.border_triangles.clear();
    }

    fn finalize(&mut self, flat_shading: bool) {
        if flat_shading {
            self.flat_shade();
        } else {
            self.bake_normals();
        }
    }
}

/// Build the mesh for one chunk at the given LOD
///
/// `lod` selects the decimation step: every `lod_increment(lod)`-th
/// sample of the bordered grid becomes a vertex. Heights pass through
/// the configured curve and multiplier; horizontal positions are
/// centered on the origin and scaled into world units.
pub fn generate_terrain_mesh(
    height_map: &HeightMap,
    settings: &HeightMapSettings,
    mesh_settings: &MeshSettings,
    lod: u32,
) -> MeshData {
    let increment = lod_increment(lod) as usize;
    let bordered_size = height_map.values.width();
    let mesh_size = bordered_size - 2 * increment;
    let mesh_size_unsimplified = bordered_size - 2;

    let top_left_x = (mesh_size_unsimplified - 1) as f32 / -2.0;
    let top_left_z = (mesh_size_unsimplified - 1) as f32 / 2.0;

    let verts_per_line = (mesh_size - 1) / increment + 1;
    let mut mesh = MeshData::with_capacity(verts_per_line);

    // Classify every decimated sample: outermost ring = border (negative
    // indices), everything else interior (sequential non-negative).
    let mut vertex_index_map = vec![0i32; bordered_size * bordered_size];
    let mut mesh_vertex_index: i32 = 0;
    let mut border_vertex_index: i32 = -1;
    for y in (0..bordered_size).step_by(increment) {
        for x in (0..bordered_size).step_by(increment) {
            let is_border =
                y == 0 || y == bordered_size - 1 || x == 0 || x == bordered_size - 1;
            vertex_index_map[y * bordered_size + x] = if is_border {
                let index = border_vertex_index;
                border_vertex_index -= 1;
                index
            } else {
                let index = mesh_vertex_index;
                mesh_vertex_index += 1;
                index
            };
        }
    }

    for y in (0..bordered_size).step_by(increment) {
        for x in (0..bordered_size).step_by(increment) {
            let vertex_index = vertex_index_map[y * bordered_size + x];
            let percent = Vec2::new(
                (x as f32 - increment as f32) / mesh_size as f32,
                (y as f32 - increment as f32) / mesh_size as f32,
            );
            let height =
                settings.height_curve.evaluate(height_map.values.get(x, y))
                    * settings.height_multiplier;
            let position = Vec3::new(
                (top_left_x + percent.x * mesh_size_unsimplified as f32) * mesh_settings.scale,
                height,
                (top_left_z - percent.y * mesh_size_unsimplified as f32) * mesh_settings.scale,
            );
            mesh.add_vertex(position, percent, vertex_index);

            // Two triangles per decimated cell sharing the
            // top-left/bottom-right diagonal
            if x < bordered_size - 1 && y < bordered_size - 1 {
                let a = vertex_index_map[y * bordered_size + x];
                let b = vertex_index_map[y * bordered_size + x + increment];
                let c = vertex_index_map[(y + increment) * bordered_size + x];
                let d = vertex_index_map[(y + increment) * bordered_size + x + increment];
                mesh.add_triangle(a, d, c);
                mesh.add_triangle(d, a, b);
            }
        }
    }

    mesh.finalize(mesh_settings.flat_shading);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Grid, HeightCurve};

    fn approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).length() < eps
    }

    /// Height map filled from a function of global grid coordinates
    fn synthetic_height_map(size: usize, offset_x: usize) -> HeightMap {
        let mut values = Grid::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let gx = (x + offset_x) as f32;
                let gy = y as f32;
                values.set(
                    x,
                    y,
                    0.5 + 0.5 * (gx * 0.3).sin() * (gy * 0.2).cos(),
                );
            }
        }
        let (min_value, max_value) = values.min_max();
        HeightMap {
            values,
            min_value,
            max_value,
        }
    }

    fn flat_height_map(size: usize, value: f32) -> HeightMap {
        HeightMap {
            values: Grid::from_values(size, size, vec![value; size * size]),
            min_value: value,
            max_value: value,
        }
    }

    fn test_settings() -> HeightMapSettings {
        HeightMapSettings {
            height_curve: HeightCurve::linear(),
            height_multiplier: 10.0,
            ..HeightMapSettings::default()
        }
    }

    fn mesh_settings() -> MeshSettings {
        MeshSettings {
            chunk_size_index: 0,
            flat_shading: false,
            scale: 1.0,
        }
    }

    #[test]
    fn test_lod0_vertex_count() {
        // Bordered 49 -> 47x47 interior vertices at full detail
        let map = synthetic_height_map(49, 0);
        let mesh = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), 0);
        assert_eq!(mesh.vertices().len(), 47 * 47);
        assert_eq!(mesh.uvs().len(), 47 * 47);
        assert_eq!(mesh.normals().len(), 47 * 47);
        assert_eq!(mesh.triangles().len(), 46 * 46 * 6);
    }

    #[test]
    fn test_decimated_vertex_count_formula() {
        let map = synthetic_height_map(49, 0);
        for lod in 1..5u32 {
            let increment = lod_increment(lod) as usize;
            let mesh_size = 49 - 2 * increment;
            let verts_per_line = (mesh_size - 1) / increment + 1;
            let mesh = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), lod);
            assert_eq!(
                mesh.vertices().len(),
                verts_per_line * verts_per_line,
                "lod {}",
                lod
            );
        }
    }

    #[test]
    fn test_renderable_triangles_are_interior_only() {
        let map = synthetic_height_map(49, 0);
        let mesh = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), 1);
        let vertex_count = mesh.vertices().len() as u32;
        assert!(mesh.triangles().iter().all(|&i| i < vertex_count));
        // The border list is non-empty and every entry touches the ring
        assert!(!mesh.border_triangles.is_empty());
        assert!(
            mesh.border_triangles
                .chunks_exact(3)
                .all(|t| t.iter().any(|&i| i < 0))
        );
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let map = flat_height_map(25, 0.5);
        let mesh = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), 0);
        for &normal in mesh.normals() {
            assert!(approx_eq(normal, Vec3::Y, 1e-5));
        }
        for &vertex in mesh.vertices() {
            assert!((vertex.y - 5.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let map = synthetic_height_map(25, 0);
        let mesh = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), 0);
        for normal in mesh.normals() {
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_mesh_is_centered_and_scaled() {
        let map = flat_height_map(25, 0.0);
        let settings = MeshSettings {
            chunk_size_index: 0,
            flat_shading: false,
            scale: 2.0,
        };
        let mesh = generate_terrain_mesh(&map, &test_settings(), &settings, 0);
        let min_x = mesh.vertices().iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        let max_x = mesh.vertices().iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
        assert!((min_x + max_x).abs() < 1e-4, "mesh not centered");
        // 25 bordered -> 23 unsimplified verts -> 22 cells * scale 2
        assert!((max_x - min_x - 44.0).abs() < 1e-4);
    }

    #[test]
    fn test_edge_normals_match_neighbor_chunk() {
        // Two height maps sampled from the same global function, one
        // chunk span apart. The shared edge must bake identical normals
        // in both meshes, as if they were one merged mesh.
        let size = 25usize;
        let span = size - 3;
        let west = synthetic_height_map(size, 0);
        let east = synthetic_height_map(size, span);

        let settings = test_settings();
        let mesh_cfg = mesh_settings();
        let west_mesh = generate_terrain_mesh(&west, &settings, &mesh_cfg, 0);
        let east_mesh = generate_terrain_mesh(&east, &settings, &mesh_cfg, 0);

        // Interior vertices form a (size-2) x (size-2) row-major grid
        let verts_per_line = size - 2;
        for row in 0..verts_per_line {
            let west_edge = west_mesh.normals()[row * verts_per_line + (verts_per_line - 1)];
            let east_edge = east_mesh.normals()[row * verts_per_line];
            assert!(
                approx_eq(west_edge, east_edge, 1e-4),
                "row {}: {:?} vs {:?}",
                row,
                west_edge,
                east_edge
            );
        }
    }

    #[test]
    fn test_flat_shading_duplicates_vertices() {
        let map = synthetic_height_map(25, 0);
        let settings = MeshSettings {
            chunk_size_index: 0,
            flat_shading: true,
            scale: 1.0,
        };
        let smooth = generate_terrain_mesh(&map, &test_settings(), &mesh_settings(), 0);
        let flat = generate_terrain_mesh(&map, &test_settings(), &settings, 0);

        assert_eq!(flat.triangles().len(), smooth.triangles().len());
        assert_eq!(flat.vertices().len(), flat.triangles().len());
        // All three vertices of a face share its normal
        for triangle in flat.triangles().chunks_exact(3) {
            let n0 = flat.normals()[triangle[0] as usize];
            assert!(approx_eq(n0, flat.normals()[triangle[1] as usize], 1e-6));
            assert!(approx_eq(n0, flat.normals()[triangle[2] as usize], 1e-6));
        }
    }
}
