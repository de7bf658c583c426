//! Procedural height-field generation

pub mod falloff;
pub mod heightmap;
pub mod noise;

pub use self::falloff::{FalloffCache, FalloffMap};
pub use self::heightmap::{HeightMap, HeightMapSettings, generate_height_map};
pub use self::noise::{NoiseSettings, NormalizeMode, generate_noise_map};
