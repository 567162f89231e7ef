use serde::Deserialize;

/// Largest accepted render radius, in chunks.
pub const MAX_RENDER_RADIUS: u32 = 64;

/// Tunables for the world cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal chunk radius kept visible around the camera.
    pub render_radius: u32,
    /// Multiplier on radius^3 so the cache also holds chunks loaded ahead of
    /// the render radius.
    pub cache_scale: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            render_radius: 6,
            cache_scale: 4,
        }
    }
}

impl WorldConfig {
    /// Number of chunks the cache holds: radius^3 * scale, at least one.
    pub fn cache_capacity(&self) -> usize {
        let r = self.render_radius as usize;
        r.saturating_mul(r)
            .saturating_mul(r)
            .saturating_mul(self.cache_scale as usize)
            .max(1)
    }
}
