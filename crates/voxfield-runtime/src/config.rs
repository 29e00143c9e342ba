use serde::Deserialize;

use crate::workers::default_worker_count;

/// Streaming knobs, read from the `[stream]` table.
#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    /// View radius in chunks.
    #[serde(default = "default_render_distance")]
    pub render_distance: i32,
    /// Columns farther than `ceil(render_distance * unload_factor)` are evicted.
    #[serde(default = "default_unload_factor")]
    pub unload_factor: f32,
    #[serde(default = "default_max_builds")]
    pub max_concurrent_builds: usize,
    #[serde(default = "default_light_jobs")]
    pub light_jobs_per_tick: usize,
    /// Number of ticks a full view scan is spread over.
    #[serde(default = "default_scan_stripes")]
    pub scan_stripes: usize,
    /// 0 picks one less than the available parallelism.
    #[serde(default)]
    pub workers: usize,
    /// 0 sizes the pool for every chunk inside the unload distance.
    #[serde(default)]
    pub render_pool_capacity: usize,
}
fn default_render_distance() -> i32 {
    8
}
fn default_unload_factor() -> f32 {
    1.25
}
fn default_max_builds() -> usize {
    6
}
fn default_light_jobs() -> usize {
    6
}
fn default_scan_stripes() -> usize {
    8
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            render_distance: default_render_distance(),
            unload_factor: default_unload_factor(),
            max_concurrent_builds: default_max_builds(),
            light_jobs_per_tick: default_light_jobs(),
            scan_stripes: default_scan_stripes(),
            workers: 0,
            render_pool_capacity: 0,
        }
    }
}

impl StreamConfig {
    /// Eviction distance in chunks; always beyond the render distance.
    pub fn unload_distance(&self) -> i32 {
        let r = self.render_distance.max(1);
        let d = (r as f32 * self.unload_factor).ceil() as i32;
        d.max(r + 1)
    }

    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 { default_worker_count() } else { self.workers }
    }

    pub fn resolved_pool_capacity(&self, height_chunks: usize) -> usize {
        if self.render_pool_capacity > 0 {
            return self.render_pool_capacity;
        }
        let side = (2 * self.unload_distance() + 1) as usize;
        side * side * height_chunks.max(1)
    }

    #[inline]
    pub fn stripes(&self) -> usize {
        self.scan_stripes.max(1)
    }
}
