use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use rayon::ThreadPoolBuildError;
use voxfield_blocks::{BlockRegistry, BlockStateId};
use voxfield_chunk::ChunkBuildData;
use voxfield_geom::Vec3;
use voxfield_lighting::{LightBox, affected_chunks};
use voxfield_mesh_cpu::{
    CancelToken, ChunkBuildResult, build_local_collider, within_movement_radius,
};
use voxfield_world::{BlockPos, CHUNK_SIZE, ChunkColumn, ChunkCoord, SetBlockOutcome, World};

use crate::column::ChunkRenderColumn;
use crate::config::StreamConfig;
use crate::observer::{Observer, SceneSink};
use crate::queue::BuildQueue;
use crate::render_pool::{ChunkRender, ChunkRenderState, RenderHandle, RenderPool};
use crate::stats::{RollingAverage, StreamStats};
use crate::workers::{JobOut, LightJob, MeshJob, Workers};

const BUILD_TIME_WINDOW: usize = 200;
const LIGHT_TIME_WINDOW: usize = 20;

const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Columns inside the view circle, nearest first.
pub(crate) fn nearby_offsets(r: i32) -> Vec<(i32, i32)> {
    let mut v: Vec<(i32, i32)> = (-r..=r)
        .flat_map(|dx| (-r..=r).map(move |dz| (dx, dz)))
        .filter(|&(dx, dz)| dx * dx + dz * dz < r * r)
        .collect();
    v.sort_by_key(|&(dx, dz)| dx * dx + dz * dz);
    v
}

#[inline]
pub(crate) fn stripe_of(cx: i32, cz: i32, stripes: usize) -> usize {
    (cx + cz * 3).rem_euclid(stripes as i32) as usize
}

/// Build priority: distance from the eye to the chunk center, in whole chunks.
#[inline]
pub fn chunk_priority(coord: ChunkCoord, eye: Vec3) -> i32 {
    (coord.center().distance(eye) / CHUNK_SIZE as f32) as i32
}

/// Owns the world and decides which chunks get built, when, and in what order.
/// Everything here runs on the owner thread; only mesh and light computation runs on
/// workers.
pub struct ChunkStreamManager {
    cfg: StreamConfig,
    world: World,
    workers: Workers,
    pool: RenderPool,
    columns: HashMap<(i32, i32), ChunkRenderColumn>,
    queue: BuildQueue,
    building: usize,
    light_requests: VecDeque<ChunkCoord>,
    light_requested: HashSet<ChunkCoord>,
    light_in_flight: HashSet<ChunkCoord>,
    nearby: Vec<(i32, i32)>,
    tick: u64,
    observer_block: Option<BlockPos>,
    observer_in_liquid: bool,
    collider_dirty: bool,
    pool_exhausted: bool,
    build_times: RollingAverage,
    light_times: RollingAverage,
}

impl ChunkStreamManager {
    pub fn new(world: World, cfg: StreamConfig) -> Result<Self, ThreadPoolBuildError> {
        let workers = Workers::new(cfg.resolved_workers())?;
        let pool = RenderPool::new(cfg.resolved_pool_capacity(world.height_chunks()));
        log::info!(
            target: "events",
            "stream manager: render {} unload {} workers {} pool {}",
            cfg.render_distance,
            cfg.unload_distance(),
            workers.worker_count(),
            pool.capacity()
        );
        Ok(Self {
            nearby: nearby_offsets(cfg.render_distance),
            cfg,
            world,
            workers,
            pool,
            columns: HashMap::new(),
            queue: BuildQueue::new(),
            building: 0,
            light_requests: VecDeque::new(),
            light_requested: HashSet::new(),
            light_in_flight: HashSet::new(),
            tick: 0,
            observer_block: None,
            observer_in_liquid: false,
            collider_dirty: true,
            pool_exhausted: false,
            build_times: RollingAverage::new(BUILD_TIME_WINDOW),
            light_times: RollingAverage::new(LIGHT_TIME_WINDOW),
        })
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// One scheduling step: apply finished work, refresh the observer's collider, start
    /// light and mesh jobs, then run one slice of the add or remove scan.
    pub fn update(&mut self, observer: &impl Observer, sink: &mut impl SceneSink) {
        self.tick += 1;
        self.drain_results(sink);
        let eye = observer.position();
        self.update_observer(BlockPos::containing(eye), sink);
        self.start_light_jobs();
        self.dispatch_builds(sink);
        if self.tick % 2 == 1 {
            self.add_scan(observer, eye);
        } else {
            self.remove_scan(sink);
        }
    }

    // ---- world feed ----

    /// Hands a column of block data to the world. Chunks holding emitters get their light
    /// computed, together with the neighbors that light can reach. Emitters already loaded
    /// next door are relit too: their light now spreads into this column, and this
    /// column's blockage changes what they lit before.
    pub fn load_column(&mut self, cx: i32, cz: i32, column: ChunkColumn) {
        self.world.insert_column(cx, cz, column);
        self.request_light_for_column(cx, cz, false);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if (dx, dz) != (0, 0) {
                    self.request_light_for_column(cx + dx, cz + dz, false);
                }
            }
        }
        log::trace!("column ({cx},{cz}) loaded");
    }

    /// Removes a column from the world. Builds of neighboring chunks that read it are
    /// cancelled and picked up again by the add scan once it returns.
    pub fn unload_column(&mut self, cx: i32, cz: i32, sink: &mut impl SceneSink) {
        if self.world.remove_column(cx, cz).is_none() {
            return;
        }
        self.evict_render_column(cx, cz, sink);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let Some(col) = self.columns.get(&(cx + dx, cz + dz)) else {
                    continue;
                };
                for (_, h) in col.handles() {
                    if let Some(r) = self.pool.get_mut(h) {
                        if r.state == ChunkRenderState::Building {
                            r.token.cancel();
                            r.state = ChunkRenderState::Cancelled;
                        }
                    }
                }
            }
        }
    }

    /// Writes a block and marks everything that depends on it: the chunk itself, the
    /// neighbor across any chunk face the block touches, the light boxes the change can
    /// reach, and the observer's collider when the edit is close enough to matter.
    pub fn set_block(&mut self, pos: BlockPos, state: BlockStateId) -> Option<SetBlockOutcome> {
        let outcome = self.world.set_block(pos, state)?;
        if outcome.previous == state {
            return Some(outcome);
        }
        let coord = pos.chunk();
        let (lx, ly, lz) = pos.local();
        self.mark_dirty(coord, 0);
        let last = CHUNK_SIZE - 1;
        for (l, (dx, dy, dz)) in [(lx, (1, 0, 0)), (ly, (0, 1, 0)), (lz, (0, 0, 1))] {
            if l == 0 {
                self.mark_dirty(coord.offset(-dx, -dy, -dz), 0);
            } else if l == last {
                self.mark_dirty(coord.offset(dx, dy, dz), 0);
            }
        }
        if outcome.relight {
            for (dx, dy, dz) in affected_chunks((lx, ly, lz)) {
                self.request_light_update(coord.offset(dx, dy, dz));
            }
        }
        if self.observer_block.is_some_and(|o| within_movement_radius(o, pos)) {
            self.collider_dirty = true;
        }
        Some(outcome)
    }

    pub fn set_biome(&mut self, pos: BlockPos, rgb: [f32; 3]) {
        let (cx, cz) = pos.column();
        if !self.world.set_biome(pos, rgb) {
            return;
        }
        let height = self.world.height_chunks() as i32;
        for cy in 0..height {
            self.mark_dirty(ChunkCoord::new(cx, cy, cz), 0);
        }
    }

    /// Queues `coord` for a rebuild. A build already running for it is cancelled and its
    /// result dropped.
    pub fn mark_dirty(&mut self, coord: ChunkCoord, priority: i32) {
        if coord.cy < 0 || coord.cy >= self.world.height_chunks() as i32 {
            return;
        }
        let Some(column) = self.columns.get_mut(&coord.column()) else {
            return;
        };
        let needs_render = self.world.chunk(coord).is_some_and(|c| c.has_blocks());
        if column.get(coord.cy).is_none() && !needs_render {
            return;
        }
        let Some(handle) = column.get_or_create(coord.cy, &mut self.pool) else {
            self.report_pool_exhausted(coord);
            return;
        };
        let Some(r) = self.pool.get_mut(handle) else {
            return;
        };
        if r.state == ChunkRenderState::Building {
            r.token.cancel();
        }
        r.state = ChunkRenderState::Pending;
        r.priority = priority;
        self.queue.push(coord, priority);
        log::trace!("dirty {coord:?} priority {priority}");
    }

    /// Schedules a light recalculation for the box centered on `coord`.
    pub fn request_light_update(&mut self, coord: ChunkCoord) {
        if coord.cy < 0 || coord.cy >= self.world.height_chunks() as i32 {
            return;
        }
        if !self.world.is_column_loaded(coord.cx, coord.cz) {
            return;
        }
        if self.light_requested.insert(coord) {
            self.light_requests.push_back(coord);
        }
    }

    /// Drops every render column and queued build; the next scans rebuild the view.
    pub fn reload_all(&mut self, sink: &mut impl SceneSink) {
        let keys: Vec<(i32, i32)> = self.columns.keys().copied().collect();
        for (cx, cz) in keys {
            self.evict_render_column(cx, cz, sink);
        }
        self.queue.clear();
        self.observer_block = None;
        self.collider_dirty = true;
        log::info!(target: "events", "[tick {}] reloaded all chunk renders", self.tick);
    }

    /// Swaps the block registry, relights every lit chunk and reloads all renders.
    pub fn set_registry(&mut self, registry: Arc<BlockRegistry>, sink: &mut impl SceneSink) {
        self.world.set_registry(registry);
        self.light_requests.clear();
        self.light_requested.clear();
        let keys: Vec<(i32, i32)> = self.world.column_keys().collect();
        for (cx, cz) in keys {
            self.request_light_for_column(cx, cz, true);
        }
        log::info!(
            target: "events",
            "[tick {}] block registry swapped ({} states)",
            self.tick,
            self.world.registry().len()
        );
        self.reload_all(sink);
    }

    // ---- queries ----

    pub fn render(&self, coord: ChunkCoord) -> Option<&ChunkRender> {
        let h = self.columns.get(&coord.column())?.get(coord.cy)?;
        self.pool.get(h)
    }

    pub fn render_state(&self, coord: ChunkCoord) -> Option<ChunkRenderState> {
        self.render(coord).map(ChunkRender::state)
    }

    pub fn has_render_column(&self, cx: i32, cz: i32) -> bool {
        self.columns.contains_key(&(cx, cz))
    }

    /// Whether `coord` waits on a light recalculation.
    pub fn light_pending(&self, coord: ChunkCoord) -> bool {
        self.light_requested.contains(&coord) || self.light_in_flight.contains(&coord)
    }

    /// Worker-side counters: (queued mesh, running mesh, queued light, running light).
    pub fn worker_queues(&self) -> (usize, usize, usize, usize) {
        self.workers.queue_debug_counts()
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            queued: self.queue.len(),
            building: self.building,
            light_pending: self.light_requests.len(),
            light_in_flight: self.light_in_flight.len(),
            avg_build_ms: self.build_times.average(),
            avg_light_ms: self.light_times.average(),
            columns: self.columns.len(),
            pooled_in_use: self.pool.in_use(),
        }
    }

    // ---- tick phases ----

    fn drain_results(&mut self, sink: &mut impl SceneSink) {
        for out in self.workers.drain_worker_results() {
            match out {
                JobOut::Mesh {
                    handle,
                    coord,
                    token,
                    result,
                    t_mesh_ms,
                } => {
                    self.building = self.building.saturating_sub(1);
                    self.build_times.push(t_mesh_ms);
                    self.apply_build(handle, coord, &token, result, sink);
                }
                JobOut::Light { light, t_light_ms } => {
                    self.light_times.push(t_light_ms);
                    self.apply_light(&light);
                }
            }
        }
    }

    fn apply_build(
        &mut self,
        handle: RenderHandle,
        coord: ChunkCoord,
        token: &CancelToken,
        result: ChunkBuildResult,
        sink: &mut impl SceneSink,
    ) {
        let Some(r) = self.pool.get_mut(handle) else {
            log::trace!("dropping build of released {coord:?}");
            return;
        };
        r.in_flight = false;
        if token.is_cancelled() {
            // a newer dirty mark already re-queued it, or its neighbors went away
            if r.state == ChunkRenderState::Building {
                r.state = ChunkRenderState::Cancelled;
            }
            return;
        }
        match result {
            ChunkBuildResult::Cancelled => r.state = ChunkRenderState::Cancelled,
            ChunkBuildResult::Empty => {
                if r.has_geometry {
                    sink.clear_chunk(coord);
                }
                r.has_geometry = false;
                r.state = ChunkRenderState::Ready;
            }
            ChunkBuildResult::Built { mesh, collider } => {
                sink.apply_chunk(coord, mesh, collider);
                r.has_geometry = true;
                r.state = ChunkRenderState::Ready;
            }
        }
    }

    fn apply_light(&mut self, light: &LightBox) {
        let center = light.center();
        self.light_in_flight.remove(&center);
        let wb = light.write_back(&mut self.world);
        if wb.changed == 0 {
            return;
        }
        log::trace!("light {center:?}: {} cells changed", wb.changed);
        self.mark_dirty(center, 0);
        for (dx, dy, dz) in wb.dirty_neighbors() {
            self.mark_dirty(center.offset(dx, dy, dz), 0);
        }
    }

    fn update_observer(&mut self, block: BlockPos, sink: &mut impl SceneSink) {
        if self.observer_block != Some(block) || self.collider_dirty {
            sink.set_local_collider(build_local_collider(&self.world, block));
            self.collider_dirty = false;
        }
        self.observer_block = Some(block);
        let in_liquid = self.world.block_state(block).in_liquid();
        if in_liquid != self.observer_in_liquid {
            self.observer_in_liquid = in_liquid;
            sink.liquid_state_changed(in_liquid);
        }
    }

    fn start_light_jobs(&mut self) {
        let mut started = 0;
        let mut busy = Vec::new();
        while started < self.cfg.light_jobs_per_tick {
            let Some(c) = self.light_requests.pop_front() else {
                break;
            };
            // at most one recalculation per chunk in flight
            if self.light_in_flight.contains(&c) {
                busy.push(c);
                continue;
            }
            self.light_requested.remove(&c);
            if !self.world.is_column_loaded(c.cx, c.cz) {
                continue;
            }
            let light = LightBox::gather(&self.world, c);
            self.light_in_flight.insert(c);
            self.workers.submit_light(LightJob { light });
            started += 1;
        }
        for c in busy.into_iter().rev() {
            self.light_requests.push_front(c);
        }
    }

    fn blocked_by_light(&self, coord: ChunkCoord) -> bool {
        self.light_pending(coord)
            || FACE_OFFSETS
                .iter()
                .any(|&(dx, dy, dz)| self.light_pending(coord.offset(dx, dy, dz)))
    }

    fn dispatch_builds(&mut self, sink: &mut impl SceneSink) {
        let mut deferred = Vec::new();
        while self.building < self.cfg.max_concurrent_builds {
            let Some((coord, priority)) = self.queue.pop() else {
                break;
            };
            let Some(handle) = self.columns.get(&coord.column()).and_then(|c| c.get(coord.cy))
            else {
                log::trace!("skip {coord:?}: column gone");
                continue;
            };
            let Some(in_flight) = self.pool.get(handle).map(|r| r.in_flight) else {
                continue;
            };
            if in_flight || self.blocked_by_light(coord) {
                deferred.push((coord, priority));
                continue;
            }
            if !self.world.neighbors_loaded(coord) {
                if let Some(r) = self.pool.get_mut(handle) {
                    r.state = ChunkRenderState::Delayed;
                }
                continue;
            }
            let Some(data) = ChunkBuildData::gather(&self.world, coord) else {
                self.release_empty(coord, sink);
                continue;
            };
            let token = CancelToken::new();
            if let Some(r) = self.pool.get_mut(handle) {
                r.state = ChunkRenderState::Building;
                r.token = token.clone();
                r.in_flight = true;
                r.priority = priority;
            }
            self.building += 1;
            self.workers.submit_mesh(MeshJob {
                handle,
                data,
                token,
            });
        }
        for (coord, priority) in deferred {
            self.queue.push(coord, priority);
        }
    }

    /// A chunk that holds only air gives its render object back.
    fn release_empty(&mut self, coord: ChunkCoord, sink: &mut impl SceneSink) {
        let Some(col) = self.columns.get_mut(&coord.column()) else {
            return;
        };
        if let Some(r) = col.release(coord.cy, &mut self.pool) {
            if r.has_geometry() {
                sink.clear_chunk(coord);
            }
        }
        self.pool_exhausted = false;
    }

    #[inline]
    fn current_stripe(&self) -> usize {
        (self.tick / 2) as usize % self.cfg.stripes()
    }

    fn add_scan(&mut self, observer: &impl Observer, eye: Vec3) {
        let Some(center) = self.observer_block.map(BlockPos::chunk) else {
            return;
        };
        let stripes = self.cfg.stripes();
        let stripe = self.current_stripe();
        let height = self.world.height_chunks() as i32;
        for i in 0..self.nearby.len() {
            let (dx, dz) = self.nearby[i];
            let (cx, cz) = (center.cx + dx, center.cz + dz);
            if stripe_of(cx, cz, stripes) != stripe {
                continue;
            }
            if !self.world.neighbors_loaded(ChunkCoord::new(cx, 0, cz)) {
                continue;
            }
            if !self.columns.contains_key(&(cx, cz)) {
                self.columns.insert((cx, cz), ChunkRenderColumn::new(cx, cz, height as usize));
                log::info!(
                    target: "events",
                    "[tick {}] render column ({cx},{cz}) created",
                    self.tick
                );
            }
            for cy in 0..height {
                let coord = ChunkCoord::new(cx, cy, cz);
                if self.world.chunk(coord).is_some_and(|c| c.has_blocks()) {
                    self.enqueue_in_view(coord, observer, eye);
                }
            }
        }
    }

    /// Add-scan step for one non-empty chunk: new chunks get a render object and join the
    /// queue; delayed or cancelled ones rejoin once visible.
    fn enqueue_in_view(&mut self, coord: ChunkCoord, observer: &impl Observer, eye: Vec3) {
        let Some(column) = self.columns.get_mut(&coord.column()) else {
            return;
        };
        let priority = chunk_priority(coord, eye);
        if let Some(r) = column.get(coord.cy).and_then(|h| self.pool.get_mut(h)) {
            let parked = matches!(r.state, ChunkRenderState::Delayed | ChunkRenderState::Cancelled);
            if parked && observer.chunk_in_viewport(coord) {
                r.state = ChunkRenderState::Pending;
                r.priority = priority;
                self.queue.push(coord, priority);
            }
            return;
        }
        let Some(handle) = column.get_or_create(coord.cy, &mut self.pool) else {
            self.report_pool_exhausted(coord);
            return;
        };
        if let Some(r) = self.pool.get_mut(handle) {
            r.priority = priority;
        }
        self.queue.push(coord, priority);
    }

    fn remove_scan(&mut self, sink: &mut impl SceneSink) {
        let Some(center) = self.observer_block.map(BlockPos::chunk) else {
            return;
        };
        let unload = self.cfg.unload_distance();
        let stripes = self.cfg.stripes();
        let stripe = self.current_stripe();
        let doomed: Vec<(i32, i32)> = self
            .columns
            .keys()
            .copied()
            .filter(|&(cx, cz)| stripe_of(cx, cz, stripes) == stripe)
            .filter(|&(cx, cz)| (cx - center.cx).abs() > unload || (cz - center.cz).abs() > unload)
            .collect();
        for (cx, cz) in doomed {
            self.evict_render_column(cx, cz, sink);
        }
    }

    fn evict_render_column(&mut self, cx: i32, cz: i32, sink: &mut impl SceneSink) {
        let Some(mut col) = self.columns.remove(&(cx, cz)) else {
            return;
        };
        for r in col.unload(&mut self.pool, &mut self.queue) {
            if r.has_geometry() {
                sink.clear_chunk(r.coord());
            }
        }
        sink.remove_block_entities_in_column(cx, cz);
        self.pool_exhausted = false;
        log::info!(target: "events", "[tick {}] render column ({cx},{cz}) evicted", self.tick);
    }

    fn report_pool_exhausted(&mut self, coord: ChunkCoord) {
        if !self.pool_exhausted {
            log::warn!(
                "render pool exhausted ({} objects); {coord:?} waits for a free slot",
                self.pool.capacity()
            );
            self.pool_exhausted = true;
        }
    }

    /// Requests light for chunks of a column that emit (and the neighbors they reach) or,
    /// with `lit`, also for chunks already holding light.
    fn request_light_for_column(&mut self, cx: i32, cz: i32, lit: bool) {
        let height = self.world.height_chunks() as i32;
        let Some(column) = self.world.column(cx, cz) else {
            return;
        };
        let mut sources = Vec::new();
        let mut relit = Vec::new();
        for cy in 0..height {
            let Some(chunk) = column.chunk(cy) else {
                continue;
            };
            if chunk.has_emitters() {
                sources.push(cy);
            } else if lit && chunk.has_light() {
                relit.push(cy);
            }
        }
        for cy in sources {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        self.request_light_update(ChunkCoord::new(cx + dx, cy + dy, cz + dz));
                    }
                }
            }
        }
        for cy in relit {
            self.request_light_update(ChunkCoord::new(cx, cy, cz));
        }
    }
}
