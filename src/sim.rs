//! Headless driver: an observer walking a slow circle over generated terrain, feeding
//! columns to the stream manager and poking the ground every few ticks.

use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use voxfield_blocks::{BlockRegistry, BlockStateId};
use voxfield_geom::Vec3;
use voxfield_mesh_cpu::{ChunkMesh, CollisionMesh, LocalCollider};
use voxfield_runtime::{ChunkStreamManager, Observer, SceneSink};
use voxfield_world::{BlockPos, CHUNK_SIZE, ChunkCoord, World};

use crate::config::AppConfig;
use crate::terrain::{self, Palette};

/// Scene stand-in that keeps what a renderer would upload.
#[derive(Default)]
pub struct HeadlessScene {
    chunks: HashMap<ChunkCoord, (usize, usize)>,
    pub uploads: usize,
    pub clears: usize,
    pub collider_rebuilds: usize,
    pub collider_quads: usize,
    pub in_liquid: bool,
    pub block_entity_sweeps: usize,
}

impl HeadlessScene {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn quad_count(&self) -> usize {
        self.chunks.values().map(|(q, _)| q).sum()
    }

    pub fn collision_quad_count(&self) -> usize {
        self.chunks.values().map(|(_, c)| c).sum()
    }
}

impl SceneSink for HeadlessScene {
    fn apply_chunk(&mut self, coord: ChunkCoord, mesh: ChunkMesh, collider: Option<CollisionMesh>) {
        let cq = collider.map_or(0, |c| c.quad_count());
        self.chunks.insert(coord, (mesh.quad_count(), cq));
        self.uploads += 1;
    }

    fn clear_chunk(&mut self, coord: ChunkCoord) {
        self.chunks.remove(&coord);
        self.clears += 1;
    }

    fn set_local_collider(&mut self, collider: LocalCollider) {
        self.collider_rebuilds += 1;
        self.collider_quads = collider.movement.quad_count() + collider.liquid.quad_count();
    }

    fn liquid_state_changed(&mut self, in_liquid: bool) {
        let verb = if in_liquid { "entered" } else { "left" };
        log::info!(target: "events", "observer {verb} liquid");
        self.in_liquid = in_liquid;
    }

    fn remove_block_entities_in_column(&mut self, _cx: i32, _cz: i32) {
        self.block_entity_sweeps += 1;
    }
}

/// Observer walking a circle around the origin at a fixed height above the ground.
pub struct Walker {
    pub pos: Vec3,
    angle: f32,
    radius: f32,
}

impl Walker {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec3::new(radius, 0.0, 0.0),
            angle: 0.0,
            radius,
        }
    }

    pub fn step(&mut self, speed: f32, ground: i32) {
        self.angle += speed / self.radius.max(1.0);
        self.pos = Vec3::new(
            self.angle.cos() * self.radius,
            ground as f32 + 1.6,
            self.angle.sin() * self.radius,
        );
    }
}

impl Observer for Walker {
    fn position(&self) -> Vec3 {
        self.pos
    }
}

pub struct Sim {
    cfg: AppConfig,
    mgr: ChunkStreamManager,
    scene: HeadlessScene,
    walker: Walker,
    loaded: HashSet<(i32, i32)>,
    blocks_path: std::path::PathBuf,
    reload_rx: Option<Receiver<()>>,
}

impl Sim {
    pub fn new(
        cfg: AppConfig,
        registry: Arc<BlockRegistry>,
        blocks_path: std::path::PathBuf,
        reload_rx: Option<Receiver<()>>,
    ) -> Result<Self, Box<dyn Error>> {
        Palette::resolve(&registry)?;
        let world = World::new(registry, cfg.world.height_chunks);
        let mgr = ChunkStreamManager::new(world, cfg.stream.clone())?;
        let radius = (cfg.stream.render_distance.max(2) * CHUNK_SIZE as i32) as f32;
        Ok(Self {
            cfg,
            mgr,
            scene: HeadlessScene::default(),
            walker: Walker::new(radius),
            loaded: HashSet::new(),
            blocks_path,
            reload_rx,
        })
    }

    /// Columns fed to the world: the view ring plus a margin so the edge chunks see their
    /// neighbors.
    fn feed_radius(&self) -> i32 {
        self.cfg.stream.render_distance + 1
    }

    fn stream_columns(&mut self) -> Result<(), Box<dyn Error>> {
        let c = BlockPos::containing(self.walker.pos).chunk();
        let r = self.feed_radius();
        let keep = self.cfg.stream.unload_distance() + 1;
        let reg = Arc::clone(self.mgr.world().registry());
        let palette = Palette::resolve(&reg)?;
        for dx in -r..=r {
            for dz in -r..=r {
                let key = (c.cx + dx, c.cz + dz);
                if self.loaded.contains(&key) {
                    continue;
                }
                let world = self.mgr.world();
                let col = terrain::generate_column(world, &self.cfg.world, &palette, key.0, key.1);
                self.mgr.load_column(key.0, key.1, col);
                self.loaded.insert(key);
            }
        }
        let gone: Vec<(i32, i32)> = self
            .loaded
            .iter()
            .copied()
            .filter(|&(x, z)| (x - c.cx).abs() > keep || (z - c.cz).abs() > keep)
            .collect();
        for (x, z) in gone {
            self.mgr.unload_column(x, z, &mut self.scene);
            self.loaded.remove(&(x, z));
        }
        Ok(())
    }

    /// Alternates digging the block under the observer and planting a torch beside it.
    fn poke(&mut self, tick: u64) {
        let feet = BlockPos::containing(self.walker.pos);
        let ground = self.ground_at(feet.x, feet.z);
        let reg = Arc::clone(self.mgr.world().registry());
        let (pos, state) = if (tick / self.cfg.sim.edit_interval.max(1)) % 2 == 0 {
            (BlockPos::new(feet.x, ground - 1, feet.z), BlockStateId::AIR)
        } else {
            match reg.id_by_name("torch") {
                Some(t) => (BlockPos::new(feet.x + 2, ground, feet.z), t),
                None => return,
            }
        };
        if let Some(out) = self.mgr.set_block(pos, state) {
            log::debug!(
                target: "events",
                "[tick {tick}] edit {:?} -> {} (was {}, relight {})",
                pos,
                reg.state_or_air(state).name,
                reg.state_or_air(out.previous).name,
                out.relight
            );
        }
    }

    /// Y just above the highest non-air block of the column at `(x, z)`.
    fn ground_at(&self, x: i32, z: i32) -> i32 {
        let w = self.mgr.world();
        (0..w.max_y())
            .rev()
            .find(|&y| {
                let s = w.block_state(BlockPos::new(x, y, z));
                !s.id.is_air() && !s.in_liquid()
            })
            .map_or(terrain::surface_height(&self.cfg.world, x, z), |y| y + 1)
    }

    fn check_reload(&mut self) {
        let Some(rx) = &self.reload_rx else {
            return;
        };
        if rx.try_iter().count() == 0 {
            return;
        }
        match BlockRegistry::from_path(&self.blocks_path) {
            Ok(reg) => {
                log::info!(target: "events", "reloading {}", self.blocks_path.display());
                self.mgr.set_registry(Arc::new(reg), &mut self.scene);
            }
            Err(e) => log::warn!("keeping the current blocks: {e}"),
        }
    }

    fn report(&self, t0: Instant) {
        let tick = self.mgr.tick();
        let s = self.mgr.stats();
        log::info!(
            target: "perf",
            "[tick {tick}] cols={} chunks={} quads={} coll={} queued={} building={} light={}+{} \
             build_avg={:.2}ms light_avg={:.2}ms pool={} uptime={:.1}s",
            s.columns,
            self.scene.chunk_count(),
            self.scene.quad_count(),
            self.scene.collision_quad_count(),
            s.queued,
            s.building,
            s.light_pending,
            s.light_in_flight,
            s.avg_build_ms,
            s.avg_light_ms,
            s.pooled_in_use,
            t0.elapsed().as_secs_f32()
        );
        let (qm, rm, ql, rl) = self.mgr.worker_queues();
        log::debug!(
            target: "perf",
            "[tick {tick}] workers mesh {qm} queued {rm} running, light {ql} queued {rl} running"
        );
    }

    pub fn run(&mut self, ticks: u64) -> Result<(), Box<dyn Error>> {
        let t0 = Instant::now();
        let sleep = Duration::from_millis(self.cfg.sim.tick_ms);
        let report_every = self.cfg.sim.report_interval.max(1);
        let edit_every = self.cfg.sim.edit_interval.max(1);
        for tick in 1..=ticks {
            self.check_reload();
            let feet = BlockPos::containing(self.walker.pos);
            let ground = self.ground_at(feet.x, feet.z);
            self.walker.step(self.cfg.sim.speed, ground);
            self.stream_columns()?;
            self.mgr.update(&self.walker, &mut self.scene);
            if tick % edit_every == 0 {
                self.poke(tick);
            }
            if tick % report_every == 0 {
                self.report(t0);
            }
            if !sleep.is_zero() {
                std::thread::sleep(sleep);
            }
        }
        self.report(t0);
        log::info!(
            target: "events",
            "done: {} uploads, {} clears, {} collider rebuilds ({} quads), {} column sweeps",
            self.scene.uploads,
            self.scene.clears,
            self.scene.collider_rebuilds,
            self.scene.collider_quads,
            self.scene.block_entity_sweeps
        );
        Ok(())
    }

    pub fn scene(&self) -> &HeadlessScene {
        &self.scene
    }

    pub fn manager(&self) -> &ChunkStreamManager {
        &self.mgr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn small_sim() -> Sim {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let path = root.join("assets/blocks.toml");
        let reg = Arc::new(BlockRegistry::from_path(&path).unwrap());
        let mut cfg = AppConfig::default();
        cfg.stream.render_distance = 2;
        cfg.stream.scan_stripes = 2;
        cfg.stream.workers = 2;
        cfg.world.height_chunks = 4;
        cfg.sim.speed = 0.0;
        cfg.sim.report_interval = 1000;
        Sim::new(cfg, reg, path, None).unwrap()
    }

    #[test]
    fn standing_still_fills_the_view() {
        let mut sim = small_sim();
        for _ in 0..200 {
            sim.run(8).unwrap();
            if sim.manager().stats().columns == 9 && sim.manager().stats().is_idle() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(sim.scene().chunk_count() > 0);
        assert!(sim.scene().quad_count() > 0);
        assert!(sim.scene().collider_rebuilds >= 1);
        assert_eq!(sim.manager().stats().columns, 9);
    }

    #[test]
    fn walker_stays_on_its_circle() {
        let mut w = Walker::new(32.0);
        for _ in 0..50 {
            w.step(1.0, 30);
            let r = (w.pos.x * w.pos.x + w.pos.z * w.pos.z).sqrt();
            assert!((r - 32.0).abs() < 1e-3);
            assert_eq!(w.pos.y, 31.6);
        }
    }
}
