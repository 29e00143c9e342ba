//! Worker lanes for mesh and light jobs.
//!
//! Jobs carry owned snapshots gathered on the owner thread, so workers never touch the
//! world. Results come back over one channel that the owner drains once per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, select, unbounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use voxfield_chunk::ChunkBuildData;
use voxfield_lighting::LightBox;
use voxfield_mesh_cpu::{CancelToken, ChunkBuildResult, build_chunk_mesh};
use voxfield_world::ChunkCoord;

use crate::render_pool::RenderHandle;

pub struct MeshJob {
    pub handle: RenderHandle,
    pub data: ChunkBuildData,
    pub token: CancelToken,
}

pub struct LightJob {
    pub light: LightBox,
}

pub enum JobOut {
    Mesh {
        handle: RenderHandle,
        coord: ChunkCoord,
        token: CancelToken,
        result: ChunkBuildResult,
        t_mesh_ms: u32,
    },
    Light {
        light: LightBox,
        t_light_ms: u32,
    },
}

#[inline]
fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn process_mesh_job(job: MeshJob, tx: &Sender<JobOut>) {
    let MeshJob {
        handle,
        data,
        token,
    } = job;
    let t0 = Instant::now();
    let result = build_chunk_mesh(&data, &token);
    let _ = tx.send(JobOut::Mesh {
        handle,
        coord: data.coord,
        token,
        result,
        t_mesh_ms: elapsed_ms(t0),
    });
}

fn process_light_job(job: LightJob, tx: &Sender<JobOut>) {
    let LightJob { mut light } = job;
    let t0 = Instant::now();
    light.propagate();
    let _ = tx.send(JobOut::Light {
        light,
        t_light_ms: elapsed_ms(t0),
    });
}

/// Number of workers to spawn when the configuration leaves it open.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

pub struct Workers {
    job_tx_mesh: Sender<MeshJob>,
    job_tx_light: Sender<LightJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    q_mesh: Arc<AtomicUsize>,
    q_light: Arc<AtomicUsize>,
    inflight_mesh: Arc<AtomicUsize>,
    inflight_light: Arc<AtomicUsize>,
    workers: usize,
}

impl Workers {
    /// Spawns `workers` threads. Each prefers pending light jobs, since meshing of the
    /// chunks they touch waits on them.
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let workers = workers.max(1);
        let (job_tx_mesh, job_rx_mesh) = unbounded::<MeshJob>();
        let (job_tx_light, job_rx_light) = unbounded::<LightJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();

        let q_mesh = Arc::new(AtomicUsize::new(0));
        let q_light = Arc::new(AtomicUsize::new(0));
        let inflight_mesh = Arc::new(AtomicUsize::new(0));
        let inflight_light = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("voxfield-build-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let mesh_rx = job_rx_mesh.clone();
            let light_rx = job_rx_light.clone();
            let tx = res_tx.clone();
            let q_mesh = q_mesh.clone();
            let q_light = q_light.clone();
            let inflight_mesh = inflight_mesh.clone();
            let inflight_light = inflight_light.clone();
            let run_light = move |job: LightJob, tx: &Sender<JobOut>| {
                q_light.fetch_sub(1, Ordering::Relaxed);
                inflight_light.fetch_add(1, Ordering::Relaxed);
                process_light_job(job, tx);
                inflight_light.fetch_sub(1, Ordering::Relaxed);
            };
            let run_mesh = move |job: MeshJob, tx: &Sender<JobOut>| {
                q_mesh.fetch_sub(1, Ordering::Relaxed);
                inflight_mesh.fetch_add(1, Ordering::Relaxed);
                process_mesh_job(job, tx);
                inflight_mesh.fetch_sub(1, Ordering::Relaxed);
            };
            pool.spawn(move || {
                loop {
                    if let Ok(job) = light_rx.try_recv() {
                        run_light(job, &tx);
                        continue;
                    }
                    select! {
                        recv(light_rx) -> res => match res {
                            Ok(job) => run_light(job, &tx),
                            Err(_) => break,
                        },
                        recv(mesh_rx) -> res => match res {
                            Ok(job) => run_mesh(job, &tx),
                            Err(_) => break,
                        },
                    }
                }
            });
        }

        Ok(Self {
            job_tx_mesh,
            job_tx_light,
            res_rx,
            _pool: pool,
            q_mesh,
            q_light,
            inflight_mesh,
            inflight_light,
            workers,
        })
    }

    pub fn submit_mesh(&self, job: MeshJob) {
        self.q_mesh.fetch_add(1, Ordering::Relaxed);
        if self.job_tx_mesh.send(job).is_err() {
            self.q_mesh.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn submit_light(&self, job: LightJob) {
        self.q_light.fetch_add(1, Ordering::Relaxed);
        if self.job_tx_light.send(job).is_err() {
            self.q_light.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Completed jobs, without waiting.
    pub fn drain_worker_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    /// (queued mesh, running mesh, queued light, running light)
    pub fn queue_debug_counts(&self) -> (usize, usize, usize, usize) {
        (
            self.q_mesh.load(Ordering::Relaxed),
            self.inflight_mesh.load(Ordering::Relaxed),
            self.q_light.load(Ordering::Relaxed),
            self.inflight_light.load(Ordering::Relaxed),
        )
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers
    }
}
