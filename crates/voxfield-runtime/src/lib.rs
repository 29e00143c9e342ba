//! Chunk streaming: prioritized, cancellable mesh and light jobs around a moving observer.
#![forbid(unsafe_code)]

mod column;
mod config;
mod manager;
mod observer;
mod queue;
mod render_pool;
mod stats;
mod workers;

pub use column::ChunkRenderColumn;
pub use config::StreamConfig;
pub use manager::{ChunkStreamManager, chunk_priority};
pub use observer::{Observer, SceneSink};
pub use queue::BuildQueue;
pub use render_pool::{ChunkRender, ChunkRenderState, RenderHandle, RenderPool};
pub use stats::{RollingAverage, StreamStats};
pub use workers::{JobOut, LightJob, MeshJob, Workers, default_worker_count};
