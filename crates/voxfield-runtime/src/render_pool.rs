//! Fixed-capacity pool of chunk render objects.
//!
//! Slots are reused across unrelated chunks. A slot is reset when acquired and its
//! build token is cancelled when released; handles carry a generation so a result
//! that arrives for a released slot is recognized as stale.

use voxfield_mesh_cpu::CancelToken;
use voxfield_world::ChunkCoord;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ChunkRenderState {
    #[default]
    Pending,
    Building,
    Ready,
    Delayed,
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle {
    index: u32,
    generation: u32,
}

/// Per-chunk render bookkeeping. Geometry itself lives in the scene.
#[derive(Debug)]
pub struct ChunkRender {
    coord: ChunkCoord,
    pub(crate) state: ChunkRenderState,
    pub(crate) priority: i32,
    pub(crate) token: CancelToken,
    /// A build was dispatched and its result has not been drained yet.
    pub(crate) in_flight: bool,
    /// The scene holds geometry for this chunk.
    pub(crate) has_geometry: bool,
}

impl ChunkRender {
    fn fresh(coord: ChunkCoord) -> Self {
        Self {
            coord,
            state: ChunkRenderState::Pending,
            priority: 0,
            token: CancelToken::new(),
            in_flight: false,
            has_geometry: false,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn state(&self) -> ChunkRenderState {
        self.state
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn has_geometry(&self) -> bool {
        self.has_geometry
    }
}

struct Slot {
    generation: u32,
    render: Option<ChunkRender>,
}

pub struct RenderPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    capacity: usize,
}

impl RenderPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Hands out a reset render object for `coord`, or `None` when the pool is exhausted.
    pub fn acquire(&mut self, coord: ChunkCoord) -> Option<RenderHandle> {
        let index = match self.free.pop() {
            Some(i) => i,
            None if self.slots.len() < self.capacity => {
                self.slots.push(Slot {
                    generation: 0,
                    render: None,
                });
                (self.slots.len() - 1) as u32
            }
            None => return None,
        };
        let slot = &mut self.slots[index as usize];
        slot.render = Some(ChunkRender::fresh(coord));
        Some(RenderHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Cancels any outstanding build and returns the slot to the free list.
    /// Returns the released object so callers can clear its scene geometry.
    pub fn release(&mut self, handle: RenderHandle) -> Option<ChunkRender> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let render = slot.render.take()?;
        render.token.cancel();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(render)
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&ChunkRender> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.render.as_ref()
    }

    pub fn get_mut(&mut self, handle: RenderHandle) -> Option<&mut ChunkRender> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.render.as_mut()
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty() && self.slots.len() >= self.capacity
    }
}
