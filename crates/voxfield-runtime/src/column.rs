use voxfield_world::ChunkCoord;

use crate::queue::BuildQueue;
use crate::render_pool::{ChunkRender, RenderHandle, RenderPool};

/// Render objects for the vertical chunk slots of one `(x, z)` column.
pub struct ChunkRenderColumn {
    cx: i32,
    cz: i32,
    slots: Vec<Option<RenderHandle>>,
}

impl ChunkRenderColumn {
    pub fn new(cx: i32, cz: i32, height_chunks: usize) -> Self {
        Self {
            cx,
            cz,
            slots: vec![None; height_chunks],
        }
    }

    #[inline]
    pub fn coord(&self, cy: i32) -> ChunkCoord {
        ChunkCoord::new(self.cx, cy, self.cz)
    }

    pub fn get(&self, cy: i32) -> Option<RenderHandle> {
        let i = usize::try_from(cy).ok()?;
        self.slots.get(i).copied().flatten()
    }

    /// Existing render object for `cy`, or a fresh one from the pool. `None` when `cy` is
    /// outside the column or the pool is exhausted.
    pub fn get_or_create(&mut self, cy: i32, pool: &mut RenderPool) -> Option<RenderHandle> {
        let i = usize::try_from(cy).ok()?;
        let coord = self.coord(cy);
        let slot = self.slots.get_mut(i)?;
        if let Some(h) = *slot {
            if pool.get(h).is_some() {
                return Some(h);
            }
        }
        let h = pool.acquire(coord)?;
        *slot = Some(h);
        Some(h)
    }

    /// Returns one slot's render object to the pool.
    pub fn release(&mut self, cy: i32, pool: &mut RenderPool) -> Option<ChunkRender> {
        let i = usize::try_from(cy).ok()?;
        let h = self.slots.get_mut(i)?.take()?;
        pool.release(h)
    }

    /// Cancels every build, drops queued entries and returns all objects to the pool.
    /// The released objects are handed back so the caller can clear their geometry.
    pub fn unload(&mut self, pool: &mut RenderPool, queue: &mut BuildQueue) -> Vec<ChunkRender> {
        let mut released = Vec::new();
        for (cy, slot) in self.slots.iter_mut().enumerate() {
            let Some(h) = slot.take() else {
                continue;
            };
            queue.remove(ChunkCoord::new(self.cx, cy as i32, self.cz));
            if let Some(r) = pool.release(h) {
                released.push(r);
            }
        }
        released
    }

    pub fn handles(&self) -> impl Iterator<Item = (i32, RenderHandle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(cy, h)| h.map(|h| (cy as i32, h)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
