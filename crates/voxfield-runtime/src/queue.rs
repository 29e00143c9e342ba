use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use voxfield_world::ChunkCoord;

/// Min-priority build queue keyed by chunk. Re-queuing a chunk replaces its priority;
/// equal priorities pop in insertion order. Superseded heap entries are skipped lazily.
#[derive(Default)]
pub struct BuildQueue {
    heap: BinaryHeap<Reverse<(i32, u64, ChunkCoord)>>,
    live: HashMap<ChunkCoord, (i32, u64)>,
    seq: u64,
}

impl BuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coord: ChunkCoord, priority: i32) {
        self.seq += 1;
        self.live.insert(coord, (priority, self.seq));
        self.heap.push(Reverse((priority, self.seq, coord)));
    }

    pub fn pop(&mut self) -> Option<(ChunkCoord, i32)> {
        while let Some(Reverse((priority, seq, coord))) = self.heap.pop() {
            if self.live.get(&coord) == Some(&(priority, seq)) {
                self.live.remove(&coord);
                return Some((coord, priority));
            }
        }
        None
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        let removed = self.live.remove(&coord).is_some();
        if self.live.is_empty() {
            self.heap.clear();
        }
        removed
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.live.contains_key(&coord)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}
