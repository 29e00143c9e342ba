use voxfield_geom::Vec3;
use voxfield_mesh_cpu::{ChunkMesh, CollisionMesh, LocalCollider};
use voxfield_world::ChunkCoord;

/// Where the world is viewed from.
pub trait Observer {
    fn position(&self) -> Vec3;

    /// Frustum test used to resurrect delayed chunks. Defaults to everything visible.
    fn chunk_in_viewport(&self, _coord: ChunkCoord) -> bool {
        true
    }
}

/// Receives finished geometry on the owner thread.
pub trait SceneSink {
    /// Replaces the chunk's visual mesh and its collision body. `collider` is `None`
    /// when nothing in the chunk collides.
    fn apply_chunk(&mut self, coord: ChunkCoord, mesh: ChunkMesh, collider: Option<CollisionMesh>);

    /// Drops the chunk's mesh and collision body.
    fn clear_chunk(&mut self, coord: ChunkCoord);

    fn set_local_collider(&mut self, collider: LocalCollider);

    fn liquid_state_changed(&mut self, _in_liquid: bool) {}

    fn remove_block_entities_in_column(&mut self, _cx: i32, _cz: i32) {}
}
