//! Shared constants for voxfield-mesh-cpu.

use voxfield_blocks::registry::MAX_LIGHT;

pub(crate) const MAX_LIGHT_F: f32 = MAX_LIGHT as f32;

/// Cells per corner-light sample: 2×2×2 around each cube corner.
pub(crate) const CORNER_SAMPLES: f32 = 8.0;

/// Liquid side faces are pulled inward by this much to avoid z-fighting.
pub(crate) const LIQUID_INSET: f32 = 0.001;
/// Height of a liquid surface open to the sky or air.
pub(crate) const LIQUID_SURFACE: f32 = 15.0 / 16.0;

/// Collision shell around the observer, in blocks.
pub const MOVEMENT_RADIUS: i32 = 3;
/// Cells at squared distance up to this are part of the local collider.
pub const MOVEMENT_RADIUS_SQR_MINI: f32 =
    (MOVEMENT_RADIUS as f32 - 0.5) * (MOVEMENT_RADIUS as f32 - 0.5);
/// Edits at squared distance up to this from the observer invalidate the local collider.
pub const MOVEMENT_RADIUS_SQR_PLUS: f32 =
    (MOVEMENT_RADIUS as f32 + 0.5) * (MOVEMENT_RADIUS as f32 + 0.5);

pub(crate) const FULL_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];
