use proptest::prelude::*;
use voxfield_lighting::{LIGHT_BOX_SIZE, LightBox, affected_chunks};
use voxfield_world::ChunkCoord;

const N: usize = LIGHT_BOX_SIZE;

fn cell() -> impl Strategy<Value = (usize, usize, usize)> {
    (0..N, 0..N, 0..N)
}

fn sparse_box() -> impl Strategy<Value = LightBox> {
    let emitters = prop::collection::vec((cell(), 0u8..=15), 1..6);
    let walls = prop::collection::vec((cell(), 0u8..=15), 0..400);
    (emitters, walls).prop_map(|(emitters, walls)| {
        let mut blockage = vec![0u8; N * N * N];
        let mut emission = vec![0u8; N * N * N];
        for ((x, y, z), b) in walls {
            blockage[LightBox::idx(x, y, z)] = b;
        }
        for ((x, y, z), e) in emitters {
            emission[LightBox::idx(x, y, z)] = e;
        }
        LightBox::from_parts(ChunkCoord::default(), blockage, emission)
    })
}

fn neighbors(x: usize, y: usize, z: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    let d: [(i32, i32, i32); 6] =
        [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)];
    d.into_iter().filter_map(move |(dx, dy, dz)| {
        let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
        let inside = |v: i32| (0..N as i32).contains(&v);
        let ok = inside(nx) && inside(ny) && inside(nz);
        ok.then_some((nx as usize, ny as usize, nz as usize))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // A second flood over converged light changes nothing
    #[test]
    fn recalculation_is_idempotent(mut b in sparse_box()) {
        b.propagate();
        let first = b.light_values().to_vec();
        b.propagate();
        prop_assert_eq!(b.light_values(), &first[..]);
    }

    // Converged light never drops faster than one level plus blockage per step
    #[test]
    fn neighbor_bound_holds(mut b in sparse_box()) {
        b.propagate();
        for y in 0..N { for z in 0..N { for x in 0..N {
            let here = i32::from(b.light(x, y, z));
            for (nx, ny, nz) in neighbors(x, y, z) {
                let there = i32::from(b.light(nx, ny, nz));
                let floor = here - 1 - i32::from(b.blockage(nx, ny, nz));
                prop_assert!(there >= floor, "({x},{y},{z})={here} -> ({nx},{ny},{nz})={there}");
            }
        }}}
    }

    // Every lit cell is either a source or supported by a brighter neighbor
    #[test]
    fn light_is_supported(mut b in sparse_box(), probe in cell()) {
        let seeds = b.light_values().to_vec();
        b.propagate();
        let (x, y, z) = probe;
        let v = b.light(x, y, z);
        if v > 0 && seeds[LightBox::idx(x, y, z)] != v {
            let blk = i32::from(b.blockage(x, y, z));
            let supported = neighbors(x, y, z)
                .any(|(nx, ny, nz)| i32::from(b.light(nx, ny, nz)) - 1 - blk == i32::from(v));
            prop_assert!(supported);
        }
    }

    // The calling chunk is always in its own affected set, and reach is symmetric per axis
    #[test]
    fn affected_set_mirrors(x in 0usize..16, y in 0usize..16, z in 0usize..16) {
        let a = affected_chunks((x, y, z));
        prop_assert!(a.contains(&(0, 0, 0)));
        let m = affected_chunks((15 - x, 15 - y, 15 - z));
        prop_assert_eq!(a.len(), m.len());
        for (dx, dy, dz) in a {
            prop_assert!(m.contains(&(-dx, -dy, -dz)));
        }
    }
}
