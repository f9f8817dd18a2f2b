use proptest::prelude::*;
use swarmfield_lib::pheromone::{
    deposit, diffuse_evaporate, evaporate_only, read_at, world_to_grid,
};
use swarmfield_lib::spatial_hash::{cell_key, SpatialHash};

prop_compose! {
    fn arb_grid()(cols in 1usize..24, rows in 1usize..24)
        (values in prop::collection::vec(0.0f32..255.0, cols * rows), cols in Just(cols), rows in Just(rows))
        -> (usize, usize, Vec<f32>) {
        (cols, rows, values)
    }
}

prop_compose! {
    fn arb_position()(
        x in -1000.0f64..1000.0,
        y in -1000.0f64..1000.0
    ) -> (f64, f64) {
        (x, y)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_world_to_grid_agrees_with_cell_key(
        (x, y) in arb_position(),
        cell_size in 0.5f64..100.0
    ) {
        let (gx, gy) = world_to_grid(x, y, cell_size);
        prop_assert_eq!((i64::from(gx), i64::from(gy)), cell_key(&(x, y), cell_size).coords());
    }

    #[test]
    fn test_step_stays_within_input_range(
        (cols, rows, field) in arb_grid(),
        diffusion in 0.0f32..=1.0,
        evaporation in 0.0f32..=1.0
    ) {
        let peak = field.iter().copied().fold(0.0f32, f32::max);
        let next = diffuse_evaporate(&field, cols, rows, diffusion, evaporation);

        prop_assert_eq!(next.len(), field.len());
        for v in &next {
            prop_assert!(*v >= 0.0, "negative cell {}", v);
            prop_assert!(*v <= peak * 1.0001, "cell {} exceeds input peak {}", v, peak);
        }
    }

    #[test]
    fn test_zero_evaporation_clears_everything(
        (cols, rows, field) in arb_grid(),
        diffusion in 0.0f32..=1.0
    ) {
        let next = diffuse_evaporate(&field, cols, rows, diffusion, 0.0);
        prop_assert!(next.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_boundary_preserved_without_evaporation(
        (cols, rows, field) in arb_grid(),
        diffusion in 0.0f32..=1.0
    ) {
        let next = diffuse_evaporate(&field, cols, rows, diffusion, 1.0);
        for y in 0..rows {
            for x in 0..cols {
                if x == 0 || y == 0 || x == cols - 1 || y == rows - 1 {
                    let i = y * cols + x;
                    prop_assert_eq!(next[i], field[i]);
                }
            }
        }
    }

    #[test]
    fn test_evaporate_only_scales_each_cell(
        (_cols, _rows, field) in arb_grid(),
        evaporation in 0.0f32..=1.0
    ) {
        let next = evaporate_only(&field, evaporation);
        for (a, b) in field.iter().zip(&next) {
            prop_assert_eq!(*b, a * evaporation);
        }
    }

    #[test]
    fn test_deposit_saturates_at_max_level(
        x in 0i32..16,
        y in 0i32..16,
        amounts in prop::collection::vec(0.0f32..200.0, 1..8),
        max_level in 1.0f32..500.0
    ) {
        let (cols, rows) = (16, 16);
        let mut field = vec![0.0; cols * rows];
        let mut expected = 0.0f32;
        for amount in amounts {
            prop_assert!(deposit(&mut field, cols, rows, x, y, amount, max_level));
            expected = (expected + amount).min(max_level);
        }
        prop_assert!((read_at(&field, cols, rows, x, y) - expected).abs() < 1e-3);
        prop_assert!(read_at(&field, cols, rows, x, y) <= max_level);
    }

    #[test]
    fn test_out_of_bounds_access_is_inert(
        x in prop_oneof![i32::MIN..0, 16i32..i32::MAX],
        y in -100i32..100
    ) {
        let (cols, rows) = (16, 16);
        let mut field = vec![1.0; cols * rows];
        prop_assert!(!deposit(&mut field, cols, rows, x, y, 10.0, 255.0));
        prop_assert_eq!(read_at(&field, cols, rows, x, y), 0.0);
        prop_assert!(field.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_nearby_entity_always_a_candidate(
        (x, y) in arb_position(),
        dx in -0.9f64..0.9,
        dy in -0.9f64..0.9,
        cell_size in 1.0f64..100.0
    ) {
        let entities = vec![(x + dx * cell_size, y + dy * cell_size)];
        let index = SpatialHash::build(&entities, cell_size);
        prop_assert_eq!(index.query_point(x, y).len(), 1);
    }

    #[test]
    fn test_distant_entity_never_a_candidate(
        (x, y) in arb_position(),
        offset in 2.1f64..10.0,
        along_x in any::<bool>(),
        cell_size in 1.0f64..100.0
    ) {
        let far = if along_x {
            (x + offset * cell_size, y)
        } else {
            (x, y - offset * cell_size)
        };
        let entities = vec![far];
        let index = SpatialHash::build(&entities, cell_size);
        prop_assert!(index.query_point(x, y).is_empty());
    }

    #[test]
    fn test_distant_entity_missed_far_from_origin(
        x in -1e15f64..1e15,
        offset in 3.0f64..1e6
    ) {
        let entities = vec![(x + offset, 0.5)];
        let index = SpatialHash::build(&entities, 1.0);
        prop_assert!(index.query_point(x, 0.5).is_empty());
    }

    #[test]
    fn test_every_entity_indexed_once(
        positions in prop::collection::vec(arb_position(), 0..64),
        cell_size in 1.0f64..200.0
    ) {
        let index = SpatialHash::build(&positions, cell_size);
        prop_assert_eq!(index.entity_count(), positions.len());
        prop_assert_eq!(index.all_entities().len(), positions.len());
        prop_assert!(index.cell_count() <= positions.len());
        for p in &positions {
            prop_assert!(index.query(p).iter().any(|q| std::ptr::eq(*q, p)));
        }
    }
}
