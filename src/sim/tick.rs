//! Fixed timestep simulation tick
//!
//! Entities tick in slot order. Each one is lifted out of its slot for the
//! duration of its own tick, which is what keeps it out of its own collision
//! candidates and lets the resolver mutate every other entity.

use super::collision::Resolver;
use super::state::World;

/// Advance the world by one step
pub fn tick(world: &mut World) {
    world.time_ticks += 1;

    let World {
        arena, slots, rng, ..
    } = world;

    for index in 0..slots.len() {
        let Some(mut entity) = slots[index].take() else {
            continue;
        };
        entity.tick(&mut Resolver::new(arena, slots, rng));
        slots[index] = Some(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::geom::{Displacement, Point};
    use crate::sim::state::{Ball, Block, Entity};

    fn ball(world: &World, index: usize) -> &Ball {
        world
            .entities()
            .filter_map(Entity::as_ball)
            .nth(index)
            .expect("ball present")
    }

    #[test]
    fn test_ball_bounces_off_left_edge() {
        let mut world = World::new(800, 600, 1);
        world.spawn(Entity::Ball(Ball::new(
            Point::new(15, 300),
            Displacement::new(-5, 0),
            10,
            BALL_COLOR,
        )));

        tick(&mut world);
        let b = ball(&world, 0);
        assert_eq!(b.velocity(), Displacement::new(5, 0));
        // Contact at (12, 300), then one continuation step
        assert_eq!(b.position(), Point::new(17, 300));

        tick(&mut world);
        assert_eq!(ball(&world, 0).position(), Point::new(22, 300));
        assert_eq!(world.time_ticks, 2);
    }

    #[test]
    fn test_free_flight_applies_full_displacement() {
        let mut world = World::new(800, 600, 1);
        world.spawn(Entity::Ball(Ball::new(
            Point::new(400, 300),
            Displacement::new(4, -3),
            10,
            BALL_COLOR,
        )));
        tick(&mut world);
        assert_eq!(ball(&world, 0).position(), Point::new(404, 297));
    }

    #[test]
    fn test_block_survives_one_hit_then_breaks() {
        let mut world = World::new(800, 600, 1);
        let block = world.spawn(Entity::Block(Block::new(
            Point::new(370, 100),
            (60, 20),
            BLOCK_COLOR,
        )));
        world.spawn(Entity::Ball(Ball::new(
            Point::new(400, 200),
            Displacement::new(0, -5),
            10,
            BALL_COLOR,
        )));

        for _ in 0..20 {
            tick(&mut world);
        }
        match world.entity(block) {
            Some(Entity::Block(b)) => assert_eq!(b.hit_count(), 1),
            other => panic!("block should survive the first hit, got {other:?}"),
        }
        assert_eq!(ball(&world, 0).velocity(), Displacement::new(0, 5));

        // Down to the bottom edge and back up
        for _ in 0..400 {
            tick(&mut world);
        }
        assert!(world.entity(block).is_none());
        assert_eq!(world.blocks_remaining(), 0);
    }

    #[test]
    fn test_ball_stays_inside_arena() {
        let (mut world, _) = World::standard(&Settings::default());
        for _ in 0..5000 {
            tick(&mut world);
            let p = ball(&world, 0).position();
            assert!(p.x <= ARENA_WIDTH && p.y <= ARENA_HEIGHT, "escaped to {p:?}");
        }
    }

    #[test]
    fn test_extreme_velocity_does_not_panic() {
        let mut world = World::new(800, 600, 1);
        world.spawn(Entity::Ball(Ball::new(
            Point::new(400, 300),
            Displacement::new(i32::MAX, 0),
            10,
            BALL_COLOR,
        )));
        for _ in 0..3 {
            tick(&mut world);
        }
        assert_eq!(world.time_ticks, 3);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let (mut world1, _) = World::standard(&settings);
        let (mut world2, _) = World::standard(&settings);

        for step in 0..600 {
            if step == 100 {
                world1.key_down(settings.paddle.bindings.left);
                world2.key_down(settings.paddle.bindings.left);
            }
            tick(&mut world1);
            tick(&mut world2);
        }

        assert_eq!(world1.time_ticks, world2.time_ticks);
        assert_eq!(world1.drawable_shapes(), world2.drawable_shapes());
    }
}
