//! Game state and core simulation types
//!
//! Entities are a closed set (ball, block, paddle) stored in a slot arena.
//! An `EntityId` is a slot index; destroying an entity empties its slot, so
//! stale ids resolve to `None` instead of dangling.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Arena, Collidable, Collision, Resolver};
use super::geom::{Displacement, Point, Segment, rect_outline};
use crate::consts::*;
use crate::settings::{GameMode, Settings};
use crate::shapes::{Color, Shape};

/// Key identifier as reported by the input collaborator
pub type KeyId = u32;

/// A ball in flight
#[derive(Debug, Clone)]
pub struct Ball {
    position: Point,
    velocity: Displacement,
    radius: u16,
    pub color: Color,
    boundaries: Vec<Segment>,
}

impl Ball {
    pub fn new(position: Point, velocity: Displacement, radius: u16, color: Color) -> Self {
        let mut ball = Self {
            position,
            velocity,
            radius,
            color,
            boundaries: Vec::new(),
        };
        ball.rebuild_boundaries();
        ball
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> Displacement {
        self.velocity
    }

    pub fn radius(&self) -> u16 {
        self.radius
    }

    /// Axis-aligned square around the circle
    fn rebuild_boundaries(&mut self) {
        let r = self.radius;
        let corner = Point::new(
            self.position.x.saturating_sub(r),
            self.position.y.saturating_sub(r),
        );
        let side = r.saturating_mul(2);
        self.boundaries = rect_outline(corner, (side, side));
    }

    /// Advance one tick, bouncing off whatever the resolver reports
    pub fn tick(&mut self, resolver: &mut Resolver<'_>) {
        let destination = self.velocity.apply(self.position);
        let route = Segment::new(self.position, destination);

        match resolver.resolve(route, self.radius as u32) {
            Collision::Miss => self.position = destination,
            Collision::Hit(contact) => {
                // Step away from the contact point right away so the next
                // route does not start inside the same boundary
                self.position = contact.displacement.apply(contact.point);
                self.velocity = contact.displacement;
            }
        }
        self.rebuild_boundaries();
    }

    pub fn shape(&self) -> Shape {
        Shape::Circle {
            center: self.position,
            radius: self.radius,
            color: self.color,
        }
    }
}

impl Collidable for Ball {
    fn boundaries(&self) -> &[Segment] {
        &self.boundaries
    }
}

/// A destructible brick
#[derive(Debug, Clone)]
pub struct Block {
    position: Point,
    size: (u16, u16),
    pub color: Color,
    hit_count: u32,
    boundaries: Vec<Segment>,
}

impl Block {
    pub fn new(position: Point, size: (u16, u16), color: Color) -> Self {
        Self {
            position,
            size,
            color,
            hit_count: 0,
            boundaries: rect_outline(position, size),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn shape(&self) -> Shape {
        Shape::Rect {
            origin: self.position,
            width: self.size.0,
            height: self.size.1,
            color: self.color,
        }
    }
}

impl Collidable for Block {
    fn boundaries(&self) -> &[Segment] {
        &self.boundaries
    }

    fn on_collision(&mut self, rng: &mut Pcg32) {
        self.hit_count += 1;
        self.color = Color::random(rng);
    }

    fn destroyed(&self) -> bool {
        self.hit_count >= BLOCK_DESTROY_THRESHOLD
    }
}

/// Something a held key does every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
}

impl Action {
    pub fn delta(self, step: i32) -> Displacement {
        match self {
            Action::MoveLeft => Displacement::new(step.saturating_neg(), 0),
            Action::MoveRight => Displacement::new(step, 0),
        }
    }
}

/// Which keys drive a paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: KeyId,
    pub right: KeyId,
}

impl KeyBindings {
    pub fn action_for(&self, key: KeyId) -> Option<Action> {
        if key == self.left {
            Some(Action::MoveLeft)
        } else if key == self.right {
            Some(Action::MoveRight)
        } else {
            None
        }
    }
}

/// A key-driven (or remotely mirrored) paddle
#[derive(Debug, Clone)]
pub struct Paddle {
    position: Point,
    size: (u16, u16),
    pub color: Color,
    step: i32,
    bindings: Option<KeyBindings>,
    held: Vec<Action>,
    boundaries: Vec<Segment>,
}

impl Paddle {
    /// Paddle moved by the local keyboard
    pub fn local(position: Point, size: (u16, u16), color: Color, step: i32, bindings: KeyBindings) -> Self {
        Self {
            position,
            size,
            color,
            step,
            bindings: Some(bindings),
            held: Vec::new(),
            boundaries: rect_outline(position, size),
        }
    }

    /// Paddle positioned only through `place`
    pub fn remote(position: Point, size: (u16, u16), color: Color) -> Self {
        Self {
            position,
            size,
            color,
            step: 0,
            bindings: None,
            held: Vec::new(),
            boundaries: rect_outline(position, size),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Actions currently firing every tick
    pub fn held(&self) -> &[Action] {
        &self.held
    }

    /// Returns true if the key is bound to this paddle
    pub fn key_down(&mut self, key: KeyId) -> bool {
        let Some(action) = self.bindings.and_then(|b| b.action_for(key)) else {
            return false;
        };
        if !self.held.contains(&action) {
            self.held.push(action);
        }
        true
    }

    /// Returns true if the key is bound to this paddle
    pub fn key_up(&mut self, key: KeyId) -> bool {
        let Some(action) = self.bindings.and_then(|b| b.action_for(key)) else {
            return false;
        };
        self.held.retain(|a| *a != action);
        true
    }

    /// Move to `position` and rebuild the boundary polygon
    pub fn place(&mut self, position: Point) {
        self.position = position;
        self.boundaries = rect_outline(position, self.size);
    }

    /// Fire every held action once, staying inside the arena
    pub fn tick(&mut self, arena: &Arena) {
        if self.held.is_empty() {
            return;
        }
        let mut position = self.position;
        for action in &self.held {
            position = arena.clamp_rect(action.delta(self.step).apply(position), self.size);
        }
        if position != self.position {
            self.place(position);
        }
    }

    pub fn shape(&self) -> Shape {
        Shape::Rect {
            origin: self.position,
            width: self.size.0,
            height: self.size.1,
            color: self.color,
        }
    }
}

impl Collidable for Paddle {
    fn boundaries(&self) -> &[Segment] {
        &self.boundaries
    }
}

/// Every kind of thing that lives in the world
#[derive(Debug, Clone)]
pub enum Entity {
    Ball(Ball),
    Block(Block),
    Paddle(Paddle),
}

impl Entity {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Ball(_) => "ball",
            Entity::Block(_) => "block",
            Entity::Paddle(_) => "paddle",
        }
    }

    pub fn tick(&mut self, resolver: &mut Resolver<'_>) {
        match self {
            Entity::Ball(ball) => ball.tick(resolver),
            Entity::Block(_) => {}
            Entity::Paddle(paddle) => paddle.tick(resolver.arena()),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Entity::Ball(ball) => ball.shape(),
            Entity::Block(block) => block.shape(),
            Entity::Paddle(paddle) => paddle.shape(),
        }
    }

    pub fn as_paddle_mut(&mut self) -> Option<&mut Paddle> {
        match self {
            Entity::Paddle(paddle) => Some(paddle),
            _ => None,
        }
    }

    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            Entity::Ball(ball) => Some(ball),
            _ => None,
        }
    }
}

impl Collidable for Entity {
    fn boundaries(&self) -> &[Segment] {
        match self {
            Entity::Ball(ball) => ball.boundaries(),
            Entity::Block(block) => block.boundaries(),
            Entity::Paddle(paddle) => paddle.boundaries(),
        }
    }

    fn on_collision(&mut self, rng: &mut Pcg32) {
        match self {
            Entity::Ball(ball) => ball.on_collision(rng),
            Entity::Block(block) => block.on_collision(rng),
            Entity::Paddle(paddle) => paddle.on_collision(rng),
        }
    }

    fn destroyed(&self) -> bool {
        match self {
            Entity::Ball(ball) => ball.destroyed(),
            Entity::Block(block) => block.destroyed(),
            Entity::Paddle(paddle) => paddle.destroyed(),
        }
    }
}

/// Stable handle into the world's slot arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handles to what a standard layout creates
#[derive(Debug, Clone)]
pub struct Roster {
    /// Brick wall, row by row
    pub blocks: Vec<EntityId>,
    pub local_paddle: EntityId,
    pub remote_paddle: Option<EntityId>,
    pub ball: EntityId,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) arena: Arena,
    pub(crate) slots: Vec<Option<Entity>>,
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl World {
    /// Empty arena
    pub fn new(width: u16, height: u16, seed: u64) -> Self {
        Self {
            arena: Arena::new(width, height),
            slots: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
        }
    }

    /// Brick wall, ball in flight, local paddle, and a mirrored paddle when
    /// playing over the network.
    ///
    /// In a two-player game the host defends the bottom edge and the guest the
    /// top, so both sides share one coordinate space.
    pub fn standard(settings: &Settings) -> (Self, Roster) {
        let mut world = Self::new(settings.arena_width, settings.arena_height, settings.seed);
        let layout = &settings.blocks;

        let row_width = layout
            .columns
            .saturating_mul(layout.width)
            .saturating_add(layout.columns.saturating_sub(1).saturating_mul(layout.gap));
        let left = settings.arena_width.saturating_sub(row_width) / 2;
        let mut blocks = Vec::with_capacity(usize::from(layout.rows) * usize::from(layout.columns));
        for row in 0..layout.rows {
            for column in 0..layout.columns {
                let origin = Point::new(
                    left.saturating_add(column.saturating_mul(layout.width.saturating_add(layout.gap))),
                    layout
                        .top
                        .saturating_add(row.saturating_mul(layout.height.saturating_add(layout.gap))),
                );
                blocks.push(world.spawn(Entity::Block(Block::new(
                    origin,
                    (layout.width, layout.height),
                    BLOCK_COLOR,
                ))));
            }
        }

        let paddle = &settings.paddle;
        let size = (paddle.width, paddle.height);
        let centered_x = (settings.arena_width.saturating_sub(paddle.width)) / 2;
        let bottom = Point::new(
            centered_x,
            settings
                .arena_height
                .saturating_sub(paddle.margin.saturating_add(paddle.height)),
        );
        let top = Point::new(centered_x, paddle.margin);

        let (local_at, remote_at) = match settings.mode {
            GameMode::Guest { .. } => (top, Some(bottom)),
            GameMode::Host => (bottom, Some(top)),
            GameMode::Local => (bottom, None),
        };

        let local_paddle = world.spawn(Entity::Paddle(Paddle::local(
            local_at,
            size,
            PADDLE_COLOR,
            paddle.step,
            paddle.bindings,
        )));
        let remote_paddle = remote_at
            .map(|at| world.spawn(Entity::Paddle(Paddle::remote(at, size, REMOTE_PADDLE_COLOR))));

        let ball = &settings.ball;
        let ball = world.spawn(Entity::Ball(Ball::new(
            ball.start,
            ball.velocity,
            ball.radius,
            BALL_COLOR,
        )));

        (
            world,
            Roster {
                blocks,
                local_paddle,
                remote_paddle,
                ball,
            },
        )
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Register an entity and return its handle
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        self.slots.push(Some(entity));
        EntityId(self.slots.len() - 1)
    }

    /// `None` once the entity has been destroyed
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn paddle_mut(&mut self, id: EntityId) -> Option<&mut Paddle> {
        self.entity_mut(id).and_then(Entity::as_paddle_mut)
    }

    /// Live entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn blocks_remaining(&self) -> usize {
        self.entities()
            .filter(|e| matches!(e, Entity::Block(_)))
            .count()
    }

    /// Forward a key press to every paddle; true if any paddle is bound to it
    pub fn key_down(&mut self, key: KeyId) -> bool {
        self.slots
            .iter_mut()
            .flatten()
            .filter_map(Entity::as_paddle_mut)
            .fold(false, |handled, paddle| paddle.key_down(key) || handled)
    }

    /// Forward a key release to every paddle; true if any paddle is bound to it
    pub fn key_up(&mut self, key: KeyId) -> bool {
        self.slots
            .iter_mut()
            .flatten()
            .filter_map(Entity::as_paddle_mut)
            .fold(false, |handled, paddle| paddle.key_up(key) || handled)
    }

    /// Shapes for the rendering collaborator, in slot order
    pub fn drawable_shapes(&self) -> Vec<Shape> {
        self.entities().map(Entity::shape).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BlockLayout, PaddleSettings};

    const LEFT: KeyId = 1;
    const RIGHT: KeyId = 2;

    fn paddle_at(x: u16) -> Paddle {
        Paddle::local(
            Point::new(x, 500),
            (100, 15),
            PADDLE_COLOR,
            6,
            KeyBindings {
                left: LEFT,
                right: RIGHT,
            },
        )
    }

    #[test]
    fn test_block_destroyed_on_second_hit() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut block = Block::new(Point::new(10, 10), (60, 20), BLOCK_COLOR);
        assert!(!block.destroyed());
        block.on_collision(&mut rng);
        assert!(!block.destroyed());
        block.on_collision(&mut rng);
        assert!(block.destroyed());
    }

    #[test]
    fn test_block_hit_recolors_only() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut block = Block::new(Point::new(10, 10), (60, 20), BLOCK_COLOR);
        let outline = block.boundaries().to_vec();
        block.on_collision(&mut rng);
        assert_eq!(block.boundaries(), outline.as_slice());
        assert_eq!(block.position(), Point::new(10, 10));
    }

    #[test]
    fn test_paddle_moves_while_key_held() {
        let arena = Arena::new(800, 600);
        let mut paddle = paddle_at(300);

        assert!(paddle.key_down(RIGHT));
        paddle.tick(&arena);
        paddle.tick(&arena);
        assert_eq!(paddle.position(), Point::new(312, 500));
        assert_eq!(paddle.boundaries()[0].a, Point::new(312, 500));

        assert!(paddle.key_up(RIGHT));
        paddle.tick(&arena);
        assert_eq!(paddle.position(), Point::new(312, 500));
    }

    #[test]
    fn test_paddle_ignores_unbound_keys() {
        let mut paddle = paddle_at(300);
        assert!(!paddle.key_down(99));
        assert!(paddle.held().is_empty());

        let mut remote = Paddle::remote(Point::new(0, 0), (100, 15), REMOTE_PADDLE_COLOR);
        assert!(!remote.key_down(LEFT));
    }

    #[test]
    fn test_paddle_repeat_key_down_is_idempotent() {
        let arena = Arena::new(800, 600);
        let mut paddle = paddle_at(300);
        paddle.key_down(LEFT);
        paddle.key_down(LEFT);
        assert_eq!(paddle.held(), &[Action::MoveLeft]);
        paddle.tick(&arena);
        assert_eq!(paddle.position(), Point::new(294, 500));
    }

    #[test]
    fn test_paddle_opposing_keys_cancel() {
        let arena = Arena::new(800, 600);
        let mut paddle = paddle_at(300);
        paddle.key_down(LEFT);
        paddle.key_down(RIGHT);
        paddle.tick(&arena);
        assert_eq!(paddle.position(), Point::new(300, 500));
    }

    #[test]
    fn test_paddle_clamped_to_arena() {
        let arena = Arena::new(800, 600);
        let mut paddle = paddle_at(697);
        paddle.key_down(RIGHT);
        paddle.tick(&arena);
        assert_eq!(paddle.position().x, 700);

        let mut paddle = paddle_at(3);
        paddle.key_down(LEFT);
        paddle.tick(&arena);
        assert_eq!(paddle.position().x, 0);
    }

    #[test]
    fn test_place_rebuilds_boundaries() {
        let mut paddle = Paddle::remote(Point::new(0, 0), (100, 15), REMOTE_PADDLE_COLOR);
        paddle.place(Point::new(50, 40));
        assert_eq!(paddle.boundaries(), rect_outline(Point::new(50, 40), (100, 15)).as_slice());
    }

    #[test]
    fn test_standard_layout() {
        let settings = Settings::default();
        let (world, roster) = World::standard(&settings);
        assert_eq!(
            world.blocks_remaining(),
            (settings.blocks.rows * settings.blocks.columns) as usize
        );
        assert!(roster.remote_paddle.is_none());
        let ball = world.entity(roster.ball).and_then(Entity::as_ball).unwrap();
        assert_eq!(ball.position(), Point::new(400, 300));
        assert_eq!(ball.radius(), 10);
        assert_eq!(ball.color, Color::rgb(0xff, 0xff, 0));
    }

    #[test]
    fn test_standard_layout_two_players() {
        let settings = Settings {
            mode: GameMode::Host,
            ..Settings::default()
        };
        let (mut world, roster) = World::standard(&settings);
        let remote = roster.remote_paddle.expect("host has a remote paddle");
        let remote_y = world.paddle_mut(remote).unwrap().position().y;
        let local_y = world.paddle_mut(roster.local_paddle).unwrap().position().y;
        assert!(remote_y < local_y, "host defends the bottom edge");
    }

    #[test]
    fn test_stale_handle_after_removal() {
        let mut world = World::new(800, 600, 1);
        let id = world.spawn(Entity::Block(Block::new(Point::new(0, 0), (1, 1), BLOCK_COLOR)));
        world.slots[id.index()] = None;
        assert!(world.entity(id).is_none());
        assert_eq!(world.blocks_remaining(), 0);
    }

    #[test]
    fn test_oversized_layout_saturates() {
        let settings = Settings {
            blocks: BlockLayout {
                rows: 2,
                columns: 2,
                width: 40_000,
                height: 40_000,
                gap: 40_000,
                top: 60_000,
            },
            paddle: PaddleSettings {
                margin: 50_000,
                height: 50_000,
                ..PaddleSettings::default()
            },
            ..Settings::default()
        };
        let (world, roster) = World::standard(&settings);
        assert_eq!(roster.blocks.len(), 4);
        assert_eq!(world.blocks_remaining(), 4);
    }

    #[test]
    fn test_huge_ball_radius() {
        let ball = Ball::new(Point::new(400, 300), Displacement::ZERO, 40_000, BALL_COLOR);
        let outline = ball.boundaries();
        assert_eq!(outline[0].a, Point::new(0, 0));
        assert_eq!(outline[1].a, Point::new(u16::MAX, 0));
    }

    #[test]
    fn test_extreme_paddle_step() {
        let arena = Arena::new(800, 600);
        let mut paddle = Paddle::local(
            Point::new(300, 500),
            (100, 15),
            PADDLE_COLOR,
            i32::MIN,
            KeyBindings {
                left: LEFT,
                right: RIGHT,
            },
        );
        paddle.key_down(LEFT);
        paddle.tick(&arena);
        assert!(paddle.position().x <= 700);
        assert_eq!(paddle.position().y, 500);
    }
}
