//! Collision detection and response
//!
//! Everything that can be hit exposes a closed polygon of boundary segments.
//! A moving entity proposes a straight route for the tick; the resolver checks
//! it against the arena edges and every other registered entity, picks the
//! nearest boundary within reach, and reflects the route off it.
//!
//! Reflection is axis-based: vertical boundaries flip x, everything else flips
//! y. Diagonal boundaries therefore bounce like horizontal ones.

use rand_pcg::Pcg32;

use super::geom::{Displacement, Point, Segment, rect_outline};
use super::state::Entity;

/// Where contact happens and how the entity moves afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Approximate contact point (midpoint of the route)
    pub point: Point,
    /// Continuation displacement after the bounce
    pub displacement: Displacement,
}

/// Result of resolving a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Nothing within reach; apply the proposed motion unchanged
    Miss,
    Hit(Contact),
}

impl Collision {
    pub fn contact(self) -> Option<Contact> {
        match self {
            Collision::Miss => None,
            Collision::Hit(contact) => Some(contact),
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Collision::Hit(_))
    }
}

/// Capability shared by everything with a boundary polygon
pub trait Collidable {
    /// Closed polygon, always current for the entity's position
    fn boundaries(&self) -> &[Segment];

    /// Called when a moving entity's route hits one of our boundaries
    fn on_collision(&mut self, _rng: &mut Pcg32) {}

    /// Destroyed entities are removed right after the hit that destroyed them
    fn destroyed(&self) -> bool {
        false
    }
}

/// The playfield rectangle
#[derive(Debug, Clone)]
pub struct Arena {
    pub width: u16,
    pub height: u16,
    edges: Vec<Segment>,
}

impl Arena {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            edges: rect_outline(Point::new(0, 0), (width, height)),
        }
    }

    /// Clamp a rectangle's top-left corner so the whole rectangle stays inside
    pub fn clamp_rect(&self, origin: Point, size: (u16, u16)) -> Point {
        Point::new(
            origin.x.min(self.width.saturating_sub(size.0)),
            origin.y.min(self.height.saturating_sub(size.1)),
        )
    }
}

impl Collidable for Arena {
    fn boundaries(&self) -> &[Segment] {
        &self.edges
    }
}

/// Which boundary set the winning segment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Arena,
    Slot(usize),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    source: Source,
    boundary: Segment,
    point: Point,
    distance: u32,
}

/// Borrowed view of the world handed to a moving entity for one tick.
///
/// The moving entity is taken out of its slot while it ticks, so it never
/// sees its own boundaries.
pub struct Resolver<'a> {
    arena: &'a Arena,
    slots: &'a mut [Option<Entity>],
    rng: &'a mut Pcg32,
}

impl<'a> Resolver<'a> {
    pub fn new(arena: &'a Arena, slots: &'a mut [Option<Entity>], rng: &'a mut Pcg32) -> Self {
        Self { arena, slots, rng }
    }

    pub fn arena(&self) -> &Arena {
        self.arena
    }

    /// Find the nearest boundary within `radius` of `route` and bounce off it.
    ///
    /// Ties go to the first boundary found: arena edges first, then entities
    /// in slot order. A hit entity gets its reaction hook, and is dropped from
    /// its slot if that destroyed it.
    pub fn resolve(&mut self, route: Segment, radius: u32) -> Collision {
        let mut best: Option<Candidate> = None;
        let mut consider = |source: Source, boundary: &Segment| {
            let Some(point) = boundary.close_point(&route, radius) else {
                return;
            };
            let distance = route.a.distance_to(point);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Candidate {
                    source,
                    boundary: *boundary,
                    point,
                    distance,
                });
            }
        };

        for edge in self.arena.boundaries() {
            consider(Source::Arena, edge);
        }
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(entity) = slot {
                for boundary in entity.boundaries() {
                    consider(Source::Slot(index), boundary);
                }
            }
        }

        let Some(hit) = best else {
            return Collision::Miss;
        };

        if let Source::Slot(index) = hit.source {
            self.react(index);
        }

        let motion = route.displacement();
        let displacement = if hit.boundary.is_vertical() {
            motion.flip_x()
        } else {
            motion.flip_y()
        };

        Collision::Hit(Contact {
            point: hit.point,
            displacement,
        })
    }

    fn react(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if let Some(entity) = slot {
            entity.on_collision(self.rng);
            if entity.destroyed() {
                log::debug!("{} in slot {} destroyed", entity.kind_name(), index);
                *slot = None;
            }
        }
    }
}
