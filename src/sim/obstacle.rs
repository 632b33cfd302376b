//! Static blocks that stop movement and bullets

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projectile::Projectile;
use crate::tuning::ObstacleTuning;

/// Axis-aligned block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub min: Vec2,
    pub max: Vec2,
}

impl Obstacle {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Whether a circle overlaps the block (strict)
    pub fn collides_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }

    /// Smallest move that takes a circle out of the block
    pub fn push_circle_out(&self, center: Vec2, radius: f32) -> Vec2 {
        if !self.collides_circle(center, radius) {
            return center;
        }
        let offset = center - self.closest_point(center);
        let dist = offset.length();
        if dist > 0.0 {
            return center + offset / dist * (radius - dist);
        }

        // Centre is inside: leave through the nearest face
        let to_left = center.x - self.min.x;
        let to_right = self.max.x - center.x;
        let to_top = center.y - self.min.y;
        let to_bottom = self.max.y - center.y;
        let nearest = to_left.min(to_right).min(to_top).min(to_bottom);
        if nearest == to_left {
            Vec2::new(self.min.x - radius, center.y)
        } else if nearest == to_right {
            Vec2::new(self.max.x + radius, center.y)
        } else if nearest == to_top {
            Vec2::new(center.x, self.min.y - radius)
        } else {
            Vec2::new(center.x, self.max.y + radius)
        }
    }

    /// Whether two blocks overlap once this one is grown by `gap`
    fn overlaps(&self, other: &Obstacle, gap: f32) -> bool {
        self.min.x - gap < other.max.x
            && self.max.x + gap > other.min.x
            && self.min.y - gap < other.max.y
            && self.max.y + gap > other.min.y
    }
}

/// Scatter blocks over the arena, keeping the centre clear for the player
pub fn generate(t: &ObstacleTuning, arena: Vec2, rng: &mut Pcg32) -> Vec<Obstacle> {
    let mut obstacles: Vec<Obstacle> = Vec::with_capacity(t.count);
    let center = arena * 0.5;
    let max_size = t.max_size.max(t.min_size);

    for _ in 0..t.count * 3 {
        if obstacles.len() >= t.count {
            break;
        }
        let size = Vec2::new(
            rng.random_range(t.min_size..=max_size),
            rng.random_range(t.min_size..=max_size),
        );
        let hi = arena - size - Vec2::splat(t.wall_margin);
        if hi.x <= t.wall_margin || hi.y <= t.wall_margin {
            continue;
        }
        let min = Vec2::new(
            rng.random_range(t.wall_margin..hi.x),
            rng.random_range(t.wall_margin..hi.y),
        );
        let candidate = Obstacle::new(min, size);
        if candidate.center().distance(center) < t.safe_radius {
            continue;
        }
        if obstacles.iter().any(|o| candidate.overlaps(o, t.gap)) {
            continue;
        }
        obstacles.push(candidate);
    }
    log::debug!("Placed {} obstacles", obstacles.len());
    obstacles
}

/// Push a circle out of every block
pub fn resolve_circle(obstacles: &[Obstacle], mut center: Vec2, radius: f32) -> Vec2 {
    for obstacle in obstacles {
        center = obstacle.push_circle_out(center, radius);
    }
    center
}

/// Stop bullets that hit a block. Piercing rounds punch through.
pub fn block_projectiles(obstacles: &[Obstacle], shots: &mut [Projectile]) {
    for shot in shots.iter_mut().filter(|s| s.alive && !s.is_piercing()) {
        if obstacles.iter().any(|o| o.collides_circle(shot.pos, shot.radius)) {
            shot.alive = false;
        }
    }
}
