//! Axis-aligned collision tests
//!
//! Every body in the runner is a box (coins use the square around their
//! circle), so a single AABB overlap test covers the whole game. Obstacle
//! tests shrink both boxes first so grazing contact is forgiven.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box, `pos` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Bounding square of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            pos: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Shrink by `inset.x` on the left and right, `inset.y` top and bottom
    pub fn inset(&self, inset: Vec2) -> Self {
        Self {
            pos: self.pos + inset,
            size: (self.size - inset * 2.0).max(Vec2::ZERO),
        }
    }

    /// Strict overlap; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        aabb_intersects(
            self.pos.x,
            self.pos.y,
            self.size.x,
            self.size.y,
            other.pos.x,
            other.pos.y,
            other.size.x,
            other.size.y,
        )
    }
}

/// `ax < bx+bw && ax+aw > bx && ay < by+bh && ay+ah > by`
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn aabb_intersects(
    ax: f32,
    ay: f32,
    aw: f32,
    ah: f32,
    bx: f32,
    by: f32,
    bw: f32,
    bh: f32,
) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

/// Forgiving obstacle test: both boxes are shrunk by their insets first
pub fn hitboxes_overlap(
    player: &Rect,
    player_inset: Vec2,
    obstacle: &Rect,
    obstacle_inset: Vec2,
) -> bool {
    player.inset(player_inset).intersects(&obstacle.inset(obstacle_inset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{OBSTACLE_HITBOX_INSET, PLAYER_HITBOX_INSET};

    fn insets() -> (Vec2, Vec2) {
        (
            Vec2::new(PLAYER_HITBOX_INSET.0, PLAYER_HITBOX_INSET.1),
            Vec2::new(OBSTACLE_HITBOX_INSET.0, OBSTACLE_HITBOX_INSET.1),
        )
    }

    #[test]
    fn test_aabb_overlap_and_miss() {
        assert!(aabb_intersects(0.0, 0.0, 10.0, 10.0, 5.0, 5.0, 10.0, 10.0));
        assert!(!aabb_intersects(0.0, 0.0, 10.0, 10.0, 20.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_shared_edge_is_not_a_hit() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_standing_player_clears_short_cactus() {
        let (pi, oi) = insets();
        let player = Rect::new(10.0, 214.0, 44.0, 46.0);
        let cactus = Rect::new(10.0, 180.0, 20.0, 32.0);
        assert!(!player.intersects(&cactus));
        assert!(!hitboxes_overlap(&player, pi, &cactus, oi));
    }

    #[test]
    fn test_one_pixel_graze_is_forgiven() {
        let (pi, oi) = insets();
        // Cactus bottom at 212, player top at 211: the raw boxes overlap by 1px
        let player = Rect::new(10.0, 211.0, 44.0, 46.0);
        let cactus = Rect::new(10.0, 180.0, 20.0, 32.0);
        assert!(player.intersects(&cactus));
        assert!(!hitboxes_overlap(&player, pi, &cactus, oi));

        // Touching side-on by 1px
        let player = Rect::new(100.0, 214.0, 44.0, 46.0);
        let cactus = Rect::new(143.0, 228.0, 20.0, 32.0);
        assert!(player.intersects(&cactus));
        assert!(!hitboxes_overlap(&player, pi, &cactus, oi));
    }

    #[test]
    fn test_deep_overlap_still_hits() {
        let (pi, oi) = insets();
        let player = Rect::new(60.0, 214.0, 44.0, 46.0);
        let cactus = Rect::new(80.0, 228.0, 20.0, 32.0);
        assert!(hitboxes_overlap(&player, pi, &cactus, oi));
    }

    #[test]
    fn test_circle_bounding_square() {
        let r = Rect::around_circle(Vec2::new(100.0, 50.0), 6.0);
        assert_eq!(r, Rect::new(94.0, 44.0, 12.0, 12.0));
    }

    #[test]
    fn test_inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inset(Vec2::new(6.0, 6.0));
        assert_eq!(r.size, Vec2::ZERO);
    }
}
