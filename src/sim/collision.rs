//! Axis-aligned rectangle overlap
//!
//! Every gameplay collision (player vs platform, player vs coin, coin
//! candidate vs terrain) goes through [`Rect::intersects`].

use glam::Vec2;

/// Axis-aligned rectangle in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let player = Rect::from_xywh(400.0, 530.0, 50.0, 50.0);
        let ground = Rect::from_xywh(0.0, 580.0, 800.0, 20.0);
        assert!(player.intersects(&ground));

        let right = Rect::from_xywh(450.0, 530.0, 10.0, 10.0);
        assert!(player.intersects(&right));
    }

    #[test]
    fn test_separated() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::from_xywh(10.5, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::from_xywh(0.0, -10.5, 10.0, 10.0)));
    }

    #[test]
    fn test_edges() {
        let r = Rect::from_xywh(150.0, 500.0, 100.0, 20.0);
        assert_eq!(r.left(), 150.0);
        assert_eq!(r.right(), 250.0);
        assert_eq!(r.top(), 500.0);
        assert_eq!(r.bottom(), 520.0);
    }
}
