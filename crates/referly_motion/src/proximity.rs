//! Pointer proximity field
//!
//! Used by the particle and network backdrops: nodes near the pointer are
//! pushed away with a linear falloff and drift back to their rest position
//! once it moves on. The constants are presentation tuning, not physics.

use referly_core::Point;

/// A particle or graph node
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityNode {
    pub rest: Point,
    pub position: Point,
}

impl ProximityNode {
    pub fn new(rest: Point) -> Self {
        Self {
            rest,
            position: rest,
        }
    }
}

/// Repulsion around the pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityField {
    /// Influence radius in pixels
    pub radius: f32,
    /// Peak displacement as a fraction of the radius
    pub strength: f32,
    /// Fraction of the remaining distance covered per frame
    pub return_factor: f32,
}

impl Default for ProximityField {
    fn default() -> Self {
        Self {
            radius: 250.0,
            strength: 0.15,
            return_factor: 0.2,
        }
    }
}

impl ProximityField {
    /// Where a node at `rest` wants to be given the pointer position
    pub fn displaced(&self, rest: Point, pointer: Option<Point>) -> Point {
        let Some(pointer) = pointer.filter(Point::is_finite) else {
            return rest;
        };
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return rest;
        }
        let (dx, dy) = (rest.x - pointer.x, rest.y - pointer.y);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance >= self.radius || distance < f32::EPSILON {
            return rest;
        }
        let falloff = 1.0 - distance / self.radius;
        let push = falloff * self.strength * self.radius;
        Point::new(
            rest.x + dx / distance * push,
            rest.y + dy / distance * push,
        )
    }

    /// Ease every node one frame toward its displaced position
    pub fn step(&self, nodes: &mut [ProximityNode], pointer: Option<Point>) {
        let factor = self.return_factor.clamp(0.0, 1.0);
        for node in nodes {
            let goal = self.displaced(node.rest, pointer);
            node.position.x += (goal.x - node.position.x) * factor;
            node.position.y += (goal.y - node.position.y) * factor;
        }
    }

    /// Opacity of a connecting line between two nodes; fades to zero at `max_distance`
    pub fn link_opacity(a: Point, b: Point, max_distance: f32) -> f32 {
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return 0.0;
        }
        let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        if !distance.is_finite() {
            return 0.0;
        }
        (1.0 - distance / max_distance).clamp(0.0, 1.0)
    }
}
