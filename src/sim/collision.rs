//! Boundary collision detection and response
//!
//! Dots only collide with the arena edges, never with each other.
//! Response is a plain axis flip: the dot is not pushed back inside,
//! so a fast dot can overlap a wall for one tick before the flipped
//! velocity carries it back.

use std::ops::{BitOr, BitOrAssign};

use super::arena::Arena;
use super::state::Dot;

/// Set of arena edges a dot is touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EdgeMask(u8);

impl EdgeMask {
    pub const NONE: Self = Self(0);
    pub const TOP: Self = Self(1 << 0);
    pub const BOTTOM: Self = Self(1 << 1);
    pub const LEFT: Self = Self(1 << 2);
    pub const RIGHT: Self = Self(1 << 3);

    /// Top or bottom
    pub const VERTICAL: Self = Self(Self::TOP.0 | Self::BOTTOM.0);
    /// Left or right
    pub const HORIZONTAL: Self = Self(Self::LEFT.0 | Self::RIGHT.0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if any edge of `other` is set
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Vertical axis (top/bottom) touched
    #[inline]
    pub fn vertical(self) -> bool {
        self.intersects(Self::VERTICAL)
    }

    /// Horizontal axis (left/right) touched
    #[inline]
    pub fn horizontal(self) -> bool {
        self.intersects(Self::HORIZONTAL)
    }
}

impl BitOr for EdgeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Classify which edges a dot touches.
///
/// An edge is touched when the perpendicular distance from the dot's
/// center to it is at most the radius (a center past the edge counts).
pub fn classify(arena: &Arena, dot: &Dot) -> EdgeMask {
    let mut mask = EdgeMask::NONE;
    if arena.height - dot.center.y <= dot.radius {
        mask |= EdgeMask::TOP;
    }
    if dot.center.y <= dot.radius {
        mask |= EdgeMask::BOTTOM;
    }
    if dot.center.x <= dot.radius {
        mask |= EdgeMask::LEFT;
    }
    if arena.width - dot.center.x <= dot.radius {
        mask |= EdgeMask::RIGHT;
    }
    mask
}

/// Flip velocity components for the touched axes.
///
/// Corners flip both components at once.
#[inline]
pub fn reflect(dot: &mut Dot, mask: EdgeMask) {
    if mask.vertical() {
        dot.velocity.y = -dot.velocity.y;
    }
    if mask.horizontal() {
        dot.velocity.x = -dot.velocity.x;
    }
}

/// Classify and reflect in one step, returning the touched edges
pub fn bounce(arena: &Arena, dot: &mut Dot) -> EdgeMask {
    let mask = classify(arena, dot);
    reflect(dot, mask);
    mask
}
