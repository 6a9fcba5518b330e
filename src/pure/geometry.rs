//! Geometry primitives
//!
//! Coordinates are signed: hidden clients are parked off screen to the left of the
//! root window and monitors reported by multi-head extensions may have negative
//! origins.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

/// An x,y coordinate pair
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    /// An absolute x coordinate relative to the root window
    pub x: i32,
    /// An absolute y coordinate relative to the root window
    pub y: i32,
}

impl Point {
    /// Create a new Point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect
    pub x: i32,
    /// The y-coordinate of the top left corner of this rect
    pub y: i32,
    /// The width of this rect
    pub w: i32,
    /// The height of this rect
    pub h: i32,
}

impl Rect {
    /// Create a new Rect.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The top left corner of this Rect
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The width of this rect once a border of `bw` is drawn on each side.
    pub fn outer_w(&self, bw: i32) -> i32 {
        self.w.saturating_add(bw.saturating_mul(2))
    }

    /// The height of this rect once a border of `bw` is drawn on each side.
    pub fn outer_h(&self, bw: i32) -> i32 {
        self.h.saturating_add(bw.saturating_mul(2))
    }

    /// Check whether this Rect contains `p`
    ///
    /// ```
    /// # use tagwm::pure::geometry::{Point, Rect};
    /// let r = Rect::new(10, 10, 50, 50);
    ///
    /// assert!(r.contains_point(Point::new(30, 20)));
    /// assert!(!r.contains_point(Point::new(60, 20)));
    /// ```
    pub fn contains_point(&self, p: Point) -> bool {
        (self.x..self.x + self.w).contains(&p.x) && (self.y..self.y + self.h).contains(&p.y)
    }

    /// The area of the overlap between this Rect and `other`, zero if they are
    /// disjoint.
    ///
    /// ```
    /// # use tagwm::pure::geometry::Rect;
    /// let left = Rect::new(0, 0, 100, 100);
    ///
    /// assert_eq!(left.intersection_area(&Rect::new(50, 50, 100, 100)), 2500);
    /// assert_eq!(left.intersection_area(&Rect::new(100, 0, 100, 100)), 0);
    /// ```
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let w = max(
            0,
            min(self.x + self.w, other.x + other.w) - max(self.x, other.x),
        );
        let h = max(
            0,
            min(self.y + self.h, other.y + other.h) - max(self.y, other.y),
        );

        w as i64 * h as i64
    }
}
