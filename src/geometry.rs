// geometry.rs - Screen Coordinate Primitives
//
// Points and axis-aligned rectangles in absolute screen coordinates.
// Monitor bookkeeping and selection handling are built on these two types.

use std::fmt;
use std::ops::{Add, Sub};

/// An absolute position on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Normalize two arbitrary corner points into a sorted rectangle.
    ///
    /// Each axis is sorted independently, so any pair of opposite corners of
    /// the same rectangle produces the same result regardless of drag
    /// direction or argument order. A zero-area pair (both points share an x
    /// or a y) is no selection at all and returns `None`.
    pub fn from_corners(a: Point, b: Point) -> Option<Rect> {
        let (left, right) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (top, bottom) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };

        let width = (right - left) as u32;
        let height = (bottom - top) as u32;
        if width == 0 || height == 0 {
            return None;
        }

        Some(Rect::new(left, top, width, height))
    }

    /// Exclusive right edge in screen coordinates.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge in screen coordinates.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `p` lies inside the rectangle, inclusive of all four edges.
    ///
    /// A point on the shared boundary between two monitors therefore belongs
    /// to both; lookups resolve the tie by enumeration order.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Pixel-exact overlap with `other`, or `None` when the rectangles do not
    /// share any area. Unlike `contains`, edge-touching rectangles overlap in
    /// zero pixels and yield `None`.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(left, top, (right - left) as u32, (bottom - top) as u32))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(10, -4);
        let b = Point::new(3, 9);
        assert_eq!(a + b, Point::new(13, 5));
        assert_eq!(a - b, Point::new(7, -13));
    }

    #[test]
    fn normalizes_any_corner_order() {
        let expected = Rect::new(10, 20, 30, 40);
        let tl = Point::new(10, 20);
        let br = Point::new(40, 60);
        let tr = Point::new(40, 20);
        let bl = Point::new(10, 60);

        assert_eq!(Rect::from_corners(tl, br), Some(expected));
        assert_eq!(Rect::from_corners(br, tl), Some(expected));
        assert_eq!(Rect::from_corners(tr, bl), Some(expected));
        assert_eq!(Rect::from_corners(bl, tr), Some(expected));
    }

    #[test]
    fn normalization_is_commutative() {
        let a = Point::new(-15, 7);
        let b = Point::new(4, -22);
        assert_eq!(Rect::from_corners(a, b), Rect::from_corners(b, a));
    }

    #[test]
    fn normalization_is_idempotent() {
        let rect = Rect::from_corners(Point::new(50, 90), Point::new(-3, 12)).unwrap();
        let again = Rect::from_corners(rect.origin(), Point::new(rect.right(), rect.bottom()));
        assert_eq!(again, Some(rect));
    }

    #[test]
    fn zero_area_is_no_selection() {
        let p = Point::new(100, 100);
        assert_eq!(Rect::from_corners(p, p), None);
        // Degenerate in one axis only.
        assert_eq!(Rect::from_corners(p, Point::new(100, 250)), None);
        assert_eq!(Rect::from_corners(p, Point::new(250, 100)), None);
    }

    #[test]
    fn normalizes_negative_coordinates() {
        // A monitor left of the primary puts the whole drag in negative x.
        let rect = Rect::from_corners(Point::new(-100, 50), Point::new(-300, 10)).unwrap();
        assert_eq!(rect, Rect::new(-300, 10, 200, 40));
    }

    #[test]
    fn containment_is_inclusive_of_edges() {
        let rect = Rect::new(0, 0, 1920, 1080);

        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(1920, 1080)));
        assert!(rect.contains(Point::new(1920, 0)));
        assert!(rect.contains(Point::new(0, 1080)));
        assert!(rect.contains(Point::new(960, 540)));

        assert!(!rect.contains(Point::new(-1, 0)));
        assert!(!rect.contains(Point::new(1921, 540)));
        assert!(!rect.contains(Point::new(960, 1081)));
    }

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));
    }

    #[test]
    fn intersect_contained() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(25, 25, 10, 10);
        assert_eq!(outer.intersect(&inner), Some(inner));
    }

    #[test]
    fn intersect_disjoint_and_edge_touching() {
        let a = Rect::new(0, 0, 100, 100);
        assert_eq!(a.intersect(&Rect::new(200, 200, 10, 10)), None);
        // Side-by-side monitors touch along an edge but share no pixels.
        assert_eq!(a.intersect(&Rect::new(100, 0, 100, 100)), None);
    }
}
