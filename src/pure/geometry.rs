//! Geometry primitives
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An x,y coordinate pair relative to the root window.
///
/// Coordinates are signed: windows may legitimately sit partially (or, during
/// a drag, almost entirely) off screen.
#[derive(Serialize, Deserialize, Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
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
    fn from(raw: (i32, i32)) -> Self {
        let (x, y) = raw;

        Self { x, y }
    }
}

/// An X window / screen position: top left corner + extent.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
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

    /// The x-coordinate one past the right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// The y-coordinate one past the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// The midpoint of this rectangle.
    pub fn midpoint(&self) -> Point {
        Point {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    /// Check whether this Rect contains `p`.
    pub fn contains_point<P>(&self, p: P) -> bool
    where
        P: Into<Point>,
    {
        let p = p.into();

        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Check whether this Rect contains `other` entirely.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Shrink all four edges inwards by `n` pixels.
    ///
    /// Width and height bottom out at 1 rather than underflowing.
    pub fn inset(&self, n: i32) -> Self {
        Self {
            x: self.x + n,
            y: self.y + n,
            w: (self.w - 2 * n).max(1),
            h: (self.h - 2 * n).max(1),
        }
    }

    /// Remove `(l, r, t, b)` pixels from the corresponding edges.
    pub fn with_padding(&self, l: i32, r: i32, t: i32, b: i32) -> Self {
        Self {
            x: self.x + l,
            y: self.y + t,
            w: (self.w - l - r).max(1),
            h: (self.h - t - b).max(1),
        }
    }

    /// Center this Rect inside of `enclosing`, preserving its size.
    ///
    /// Returns `None` if this Rect can not fit inside enclosing.
    pub fn centered_in(&self, enclosing: &Rect) -> Option<Self> {
        if self.w > enclosing.w || self.h > enclosing.h {
            return None;
        }

        Some(Self {
            x: enclosing.x + ((enclosing.w - self.w) / 2),
            y: enclosing.y + ((enclosing.h - self.h) / 2),
            ..*self
        })
    }

    /// The area shared between this Rect and `other`, as used for deciding
    /// which monitor a window "mostly" occupies.
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let dx = (self.right().min(other.right()) - self.x.max(other.x)).max(0);
        let dy = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0);

        dx as i64 * dy as i64
    }
}

/// Edge or center alignment used when placing floating windows.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gravity {
    /// Leave the coordinate as it is
    #[default]
    None,
    /// Align to the left edge
    Left,
    /// Align to the right edge
    Right,
    /// Center within the containing rect
    Center,
    /// Align to the top edge
    Top,
    /// Align to the bottom edge
    Bottom,
}

impl Gravity {
    /// The command-line name for this gravity.
    pub fn name(&self) -> &'static str {
        match self {
            Gravity::None => "none",
            Gravity::Left => "left",
            Gravity::Right => "right",
            Gravity::Center => "center",
            Gravity::Top => "top",
            Gravity::Bottom => "bottom",
        }
    }

    /// Resolve an x coordinate within `r` for a window of total width `w`
    /// (border included), inset by `gap`.
    pub fn apply_x(&self, r: &Rect, w: i32, gap: i32) -> Option<i32> {
        match self {
            Gravity::Left => Some(r.x + gap),
            Gravity::Right => Some(r.right() - w - gap),
            Gravity::Center => Some(r.x + (r.w - w) / 2),
            _ => None,
        }
    }

    /// Resolve a y coordinate within `r` for a window of total height `h`
    /// (border included), inset by `gap`.
    pub fn apply_y(&self, r: &Rect, h: i32, gap: i32) -> Option<i32> {
        match self {
            Gravity::Top => Some(r.y + gap),
            Gravity::Bottom => Some(r.bottom() - h - gap),
            Gravity::Center => Some(r.y + (r.h - h) / 2),
            _ => None,
        }
    }
}

impl FromStr for Gravity {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "none" => Ok(Gravity::None),
            "left" => Ok(Gravity::Left),
            "right" => Ok(Gravity::Right),
            "center" => Ok(Gravity::Center),
            "top" => Ok(Gravity::Top),
            "bottom" => Ok(Gravity::Bottom),
            _ => Err(bad_command!(
                "invalid value for gravity: {}\n\nexpected one of none, left, right, center, top, bottom",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(Point::new(0, 0), false; "outside")]
    #[test_case(Point::new(30, 20), true; "inside")]
    #[test_case(Point::new(10, 20), true; "top left")]
    #[test_case(Point::new(40, 60), true; "bottom right")]
    #[test]
    fn contains_point(p: Point, expected: bool) {
        let r = Rect::new(10, 20, 30, 40);

        assert_eq!(r.contains_point(p), expected);
    }

    #[test]
    fn contains_rect() {
        let r1 = Rect::new(10, 10, 50, 50);
        let r2 = Rect::new(0, 0, 100, 100);

        assert!(r2.contains(&r1));
        assert!(!r1.contains(&r2));
    }

    #[test_case(
        Rect::new(0, 0, 10, 10),
        Some(Rect::new(5, 5, 10, 10));
        "fits"
    )]
    #[test_case(Rect::new(0, 0, 100, 100), None; "doesn't fit")]
    #[test]
    fn centered_in(inner: Rect, expected: Option<Rect>) {
        let outer = Rect::new(0, 0, 20, 20);

        assert_eq!(inner.centered_in(&outer), expected);
    }

    #[test_case(Rect::new(0, 0, 100, 100), Rect::new(50, 50, 100, 100), 2500; "overlapping")]
    #[test_case(Rect::new(0, 0, 100, 100), Rect::new(200, 0, 100, 100), 0; "disjoint")]
    #[test_case(Rect::new(0, 0, 100, 100), Rect::new(25, 25, 50, 50), 2500; "contained")]
    #[test]
    fn intersection_area(a: Rect, b: Rect, expected: i64) {
        assert_eq!(a.intersection_area(&b), expected);
        assert_eq!(b.intersection_area(&a), expected);
    }

    #[test]
    fn with_padding_clamps_to_positive_size() {
        let r = Rect::new(0, 0, 10, 10).with_padding(20, 20, 0, 0);

        assert_eq!(r.w, 1);
    }

    #[test_case(Gravity::Left, Some(5); "left")]
    #[test_case(Gravity::Right, Some(75); "right")]
    #[test_case(Gravity::Center, Some(40); "center")]
    #[test_case(Gravity::None, None; "none")]
    #[test]
    fn gravity_x(g: Gravity, expected: Option<i32>) {
        let r = Rect::new(0, 0, 100, 100);

        assert_eq!(g.apply_x(&r, 20, 5), expected);
    }
}
