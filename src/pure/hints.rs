//! ICCCM size hint handling.
use serde::{Deserialize, Serialize};

/// Parsed WM_NORMAL_HINTS constraints for a client window.
///
/// A value of 0 for any dimension field means "unset". Aspect limits are
/// stored as `w / h` for max and `h / w` for min, matching the convention the
/// constraint algorithm expects.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeHints {
    /// Minimum width
    pub min_w: i32,
    /// Minimum height
    pub min_h: i32,
    /// Maximum width (0 = unbounded)
    pub max_w: i32,
    /// Maximum height (0 = unbounded)
    pub max_h: i32,
    /// Base width subtracted before increment calculations
    pub base_w: i32,
    /// Base height subtracted before increment calculations
    pub base_h: i32,
    /// Width resize increment
    pub inc_w: i32,
    /// Height resize increment
    pub inc_h: i32,
    /// Minimum aspect ratio as h/w
    pub min_aspect: f32,
    /// Maximum aspect ratio as w/h
    pub max_aspect: f32,
}

impl SizeHints {
    /// A client whose min and max dimensions coincide can never be resized.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }

    /// Constrain a proposed `(w, h)` to these hints: subtract the base size,
    /// enforce the aspect ratio, snap to the resize increment, re-add the
    /// base and clamp to the min/max dimensions.
    pub fn constrain(&self, w: &mut i32, h: &mut i32) {
        let base_is_min = self.base_w == self.min_w && self.base_h == self.min_h;

        if !base_is_min {
            *w -= self.base_w;
            *h -= self.base_h;
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
            if self.max_aspect < *w as f32 / *h as f32 {
                *w = (*h as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < *h as f32 / *w as f32 {
                *h = (*w as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            *w -= self.base_w;
            *h -= self.base_h;
        }

        if self.inc_w > 0 {
            *w -= *w % self.inc_w;
        }
        if self.inc_h > 0 {
            *h -= *h % self.inc_h;
        }

        *w += self.base_w;
        *h += self.base_h;
        *w = (*w).max(self.min_w);
        *h = (*h).max(self.min_h);

        if self.max_w > 0 {
            *w = (*w).min(self.max_w);
        }
        if self.max_h > 0 {
            *h = (*h).min(self.max_h);
        }
    }

    /// Snap a keyboard-driven resize to whole increments, used when the user
    /// adjusts a floating client without the mouse.
    pub fn snap_to_increment(&self, cur_w: i32, cur_h: i32, w: &mut i32, h: &mut i32) {
        if *w > cur_w && self.inc_w > *w - cur_w {
            *w = cur_w + self.inc_w;
        } else if *w < cur_w && self.inc_w > cur_w - *w {
            *w = cur_w - self.inc_w;
        }

        if *h > cur_h && self.inc_h > *h - cur_h {
            *h = cur_h + self.inc_h;
        } else if *h < cur_h && self.inc_h > cur_h - *h {
            *h = cur_h - self.inc_h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(
        SizeHints { min_w: 100, min_h: 100, ..Default::default() },
        (50, 50), (100, 100);
        "clamped up to min"
    )]
    #[test_case(
        SizeHints { max_w: 300, max_h: 200, ..Default::default() },
        (500, 500), (300, 200);
        "clamped down to max"
    )]
    #[test_case(
        SizeHints { inc_w: 7, inc_h: 13, ..Default::default() },
        (100, 100), (98, 91);
        "snapped to increments"
    )]
    #[test_case(
        SizeHints { base_w: 10, base_h: 10, inc_w: 8, inc_h: 8, ..Default::default() },
        (100, 100), (98, 98);
        "base subtracted before increment snap"
    )]
    #[test_case(SizeHints::default(), (640, 480), (640, 480); "no hints is identity")]
    #[test]
    fn constrain(hints: SizeHints, proposed: (i32, i32), expected: (i32, i32)) {
        let (mut w, mut h) = proposed;

        hints.constrain(&mut w, &mut h);

        assert_eq!((w, h), expected);
    }

    #[test]
    fn aspect_limits_width() {
        let hints = SizeHints {
            max_aspect: 2.0,
            min_aspect: 0.5,
            ..Default::default()
        };
        let (mut w, mut h) = (500, 100);

        hints.constrain(&mut w, &mut h);

        assert_eq!((w, h), (200, 100));
    }

    #[test_case(
        SizeHints { min_w: 50, max_w: 50, min_h: 40, max_h: 40, ..Default::default() },
        true;
        "min equals max"
    )]
    #[test_case(SizeHints::default(), false; "unset")]
    #[test_case(
        SizeHints { min_w: 50, max_w: 60, min_h: 40, max_h: 40, ..Default::default() },
        false;
        "width resizable"
    )]
    #[test]
    fn is_fixed(hints: SizeHints, expected: bool) {
        assert_eq!(hints.is_fixed(), expected);
    }
}
