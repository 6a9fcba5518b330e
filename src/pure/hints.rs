//! Client size hints and the constraint engine that applies them
use crate::{
    pure::geometry::Rect,
    x::property::{WmNormalHints, WmNormalHintsFlags},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

/// The ICCCM size constraints requested by a client, normalised so that every
/// field is always present (zero meaning "unconstrained").
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeHints {
    /// Base width
    pub base_w: i32,
    /// Base height
    pub base_h: i32,
    /// Width increment
    pub inc_w: i32,
    /// Height increment
    pub inc_h: i32,
    /// Maximum width
    pub max_w: i32,
    /// Maximum height
    pub max_h: i32,
    /// Minimum width
    pub min_w: i32,
    /// Minimum height
    pub min_h: i32,
    /// Minimum aspect ratio as height / width
    pub min_aspect: f32,
    /// Maximum aspect ratio as width / height
    pub max_aspect: f32,
}

impl SizeHints {
    /// Normalise the raw `WM_NORMAL_HINTS` property of a client.
    ///
    /// The base size falls back to the minimum size and vice versa. A client that does
    /// not set the property at all is unconstrained.
    pub fn from_normal_hints(raw: Option<&WmNormalHints>) -> Self {
        let raw = match raw {
            Some(raw) => raw,
            None => return Self::default(),
        };

        let has = |flag| raw.flags.contains(flag);
        let ratio = |num: i32, den: i32| if den == 0 { 0.0 } else { num as f32 / den as f32 };

        let (base_w, base_h) = if has(WmNormalHintsFlags::P_BASE_SIZE) {
            raw.base
        } else if has(WmNormalHintsFlags::P_MIN_SIZE) {
            raw.min
        } else {
            (0, 0)
        };

        let (min_w, min_h) = if has(WmNormalHintsFlags::P_MIN_SIZE) {
            raw.min
        } else if has(WmNormalHintsFlags::P_BASE_SIZE) {
            raw.base
        } else {
            (0, 0)
        };

        let (inc_w, inc_h) = if has(WmNormalHintsFlags::P_RESIZE_INC) {
            raw.inc
        } else {
            (0, 0)
        };

        let (max_w, max_h) = if has(WmNormalHintsFlags::P_MAX_SIZE) {
            raw.max
        } else {
            (0, 0)
        };

        let (min_aspect, max_aspect) = if has(WmNormalHintsFlags::P_ASPECT) {
            (
                ratio(raw.min_aspect.1, raw.min_aspect.0),
                ratio(raw.max_aspect.0, raw.max_aspect.1),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            base_w,
            base_h,
            inc_w,
            inc_h,
            max_w,
            max_h,
            min_w,
            min_h,
            min_aspect,
            max_aspect,
        }
    }

    /// A client is fixed if its minimum and maximum sizes are set and identical.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }

    /// Constrain a proposed geometry for a client currently occupying `current` with a
    /// border of `bw`.
    ///
    /// Returns the constrained geometry and whether it differs from `current`.
    ///
    /// When `interact` is true the position is only kept on the screen, otherwise it is
    /// kept within the window area of the client's monitor. Size hints are only honoured
    /// if `bounds.respect_hints` is set.
    ///
    /// ```
    /// # use tagwm::pure::{geometry::Rect, hints::{HintBounds, SizeHints}};
    /// let hints = SizeHints { inc_w: 10, inc_h: 10, ..Default::default() };
    /// let bounds = HintBounds {
    ///     screen: Rect::new(0, 0, 1000, 800),
    ///     area: Rect::new(0, 0, 1000, 800),
    ///     bar_height: 0,
    ///     respect_hints: true,
    /// };
    ///
    /// let (r, changed) = hints.apply(Rect::new(0, 0, 100, 100), 0, Rect::new(0, 0, 155, 99), false, &bounds);
    ///
    /// assert_eq!(r, Rect::new(0, 0, 150, 90));
    /// assert!(changed);
    /// ```
    pub fn apply(
        &self,
        current: Rect,
        bw: i32,
        proposed: Rect,
        interact: bool,
        bounds: &HintBounds,
    ) -> (Rect, bool) {
        let Rect { mut x, mut y, w, h } = proposed;
        let (mut w, mut h) = (max(1, w), max(1, h));
        let (outer_w, outer_h) = (current.outer_w(bw), current.outer_h(bw));
        // requested geometry comes straight from clients
        let far_x = x.saturating_add(w).saturating_add(bw.saturating_mul(2));
        let far_y = y.saturating_add(h).saturating_add(bw.saturating_mul(2));

        if interact {
            let s = bounds.screen;
            if x > s.w {
                x = s.w.saturating_sub(outer_w);
            }
            if y > s.h {
                y = s.h.saturating_sub(outer_h);
            }
            if far_x < 0 {
                x = 0;
            }
            if far_y < 0 {
                y = 0;
            }
        } else {
            let a = bounds.area;
            if x >= a.x + a.w {
                x = (a.x + a.w).saturating_sub(outer_w);
            }
            if y >= a.y + a.h {
                y = (a.y + a.h).saturating_sub(outer_h);
            }
            if far_x <= a.x {
                x = a.x;
            }
            if far_y <= a.y {
                y = a.y;
            }
        }

        h = max(h, bounds.bar_height);
        w = max(w, bounds.bar_height);

        if bounds.respect_hints {
            (w, h) = self.constrain_size(w, h);
        }

        let r = Rect::new(x, y, w, h);

        (r, r != current)
    }

    // ICCCM 4.1.2.3: the base size is not counted when checking the aspect ratio unless
    // it also stands in for the minimum size.
    fn constrain_size(&self, mut w: i32, mut h: i32) -> (i32, i32) {
        let base_is_min = self.base_w == self.min_w && self.base_h == self.min_h;

        if !base_is_min {
            w = w.saturating_sub(self.base_w);
            h = h.saturating_sub(self.base_h);
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
            if self.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            w = w.saturating_sub(self.base_w);
            h = h.saturating_sub(self.base_h);
        }

        if self.inc_w > 0 {
            w -= w % self.inc_w;
        }
        if self.inc_h > 0 {
            h -= h % self.inc_h;
        }

        w = max(w.saturating_add(self.base_w), self.min_w);
        h = max(h.saturating_add(self.base_h), self.min_h);

        if self.max_w > 0 {
            w = min(w, self.max_w);
        }
        if self.max_h > 0 {
            h = min(h, self.max_h);
        }

        (w, h)
    }
}

/// Everything outside of a client itself that constrains its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintBounds {
    /// The full root window
    pub screen: Rect,
    /// The window area of the client's monitor
    pub area: Rect,
    /// The height of the status bar, used as a minimum window dimension
    pub bar_height: i32,
    /// Whether or not size hints should be honoured
    pub respect_hints: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;

    fn bounds(respect_hints: bool) -> HintBounds {
        HintBounds {
            screen: Rect::new(0, 0, 1920, 1080),
            area: Rect::new(0, 0, 1000, 800),
            bar_height: 18,
            respect_hints,
        }
    }

    fn hints() -> SizeHints {
        SizeHints::default()
    }

    #[test_case(hints(), true, Rect::new(10, 10, 200, 150), Rect::new(10, 10, 200, 150); "unconstrained")]
    #[test_case(SizeHints { inc_w: 10, inc_h: 20, ..hints() }, true, Rect::new(0, 0, 205, 155), Rect::new(0, 0, 200, 140); "increments")]
    #[test_case(SizeHints { base_w: 5, min_w: 20, inc_w: 10, ..hints() }, true, Rect::new(0, 0, 107, 100), Rect::new(0, 0, 105, 100); "base differs from min")]
    #[test_case(SizeHints { min_w: 300, min_h: 300, ..hints() }, true, Rect::new(0, 0, 100, 100), Rect::new(0, 0, 300, 300); "minimum")]
    #[test_case(SizeHints { max_w: 300, max_h: 200, ..hints() }, true, Rect::new(0, 0, 500, 500), Rect::new(0, 0, 300, 200); "maximum")]
    #[test_case(SizeHints { min_aspect: 0.5, max_aspect: 2.0, ..hints() }, true, Rect::new(0, 0, 600, 200), Rect::new(0, 0, 400, 200); "too wide")]
    #[test_case(SizeHints { min_aspect: 0.5, max_aspect: 2.0, ..hints() }, true, Rect::new(0, 0, 100, 400), Rect::new(0, 0, 100, 50); "too tall")]
    #[test_case(hints(), true, Rect::new(0, 0, 5, 5), Rect::new(0, 0, 18, 18); "bar height floor")]
    #[test_case(SizeHints { inc_w: 10, inc_h: 20, ..hints() }, false, Rect::new(0, 0, 205, 155), Rect::new(0, 0, 205, 155); "hints ignored")]
    #[test_case(hints(), true, Rect::new(1200, 900, 50, 50), Rect::new(898, 698, 50, 50); "clamped into area")]
    #[test_case(hints(), true, Rect::new(-300, -300, 50, 50), Rect::new(0, 0, 50, 50); "pulled back into area")]
    #[test]
    fn apply_non_interactive(h: SizeHints, respect: bool, proposed: Rect, expected: Rect) {
        let current = Rect::new(0, 0, 100, 100);
        let (r, _) = h.apply(current, 1, proposed, false, &bounds(respect));

        assert_eq!(r, expected);
    }

    #[test_case(Rect::new(2000, 10, 50, 50), Rect::new(1818, 10, 50, 50); "off the right of the screen")]
    #[test_case(Rect::new(10, 1200, 50, 50), Rect::new(10, 978, 50, 50); "off the bottom of the screen")]
    #[test_case(Rect::new(-500, 10, 200, 50), Rect::new(0, 10, 200, 50); "off the left of the screen")]
    #[test_case(Rect::new(1500, 900, 50, 50), Rect::new(1500, 900, 50, 50); "outside the area but on screen")]
    #[test]
    fn apply_interactive(proposed: Rect, expected: Rect) {
        let current = Rect::new(0, 0, 100, 100);
        let (r, _) = hints().apply(current, 1, proposed, true, &bounds(true));

        assert_eq!(r, expected);
    }

    #[test_case(false; "tiled")]
    #[test_case(true; "interactive")]
    #[test]
    fn extreme_requests_saturate_rather_than_overflow(interact: bool) {
        let current = Rect::new(0, 0, 100, 100);
        let h = SizeHints {
            base_w: 5,
            min_w: 20,
            ..hints()
        };

        for proposed in [
            Rect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX),
            Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX),
        ] {
            let (r, _) = h.apply(current, i32::MAX / 2, proposed, interact, &bounds(true));

            assert!(r.x <= 1920 && r.y <= 1080, "{r:?}");
            assert_eq!((r.w, r.h), (i32::MAX, i32::MAX));
        }
    }

    #[test]
    fn unchanged_geometry_is_reported() {
        let current = Rect::new(10, 10, 100, 100);
        let (r, changed) = hints().apply(current, 1, current, false, &bounds(true));

        assert_eq!(r, current);
        assert!(!changed);
    }

    #[test_case(None, hints(); "no property")]
    #[test_case(Some(WmNormalHints::default().with_min(100, 50)), SizeHints { base_w: 100, base_h: 50, min_w: 100, min_h: 50, ..hints() }; "min stands in for base")]
    #[test_case(Some(WmNormalHints::default().with_base(10, 10)), SizeHints { base_w: 10, base_h: 10, min_w: 10, min_h: 10, ..hints() }; "base stands in for min")]
    #[test_case(Some(WmNormalHints::default().with_increments(7, 14)), SizeHints { inc_w: 7, inc_h: 14, ..hints() }; "increments")]
    #[test_case(Some(WmNormalHints::default().with_aspect((1, 2), (3, 1))), SizeHints { min_aspect: 2.0, max_aspect: 3.0, ..hints() }; "aspect")]
    #[test_case(Some(WmNormalHints::default().with_aspect((0, 2), (3, 0))), SizeHints { min_aspect: 0.0, max_aspect: 0.0, ..hints() }; "zero denominators")]
    #[test]
    fn from_normal_hints(raw: Option<WmNormalHints>, expected: SizeHints) {
        assert_eq!(SizeHints::from_normal_hints(raw.as_ref()), expected);
    }

    #[test_case(WmNormalHints::default().with_min(100, 100).with_max(100, 100), true; "min equals max")]
    #[test_case(WmNormalHints::default().with_min(100, 100).with_max(200, 100), false; "wider max")]
    #[test_case(WmNormalHints::default().with_min(100, 100), false; "no max")]
    #[test]
    fn is_fixed(raw: WmNormalHints, expected: bool) {
        assert_eq!(SizeHints::from_normal_hints(Some(&raw)).is_fixed(), expected);
    }

    // Hints that a well behaved client would set: the base size never exceeds the bar
    // height and the maximum size sits on an increment boundary.
    #[derive(Debug, Clone)]
    struct Case {
        hints: SizeHints,
        bw: i32,
        bar_height: i32,
        current: Rect,
        proposed: Rect,
        interact: bool,
    }

    fn in_range(g: &mut Gen, lo: i32, hi: i32) -> i32 {
        lo + (u32::arbitrary(g) % (hi - lo) as u32) as i32
    }

    impl Arbitrary for Case {
        fn arbitrary(g: &mut Gen) -> Self {
            let bar_height = in_range(g, 0, 30);
            let (base_w, base_h) = (in_range(g, 0, bar_height + 1), in_range(g, 0, bar_height + 1));
            let (min_w, min_h) = (in_range(g, 0, 300), in_range(g, 0, 300));
            let (inc_w, inc_h) = (in_range(g, 0, 20), in_range(g, 0, 20));

            let mut aligned_max = |base: i32, min: i32, inc: i32| {
                if bool::arbitrary(g) {
                    0
                } else if inc == 0 {
                    min + in_range(g, 0, 500)
                } else {
                    let k = max(0, (min - base + inc - 1) / inc);
                    base + inc * (k + in_range(g, 0, 50))
                }
            };
            let max_w = aligned_max(base_w, min_w, inc_w);
            let max_h = aligned_max(base_h, min_h, inc_h);

            Self {
                hints: SizeHints {
                    base_w,
                    base_h,
                    inc_w,
                    inc_h,
                    max_w,
                    max_h,
                    min_w,
                    min_h,
                    ..Default::default()
                },
                bw: in_range(g, 0, 5),
                bar_height,
                current: Rect::new(
                    in_range(g, 0, 500),
                    in_range(g, 0, 500),
                    in_range(g, 1, 400),
                    in_range(g, 1, 400),
                ),
                proposed: Rect::new(
                    in_range(g, 0, 3000),
                    in_range(g, 0, 3000),
                    in_range(g, 1, 3000),
                    in_range(g, 1, 3000),
                ),
                interact: bool::arbitrary(g),
            }
        }
    }

    #[quickcheck]
    fn apply_is_idempotent(case: Case) -> bool {
        let b = HintBounds {
            screen: Rect::new(0, 0, 2000, 1600),
            area: Rect::new(0, 0, 2000, 1600),
            bar_height: case.bar_height,
            respect_hints: true,
        };
        let apply = |r| case.hints.apply(case.current, case.bw, r, case.interact, &b).0;
        let once = apply(case.proposed);

        apply(once) == once
    }

    // Aspect bounds that leave room between them: the tallest allowed shape is clearly
    // wider than the narrowest, so rounding in one direction cannot cross the other.
    #[derive(Debug, Clone)]
    struct AspectCase {
        hints: SizeHints,
        bw: i32,
        proposed: Rect,
    }

    impl Arbitrary for AspectCase {
        fn arbitrary(g: &mut Gen) -> Self {
            let max_aspect = in_range(g, 100, 300) as f32 / 100.0;
            let min_aspect = in_range(g, 110, 200) as f32 / 100.0 / max_aspect;

            Self {
                hints: SizeHints {
                    min_aspect,
                    max_aspect,
                    ..Default::default()
                },
                bw: in_range(g, 0, 5),
                proposed: Rect::new(
                    in_range(g, 0, 1500),
                    in_range(g, 0, 1500),
                    in_range(g, 50, 3000),
                    in_range(g, 50, 3000),
                ),
            }
        }
    }

    #[quickcheck]
    fn apply_with_aspect_is_idempotent_and_within_bounds(case: AspectCase) -> bool {
        let b = HintBounds {
            screen: Rect::new(0, 0, 2000, 1600),
            area: Rect::new(0, 0, 2000, 1600),
            bar_height: 0,
            respect_hints: true,
        };
        let current = Rect::new(0, 0, 100, 100);
        let apply = |r| case.hints.apply(current, case.bw, r, false, &b).0;
        let once = apply(case.proposed);
        let (w, h) = (once.w as f32, once.h as f32);

        apply(once) == once
            && w <= h * case.hints.max_aspect + 1.0
            && h <= w * case.hints.min_aspect + 1.0
    }
}
