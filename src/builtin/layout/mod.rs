//! Built-in [Split] presets: ready-made stack arrangements for common layout
//! shapes, built directly on the [pure layout engine][crate::pure::layout].
pub mod transformers;

use crate::pure::layout::{Split, StackSpec};

/// A main region holding up to `max_main` windows and a secondary region
/// taking the remaining space, split left to right (`vertical`) or top to
/// bottom. `ratio` is the fraction of the split given to the main region,
/// clamped to `(0.0, 1.0)`; `mirrored` swaps which side the main region is on.
///
/// When there are `max_main` or fewer windows the secondary stack is left
/// empty and the main region expands to fill the whole split, matching a
/// single-stack layout.
fn main_and_stack(vertical: bool, max_main: usize, ratio: f32, mirrored: bool) -> Split {
    let ratio = ratio.clamp(0.01, 0.99);
    let main_weight = ((ratio * 1000.0).round() as u32).max(1);
    let stack_weight = (1000 - main_weight).max(1);

    let main = StackSpec::new("main")
        .weight(main_weight)
        .limit(max_main.max(1))
        .priority(Some(0));
    let stack = StackSpec::new("stack").weight(stack_weight);

    let specs = if mirrored { vec![stack, main] } else { vec![main, stack] };
    Split::new(vertical, false, specs)
}

/// Main region on the left, secondary windows stacked to the right.
pub fn main_and_stack_side(max_main: usize, ratio: f32) -> Split {
    main_and_stack(true, max_main, ratio, false)
}

/// As [main_and_stack_side] but with the main region on the right.
pub fn main_and_stack_side_mirrored(max_main: usize, ratio: f32) -> Split {
    main_and_stack(true, max_main, ratio, true)
}

/// Main region at the top, secondary windows stacked along the bottom.
pub fn main_and_stack_bottom(max_main: usize, ratio: f32) -> Split {
    main_and_stack(false, max_main, ratio, false)
}

/// As [main_and_stack_bottom] but with the main region on the bottom.
pub fn main_and_stack_bottom_mirrored(max_main: usize, ratio: f32) -> Split {
    main_and_stack(false, max_main, ratio, true)
}

/// A single stack that only ever renders its top window full screen, so
/// switching focus is the only thing that changes what is visible.
pub fn monocle() -> Split {
    Split::new(true, false, vec![StackSpec::new("main").single_visible()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pure::{geometry::Rect, window::Xid};

    #[test]
    fn side_overflow_splits_by_ratio() {
        let mut split = main_and_stack_side(1, 0.6);
        split.set_bounds(Rect::new(0, 0, 1000, 600));

        split.add(Xid(1), None);
        split.add(Xid(2), None);

        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&Xid(1)], Rect::new(0, 0, 600, 600));
        assert_eq!(boxes[&Xid(2)], Rect::new(600, 0, 400, 600));
    }

    #[test]
    fn side_under_capacity_is_a_single_full_width_stack() {
        let mut split = main_and_stack_side(2, 0.6);
        split.set_bounds(Rect::new(0, 0, 1000, 600));

        split.add(Xid(1), None);
        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&Xid(1)], Rect::new(0, 0, 1000, 600));
    }

    #[test]
    fn mirrored_puts_main_on_the_opposite_side() {
        let mut split = main_and_stack_side_mirrored(1, 0.6);
        split.set_bounds(Rect::new(0, 0, 1000, 600));

        split.add(Xid(1), None);
        split.add(Xid(2), None);

        let boxes: std::collections::HashMap<_, _> = split.layout().into_iter().collect();
        assert_eq!(boxes[&Xid(1)], Rect::new(400, 0, 600, 600));
        assert_eq!(boxes[&Xid(2)], Rect::new(0, 0, 400, 600));
    }

    #[test]
    fn monocle_shows_only_the_top_window() {
        let mut split = monocle();
        split.set_bounds(Rect::new(0, 0, 1000, 600));

        split.add(Xid(1), None);
        split.add(Xid(2), None);

        let positions = split.layout();
        assert_eq!(positions, vec![(Xid(1), Rect::new(0, 0, 1000, 600))]);
    }
}

#[cfg(test)]
mod quickcheck_tests {
    //! Property tests ensuring the built-in presets never panic or drop
    //! windows for arbitrary bounds, window counts, ratios and stack limits.
    use super::*;
    use crate::pure::{geometry::Rect, window::Xid};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    impl Arbitrary for Rect {
        fn arbitrary(g: &mut Gen) -> Self {
            Rect::new(
                u8::arbitrary(g) as u32,
                u8::arbitrary(g) as u32,
                (u8::arbitrary(g) as u32) + 100,
                (u8::arbitrary(g) as u32) + 100,
            )
        }
    }

    fn windows(n: u8) -> Vec<Xid> {
        (1..=(n % 16) as u32 + 1).map(Xid).collect()
    }

    fn fill(mut split: Split, r: Rect, n: u8) -> Split {
        split.set_bounds(r);
        for w in windows(n) {
            split.add(w, None);
        }
        split
    }

    #[quickcheck]
    fn main_and_stack_side_is_exhaustive(r: Rect, n: u8, max_main: u8, ratio: u8) -> bool {
        let ratio = (ratio as f32) / 255.0;
        let split = fill(main_and_stack_side(max_main as usize, ratio), r, n);
        let rendered: std::collections::HashSet<_> = split.layout().into_iter().map(|(w, _)| w).collect();
        rendered.len() == split.all_windows().len()
    }

    #[quickcheck]
    fn main_and_stack_bottom_mirrored_is_exhaustive(r: Rect, n: u8, max_main: u8, ratio: u8) -> bool {
        let ratio = (ratio as f32) / 255.0;
        let split = fill(main_and_stack_bottom_mirrored(max_main as usize, ratio), r, n);
        let rendered: std::collections::HashSet<_> = split.layout().into_iter().map(|(w, _)| w).collect();
        rendered.len() == split.all_windows().len()
    }

    #[quickcheck]
    fn monocle_always_shows_exactly_one_window_when_non_empty(r: Rect, n: u8) -> bool {
        let split = fill(monocle(), r, n);
        split.layout().len() == 1
    }
}
