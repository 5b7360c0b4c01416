//! Built-in refresh hooks.
use crate::{
    core::{hooks::StateHook, State},
    pure::geometry::Rect,
    x::{ClientConfig, XConn},
    Result,
};

/// Gaps around the window placement of each screen's tiled layout.
///
/// `outer_px` controls the gap around the edge of the screen and `inner_px`
/// controls the gap around each individual window; set both equal to one
/// another for a consistent gap everywhere. `top_px`/`bottom_px` additionally
/// reserve space above/below the tiled area, for use alongside a status bar
/// that isn't registered as a [crate::pure::screen::Bar].
///
/// Install with [crate::core::Config::compose_or_set_refresh_hook]; it runs
/// after every [crate::x::XConnExt::refresh], so it sees the zero-gap layout
/// that was just applied and re-lays it out with gaps.
#[derive(Debug, Clone, Default)]
pub struct SpacingHook {
    pub outer_px: u32,
    pub inner_px: u32,
    pub top_px: u32,
    pub bottom_px: u32,
}

impl SpacingHook {
    fn shrink_outer(&self, mut r: Rect) -> Rect {
        if r.w == 0 || r.h == 0 {
            return r;
        }

        r.y += self.top_px;
        r.h = r.h.saturating_sub(self.top_px).saturating_sub(self.bottom_px);
        shrink(r, self.outer_px)
    }
}

impl<X: XConn> StateHook<X> for SpacingHook {
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        let bound: Vec<(usize, Rect)> = state
            .screens
            .screens
            .iter()
            .filter_map(|s| s.group.map(|g| (g, s.inner)))
            .collect();

        for (group_idx, inner) in bound {
            let group = &mut state.groups.groups[group_idx];
            if !group.visible {
                continue;
            }

            group.layout.set_bounds(self.shrink_outer(inner));
            for (id, r) in group.layout.layout() {
                x.set_client_config(id, &[ClientConfig::Position(shrink(r, self.inner_px))])?;
            }
        }

        Ok(())
    }
}

fn shrink(r: Rect, px: u32) -> Rect {
    if r.w <= 2 * px || r.h <= 2 * px {
        return r;
    }

    Rect {
        x: r.x + px,
        y: r.y + px,
        w: r.w - 2 * px,
        h: r.h - 2 * px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_outer_reserves_top_and_bottom_then_insets() {
        let hook = SpacingHook { outer_px: 10, inner_px: 5, top_px: 20, bottom_px: 0 };
        let r = hook.shrink_outer(Rect::new(0, 0, 800, 600));

        assert_eq!(r, Rect::new(10, 30, 780, 570));
    }

    #[test]
    fn shrink_is_a_noop_on_degenerate_rects() {
        let r = Rect::new(0, 0, 0, 0);
        assert_eq!(shrink(r, 5), r);
    }
}
