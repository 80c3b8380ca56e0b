//! Per-workspace geometry solvers.
//!
//! A layout is a pure function from the tiled clients of a workspace to a set
//! of proposed placements within the monitor's usable rectangle (minus the
//! workspace paddings). Layouts never touch the X server: the refresh
//! pipeline applies the returned placements, and any client a layout had to
//! pop out to floating is reported back for quadrant placement.
use crate::{pure::geometry::Rect, Xid};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The built-in layout selectors.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Master column on the left, stack and overflow columns to its right
    #[default]
    Tile,
    /// Mirror of [LayoutKind::Tile] across the vertical axis
    RTile,
    /// All tiled clients occupy the full usable rect, only the selected one
    /// is on screen
    Mono,
    /// Near-square grid, column-major
    Grid,
    /// Fibonacci split rotating direction every step
    Spiral,
    /// Fibonacci split halving a single axis
    Dwindle,
    /// No tiling: every client floats
    None,
}

impl LayoutKind {
    /// All selectable layouts in cycle order.
    pub const ALL: [LayoutKind; 7] = [
        LayoutKind::Tile,
        LayoutKind::RTile,
        LayoutKind::Mono,
        LayoutKind::Grid,
        LayoutKind::Spiral,
        LayoutKind::Dwindle,
        LayoutKind::None,
    ];

    /// The command-line name of this layout.
    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Tile => "tile",
            LayoutKind::RTile => "rtile",
            LayoutKind::Mono => "mono",
            LayoutKind::Grid => "grid",
            LayoutKind::Spiral => "spiral",
            LayoutKind::Dwindle => "dwindle",
            LayoutKind::None => "none",
        }
    }

    /// Whether this layout tiles at all. `none` has no tile function so all
    /// of its clients are implicitly floating.
    pub fn is_tiling(&self) -> bool {
        !matches!(self, LayoutKind::None)
    }

    /// Whether dragging within the layout adjusts the column splits.
    pub fn supports_drag_resize(&self) -> bool {
        matches!(self, LayoutKind::Tile | LayoutKind::RTile)
    }

    /// The next layout in cycle order, wrapping at the end.
    pub fn cycled(&self) -> Self {
        let i = Self::ALL.iter().position(|k| k == self).unwrap_or(0);

        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl FromStr for LayoutKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .iter()
            .find(|k| k.name() == s)
            .copied()
            .ok_or_else(|| {
                bad_command!(
                    "invalid value for layout: {}\n\nexpected one of tile, rtile, mono, grid, spiral, dwindle, none",
                    s
                )
            })
    }
}

/// The slice of per-client state a layout is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// The client window
    pub id: Xid,
    /// Its configured border width
    pub bw: i32,
    /// Its user-adjusted height offset (tile columns only)
    pub hoff: i32,
}

/// Everything a layout pass needs to know about its workspace.
#[derive(Debug, Clone)]
pub struct LayoutCtx {
    /// Usable monitor rect with the workspace paddings already removed
    pub r: Rect,
    /// Tiled clients in list order
    pub tiles: Vec<Tile>,
    /// The workspace selection (monocle raises it)
    pub sel: Option<Xid>,
    /// Workspace gap in pixels
    pub gap: i32,
    /// Master count
    pub nmaster: usize,
    /// Stack count
    pub nstack: usize,
    /// Master split ratio
    pub msplit: f32,
    /// Stack split ratio
    pub ssplit: f32,
    /// Minimum tiled client dimension before popping to floating
    pub min_wh: i32,
    /// Drop the gap when only one client is tiled
    pub smart_gap: bool,
    /// Drop the border when only one client is tiled
    pub smart_border: bool,
}

/// A proposed position for one client. `r` excludes the border; `bw` is the
/// border width the client should be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The client window
    pub id: Xid,
    /// Proposed geometry, border excluded
    pub r: Rect,
    /// Border width to apply
    pub bw: i32,
}

/// The outcome of running a layout over one workspace.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    /// Geometry per tiled client, in list order
    pub placements: Vec<Placement>,
    /// Clients the layout could not fit: they transition to floating
    pub popped: Vec<Xid>,
    /// Clients to park off screen without resizing them (monocle keeps its
    /// non-selected clients mapped but out of sight)
    pub parked: Vec<Xid>,
    /// At least one client was clamped below its requested share
    pub overflowed: bool,
    /// The gap was dropped for a lone tiled client this pass
    pub smart_gap: bool,
}

/// Run `kind` against the given workspace context.
pub fn layout(kind: LayoutKind, ctx: &LayoutCtx) -> LayoutResult {
    match kind {
        LayoutKind::Tile => column_tile(ctx, false),
        LayoutKind::RTile => column_tile(ctx, true),
        LayoutKind::Mono => mono(ctx),
        LayoutKind::Grid => grid(ctx),
        LayoutKind::Spiral => fibonacci(ctx, true),
        LayoutKind::Dwindle => fibonacci(ctx, false),
        LayoutKind::None => LayoutResult::default(),
    }
}

// The gap used this pass plus whether smart gap kicked in.
fn effective_gap(ctx: &LayoutCtx, n: usize) -> (i32, bool) {
    if ctx.smart_gap && n == 1 {
        (0, true)
    } else {
        (ctx.gap, false)
    }
}

fn effective_bw(ctx: &LayoutCtx, n: usize, bw: i32) -> i32 {
    if ctx.smart_border && n == 1 {
        0
    } else {
        bw
    }
}

/// The master/stack/overflow column tiler, mirrored for `rtile`.
///
/// Column widths come from `msplit`/`ssplit`; each column divides its height
/// between its clients adjusted by per-client height offsets. When a height
/// offset squeezes a client below the minimum the previous client's height
/// absorbs the deficit, and a client that cannot fit at all pops to floating.
fn column_tile(ctx: &LayoutCtx, mirrored: bool) -> LayoutResult {
    let n = ctx.tiles.len();
    let mut res = LayoutResult::default();
    if n == 0 {
        return res;
    }

    let (g, smart) = effective_gap(ctx, n);
    res.smart_gap = smart;

    let Rect { x: wx, y: wy, w: ww, h: wh } = ctx.r;
    let (nm, ns_cfg) = (ctx.nmaster, ctx.nstack);
    let min_wh = ctx.min_wh;

    // Column widths. `ns` is the number of gap seams at the master edge,
    // `ss` marks a rightmost column being present.
    let mut mw = 0;
    let mut sw = 0;
    let mut ssw = 0;
    let mut ss = 0;
    let mut ns = 1;

    if n <= nm {
        mw = ww;
        ss = 1;
    } else if nm > 0 {
        ns = 2;
        mw = (ww as f32 * ctx.msplit) as i32;
    }
    if n.saturating_sub(nm) <= ns_cfg {
        sw = ww - mw;
    } else if ns_cfg > 0 {
        sw = ((ww - mw) as f32 * ctx.ssplit) as i32;
    }
    if n.saturating_sub(nm) > ns_cfg {
        ss = 1;
        ssw = ww - mw - sw;
    }
    if nm == 0 {
        ss = 0;
    }

    struct Geo {
        id: Xid,
        r: [i32; 4],
        bw: i32,
        popped: bool,
    }

    let mut geo: Vec<Geo> = Vec::with_capacity(n);
    let (mut my, mut sy, mut ssy) = (g, g, g);
    // Index of the previous client in the same column, for deficit handling.
    let mut p: Option<usize> = None;
    let mut pbw = 0;

    for (i, t) in ctx.tiles.iter().enumerate() {
        let (remain, x, y, col_w) = if i < nm {
            (
                nm.min(n) - i,
                g,
                &mut my,
                mw - g * (5 - ns) / 2,
            )
        } else if i - nm < ns_cfg {
            let extra = if nm == 0 && n > nm + ns_cfg { g / 2 } else { 0 };
            (
                (n - nm).min(ns_cfg) - (i - nm),
                if mirrored {
                    if n <= nm + ns_cfg {
                        g
                    } else {
                        (ssw + g / ns) - extra
                    }
                } else {
                    mw + g / ns
                },
                &mut sy,
                (sw - g * (5 - ns - ss) / 2) + extra,
            )
        } else {
            let extra = if nm == 0 { g / 2 } else { 0 };
            (
                n - i,
                if mirrored { g } else { mw + sw + g / ns - extra },
                &mut ssy,
                ssw - g * (5 - ns) / 2 + extra,
            )
        };

        let bw = effective_bw(ctx, n, t.bw);
        let gx = wx + x;
        let gy = wy + *y;
        let mut gw = col_w;
        let mut gh;
        let mut popped = false;
        let mut adjusted_y = gy;

        if p.is_none() && remain == 1 {
            gh = wh - *y - g;
        } else {
            gh = (wh - *y) / remain.max(1) as i32 - g + t.hoff;
            let available = wh - (*y + gh + g);

            if t.hoff == 0 && gh - 2 * bw < min_wh {
                popped = true;
                res.popped.push(t.id);
            } else if remain > 1 && (remain as i32 - 1) * (min_wh + g + 2 * bw) > available {
                gh += available - (remain as i32 - 1) * (min_wh + g + 2 * bw);
                res.overflowed = true;
            } else if remain == 1 && *y + gh != wh - g {
                if let Some(pi) = p {
                    let (ph, py) = (geo[pi].r[3], geo[pi].r[1]);
                    if ph + available < min_wh + 2 * bw {
                        geo[pi].r[3] = min_wh + 2 * pbw;
                        adjusted_y = py + geo[pi].r[3] + g + 2 * pbw;
                        gh = (wh - 2 * g) - (py + geo[pi].r[3]) - 2 * pbw;
                        res.overflowed = true;
                    } else if gh <= min_wh {
                        geo[pi].r[3] -= min_wh - gh + 2 * bw;
                        adjusted_y = py + geo[pi].r[3] + g;
                        gh = min_wh + 2 * bw;
                        res.overflowed = true;
                    } else {
                        geo[pi].r[3] += available;
                        adjusted_y += available;
                    }
                } else {
                    gh = available;
                }
            } else if gh - 2 * bw < min_wh {
                gh = if remain == 1 { wh - 2 * g } else { min_wh + 2 * bw };
                res.overflowed = true;
            }
        }

        if !popped {
            *y = (adjusted_y - wy) + gh + g;
            gw -= 2 * bw;
            gh -= 2 * bw;
        }
        geo.push(Geo {
            id: t.id,
            r: [gx, adjusted_y, gw, gh],
            bw,
            popped,
        });
        p = if remain == 1 { None } else { Some(i) };
        pbw = bw;
    }

    for gc in geo {
        if gc.popped {
            continue;
        }
        if gc.r[3] <= min_wh {
            res.overflowed = true;
        }
        res.placements.push(Placement {
            id: gc.id,
            r: Rect::new(gc.r[0], gc.r[1], gc.r[2], gc.r[3]),
            bw: gc.bw,
        });
    }

    res
}

/// Every tiled client gets the full usable rect; all but the selected one
/// are parked off screen (still mapped) so refresh cycles stay stable.
fn mono(ctx: &LayoutCtx) -> LayoutResult {
    let mut res = LayoutResult::default();
    let sel = match ctx.sel {
        Some(sel) => sel,
        None => return res,
    };

    // Smart gap applies unconditionally here: one client is ever visible.
    let (g, smart) = if ctx.smart_gap { (0, true) } else { (ctx.gap, false) };
    res.smart_gap = smart;

    for t in ctx.tiles.iter() {
        let bw = if ctx.smart_border { 0 } else { t.bw };
        let r = Rect::new(
            ctx.r.x + g,
            ctx.r.y + g,
            ctx.r.w - 2 * g - 2 * bw,
            ctx.r.h - 2 * g - 2 * bw,
        );

        res.placements.push(Placement { id: t.id, r, bw });
        if t.id != sel {
            res.parked.push(t.id);
        }
    }

    res
}

/// Rows x cols chosen so that `cols² >= n` and `cols <= n / 2`, filled
/// column-major. Five clients get two columns rather than three.
fn grid(ctx: &LayoutCtx) -> LayoutResult {
    let n = ctx.tiles.len();
    let mut res = LayoutResult::default();
    if n == 0 {
        return res;
    }

    let (g, smart) = effective_gap(ctx, n);
    res.smart_gap = smart;

    let mut cols = 0;
    while cols <= n / 2 {
        if cols * cols >= n {
            break;
        }
        cols += 1;
    }
    if n == 5 {
        cols = 2;
    }
    let cols = cols.max(1) as i32;
    let mut rows = (n as i32) / cols;

    let Rect { x: wx, y: wy, w: ww, h: wh } = ctx.r;
    let (mut col, mut row) = (0, 0);

    for (i, t) in ctx.tiles.iter().enumerate() {
        if (i as i32) / rows.max(1) + 1 > cols - (n as i32) % cols {
            rows = n as i32 / cols + 1;
        }
        let bw = effective_bw(ctx, n, t.bw);
        let ch = if rows > 0 { (wh - g) / rows } else { wh };
        let cw = if cols > 0 { (ww - g) / cols } else { ww };

        res.placements.push(Placement {
            id: t.id,
            r: Rect::new(
                (wx + g) + col * cw,
                (wy + g) + row * ch,
                cw - 2 * bw - g,
                ch - 2 * bw - g,
            ),
            bw,
        });

        row += 1;
        if row >= rows {
            row = 0;
            col += 1;
        }
    }

    res
}

/// The Fibonacci splitter behind `spiral` and `dwindle`: each step halves
/// the remaining rect along alternating axes. Spiral rotates the direction
/// every step; dwindle always splits towards the bottom right.
fn fibonacci(ctx: &LayoutCtx, spiral: bool) -> LayoutResult {
    let n = ctx.tiles.len();
    let mut res = LayoutResult::default();
    if n == 0 {
        return res;
    }

    let (g, smart) = effective_gap(ctx, n);
    res.smart_gap = smart;

    let Rect { x: wx, y: wy, w: full_w, h: full_h } = ctx.r;
    let (mut x, mut y, mut w, mut h) = (wx, wy, full_w, full_h);
    let ww = full_w;
    let mut ran_out = false;

    for (i, t) in ctx.tiles.iter().enumerate() {
        let (ox, oy) = (x, y);
        let horizontal = i % 2 == 0;
        let b = effective_bw(ctx, n, t.bw);

        if i < n - 1 {
            if horizontal {
                w /= 2;
            } else {
                h /= 2;
            }
            if spiral {
                if i % 4 == 2 {
                    x += w;
                } else if i % 4 == 3 {
                    y += h;
                }
            }
        }
        if spiral {
            match i % 4 {
                0 => y -= h,
                1 => x += w,
                2 => y += h,
                _ => x -= w,
            }
        } else {
            match i % 4 {
                0 | 2 => y += h,
                _ => x += w,
            }
        }
        if i == 0 {
            w = if n > 1 {
                (ww as f32 * ctx.msplit) as i32 - g / 2
            } else {
                ww - g
            };
            h -= g;
            y = wy;
        } else if i == 1 {
            w = ww - ((ww as f32 * ctx.msplit) as i32 + g / 2);
        }

        let split_dim = if horizontal { &mut w } else { &mut h };
        if ran_out || *split_dim - g - 2 * b < ctx.min_wh {
            if ran_out {
                res.popped.push(t.id);
                res.overflowed = true;
                continue;
            }
            ran_out = true;
            *split_dim *= 2;
            res.overflowed = true;
            if horizontal {
                x = ox;
            } else {
                y = oy;
            }
        }

        res.placements.push(Placement {
            id: t.id,
            r: Rect::new(x + g, y + g, w - g - 2 * b, h - g - 2 * b),
            bw: b,
        });
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn ctx(n: usize, r: Rect) -> LayoutCtx {
        LayoutCtx {
            r,
            tiles: (1..=n as u32)
                .map(|i| Tile { id: Xid::from(i), bw: 1, hoff: 0 })
                .collect(),
            sel: Some(Xid::from(1)),
            gap: 0,
            nmaster: 1,
            nstack: 3,
            msplit: 0.5,
            ssplit: 0.55,
            min_wh: 50,
            smart_gap: false,
            smart_border: false,
        }
    }

    #[test]
    fn two_clients_split_at_msplit() {
        let res = layout(LayoutKind::Tile, &ctx(2, Rect::new(0, 0, 1920, 1080)));

        assert!(res.popped.is_empty());
        assert!(!res.overflowed);
        assert_eq!(res.placements[0].r, Rect::new(0, 0, 958, 1078));
        assert_eq!(res.placements[1].r, Rect::new(960, 0, 958, 1078));
    }

    #[test]
    fn rtile_mirrors_tile() {
        let res = layout(LayoutKind::RTile, &ctx(2, Rect::new(0, 0, 1920, 1080)));

        // Master on the right, stack on the left.
        assert_eq!(res.placements[0].r, Rect::new(960, 0, 958, 1078));
        assert_eq!(res.placements[1].r, Rect::new(0, 0, 958, 1078));
    }

    #[test_case(1; "single")]
    #[test_case(2; "master and stack")]
    #[test_case(4; "full stack column")]
    #[test_case(6; "overflow column")]
    #[test_case(9; "heavy overflow")]
    #[test]
    fn tile_rects_stay_within_bounds_and_disjoint(n: usize) {
        let r = Rect::new(0, 0, 1920, 1080);
        let res = layout(LayoutKind::Tile, &ctx(n, r));

        assert_eq!(res.placements.len(), n);
        for p in res.placements.iter() {
            let frame = Rect::new(p.r.x, p.r.y, p.r.w + 2 * p.bw, p.r.h + 2 * p.bw);
            assert!(r.contains(&frame), "{:?} outside {:?}", frame, r);
        }
        for (i, a) in res.placements.iter().enumerate() {
            for b in res.placements.iter().skip(i + 1) {
                let fa = Rect::new(a.r.x, a.r.y, a.r.w + 2 * a.bw, a.r.h + 2 * a.bw);
                let fb = Rect::new(b.r.x, b.r.y, b.r.w + 2 * b.bw, b.r.h + 2 * b.bw);
                assert_eq!(fa.intersection_area(&fb), 0, "{:?} overlaps {:?}", fa, fb);
            }
        }
    }

    #[test]
    fn zero_master_splits_by_ssplit() {
        let mut c = ctx(4, Rect::new(0, 0, 1920, 1080));
        c.nmaster = 0;
        c.nstack = 2;

        let res = layout(LayoutKind::Tile, &c);

        // Stack column takes ssplit of the full width, overflow the rest.
        assert_eq!(res.placements.len(), 4);
        let stack_w = (1920.0 * 0.55) as i32;
        assert_eq!(res.placements[0].r.w, stack_w - 2);
    }

    #[test]
    fn gaps_are_inserted_between_clients() {
        let mut c = ctx(2, Rect::new(0, 0, 1920, 1080));
        c.gap = 10;

        let res = layout(LayoutKind::Tile, &c);
        let a = res.placements[0];
        let b = res.placements[1];

        assert_eq!(a.r.x, 10);
        assert_eq!(a.r.y, 10);
        // Frames of the two clients never touch.
        assert!(a.r.x + a.r.w + 2 * a.bw + 10 <= b.r.x);
    }

    #[test]
    fn smart_gap_drops_gap_for_lone_client() {
        let mut c = ctx(1, Rect::new(0, 0, 1920, 1080));
        c.gap = 20;
        c.smart_gap = true;

        let res = layout(LayoutKind::Tile, &c);

        assert!(res.smart_gap);
        assert_eq!(res.placements[0].r, Rect::new(0, 0, 1918, 1078));
    }

    #[test]
    fn smart_border_drops_border_for_lone_client() {
        let mut c = ctx(1, Rect::new(0, 0, 1920, 1080));
        c.smart_border = true;

        let res = layout(LayoutKind::Tile, &c);

        assert_eq!(res.placements[0].bw, 0);
        assert_eq!(res.placements[0].r, Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn hoff_is_absorbed_by_the_previous_client() {
        let mut c = ctx(3, Rect::new(0, 0, 1920, 1080));
        c.tiles[1].hoff = 100;

        let res = layout(LayoutKind::Tile, &c);

        // Stack column: client 2 grew by ~100, client 3 shrank to fit.
        let b = res.placements[1];
        let cc = res.placements[2];
        assert!(b.r.h > cc.r.h);
        assert_eq!(cc.r.y + cc.r.h + cc.bw * 2, 1080);
    }

    #[test]
    fn too_small_tile_pops_to_floating() {
        // A 60px tall screen cannot hold two stacked 50px clients: the
        // second stack client is popped out to floating.
        let mut c = ctx(3, Rect::new(0, 0, 600, 60));
        c.min_wh = 50;

        let res = layout(LayoutKind::Tile, &c);

        assert_eq!(res.popped, vec![Xid::from(2)]);
        assert!(res.placements.iter().all(|p| p.id != Xid::from(2)));
    }

    #[test]
    fn mono_gives_selected_the_full_rect_and_parks_the_rest() {
        let mut c = ctx(3, Rect::new(0, 0, 1920, 1080));
        c.sel = Some(Xid::from(2));

        let res = layout(LayoutKind::Mono, &c);

        assert_eq!(res.placements.len(), 3);
        for p in res.placements.iter() {
            assert_eq!(p.r, Rect::new(0, 0, 1918, 1078));
        }
        assert_eq!(res.parked, vec![Xid::from(1), Xid::from(3)]);
    }

    #[test]
    fn mono_without_selection_places_nothing() {
        let mut c = ctx(3, Rect::new(0, 0, 1920, 1080));
        c.sel = None;

        let res = layout(LayoutKind::Mono, &c);

        assert!(res.placements.is_empty());
    }

    #[test_case(1, 1; "one client one column")]
    #[test_case(2, 2; "two clients two columns")]
    #[test_case(4, 2; "four clients two columns")]
    #[test_case(5, 2; "five clients special cased")]
    #[test_case(9, 3; "nine clients three columns")]
    #[test]
    fn grid_column_counts(n: usize, cols: i32) {
        let res = layout(LayoutKind::Grid, &ctx(n, Rect::new(0, 0, 1920, 1080)));

        let distinct_x: std::collections::HashSet<i32> =
            res.placements.iter().map(|p| p.r.x).collect();
        assert_eq!(distinct_x.len() as i32, cols);
    }

    #[test_case(LayoutKind::Spiral; "spiral")]
    #[test_case(LayoutKind::Dwindle; "dwindle")]
    #[test]
    fn fibonacci_first_split_follows_msplit(kind: LayoutKind) {
        let res = layout(kind, &ctx(2, Rect::new(0, 0, 1920, 1080)));

        assert_eq!(res.placements[0].r.w, 958);
        assert_eq!(res.placements[1].r.x, 960);
    }

    #[test_case(LayoutKind::Spiral; "spiral")]
    #[test_case(LayoutKind::Dwindle; "dwindle")]
    #[test]
    fn fibonacci_stays_in_bounds(kind: LayoutKind) {
        let r = Rect::new(0, 0, 1920, 1080);
        for n in 1..=6 {
            let res = layout(kind, &ctx(n, r));
            for p in res.placements.iter() {
                let frame = Rect::new(p.r.x, p.r.y, p.r.w + 2 * p.bw, p.r.h + 2 * p.bw);
                assert!(r.contains(&frame), "n={}: {:?} outside {:?}", n, frame, r);
            }
        }
    }

    #[test]
    fn none_layout_places_nothing() {
        let res = layout(LayoutKind::None, &ctx(3, Rect::new(0, 0, 1920, 1080)));

        assert_eq!(res, LayoutResult::default());
    }

    #[test]
    fn layout_cycle_covers_all_and_wraps() {
        let mut k = LayoutKind::Tile;
        for _ in 0..LayoutKind::ALL.len() {
            k = k.cycled();
        }

        assert_eq!(k, LayoutKind::Tile);
    }
}
