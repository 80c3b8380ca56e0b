//! Tests that layouts behave as expected across client counts.
use lath::{
    layout::{layout, LayoutCtx, LayoutKind, Tile},
    pure::geometry::Rect,
    Xid,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use simple_test_case::test_case;

const R_SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
const MAX_CLIENTS: usize = 10;

fn ctx(n: usize, r: Rect) -> LayoutCtx {
    LayoutCtx {
        r,
        tiles: (1..=n as u32)
            .map(|i| Tile { id: Xid::from(i), bw: 1, hoff: 0 })
            .collect(),
        sel: (n > 0).then(|| Xid::from(1)),
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

fn frame(p: &lath::layout::Placement) -> Rect {
    Rect::new(p.r.x, p.r.y, p.r.w + 2 * p.bw, p.r.h + 2 * p.bw)
}

#[test_case(LayoutKind::Tile; "tile")]
#[test_case(LayoutKind::RTile; "rtile")]
#[test_case(LayoutKind::Grid; "grid")]
#[test_case(LayoutKind::Spiral; "spiral")]
#[test_case(LayoutKind::Dwindle; "dwindle")]
#[test]
fn placements_are_disjoint_and_in_bounds(kind: LayoutKind) {
    for n in 1..=MAX_CLIENTS {
        let res = layout(kind, &ctx(n, R_SCREEN));

        for p in res.placements.iter() {
            assert!(
                R_SCREEN.contains(&frame(p)),
                "{:?} n={}: {:?} escapes the screen",
                kind,
                n,
                p
            );
        }
        for (i, a) in res.placements.iter().enumerate() {
            for b in res.placements.iter().skip(i + 1) {
                assert_eq!(
                    frame(a).intersection_area(&frame(b)),
                    0,
                    "{:?} n={}: {} overlaps {}",
                    kind,
                    n,
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[test_case(LayoutKind::Tile; "tile")]
#[test_case(LayoutKind::RTile; "rtile")]
#[test_case(LayoutKind::Grid; "grid")]
#[test_case(LayoutKind::Spiral; "spiral")]
#[test_case(LayoutKind::Dwindle; "dwindle")]
#[test_case(LayoutKind::Mono; "mono")]
#[test]
fn every_tile_is_placed_or_popped(kind: LayoutKind) {
    for n in 1..=MAX_CLIENTS {
        let c = ctx(n, R_SCREEN);
        let res = layout(kind, &c);

        assert_eq!(
            res.placements.len() + res.popped.len(),
            n,
            "{:?} n={}",
            kind,
            n
        );
    }
}

#[test]
fn workspace_paddings_inset_the_layout_area() {
    let padded = R_SCREEN.with_padding(20, 30, 40, 50);
    let res = layout(LayoutKind::Tile, &ctx(4, padded));

    for p in res.placements.iter() {
        assert!(padded.contains(&frame(p)));
    }
}

#[quickcheck]
fn tile_respects_arbitrary_splits(n: u8, msplit: f32, nmaster: u8) -> TestResult {
    let n = (n % 10) as usize;
    if n == 0 || !(0.0..=1.0).contains(&msplit) {
        return TestResult::discard();
    }

    let mut c = ctx(n, R_SCREEN);
    c.msplit = msplit.clamp(0.05, 0.95);
    c.nmaster = (nmaster % 4) as usize;

    let res = layout(LayoutKind::Tile, &c);
    for p in res.placements.iter() {
        if !R_SCREEN.contains(&frame(p)) {
            return TestResult::failed();
        }
    }

    TestResult::passed()
}

#[quickcheck]
fn gaps_never_push_tiles_out_of_bounds(n: u8, gap: u8) -> TestResult {
    let n = (n % 8) as usize;
    if n == 0 {
        return TestResult::discard();
    }

    let mut c = ctx(n, R_SCREEN);
    c.gap = (gap % 50) as i32;

    let res = layout(LayoutKind::Tile, &c);
    for p in res.placements.iter() {
        if !R_SCREEN.contains(&frame(p)) {
            return TestResult::failed();
        }
    }

    TestResult::passed()
}
