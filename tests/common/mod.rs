//! Shared fixtures for driving the window manager against the mock
//! transport.
#![allow(dead_code)]
use lath::{
    core::Wm,
    pure::{geometry::Rect, model::Config},
    x::{mock::MockXConn, OutputInfo, Prop},
    Xid,
};

pub const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

/// A window manager over one mocked 1920x1080 monitor.
pub fn wm(cfg: Config) -> Wm<MockXConn> {
    let conn = MockXConn::new(SCREEN);

    Wm::new(conn, cfg).expect("mock wm to initialize")
}

/// A window manager over two mocked side-by-side 1920x1080 monitors.
pub fn dual_wm(cfg: Config) -> Wm<MockXConn> {
    let mut conn = MockXConn::new(Rect::new(0, 0, 3840, 1080));
    conn.set_outputs(vec![
        OutputInfo {
            id: 1,
            name: "MOCK-1".to_string(),
            r: Rect::new(0, 0, 1920, 1080),
            primary: true,
        },
        OutputInfo {
            id: 2,
            name: "MOCK-2".to_string(),
            r: Rect::new(1920, 0, 1920, 1080),
            primary: false,
        },
    ]);

    Wm::new(conn, cfg).expect("mock wm to initialize")
}

/// Register a window with the mock server and manage it.
pub fn manage(wm: &mut Wm<MockXConn>, id: u32, r: Rect) -> Xid {
    let id = Xid::from(id);
    wm.x.add_window(id, r);
    wm.manage(id, false);

    id
}

/// Register a window with a WM_CLASS pair before managing it.
pub fn manage_with_class(wm: &mut Wm<MockXConn>, id: u32, r: Rect, class: &str) -> Xid {
    let id = Xid::from(id);
    wm.x.add_window(id, r);
    wm.x.set_window_prop(
        id,
        "WM_CLASS",
        Prop::UTF8String(vec![class.to_string(), class.to_string()]),
    );
    wm.manage(id, false);

    id
}
