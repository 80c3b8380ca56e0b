//! A recording, scriptable [XConn] for driving the window manager in tests
//! without a live X server.
use crate::{
    pure::{
        geometry::{Point, Rect},
        model::MouseCfg,
    },
    x::{
        ClientAttr, ClientConfig, CursorKind, OutputInfo, Prop, WindowAttributes, WmState, XConn,
        XEvent,
    },
    Error, Result, Xid,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    os::unix::io::RawFd,
};

/// Every state-changing request issued through the mock, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// map()
    Map(Xid),
    /// unmap()
    Unmap(Xid),
    /// kill()
    Kill(Xid),
    /// focus()
    Focus(Xid),
    /// set_client_attributes()
    Attrs(Xid, Vec<ClientAttr>),
    /// set_client_config()
    Config(Xid, Vec<ClientConfig>),
    /// send_protocol_message()
    Protocol(Xid, String),
    /// send_configure_notify()
    ConfigureNotify(Xid, Rect, i32),
    /// set_prop()
    SetProp(Xid, String, Prop),
    /// delete_prop()
    DeleteProp(Xid, String),
    /// set_wm_state()
    SetWmState(Xid, WmState),
    /// grab_pointer()
    GrabPointer(CursorKind),
    /// ungrab_pointer()
    UngrabPointer,
    /// grab_buttons()
    GrabButtons(Xid),
    /// warp_pointer()
    WarpPointer(Xid, i32, i32),
}

/// A scriptable in-memory X server double.
///
/// Windows are registered up front with their geometry, attributes and
/// properties; events are fed through [MockXConn::enqueue]. All mutating
/// calls are recorded for assertion.
#[derive(Debug, Default)]
pub struct MockXConn {
    screen: Rect,
    outputs: Vec<OutputInfo>,
    windows: RefCell<HashMap<Xid, MockWindow>>,
    events: RefCell<VecDeque<XEvent>>,
    calls: RefCell<Vec<MockCall>>,
    cursor: RefCell<Point>,
    atoms: RefCell<Vec<String>>,
}

#[derive(Debug, Default, Clone)]
struct MockWindow {
    geometry: Rect,
    attrs: WindowAttributes,
    props: HashMap<String, Prop>,
}

impl MockXConn {
    /// A mock server with a single screen-sized output named `MOCK-1`.
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            outputs: vec![OutputInfo {
                id: 1,
                name: "MOCK-1".to_string(),
                r: screen,
                primary: true,
            }],
            ..Default::default()
        }
    }

    /// Replace the advertised RandR outputs.
    pub fn set_outputs(&mut self, outputs: Vec<OutputInfo>) {
        self.outputs = outputs;
    }

    /// Register a window with the given geometry and no properties.
    pub fn add_window(&self, id: Xid, geometry: Rect) {
        self.windows.borrow_mut().insert(
            id,
            MockWindow {
                geometry,
                attrs: WindowAttributes { override_redirect: false, viewable: true },
                props: HashMap::new(),
            },
        );
    }

    /// Set a property on a registered window.
    pub fn set_window_prop(&self, id: Xid, name: &str, value: Prop) {
        if let Some(w) = self.windows.borrow_mut().get_mut(&id) {
            w.props.insert(name.to_string(), value);
        }
    }

    /// Queue an event for the next poll.
    pub fn enqueue(&self, ev: XEvent) {
        self.events.borrow_mut().push_back(ev);
    }

    /// All recorded calls so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    /// Drop the recorded call log.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: MockCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl XConn for MockXConn {
    fn root(&self) -> Xid {
        Xid(1)
    }

    fn screen_size(&self) -> Rect {
        self.screen
    }

    fn register_wm(&self) -> Result<()> {
        Ok(())
    }

    fn create_check_window(&self) -> Result<Xid> {
        let id = Xid(0xc4ec);
        self.windows.borrow_mut().insert(
            id,
            MockWindow {
                geometry: Rect::new(0, 0, 1, 1),
                attrs: WindowAttributes { override_redirect: true, viewable: false },
                props: HashMap::new(),
            },
        );

        Ok(id)
    }

    fn intern_atom(&self, name: &str) -> Result<u32> {
        let mut atoms = self.atoms.borrow_mut();
        if let Some(i) = atoms.iter().position(|a| a == name) {
            return Ok(i as u32 + 1);
        }
        atoms.push(name.to_string());

        Ok(atoms.len() as u32)
    }

    fn atom_name(&self, id: u32) -> Result<String> {
        self.atoms
            .borrow()
            .get(id.saturating_sub(1) as usize)
            .cloned()
            .ok_or_else(|| Error::BadCommand(format!("unknown atom id {}", id)))
    }

    fn outputs(&self) -> Result<Vec<OutputInfo>> {
        Ok(self.outputs.clone())
    }

    fn cursor_position(&self) -> Result<Point> {
        Ok(*self.cursor.borrow())
    }

    fn warp_pointer(&self, id: Xid, x: i32, y: i32) -> Result<()> {
        *self.cursor.borrow_mut() = Point::new(x, y);
        self.record(MockCall::WarpPointer(id, x, y));

        Ok(())
    }

    fn existing_windows(&self) -> Result<Vec<Xid>> {
        let mut ids: Vec<Xid> = self.windows.borrow().keys().copied().collect();
        ids.sort();

        Ok(ids)
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        self.windows
            .borrow()
            .get(&id)
            .map(|w| w.attrs)
            .ok_or(Error::UnknownClient(id))
    }

    fn window_geometry(&self, id: Xid) -> Result<Rect> {
        self.windows
            .borrow()
            .get(&id)
            .map(|w| w.geometry)
            .ok_or(Error::UnknownClient(id))
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.record(MockCall::Map(id));
        Ok(())
    }

    fn unmap(&self, id: Xid) -> Result<()> {
        self.record(MockCall::Unmap(id));
        Ok(())
    }

    fn kill(&self, id: Xid) -> Result<()> {
        self.record(MockCall::Kill(id));
        Ok(())
    }

    fn focus(&self, id: Xid) -> Result<()> {
        self.record(MockCall::Focus(id));
        Ok(())
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        self.record(MockCall::Attrs(id, attrs.to_vec()));
        Ok(())
    }

    fn set_client_config(&self, id: Xid, conf: &[ClientConfig]) -> Result<()> {
        for c in conf {
            if let Some(w) = self.windows.borrow_mut().get_mut(&id) {
                match c {
                    ClientConfig::Position(r) => w.geometry = *r,
                    ClientConfig::Move(p) => {
                        w.geometry.x = p.x;
                        w.geometry.y = p.y;
                    }
                    _ => (),
                }
            }
        }
        self.record(MockCall::Config(id, conf.to_vec()));

        Ok(())
    }

    fn send_protocol_message(&self, id: Xid, proto: &str) -> Result<()> {
        self.record(MockCall::Protocol(id, proto.to_string()));
        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        self.record(MockCall::ConfigureNotify(id, r, bw));
        Ok(())
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        Ok(self
            .windows
            .borrow()
            .get(&id)
            .and_then(|w| w.props.get(name).cloned()))
    }

    fn set_prop(&self, id: Xid, name: &str, value: Prop) -> Result<()> {
        if let Some(w) = self.windows.borrow_mut().get_mut(&id) {
            w.props.insert(name.to_string(), value.clone());
        }
        self.record(MockCall::SetProp(id, name.to_string(), value));

        Ok(())
    }

    fn delete_prop(&self, id: Xid, name: &str) -> Result<()> {
        if let Some(w) = self.windows.borrow_mut().get_mut(&id) {
            w.props.remove(name);
        }
        self.record(MockCall::DeleteProp(id, name.to_string()));

        Ok(())
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.record(MockCall::SetWmState(id, state));
        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<()> {
        self.record(MockCall::GrabPointer(cursor));
        Ok(())
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.record(MockCall::UngrabPointer);
        Ok(())
    }

    fn grab_buttons(&self, id: Xid, _mouse: &MouseCfg) -> Result<()> {
        self.record(MockCall::GrabButtons(id));
        Ok(())
    }

    fn allow_pointer_events(&self) -> Result<()> {
        Ok(())
    }

    fn refresh_keyboard_mapping(&self) -> Result<()> {
        Ok(())
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        Ok(self.events.borrow_mut().pop_front())
    }

    fn next_event(&self) -> Result<XEvent> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::BadCommand("mock event queue exhausted".to_string()))
    }

    fn push_back_event(&self, event: XEvent) {
        self.events.borrow_mut().push_front(event);
    }

    fn connection_fd(&self) -> RawFd {
        -1
    }

    fn flush(&self) {}
}
