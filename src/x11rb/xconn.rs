//! An [XConn] implementation backed by the x11rb crate.
use crate::{
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
        model::MouseCfg,
    },
    x::{
        Atom, ClientAttr, ClientConfig, ConfigureEvent, ConfigureRequest, CursorKind,
        MouseEvent, OutputInfo, PointerChange, Prop, PropertyEvent, WindowAttributes, WmHints,
        WmState, XConn, XEvent,
    },
    Error as CrateError, Result, Xid,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    os::unix::io::{AsRawFd, RawFd},
};
use strum::IntoEnumIterator;
use tracing::{trace, warn};
use x11rb::{
    connection::{Connection, RequestConnection},
    cursor::Handle as CursorHandle,
    properties::{WmClass, WmHints as XWmHints, WmSizeHints},
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            Allow, AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent,
            ConfigWindow, ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, GrabMode, InputFocus, MapState, ModMask,
            NotifyDetail, NotifyMode, PropMode, StackMode, WindowClass, CONFIGURE_NOTIFY_EVENT,
        },
        Event,
    },
    resource_manager,
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

use super::Error;

fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::POINTER_MOTION
        | EventMask::PROPERTY_CHANGE
}

fn client_event_mask() -> EventMask {
    EventMask::ENTER_WINDOW
        | EventMask::FOCUS_CHANGE
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

fn client_unmap_mask() -> EventMask {
    EventMask::ENTER_WINDOW | EventMask::FOCUS_CHANGE | EventMask::PROPERTY_CHANGE
}

/// Handles communication with an X server via x11rb.
pub struct RustConn {
    conn: RustConnection,
    root: Xid,
    screen: Rect,
    atoms: RefCell<HashMap<String, u32>>,
    names: RefCell<HashMap<u32, String>>,
    cursors: HashMap<CursorKind, u32>,
    pending: RefCell<VecDeque<XEvent>>,
}

impl RustConn {
    /// Connect to the display named by `$DISPLAY` and intern the fixed atom
    /// set.
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None).map_err(Error::from)?;
        let s = &conn.setup().roots[screen_num];
        let root = Xid::from(s.root);
        let screen = Rect::new(0, 0, s.width_in_pixels as i32, s.height_in_pixels as i32);

        if conn
            .extension_information(randr::X11_EXTENSION_NAME)
            .map_err(Error::from)?
            .is_none()
        {
            return Err(Error::MissingRandRSupport.into());
        }
        conn.randr_select_input(
            *root,
            randr::NotifyMask::SCREEN_CHANGE
                | randr::NotifyMask::OUTPUT_CHANGE
                | randr::NotifyMask::CRTC_CHANGE,
        )
        .map_err(Error::from)?;

        // Intern the full atom set up front; anything else on demand.
        let cookies: Vec<_> = Atom::iter()
            .map(|a| (a, conn.intern_atom(false, a.as_ref().as_bytes())))
            .collect();
        let mut atoms = HashMap::new();
        let mut names = HashMap::new();
        for (a, cookie) in cookies {
            let id = cookie
                .map_err(Error::from)?
                .reply()
                .map_err(Error::from)?
                .atom;
            atoms.insert(a.as_ref().to_string(), id);
            names.insert(id, a.as_ref().to_string());
        }

        let db =
            resource_manager::new_from_default(&conn).map_err(|e| Error::from(e))?;
        let handle = CursorHandle::new(&conn, screen_num, &db)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;
        let mut cursors = HashMap::new();
        for (kind, name) in [
            (CursorKind::Normal, "left_ptr"),
            (CursorKind::Move, "fleur"),
            (CursorKind::Resize, "sizing"),
        ] {
            let c = handle.load_cursor(&conn, name).map_err(Error::from)?;
            cursors.insert(kind, c);
        }

        let this = Self {
            conn,
            root,
            screen,
            atoms: RefCell::new(atoms),
            names: RefCell::new(names),
            cursors,
            pending: RefCell::new(VecDeque::new()),
        };

        if let Some(&normal) = this.cursors.get(&CursorKind::Normal) {
            let aux = ChangeWindowAttributesAux::new().cursor(normal);
            let _ = this.conn.change_window_attributes(*this.root, &aux);
        }

        Ok(this)
    }

    fn atom_id(&self, name: &str) -> Result<u32> {
        if let Some(&id) = self.atoms.borrow().get(name) {
            return Ok(id);
        }

        let id = self
            .conn
            .intern_atom(false, name.as_bytes())
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?
            .atom;
        self.atoms.borrow_mut().insert(name.to_string(), id);
        self.names.borrow_mut().insert(id, name.to_string());

        Ok(id)
    }

    fn id_to_name(&self, id: u32) -> Result<String> {
        if let Some(name) = self.names.borrow().get(&id) {
            return Ok(name.clone());
        }

        let reply = self
            .conn
            .get_atom_name(id)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;
        let name = String::from_utf8_lossy(&reply.name).to_string();
        self.atoms.borrow_mut().insert(name.clone(), id);
        self.names.borrow_mut().insert(id, name.clone());

        Ok(name)
    }

    // Translate one raw event, skipping those the window manager does not
    // react to.
    fn convert_event(&self, ev: Event) -> Option<XEvent> {
        let synthetic = |rt: u8| rt & 0x80 != 0;

        match ev {
            Event::ButtonPress(e) => Some(XEvent::ButtonPress(MouseEvent {
                id: Xid::from(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                state: u16::from(e.state),
                button: e.detail,
            })),
            Event::ButtonRelease(e) => Some(XEvent::ButtonRelease(MouseEvent {
                id: Xid::from(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                state: u16::from(e.state),
                button: e.detail,
            })),
            Event::MotionNotify(e) => Some(XEvent::Motion(MouseEvent {
                id: Xid::from(e.event),
                abs: Point::new(e.root_x as i32, e.root_y as i32),
                state: u16::from(e.state),
                button: 0,
            })),
            Event::ClientMessage(e) => {
                let dtype = self.id_to_name(e.type_).ok()?;
                let mut data = [0u32; 5];
                data.copy_from_slice(&e.data.as_data32());
                Some(XEvent::ClientMessage(crate::x::ClientMessage {
                    id: Xid::from(e.window),
                    dtype,
                    data,
                }))
            }
            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify(ConfigureEvent {
                id: Xid::from(e.window),
                r: Rect::new(e.x as i32, e.y as i32, e.width as i32, e.height as i32),
                is_root: Xid::from(e.window) == self.root,
            })),
            Event::ConfigureRequest(e) => {
                let m = e.value_mask;
                let has = |f: ConfigWindow| m.contains(f);
                Some(XEvent::ConfigureRequest(ConfigureRequest {
                    id: Xid::from(e.window),
                    x: has(ConfigWindow::X).then_some(e.x as i32),
                    y: has(ConfigWindow::Y).then_some(e.y as i32),
                    w: has(ConfigWindow::WIDTH).then_some(e.width as i32),
                    h: has(ConfigWindow::HEIGHT).then_some(e.height as i32),
                    bw: has(ConfigWindow::BORDER_WIDTH).then_some(e.border_width as i32),
                }))
            }
            Event::DestroyNotify(e) => Some(XEvent::Destroy(Xid::from(e.window))),
            Event::EnterNotify(e) => {
                if Xid::from(e.event) != self.root
                    && (e.mode != NotifyMode::NORMAL || e.detail == NotifyDetail::INFERIOR)
                {
                    return None;
                }
                Some(XEvent::Enter(PointerChange {
                    id: Xid::from(e.event),
                    abs: Point::new(e.root_x as i32, e.root_y as i32),
                }))
            }
            Event::FocusIn(e) => {
                if e.mode == NotifyMode::GRAB
                    || e.mode == NotifyMode::UNGRAB
                    || e.detail == NotifyDetail::POINTER
                    || e.detail == NotifyDetail::POINTER_ROOT
                    || e.detail == NotifyDetail::NONE
                {
                    return None;
                }
                Some(XEvent::FocusIn(Xid::from(e.event)))
            }
            Event::MappingNotify(_) => Some(XEvent::MappingNotify),
            Event::MapRequest(e) => Some(XEvent::MapRequest(Xid::from(e.window))),
            Event::PropertyNotify(e) => {
                let atom = self.id_to_name(e.atom).ok()?;
                Some(XEvent::PropertyNotify(PropertyEvent {
                    id: Xid::from(e.window),
                    atom,
                    deleted: e.state == x11rb::protocol::xproto::Property::DELETE,
                }))
            }
            Event::RandrScreenChangeNotify(_) | Event::RandrNotify(_) => Some(XEvent::RandrNotify),
            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify {
                id: Xid::from(e.window),
                from_send_event: synthetic(e.response_type),
            }),
            Event::Error(e) => {
                warn!(?e, "X11 error event");
                None
            }
            _ => None,
        }
    }
}

impl XConn for RustConn {
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_size(&self) -> Rect {
        self.screen
    }

    fn register_wm(&self) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(root_event_mask());
        let res = self
            .conn
            .change_window_attributes(*self.root, &aux)
            .map_err(Error::from)?
            .check();

        res.map_err(|_| CrateError::AnotherWmRunning)
    }

    fn create_check_window(&self) -> Result<Xid> {
        let id = self.conn.generate_id().map_err(Error::from)?;
        let aux = CreateWindowAux::new().override_redirect(1);
        self.conn
            .create_window(
                0,
                id,
                *self.root,
                -1,
                -1,
                1,
                1,
                0,
                WindowClass::INPUT_OUTPUT,
                0,
                &aux,
            )
            .map_err(Error::from)?;

        Ok(Xid::from(id))
    }

    fn intern_atom(&self, name: &str) -> Result<u32> {
        self.atom_id(name)
    }

    fn atom_name(&self, id: u32) -> Result<String> {
        self.id_to_name(id)
    }

    fn outputs(&self) -> Result<Vec<OutputInfo>> {
        let reply = self
            .conn
            .randr_get_monitors(*self.root, true)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        let mut outputs = Vec::with_capacity(reply.monitors.len());
        for m in reply.monitors.iter() {
            let name = self.id_to_name(m.name).unwrap_or_else(|_| "unknown".to_string());
            let id = m.outputs.first().copied().unwrap_or(m.name);
            outputs.push(OutputInfo {
                id,
                name,
                r: Rect::new(m.x as i32, m.y as i32, m.width as i32, m.height as i32),
                primary: m.primary,
            });
        }

        Ok(outputs)
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self
            .conn
            .query_pointer(*self.root)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn warp_pointer(&self, id: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .warp_pointer(NONE, *id, 0, 0, 0, 0, x as i16, y as i16)
            .map_err(Error::from)?;

        Ok(())
    }

    fn existing_windows(&self) -> Result<Vec<Xid>> {
        let reply = self
            .conn
            .query_tree(*self.root)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        Ok(reply.children.into_iter().map(Xid::from).collect())
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        let reply = self
            .conn
            .get_window_attributes(*id)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        Ok(WindowAttributes {
            override_redirect: reply.override_redirect,
            viewable: reply.map_state == MapState::VIEWABLE,
        })
    }

    fn window_geometry(&self, id: Xid) -> Result<Rect> {
        let reply = self
            .conn
            .get_geometry(*id)
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        Ok(Rect::new(
            reply.x as i32,
            reply.y as i32,
            reply.width as i32,
            reply.height as i32,
        ))
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id).map_err(Error::from)?;
        Ok(())
    }

    fn unmap(&self, id: Xid) -> Result<()> {
        self.conn.unmap_window(*id).map_err(Error::from)?;
        Ok(())
    }

    fn kill(&self, id: Xid) -> Result<()> {
        self.conn.kill_client(*id).map_err(Error::from)?;
        Ok(())
    }

    fn focus(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *id, CURRENT_TIME)
            .map_err(Error::from)?;

        Ok(())
    }

    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()> {
        for attr in attrs {
            let aux = match attr {
                ClientAttr::BorderColor(c) => ChangeWindowAttributesAux::new().border_pixel(*c),
                ClientAttr::ClientEventMask => {
                    ChangeWindowAttributesAux::new().event_mask(client_event_mask())
                }
                ClientAttr::ClientUnmapMask => {
                    ChangeWindowAttributesAux::new().event_mask(client_unmap_mask())
                }
                ClientAttr::RootEventMask => {
                    ChangeWindowAttributesAux::new().event_mask(root_event_mask())
                }
            };
            self.conn
                .change_window_attributes(*id, &aux)
                .map_err(Error::from)?;
        }

        Ok(())
    }

    fn set_client_config(&self, id: Xid, conf: &[ClientConfig]) -> Result<()> {
        for c in conf {
            let aux = match c {
                ClientConfig::BorderPx(bw) => ConfigureWindowAux::new().border_width(*bw as u32),
                ClientConfig::Move(p) => ConfigureWindowAux::new().x(p.x).y(p.y),
                ClientConfig::Position(r) => ConfigureWindowAux::new()
                    .x(r.x)
                    .y(r.y)
                    .width(r.w.max(1) as u32)
                    .height(r.h.max(1) as u32),
                ClientConfig::StackAbove => {
                    ConfigureWindowAux::new().stack_mode(StackMode::ABOVE)
                }
                ClientConfig::StackBelow => {
                    ConfigureWindowAux::new().stack_mode(StackMode::BELOW)
                }
            };
            self.conn.configure_window(*id, &aux).map_err(Error::from)?;
        }

        Ok(())
    }

    fn send_protocol_message(&self, id: Xid, proto: &str) -> Result<()> {
        let proto_atom = self.atom_id(proto)?;
        let protocols = self.atom_id(Atom::WmProtocols.as_ref())?;
        let event = ClientMessageEvent::new(
            32,
            *id,
            protocols,
            [proto_atom, CURRENT_TIME, 0, 0, 0],
        );
        self.conn
            .send_event(false, *id, EventMask::NO_EVENT, event)
            .map_err(Error::from)?;
        self.conn.flush().map_err(Error::from)?;

        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: bw as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)
            .map_err(Error::from)?;

        Ok(())
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        match name {
            n if n == Atom::WmClass.as_ref() => {
                let reply = match WmClass::get(&self.conn, *id)
                    .map_err(Error::from)?
                    .reply_unchecked()
                {
                    Ok(Some(r)) => r,
                    _ => return Ok(None),
                };
                Ok(Some(Prop::UTF8String(vec![
                    String::from_utf8_lossy(reply.instance()).to_string(),
                    String::from_utf8_lossy(reply.class()).to_string(),
                ])))
            }
            n if n == Atom::WmHints.as_ref() => {
                let reply = match XWmHints::get(&self.conn, *id)
                    .map_err(Error::from)?
                    .reply_unchecked()
                {
                    Ok(Some(r)) => r,
                    _ => return Ok(None),
                };
                Ok(Some(Prop::WmHints(WmHints {
                    urgent: reply.urgent,
                    accepts_input: reply.input.unwrap_or(true),
                })))
            }
            n if n == Atom::WmNormalHints.as_ref() => {
                let h = match WmSizeHints::get_normal_hints(&self.conn, *id)
                    .map_err(Error::from)?
                    .reply_unchecked()
                {
                    Ok(Some(r)) => r,
                    _ => return Ok(None),
                };
                let (min_w, min_h) = h.min_size.unwrap_or((0, 0));
                let (max_w, max_h) = h.max_size.unwrap_or((0, 0));
                let (inc_w, inc_h) = h.size_increment.unwrap_or((0, 0));
                let (base_w, base_h) = h.base_size.unwrap_or((min_w, min_h));
                let (min_w, min_h) = if h.min_size.is_some() {
                    (min_w, min_h)
                } else {
                    h.base_size.unwrap_or((0, 0))
                };
                let (min_aspect, max_aspect) = match h.aspect {
                    Some((min, max)) => (
                        min.denominator as f32 / min.numerator.max(1) as f32,
                        max.numerator as f32 / max.denominator.max(1) as f32,
                    ),
                    None => (0.0, 0.0),
                };
                Ok(Some(Prop::WmNormalHints(SizeHints {
                    min_w,
                    min_h,
                    max_w,
                    max_h,
                    base_w,
                    base_h,
                    inc_w,
                    inc_h,
                    min_aspect,
                    max_aspect,
                })))
            }
            _ => {
                let atom = self.atom_id(name)?;
                let reply = match self
                    .conn
                    .get_property(false, *id, atom, AtomEnum::ANY, 0, 4096)
                    .map_err(Error::from)?
                    .reply()
                {
                    Ok(r) => r,
                    Err(_) => return Ok(None),
                };
                if reply.value_len == 0 {
                    return Ok(None);
                }

                let prop_type = self.id_to_name(reply.type_).unwrap_or_default();
                let prop = match prop_type.as_str() {
                    "ATOM" => Prop::Atoms(
                        reply
                            .value32()
                            .into_iter()
                            .flatten()
                            .filter_map(|a| self.id_to_name(a).ok())
                            .collect(),
                    ),
                    "WINDOW" => Prop::Window(
                        reply
                            .value32()
                            .into_iter()
                            .flatten()
                            .map(Xid::from)
                            .collect(),
                    ),
                    "STRING" | "UTF8_STRING" => Prop::UTF8String(
                        String::from_utf8_lossy(&reply.value)
                            .split('\0')
                            .filter(|s| !s.is_empty())
                            .map(|s| s.to_string())
                            .collect(),
                    ),
                    _ => Prop::Cardinal(reply.value32().into_iter().flatten().collect()),
                };

                Ok(Some(prop))
            }
        }
    }

    fn set_prop(&self, id: Xid, name: &str, value: Prop) -> Result<()> {
        let atom = self.atom_id(name)?;

        match value {
            Prop::Atoms(strs) => {
                let ids: Vec<u32> = strs
                    .iter()
                    .map(|s| self.atom_id(s))
                    .collect::<Result<_>>()?;
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::ATOM, &ids)
                    .map_err(Error::from)?;
            }
            Prop::Cardinal(vals) => {
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::CARDINAL, &vals)
                    .map_err(Error::from)?;
            }
            Prop::Window(ids) => {
                let raw: Vec<u32> = ids.iter().map(|w| **w).collect();
                self.conn
                    .change_property32(PropMode::REPLACE, *id, atom, AtomEnum::WINDOW, &raw)
                    .map_err(Error::from)?;
            }
            Prop::UTF8String(strs) => {
                let utf8 = self.atom_id(Atom::UTF8String.as_ref())?;
                let joined = strs.join("\0");
                self.conn
                    .change_property8(PropMode::REPLACE, *id, atom, utf8, joined.as_bytes())
                    .map_err(Error::from)?;
            }
            Prop::WmHints(h) => {
                let mut hints = XWmHints::default();
                hints.urgent = h.urgent;
                hints.input = Some(h.accepts_input);
                hints.set(&self.conn, *id).map_err(Error::from)?;
            }
            Prop::WmNormalHints(_) => {
                // The window manager never writes size hints.
                trace!(%id, "ignoring request to write WM_NORMAL_HINTS");
            }
        }

        Ok(())
    }

    fn delete_prop(&self, id: Xid, name: &str) -> Result<()> {
        let atom = self.atom_id(name)?;
        self.conn.delete_property(*id, atom).map_err(Error::from)?;

        Ok(())
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        let atom = self.atom_id(Atom::WmState.as_ref())?;
        let data = [u32::from(state), NONE];
        self.conn
            .change_property32(PropMode::REPLACE, *id, atom, atom, &data)
            .map_err(Error::from)?;

        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<()> {
        let c = self.cursors.get(&cursor).copied().unwrap_or(NONE);
        self.conn
            .grab_pointer(
                false,
                *self.root,
                EventMask::BUTTON_RELEASE
                    | EventMask::BUTTON_MOTION
                    | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                *self.root,
                c,
                CURRENT_TIME,
            )
            .map_err(Error::from)?
            .reply()
            .map_err(Error::from)?;

        Ok(())
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME).map_err(Error::from)?;
        Ok(())
    }

    fn grab_buttons(&self, id: Xid, mouse: &MouseCfg) -> Result<()> {
        self.conn
            .ungrab_button(ButtonIndex::ANY, *id, ModMask::ANY)
            .map_err(Error::from)?;
        // A sync grab on every button lets us replay clicks we are not
        // interested in back to the client.
        self.conn
            .grab_button(
                false,
                *id,
                EventMask::BUTTON_PRESS,
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )
            .map_err(Error::from)?;

        let modifier = ModMask::from(mouse.modifier);
        for extra in [
            ModMask::default(),
            ModMask::LOCK,
            ModMask::M2,
            ModMask::LOCK | ModMask::M2,
        ] {
            for button in [mouse.move_button, mouse.resize_button] {
                self.conn
                    .grab_button(
                        false,
                        *id,
                        EventMask::BUTTON_PRESS,
                        GrabMode::ASYNC,
                        GrabMode::SYNC,
                        NONE,
                        NONE,
                        ButtonIndex::from(button),
                        modifier | extra,
                    )
                    .map_err(Error::from)?;
            }
        }

        Ok(())
    }

    fn allow_pointer_events(&self) -> Result<()> {
        self.conn
            .allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)
            .map_err(Error::from)?;

        Ok(())
    }

    fn refresh_keyboard_mapping(&self) -> Result<()> {
        // Keyboard state is only used for grab modifiers which the server
        // tracks itself; nothing is cached on our side.
        Ok(())
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        if let Some(ev) = self.pending.borrow_mut().pop_front() {
            return Ok(Some(ev));
        }

        loop {
            match self.conn.poll_for_event().map_err(Error::from)? {
                Some(raw) => {
                    if let Some(ev) = self.convert_event(raw) {
                        return Ok(Some(ev));
                    }
                }
                None => return Ok(None),
            }
        }
    }

    fn next_event(&self) -> Result<XEvent> {
        if let Some(ev) = self.pending.borrow_mut().pop_front() {
            return Ok(ev);
        }

        loop {
            let raw = self.conn.wait_for_event().map_err(Error::from)?;
            if let Some(ev) = self.convert_event(raw) {
                return Ok(ev);
            }
        }
    }

    fn push_back_event(&self, event: XEvent) {
        self.pending.borrow_mut().push_front(event);
    }

    fn connection_fd(&self) -> RawFd {
        self.conn.stream().as_raw_fd()
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }
}
