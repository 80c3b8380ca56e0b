//! Workspaces: named, numbered containers of clients.
use crate::{layout::LayoutKind, Xid};
use serde::{Deserialize, Serialize};

/// Default settings stamped onto each workspace as it is allocated, and
/// adjustable at runtime with `set ws _ ...`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WsDefaults {
    /// Layout selector
    pub layout: LayoutKind,
    /// Clients in the master column
    pub nmaster: usize,
    /// Clients in the stack column
    pub nstack: usize,
    /// Master column split ratio
    pub msplit: f32,
    /// Stack column split ratio
    pub ssplit: f32,
    /// Pixels between and around tiled clients
    pub gap: i32,
    /// Edge paddings (l, r, t, b)
    pub pad: (i32, i32, i32, i32),
}

impl Default for WsDefaults {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Tile,
            nmaster: 1,
            nstack: 3,
            msplit: 0.55,
            ssplit: 0.55,
            gap: 0,
            pad: (0, 0, 0, 0),
        }
    }
}

/// A named, numbered container of clients assigned to one monitor.
///
/// The two orderings mandated for every workspace are kept as id lists:
/// `clients` is tiling order, `stack` is the most-recently-focused LIFO whose
/// head tracks `sel`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Workspace {
    /// 0-based workspace number
    pub num: usize,
    /// Short display name (defaults to the 1-based number)
    pub name: String,
    /// Index of the monitor this workspace is assigned to
    pub mon: usize,
    /// Layout selector
    pub layout: LayoutKind,
    /// Clients in the master column
    pub nmaster: usize,
    /// Clients in the stack column
    pub nstack: usize,
    /// Master column split ratio in `[0.05, 0.95]`
    pub msplit: f32,
    /// Stack column split ratio in `[0.05, 0.95]`
    pub ssplit: f32,
    /// Pixels between and around tiled clients
    pub gap: i32,
    /// Left edge padding
    pub pad_l: i32,
    /// Right edge padding
    pub pad_r: i32,
    /// Top edge padding
    pub pad_t: i32,
    /// Bottom edge padding
    pub pad_b: i32,
    /// The last layout pass dropped the gap for a lone tiled client
    pub smart_gap: bool,
    /// Tiling order
    pub clients: Vec<Xid>,
    /// Focus history, most recent first
    pub stack: Vec<Xid>,
    /// The selected client, always the stack head when present
    pub sel: Option<Xid>,
}

impl Workspace {
    /// Allocate workspace `num` from the given defaults.
    pub fn new(num: usize, mon: usize, def: &WsDefaults) -> Self {
        Self {
            num,
            name: (num + 1).to_string(),
            mon,
            layout: def.layout,
            nmaster: def.nmaster,
            nstack: def.nstack,
            msplit: def.msplit,
            ssplit: def.ssplit,
            gap: def.gap,
            pad_l: def.pad.0,
            pad_r: def.pad.1,
            pad_t: def.pad.2,
            pad_b: def.pad.3,
            smart_gap: false,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
        }
    }

    /// Whether `id` is on this workspace's client list.
    pub fn contains(&self, id: Xid) -> bool {
        self.clients.contains(&id)
    }

    /// Append or prepend `id` to the tiling order.
    pub fn attach(&mut self, id: Xid, to_head: bool) {
        if to_head {
            self.clients.insert(0, id);
        } else {
            self.clients.push(id);
        }
    }

    /// Remove `id` from the tiling order.
    pub fn detach(&mut self, id: Xid) {
        self.clients.retain(|&c| c != id);
    }

    /// Push `id` onto the focus stack head (or tail). The selection is left
    /// alone: it only moves on focus or when the selected client detaches.
    pub fn attach_stack(&mut self, id: Xid, to_tail: bool) {
        if to_tail {
            self.stack.push(id);
        } else {
            self.stack.insert(0, id);
        }
    }

    /// Remove `id` from the focus stack; if it was selected the new stack
    /// head becomes the selection.
    pub fn detach_stack(&mut self, id: Xid) {
        self.stack.retain(|&c| c != id);
        if self.sel == Some(id) {
            self.sel = self.stack.first().copied();
        }
    }

    /// Move `id` to the focus stack head, marking it selected.
    pub fn raise_in_stack(&mut self, id: Xid) {
        self.stack.retain(|&c| c != id);
        self.stack.insert(0, id);
        self.sel = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws_with(ids: &[u32]) -> Workspace {
        let mut ws = Workspace::new(0, 0, &WsDefaults::default());
        for &id in ids {
            ws.attach(Xid(id), false);
            ws.raise_in_stack(Xid(id));
        }

        ws
    }

    #[test]
    fn attach_to_head_and_tail() {
        let mut ws = ws_with(&[1, 2]);
        ws.attach(Xid(3), true);

        assert_eq!(ws.clients, vec![Xid(3), Xid(1), Xid(2)]);
    }

    #[test]
    fn detach_stack_promotes_next_in_stack() {
        let mut ws = ws_with(&[1, 2, 3]);
        assert_eq!(ws.sel, Some(Xid(3)));

        ws.detach_stack(Xid(3));

        assert_eq!(ws.sel, Some(Xid(2)));
        assert_eq!(ws.stack, vec![Xid(2), Xid(1)]);
    }

    #[test]
    fn detach_stack_of_unselected_keeps_selection() {
        let mut ws = ws_with(&[1, 2, 3]);

        ws.detach_stack(Xid(1));

        assert_eq!(ws.sel, Some(Xid(3)));
    }

    #[test]
    fn raise_in_stack_moves_to_head() {
        let mut ws = ws_with(&[1, 2, 3]);

        ws.raise_in_stack(Xid(1));

        assert_eq!(ws.stack, vec![Xid(1), Xid(3), Xid(2)]);
        assert_eq!(ws.sel, Some(Xid(1)));
    }
}
