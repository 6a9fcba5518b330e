//! The registry of managed clients and the monitors they are assigned to
use crate::{
    core::layout::Layout,
    pure::{
        geometry::{Point, Rect},
        hints::HintBounds,
        reconcile::Topology,
        Client, Monitor,
    },
    Error, Result, Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, iter::successors, rc::Rc};
use tracing::{debug, trace};

/// The maximum number of tags that can be configured.
pub const MAX_TAGS: usize = 31;

/// Static configuration consulted by the [ClientSet].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The number of tags available
    pub n_tags: usize,
    /// The initial master fraction for new monitors
    pub mfact: f32,
    /// The initial master count for new monitors
    pub nmaster: i32,
    /// Whether the bar is initially shown on new monitors
    pub show_bar: bool,
    /// Whether the bar is placed at the top of new monitors
    pub top_bar: bool,
    /// The height of the bar in pixels
    pub bar_height: i32,
    /// Whether size hints are respected for tiled clients
    pub resize_hints: bool,
    /// Whether focus is held by a fullscreen client when cycling the focus stack
    pub lock_fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            n_tags: 9,
            mfact: 0.5,
            nmaster: 1,
            show_bar: false,
            top_bar: false,
            bar_height: 18,
            resize_hints: true,
            lock_fullscreen: true,
        }
    }
}

/// A rule applied to newly managed clients based on their class, instance and title.
///
/// Each of `class`, `instance` and `title` matches as a substring if set. Every matching
/// rule is applied in order: the floating state and monitor of the last match win and
/// the tags of all matches are combined.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    /// A substring of the WM_CLASS class
    pub class: Option<String>,
    /// A substring of the WM_CLASS instance
    pub instance: Option<String>,
    /// A substring of the client title
    pub title: Option<String>,
    /// The tags to assign. Zero keeps the tags of the monitor.
    pub tags: u32,
    /// Whether matching clients float
    pub floating: bool,
    /// The index of the monitor to place matching clients on
    pub monitor: Option<usize>,
}

impl Rule {
    fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let check = |pat: &Option<String>, s: &str| pat.as_ref().map_or(true, |p| s.contains(p));

        check(&self.title, title) && check(&self.class, class) && check(&self.instance, instance)
    }
}

/// A geometry change that needs to be sent to the display server.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configure {
    /// The client being configured
    pub id: Xid,
    /// The new geometry
    pub r: Rect,
    /// The border width to draw
    pub border: i32,
}

/// The pure client state information for the window manager.
///
/// Clients are held in an arena keyed by their [Xid] and are linked into the client
/// list and focus stack of exactly one [Monitor]. Monitors are held in order and are
/// only ever removed from the end of the list so a monitor index is stable for as long
/// as the monitor exists.
#[derive(Debug)]
pub struct ClientSet {
    pub(crate) clients: HashMap<Xid, Client>,
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) selmon: usize,
    pub(crate) layouts: Rc<[Layout]>,
    pub(crate) settings: Settings,
    pub(crate) screen: Rect,
    pub(crate) pending: Vec<Configure>,
}

impl ClientSet {
    /// Create a new ClientSet for a screen of the given size, with monitors taken from
    /// the given [Topology].
    ///
    /// # Errors
    /// This method will error if there are no layouts, too many or too few tags or if
    /// the topology contains no monitors.
    pub fn try_new(
        settings: Settings,
        layouts: Vec<Layout>,
        screen: Rect,
        topology: Topology,
    ) -> Result<Self> {
        if layouts.is_empty() {
            return Err(Error::InvalidConfig("at least one layout is required".into()));
        }
        if settings.n_tags == 0 || settings.n_tags > MAX_TAGS {
            return Err(Error::InvalidConfig(format!(
                "between 1 and {MAX_TAGS} tags are required: got {}",
                settings.n_tags
            )));
        }

        let mut cs = Self {
            clients: HashMap::new(),
            monitors: Vec::new(),
            selmon: 0,
            layouts: layouts.into(),
            settings,
            screen,
            pending: Vec::new(),
        };

        cs.reconcile(topology);
        if cs.monitors.is_empty() {
            return Err(Error::NoScreens);
        }

        Ok(cs)
    }

    pub(crate) fn new_monitor(&self, num: usize) -> Monitor {
        let n = self.layouts.len();

        Monitor::new(
            num,
            self.settings.mfact,
            self.settings.nmaster,
            self.settings.show_bar,
            self.settings.top_bar,
            [0, 1 % n],
            &self.layouts[0].symbol,
        )
    }

    /// The static settings in use
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The full extent of the root window
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Update the size of the root window, returning whether it changed.
    pub fn set_screen_size(&mut self, w: i32, h: i32) -> bool {
        let changed = self.screen.w != w || self.screen.h != h;
        self.screen = Rect::new(0, 0, w, h);

        changed
    }

    /// The mask of all valid tag bits
    pub fn tag_mask(&self) -> u32 {
        (1 << self.settings.n_tags) - 1
    }

    /// The layout catalog
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    // Monitors

    /// All monitors in order
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Look up a monitor by index
    pub fn monitor(&self, m: usize) -> Option<&Monitor> {
        self.monitors.get(m)
    }

    /// The index of the selected monitor
    pub fn selected_monitor(&self) -> usize {
        self.selmon
    }

    /// Select the monitor with the given index
    pub fn set_selected_monitor(&mut self, m: usize) -> Result<()> {
        if m >= self.monitors.len() {
            return Err(Error::UnknownMonitor(m));
        }
        self.selmon = m;

        Ok(())
    }

    pub(crate) fn selmon(&self) -> &Monitor {
        &self.monitors[self.selmon]
    }

    pub(crate) fn selmon_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.selmon]
    }

    /// The active layout of monitor `m`
    pub fn layout_for(&self, m: usize) -> &Layout {
        &self.layouts[self.monitors[m].layout()]
    }

    /// Whether monitor `m` is currently using a floating layout
    pub fn has_floating_layout(&self, m: usize) -> bool {
        self.layout_for(m).is_floating()
    }

    // Clients

    /// Whether or not the given window is a managed client
    pub fn contains(&self, id: Xid) -> bool {
        self.clients.contains_key(&id)
    }

    /// Look up a client by ID
    pub fn client(&self, id: Xid) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub(crate) fn client_mut(&mut self, id: Xid) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// The selected client of the selected monitor
    pub fn selected_client(&self) -> Option<Xid> {
        self.selmon().sel
    }

    /// Whether the client is on one of the tags currently viewed by its monitor
    pub fn is_visible(&self, id: Xid) -> bool {
        self.clients.get(&id).map_or(false, |c| self.visible(c))
    }

    pub(crate) fn visible(&self, c: &Client) -> bool {
        c.tags & self.monitors[c.mon].tags() != 0
    }

    fn walk<'a>(
        &'a self,
        head: Option<Xid>,
        link: fn(&Client) -> Option<Xid>,
    ) -> impl Iterator<Item = &'a Client> + 'a {
        successors(head.and_then(|id| self.clients.get(&id)), move |c| {
            link(c).and_then(|id| self.clients.get(&id))
        })
    }

    /// The clients of monitor `m` in client list order
    pub fn iter_clients(&self, m: usize) -> impl Iterator<Item = &Client> + '_ {
        let head = self.monitors.get(m).and_then(|mon| mon.clients);

        self.walk(head, |c| c.next)
    }

    /// The clients of monitor `m` in focus stack (most recently focused first) order
    pub fn iter_stack(&self, m: usize) -> impl Iterator<Item = &Client> + '_ {
        let head = self.monitors.get(m).and_then(|mon| mon.stack);

        self.walk(head, |c| c.snext)
    }

    /// The IDs of the visible clients of monitor `m` in client list order
    pub fn visible_clients(&self, m: usize) -> Vec<Xid> {
        self.iter_clients(m)
            .filter(|c| self.visible(c))
            .map(|c| c.id)
            .collect()
    }

    /// The IDs of the clients of monitor `m` that are subject to the active layout:
    /// visible, not floating and not fullscreen.
    pub fn tiled_clients(&self, m: usize) -> Vec<Xid> {
        self.iter_clients(m)
            .filter(|c| !c.is_floating && !c.is_fullscreen && self.visible(c))
            .map(|c| c.id)
            .collect()
    }

    /// IDs of every managed client, monitor by monitor in client list order.
    pub fn all_clients(&self) -> Vec<Xid> {
        (0..self.monitors.len())
            .flat_map(|m| self.iter_clients(m).map(|c| c.id))
            .collect()
    }

    // Membership primitives

    /// Push a client onto the head of its monitor's client list.
    pub fn attach(&mut self, id: Xid) {
        let m = match self.clients.get(&id) {
            Some(c) => c.mon,
            None => return,
        };
        let head = self.monitors[m].clients.replace(id);
        if let Some(c) = self.clients.get_mut(&id) {
            c.next = head;
        }
    }

    /// Insert a client into its monitor's client list directly after the selected client.
    ///
    /// If there is no selection or the selection is floating then the client is placed
    /// after the first tiled client sharing one of its tags, falling back to the head of
    /// the list. A client that is already in the list is moved rather than duplicated.
    pub fn attach_below(&mut self, id: Xid) {
        let (m, tags) = match self.clients.get(&id) {
            Some(c) => (c.mon, c.tags),
            None => return,
        };

        if self.iter_clients(m).any(|c| c.id == id) {
            self.detach(id);
        }

        let tiled_sel = self.monitors[m]
            .sel
            .filter(|&s| s != id)
            .and_then(|s| self.clients.get(&s))
            .filter(|c| !c.is_floating)
            .map(|c| c.id);

        let at = tiled_sel.or_else(|| {
            self.iter_clients(m)
                .find(|c| !c.is_floating && c.tags & tags != 0)
                .map(|c| c.id)
        });

        match at {
            Some(at) => {
                let next = self.clients.get_mut(&at).and_then(|c| c.next.replace(id));
                if let Some(c) = self.clients.get_mut(&id) {
                    c.next = next;
                }
            }
            None => self.attach(id),
        }
    }

    /// Remove a client from its monitor's client list.
    pub fn detach(&mut self, id: Xid) {
        self.unlink(id, |m| &mut m.clients, |c| &mut c.next);
    }

    /// Push a client onto the head of its monitor's focus stack.
    pub fn attach_stack(&mut self, id: Xid) {
        let m = match self.clients.get(&id) {
            Some(c) => c.mon,
            None => return,
        };
        let head = self.monitors[m].stack.replace(id);
        if let Some(c) = self.clients.get_mut(&id) {
            c.snext = head;
        }
    }

    /// Remove a client from its monitor's focus stack.
    ///
    /// If the client was selected then the selection moves to the first visible client
    /// remaining in the stack.
    pub fn detach_stack(&mut self, id: Xid) {
        let m = match self.unlink(id, |m| &mut m.stack, |c| &mut c.snext) {
            Some(m) => m,
            None => return,
        };

        if self.monitors[m].sel == Some(id) {
            let next = self.iter_stack(m).find(|c| self.visible(c)).map(|c| c.id);
            trace!(%id, ?next, "reselecting after detach from stack");
            self.monitors[m].sel = next;
        }
    }

    fn unlink(
        &mut self,
        id: Xid,
        head: fn(&mut Monitor) -> &mut Option<Xid>,
        link: fn(&mut Client) -> &mut Option<Xid>,
    ) -> Option<usize> {
        let c = self.clients.get_mut(&id)?;
        let m = c.mon;
        let next = link(c).take();

        let h = head(&mut self.monitors[m]);
        if *h == Some(id) {
            *h = next;
            return Some(m);
        }

        let mut cur = *h;
        while let Some(cid) = cur {
            let l = link(self.clients.get_mut(&cid)?);
            if *l == Some(id) {
                *l = next;
                break;
            }
            cur = *l;
        }

        Some(m)
    }

    /// Add a new client to the arena without linking it into any list.
    pub(crate) fn insert_detached(&mut self, c: Client) {
        self.clients.insert(c.id, c);
    }

    /// Link a client that is in the arena into its monitor's client list and stack.
    pub(crate) fn link(&mut self, id: Xid) {
        self.attach_below(id);
        self.attach_stack(id);
    }

    /// Add a new client to the monitor it is assigned to, linking it directly after the
    /// current selection and at the head of the focus stack.
    pub fn insert(&mut self, c: Client) {
        let id = c.id;
        self.insert_detached(c);
        self.link(id);
    }

    /// Remove a client entirely, returning it if it was known.
    pub fn remove(&mut self, id: Xid) -> Option<Client> {
        self.detach(id);
        self.detach_stack(id);
        self.pending.retain(|p| p.id != id);

        self.clients.remove(&id)
    }

    // Placement of new clients

    /// Choose the monitor and tags for a new client.
    ///
    /// Transient windows whose parent is managed inherit the parent's monitor and tags,
    /// everything else is placed on the selected monitor and passed through the rules.
    pub(crate) fn assign(
        &self,
        c: &mut Client,
        parent: Option<Xid>,
        class: &str,
        instance: &str,
        rules: &[Rule],
    ) {
        if let Some(p) = parent.and_then(|p| self.clients.get(&p)) {
            c.mon = p.mon;
            c.tags = p.tags;
            return;
        }

        c.mon = self.selmon;
        c.is_floating = false;
        c.tags = 0;

        for r in rules.iter().filter(|r| r.matches(class, instance, &c.name)) {
            c.is_floating = r.floating;
            c.tags |= r.tags;
            if let Some(m) = r.monitor.filter(|&m| m < self.monitors.len()) {
                c.mon = m;
            }
        }

        let mask = self.tag_mask();
        c.tags = if c.tags & mask != 0 {
            c.tags & mask
        } else {
            self.monitors[c.mon].tags()
        };
    }

    /// Pull the geometry of a new client inside its monitor, keeping its centre off of a
    /// bar at the top of the monitor.
    pub(crate) fn place(&self, c: &mut Client) {
        let m = &self.monitors[c.mon];
        let (mr, wr) = (m.r, m.wr);

        if c.r.x + c.outer_w() > mr.x + mr.w {
            c.r.x = mr.x + mr.w - c.outer_w();
        }
        if c.r.y + c.outer_h() > mr.y + mr.h {
            c.r.y = mr.y + mr.h - c.outer_h();
        }
        c.r.x = c.r.x.max(mr.x);

        let centre = c.r.x + c.r.w / 2;
        let covers_bar = m.bar_y == mr.y && centre >= wr.x && centre < wr.x + wr.w;
        c.r.y = c.r.y.max(if covers_bar {
            self.settings.bar_height
        } else {
            mr.y
        });
    }

    // Geometry

    pub(crate) fn hint_bounds(&self, c: &Client) -> HintBounds {
        HintBounds {
            screen: self.screen,
            area: self.monitors[c.mon].wr,
            bar_height: self.settings.bar_height,
            respect_hints: self.settings.resize_hints
                || c.is_floating
                || self.has_floating_layout(c.mon),
        }
    }

    /// Request a new geometry for a client, subject to its size hints.
    ///
    /// `interact` should be set when the request comes from the user dragging the client
    /// with the mouse: the client is then only kept on screen rather than within its
    /// monitor.
    pub fn resize(&mut self, id: Xid, r: Rect, interact: bool) {
        let (r, changed) = match self.clients.get(&id) {
            Some(c) => c
                .hints
                .apply(c.r, c.border, r, interact, &self.hint_bounds(c)),
            None => return,
        };

        if changed {
            self.resize_client(id, r);
        }
    }

    /// Set the geometry of a client directly, bypassing size hints.
    ///
    /// A tiled client that is alone on its monitor, or under a layout that fills the
    /// window area, is drawn without a border and grows to cover where it would have been.
    pub fn resize_client(&mut self, id: Xid, r: Rect) {
        let m = match self.clients.get(&id) {
            Some(c) => c.mon,
            None => return,
        };

        let layout = self.layout_for(m);
        let (tiling, fills) = (!layout.is_floating(), layout.fills_area());
        let tiled = self.tiled_clients(m);
        let alone = tiled.len() == 1 && tiled[0] == id;

        let c = match self.clients.get_mut(&id) {
            Some(c) => c,
            None => return,
        };
        c.old_r = c.r;
        c.r = r;

        let mut border = c.border;
        if (alone || fills) && !c.is_fullscreen && !c.is_floating && tiling {
            c.r.w += 2 * c.border;
            c.r.h += 2 * c.border;
            border = 0;
        }

        let cfg = Configure {
            id,
            r: c.r,
            border,
        };
        trace!(%id, r = ?cfg.r, border, "queueing client configure");

        match self.pending.iter_mut().find(|p| p.id == id) {
            Some(p) => *p = cfg,
            None => self.pending.push(cfg),
        }
    }

    /// Take the geometry changes that have been made since the last call.
    pub fn drain_pending(&mut self) -> Vec<Configure> {
        std::mem::take(&mut self.pending)
    }

    /// Compute the moves needed to show the visible clients of monitor `m` and hide the
    /// rest off screen, resizing floating clients back within bounds as they are shown.
    ///
    /// Visible clients are returned top down followed by hidden clients bottom up.
    pub(crate) fn show_hide(&mut self, m: usize) -> Vec<(Xid, Point)> {
        let floating_layout = self.has_floating_layout(m);
        let stack: Vec<Xid> = self.iter_stack(m).map(|c| c.id).collect();
        let mut shown = Vec::new();
        let mut hidden = Vec::new();

        for id in stack {
            let (visible, r, outer_w, refloat) = match self.clients.get(&id) {
                Some(c) => (
                    self.visible(c),
                    c.r,
                    c.outer_w(),
                    (floating_layout || c.is_floating) && !c.is_fullscreen,
                ),
                None => continue,
            };

            if visible {
                shown.push((id, r.origin()));
                if refloat {
                    self.resize(id, r, false);
                }
            } else {
                hidden.push((id, Point::new(-2 * outer_w, r.y)));
            }
        }

        shown.extend(hidden.into_iter().rev());
        shown
    }

    /// Refresh the layout symbol of monitor `m` and run its active layout.
    pub fn arrange_monitor(&mut self, m: usize) {
        if m >= self.monitors.len() {
            return;
        }

        let layouts = Rc::clone(&self.layouts);
        let layout = &layouts[self.monitors[m].layout()];
        self.monitors[m].symbol = layout.symbol.clone();

        if let Some(arrange) = &layout.arrange {
            arrange.arrange(self, m);
        }
    }

    // User level operations on the selected monitor

    /// View the given tags on the selected monitor, swapping to the previous view if the
    /// mask is empty. Returns false if the tags were already being viewed.
    pub fn view(&mut self, mask: u32) -> bool {
        let mask = mask & self.tag_mask();
        let mon = self.selmon_mut();
        if mask == mon.tags() {
            return false;
        }

        mon.seltags ^= 1;
        if mask != 0 {
            mon.tagset[mon.seltags] = mask;
        }
        debug!(tags = mon.tags(), "viewing tags");

        true
    }

    /// Toggle whether the given tags are viewed on the selected monitor. Returns false if
    /// that would leave no tags in view.
    pub fn toggle_view(&mut self, mask: u32) -> bool {
        let mask = mask & self.tag_mask();
        let mon = self.selmon_mut();
        let tags = mon.tags() ^ mask;
        if tags == 0 {
            return false;
        }
        mon.tagset[mon.seltags] = tags;

        true
    }

    /// Replace the tags of the selected client. Returns false if there is no selection
    /// or the mask contains no valid tags.
    pub fn tag_selected(&mut self, mask: u32) -> bool {
        let mask = mask & self.tag_mask();
        match self.selected_client().and_then(|id| self.clients.get_mut(&id)) {
            Some(c) if mask != 0 => {
                c.tags = mask;
                true
            }
            _ => false,
        }
    }

    /// Toggle the given tags on the selected client. Returns false if there is no
    /// selection or the client would be left without any tags.
    pub fn toggle_tag_selected(&mut self, mask: u32) -> bool {
        let mask = mask & self.tag_mask();
        match self.selected_client().and_then(|id| self.clients.get_mut(&id)) {
            Some(c) if c.tags ^ mask != 0 => {
                c.tags ^= mask;
                true
            }
            _ => false,
        }
    }

    /// Set the layout of the selected monitor.
    ///
    /// With `None`, or with a layout other than the active one, the monitor first swaps
    /// to its other layout slot. A given layout is then stored in the active slot. Unknown
    /// layout indices are ignored.
    pub fn set_layout(&mut self, layout: Option<usize>) {
        if layout.map_or(false, |l| l >= self.layouts.len()) {
            return;
        }

        let symbol = {
            let mon = &mut self.monitors[self.selmon];
            if layout != Some(mon.layout()) {
                mon.sellt ^= 1;
            }
            if let Some(l) = layout {
                mon.lt[mon.sellt] = l;
            }
            mon.layout()
        };

        let symbol = self.layouts[symbol].symbol.clone();
        self.selmon_mut().symbol = symbol;
    }

    /// Adjust the master fraction of the selected monitor.
    ///
    /// Values below 1.0 are added to the current fraction and values of 1.0 or more set it
    /// absolutely after subtracting 1.0. Results outside of [0.05, 0.95] are rejected, as
    /// are changes under a floating layout. Returns whether the fraction changed.
    pub fn set_mfact(&mut self, f: f32) -> bool {
        if self.has_floating_layout(self.selmon) {
            return false;
        }

        let mon = self.selmon_mut();
        let f = if f < 1.0 { f + mon.mfact } else { f - 1.0 };
        if !(0.05..=0.95).contains(&f) {
            return false;
        }
        mon.mfact = f;

        true
    }

    /// Change the number of clients in the master area of the selected monitor, not going
    /// below zero.
    pub fn inc_nmaster(&mut self, n: i32) {
        let mon = self.selmon_mut();
        mon.nmaster = (mon.nmaster + n).max(0);
    }

    /// Toggle whether the selected client floats. Fixed size clients always float and
    /// fullscreen clients are left alone. Returns false if nothing was changed.
    pub fn toggle_floating(&mut self) -> bool {
        let id = match self.selected_client() {
            Some(id) => id,
            None => return false,
        };

        let (floating, r) = match self.clients.get_mut(&id) {
            Some(c) if !c.is_fullscreen => {
                c.is_floating = !c.is_floating || c.is_fixed;
                (c.is_floating, c.r)
            }
            _ => return false,
        };

        if floating {
            self.resize(id, r, false);
        }

        true
    }

    /// Toggle the bar on the selected monitor, recomputing its window area.
    pub fn toggle_bar(&mut self) {
        let bar_height = self.settings.bar_height;
        let mon = self.selmon_mut();
        mon.show_bar = !mon.show_bar;
        mon.update_bar_pos(bar_height);
    }

    /// The client that should be moved to the master position by a zoom: the selection,
    /// or the next tiled client if the selection is already the master.
    pub fn zoom_target(&self) -> Option<Xid> {
        let m = self.selmon;
        if self.has_floating_layout(m) {
            return None;
        }

        let sel = self.selected_client()?;
        if self.clients.get(&sel)?.is_floating {
            return None;
        }

        let tiled = self.tiled_clients(m);
        if tiled.first() == Some(&sel) {
            tiled.get(1).copied()
        } else {
            Some(sel)
        }
    }

    /// Move a client to the head of its monitor's client list.
    pub fn pop(&mut self, id: Xid) {
        self.detach(id);
        self.attach(id);
    }

    /// Enter or leave fullscreen for a client, returning whether its state changed.
    ///
    /// Entering fullscreen saves the floating state, border and geometry of the client so
    /// that they can be restored exactly on exit.
    pub fn set_fullscreen(&mut self, id: Xid, fullscreen: bool) -> bool {
        let mr = match self.clients.get(&id) {
            Some(c) if c.is_fullscreen != fullscreen => self.monitors[c.mon].r,
            _ => return false,
        };

        let r = match self.clients.get_mut(&id) {
            Some(c) if fullscreen => {
                c.is_fullscreen = true;
                c.old_floating = c.is_floating;
                c.old_border = c.border;
                c.border = 0;
                c.is_floating = true;
                mr
            }
            Some(c) => {
                c.is_fullscreen = false;
                c.is_floating = c.old_floating;
                c.border = c.old_border;
                c.r = c.old_r;
                c.r
            }
            None => return false,
        };

        debug!(%id, fullscreen, "setting fullscreen state");
        self.resize_client(id, r);

        true
    }

    /// Move a client to monitor `m`, giving it the tags currently viewed there.
    /// Returns false if the client is unknown or already on that monitor.
    pub fn send_to_monitor(&mut self, id: Xid, m: usize) -> bool {
        if m >= self.monitors.len() {
            return false;
        }
        match self.clients.get(&id) {
            Some(c) if c.mon != m => (),
            _ => return false,
        }

        self.detach(id);
        self.detach_stack(id);
        let tags = self.monitors[m].tags();
        if let Some(c) = self.clients.get_mut(&id) {
            c.mon = m;
            c.tags = tags;
        }
        self.link(id);
        debug!(%id, m, "sent client to monitor");

        true
    }

    /// Check the structural invariants of the client and monitor lists, returning a
    /// description of each violation found.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut errs = Vec::new();
        let limit = self.clients.len() + 1;
        let mask = self.tag_mask();

        if self.selmon >= self.monitors.len() {
            errs.push(format!("selected monitor {} out of range", self.selmon));
        }

        let mut in_lists: HashMap<Xid, usize> = HashMap::new();
        let mut in_stacks: HashMap<Xid, usize> = HashMap::new();

        for (i, mon) in self.monitors.iter().enumerate() {
            if mon.num != i {
                errs.push(format!("monitor {i} has num {}", mon.num));
            }

            let list: Vec<&Client> = self.iter_clients(i).take(limit).collect();
            let stack: Vec<&Client> = self.iter_stack(i).take(limit).collect();
            if list.len() == limit || stack.len() == limit {
                errs.push(format!("cycle in the lists of monitor {i}"));
                continue;
            }

            for c in &list {
                *in_lists.entry(c.id).or_default() += 1;
                if c.mon != i {
                    errs.push(format!("{} is listed on {i} but assigned to {}", c.id, c.mon));
                }
            }
            for c in &stack {
                *in_stacks.entry(c.id).or_default() += 1;
            }

            if let Some(sel) = mon.sel {
                if !list.iter().any(|c| c.id == sel) {
                    errs.push(format!("selection {sel} is not in the client list of {i}"));
                }
            }
        }

        for (id, c) in self.clients.iter() {
            for (name, seen) in [("client list", &in_lists), ("stack", &in_stacks)] {
                let n = seen.get(id).copied().unwrap_or(0);
                if n != 1 {
                    errs.push(format!("{id} appears {n} times in a {name}"));
                }
            }
            if c.tags == 0 || c.tags & !mask != 0 {
                errs.push(format!("{id} has invalid tags {:#b}", c.tags));
            }
            if c.is_fullscreen && (!c.is_floating || c.border != 0) {
                errs.push(format!("fullscreen client {id} is not floating and borderless"));
            }
        }

        errs
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::builtin::layout::default_layouts;
    use simple_test_case::test_case;

    pub(crate) fn test_set(ids: &[u32]) -> ClientSet {
        let mut cs = ClientSet::try_new(
            Settings::default(),
            default_layouts(),
            Rect::new(0, 0, 1000, 800),
            Topology::Single,
        )
        .unwrap();

        for &id in ids {
            let mut c = Client::new(Xid(id), Rect::new(0, 0, 100, 100), 1);
            c.tags = 1;
            cs.insert(c);
            cs.monitors[0].sel = Some(Xid(id));
        }

        cs
    }

    fn order(cs: &ClientSet) -> Vec<u32> {
        cs.iter_clients(0).map(|c| *c.id).collect()
    }

    fn stack(cs: &ClientSet) -> Vec<u32> {
        cs.iter_stack(0).map(|c| *c.id).collect()
    }

    #[test]
    fn insert_places_new_clients_below_the_selection() {
        let cs = test_set(&[1, 2, 3]);

        assert_eq!(order(&cs), vec![1, 2, 3]);
        assert_eq!(stack(&cs), vec![3, 2, 1]);
        assert!(cs.invariant_violations().is_empty());
    }

    #[test]
    fn attach_below_a_floating_selection_uses_first_tiled_sharing_a_tag() {
        let mut cs = test_set(&[1, 2, 3]);
        cs.clients.get_mut(&Xid(3)).unwrap().is_floating = true;

        let mut c = Client::new(Xid(4), Rect::default(), 1);
        c.tags = 1;
        cs.insert(c);

        assert_eq!(order(&cs), vec![1, 4, 2, 3]);
    }

    #[test]
    fn attach_below_with_no_candidates_attaches_at_head() {
        let mut cs = test_set(&[1]);
        cs.clients.get_mut(&Xid(1)).unwrap().is_floating = true;

        let mut c = Client::new(Xid(2), Rect::default(), 1);
        c.tags = 2;
        cs.insert(c);

        assert_eq!(order(&cs), vec![2, 1]);
    }

    #[test]
    fn attach_below_moves_rather_than_duplicates() {
        let mut cs = test_set(&[1, 2, 3]);
        cs.monitors[0].sel = Some(Xid(3));
        cs.attach_below(Xid(1));

        assert_eq!(order(&cs), vec![2, 3, 1]);
        assert!(cs.invariant_violations().is_empty());
    }

    #[test_case(1, vec![2, 3]; "head")]
    #[test_case(2, vec![1, 3]; "middle")]
    #[test_case(3, vec![1, 2]; "tail")]
    #[test]
    fn detach(id: u32, expected: Vec<u32>) {
        let mut cs = test_set(&[1, 2, 3]);
        cs.detach(Xid(id));

        assert_eq!(order(&cs), expected);
    }

    #[test]
    fn detach_stack_reselects_first_visible_in_stack() {
        let mut cs = test_set(&[1, 2, 3]);
        cs.clients.get_mut(&Xid(2)).unwrap().tags = 2;
        cs.detach_stack(Xid(3));

        assert_eq!(cs.monitors[0].sel, Some(Xid(1)));
        assert_eq!(stack(&cs), vec![2, 1]);
    }

    #[test]
    fn remove_keeps_invariants() {
        let mut cs = test_set(&[1, 2, 3]);
        let c = cs.remove(Xid(3));

        assert_eq!(c.map(|c| c.id), Some(Xid(3)));
        assert_eq!(cs.selected_client(), Some(Xid(2)));
        assert!(cs.invariant_violations().is_empty());
    }

    #[test_case(0b10, true, 0b10; "new tag")]
    #[test_case(0b01, false, 0b01; "current tag")]
    #[test_case(0, true, 0b01; "zero swaps back")]
    #[test]
    fn view(mask: u32, changed: bool, tags: u32) {
        let mut cs = test_set(&[]);
        if mask == 0 {
            cs.view(0b100);
        }

        assert_eq!(cs.view(mask), changed);
        assert_eq!(cs.selmon().tags(), tags);
    }

    #[test]
    fn toggle_view_rejects_empty_result() {
        let mut cs = test_set(&[]);

        assert!(!cs.toggle_view(0b1));
        assert!(cs.toggle_view(0b10));
        assert_eq!(cs.selmon().tags(), 0b11);
    }

    #[test]
    fn toggle_tag_that_would_leave_no_tags_is_a_no_op() {
        let mut cs = test_set(&[1]);

        assert!(!cs.toggle_tag_selected(0b1));
        assert_eq!(cs.client(Xid(1)).unwrap().tags, 0b1);
        assert!(cs.toggle_tag_selected(0b10));
        assert_eq!(cs.client(Xid(1)).unwrap().tags, 0b11);
    }

    #[test]
    fn tag_masks_out_invalid_bits() {
        let mut cs = test_set(&[1]);

        assert!(!cs.tag_selected(1 << 20));
        assert!(cs.tag_selected(0b100 | 1 << 20));
        assert_eq!(cs.client(Xid(1)).unwrap().tags, 0b100);
    }

    #[test_case(None, 1, "T"; "none swaps slot")]
    #[test_case(Some(0), 0, "D"; "current layout keeps slot")]
    #[test_case(Some(3), 3, "M"; "new layout swaps slot and stores")]
    #[test_case(Some(9), 0, "D"; "unknown layout ignored")]
    #[test]
    fn set_layout(layout: Option<usize>, active: usize, symbol: &str) {
        let mut cs = test_set(&[]);
        cs.set_layout(layout);

        assert_eq!(cs.selmon().layout(), active);
        assert_eq!(cs.selmon().symbol(), symbol);
    }

    #[test_case(0.1, true, 0.6; "relative increase")]
    #[test_case(-0.1, true, 0.4; "relative decrease")]
    #[test_case(1.3, true, 0.3; "absolute")]
    #[test_case(0.5, false, 0.5; "too large")]
    #[test_case(1.01, false, 0.5; "too small")]
    #[test]
    fn set_mfact(f: f32, changed: bool, expected: f32) {
        let mut cs = test_set(&[]);

        assert_eq!(cs.set_mfact(f), changed);
        assert!((cs.selmon().mfact() - expected).abs() < 1e-6);
    }

    #[test]
    fn set_mfact_is_ignored_under_a_floating_layout() {
        let mut cs = test_set(&[]);
        cs.set_layout(Some(2));

        assert!(!cs.set_mfact(0.1));
    }

    #[test]
    fn inc_nmaster_is_clamped_at_zero() {
        let mut cs = test_set(&[]);
        cs.inc_nmaster(-5);
        assert_eq!(cs.selmon().nmaster(), 0);

        cs.inc_nmaster(2);
        assert_eq!(cs.selmon().nmaster(), 2);
    }

    #[test]
    fn fixed_clients_stay_floating() {
        let mut cs = test_set(&[1]);
        let c = cs.clients.get_mut(&Xid(1)).unwrap();
        c.is_fixed = true;
        c.is_floating = true;

        assert!(cs.toggle_floating());
        assert!(cs.client(Xid(1)).unwrap().is_floating);
    }

    #[test]
    fn zoom_target_of_master_is_next_tiled() {
        let mut cs = test_set(&[1, 2, 3]);
        cs.monitors[0].sel = Some(Xid(1));

        assert_eq!(cs.zoom_target(), Some(Xid(2)));

        cs.monitors[0].sel = Some(Xid(3));
        assert_eq!(cs.zoom_target(), Some(Xid(3)));

        cs.pop(Xid(3));
        assert_eq!(order(&cs), vec![3, 1, 2]);
    }

    #[test]
    fn fullscreen_round_trip_restores_state() {
        let mut cs = test_set(&[1]);
        cs.clients.get_mut(&Xid(1)).unwrap().r = Rect::new(10, 20, 300, 200);

        assert!(cs.set_fullscreen(Xid(1), true));
        let c = cs.client(Xid(1)).unwrap();
        assert!(c.is_floating && c.is_fullscreen);
        assert_eq!((c.r, c.border), (Rect::new(0, 0, 1000, 800), 0));
        assert!(cs.invariant_violations().is_empty());

        assert!(!cs.set_fullscreen(Xid(1), true));
        assert!(cs.set_fullscreen(Xid(1), false));
        let c = cs.client(Xid(1)).unwrap();
        assert!(!c.is_floating && !c.is_fullscreen);
        assert_eq!(c.border, 1);
        assert_eq!(c.r.origin(), Point::new(10, 20));
    }

    #[test]
    fn resize_client_drops_the_border_of_a_lone_tiled_client() {
        let mut cs = test_set(&[1]);
        cs.resize_client(Xid(1), Rect::new(0, 0, 998, 798));

        assert_eq!(cs.client(Xid(1)).unwrap().r, Rect::new(0, 0, 1000, 800));
        assert_eq!(
            cs.drain_pending(),
            vec![Configure {
                id: Xid(1),
                r: Rect::new(0, 0, 1000, 800),
                border: 0
            }]
        );
        assert!(cs.drain_pending().is_empty());
    }

    #[test]
    fn show_hide_orders_visible_then_hidden_bottom_up() {
        let mut cs = test_set(&[1, 2, 3, 4]);
        cs.clients.get_mut(&Xid(3)).unwrap().tags = 2;
        cs.clients.get_mut(&Xid(1)).unwrap().tags = 2;

        let ids: Vec<u32> = cs.show_hide(0).into_iter().map(|(id, _)| *id).collect();

        // stack order is 4 3 2 1
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn rules_combine_tags_and_fall_back_to_monitor_tags() {
        let cs = test_set(&[]);
        let rules = vec![
            Rule {
                class: Some("Gimp".into()),
                floating: true,
                ..Default::default()
            },
            Rule {
                class: Some("Firefox".into()),
                tags: 1 << 8,
                ..Default::default()
            },
        ];

        let mut c = Client::new(Xid(1), Rect::default(), 0);
        cs.assign(&mut c, None, "Gimp", "gimp", &rules);
        assert!(c.is_floating);
        assert_eq!(c.tags, 1);

        let mut c = Client::new(Xid(2), Rect::default(), 0);
        cs.assign(&mut c, None, "Firefox", "Navigator", &rules);
        assert!(!c.is_floating);
        assert_eq!(c.tags, 1 << 8);
    }

    #[test]
    fn transients_inherit_from_their_parent() {
        let mut cs = test_set(&[1]);
        cs.clients.get_mut(&Xid(1)).unwrap().tags = 0b100;

        let mut c = Client::new(Xid(2), Rect::default(), 0);
        cs.assign(&mut c, Some(Xid(1)), "", "", &[]);

        assert_eq!(c.tags, 0b100);
    }

    #[test]
    fn place_keeps_new_clients_on_their_monitor() {
        let cs = test_set(&[]);
        let mut c = Client::new(Xid(1), Rect::new(900, 700, 300, 300), 0);
        cs.place(&mut c);

        assert_eq!(c.r, Rect::new(700, 500, 300, 300));

        let mut c = Client::new(Xid(1), Rect::new(-50, -50, 300, 300), 0);
        cs.place(&mut c);

        assert_eq!(c.r.origin(), Point::new(0, 0));
    }

    #[test]
    fn send_to_monitor_rejects_unknown_monitors() {
        let mut cs = test_set(&[1]);

        assert!(!cs.send_to_monitor(Xid(1), 3));
        assert!(!cs.send_to_monitor(Xid(1), 0));
    }
}
