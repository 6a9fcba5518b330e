//! A managed client window and its window manager side state
use crate::{
    pure::{geometry::Rect, hints::SizeHints},
    Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The name given to clients whose title can not be read.
pub const BROKEN: &str = "broken";

/// The maximum length in bytes of a client name.
pub const MAX_NAME_LEN: usize = 255;

/// A managed top level window.
///
/// Clients are owned by the [ClientSet](crate::pure::ClientSet) and are linked into the
/// client list and focus stack of exactly one monitor via the `next` and `snext` links.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub(crate) id: Xid,
    pub(crate) name: String,
    pub(crate) r: Rect,
    pub(crate) old_r: Rect,
    pub(crate) hints: SizeHints,
    pub(crate) border: i32,
    pub(crate) old_border: i32,
    pub(crate) tags: u32,
    pub(crate) is_fixed: bool,
    pub(crate) is_floating: bool,
    pub(crate) is_urgent: bool,
    pub(crate) never_focus: bool,
    pub(crate) old_floating: bool,
    pub(crate) is_fullscreen: bool,
    pub(crate) mon: usize,
    pub(crate) next: Option<Xid>,
    pub(crate) snext: Option<Xid>,
}

impl Client {
    /// Create a new, unlinked client with the given geometry and no tags.
    pub fn new(id: Xid, r: Rect, border: i32) -> Self {
        Self {
            id,
            name: BROKEN.to_string(),
            r,
            old_r: r,
            hints: SizeHints::default(),
            border,
            old_border: border,
            tags: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_floating: false,
            is_fullscreen: false,
            mon: 0,
            next: None,
            snext: None,
        }
    }

    /// The window ID of this client
    pub fn id(&self) -> Xid {
        self.id
    }

    /// The current display name of this client
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the display name of this client.
    ///
    /// Missing and empty names are replaced with [BROKEN] and long names are truncated
    /// to [MAX_NAME_LEN] bytes on a character boundary.
    pub fn set_name(&mut self, name: Option<&str>) {
        let name = match name {
            Some(s) if !s.is_empty() => s,
            _ => BROKEN,
        };

        let mut end = name.len().min(MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }

        self.name = name[..end].to_string();
    }

    /// The current geometry of this client, excluding its border
    pub fn geometry(&self) -> Rect {
        self.r
    }

    /// The current border width of this client
    pub fn border(&self) -> i32 {
        self.border
    }

    /// The tag mask of this client
    pub fn tags(&self) -> u32 {
        self.tags
    }

    /// The index of the monitor this client is on
    pub fn monitor(&self) -> usize {
        self.mon
    }

    /// The size hints this client has requested
    pub fn hints(&self) -> &SizeHints {
        &self.hints
    }

    /// Replace the size hints for this client, updating whether it is fixed in size
    pub fn set_hints(&mut self, hints: SizeHints) {
        self.is_fixed = hints.is_fixed();
        self.hints = hints;
    }

    /// Whether this client floats above the tiled layout
    pub fn is_floating(&self) -> bool {
        self.is_floating
    }

    /// Whether this client currently covers its whole monitor
    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Whether this client has the urgency hint set
    pub fn is_urgent(&self) -> bool {
        self.is_urgent
    }

    /// Whether this client has requested never to receive input focus
    pub fn never_focus(&self) -> bool {
        self.never_focus
    }

    /// Whether this client has a fixed size
    pub fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    /// Width including the border
    pub fn outer_w(&self) -> i32 {
        self.r.outer_w(self.border)
    }

    /// Height including the border
    pub fn outer_h(&self) -> i32 {
        self.r.outer_h(self.border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(None, BROKEN; "missing")]
    #[test_case(Some(""), BROKEN; "empty")]
    #[test_case(Some("st"), "st"; "short")]
    #[test]
    fn set_name(name: Option<&str>, expected: &str) {
        let mut c = Client::new(Xid(1), Rect::default(), 1);
        c.set_name(name);

        assert_eq!(c.name(), expected);
    }

    #[test]
    fn long_names_are_truncated_on_a_char_boundary() {
        let mut c = Client::new(Xid(1), Rect::default(), 1);
        let name = format!("{}é", "a".repeat(254));
        c.set_name(Some(&name));

        assert_eq!(c.name().len(), 254);

        c.set_name(Some(&"b".repeat(1000)));
        assert_eq!(c.name().len(), MAX_NAME_LEN);
    }

    #[test]
    fn set_hints_updates_fixed() {
        let mut c = Client::new(Xid(1), Rect::default(), 1);
        c.set_hints(SizeHints {
            min_w: 10,
            min_h: 10,
            max_w: 10,
            max_h: 10,
            ..Default::default()
        });

        assert!(c.is_fixed());
    }
}
