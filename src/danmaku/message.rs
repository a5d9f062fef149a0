//! Message values flowing from the source to the overlay.

/// Where a message came from. Drives styling and whether the item is clickable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Core,
    Filler,
    UserSubmitted,
    UserLive,
    CallToAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub origin: Origin,
}

impl Message {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self { text: text.into(), origin }
    }

    /// Call-to-action items get a click affordance before they become visible.
    pub fn is_clickable(&self) -> bool {
        matches!(self.origin, Origin::CallToAction)
    }

    pub fn is_user(&self) -> bool {
        matches!(self.origin, Origin::UserSubmitted | Origin::UserLive)
    }
}
