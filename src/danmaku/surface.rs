/// Engine-assigned identity of one scrolling item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// What the surface needs to create an item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpec<'a> {
    pub text: &'a str,
    /// Attach a click affordance before the item is revealed.
    pub clickable: bool,
    pub user: bool,
}

/// Where and how fast an item travels once measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemLayout {
    pub top_px: f64,
    pub enter_delay_s: f64,
    pub travel_duration_s: f64,
}

/// Rendering surface the engine draws into. Items are inserted hidden,
/// measured, laid out, then revealed once their enter delay elapses.
pub trait OverlaySurface {
    fn viewport_width(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn insert(&mut self, id: ItemId, spec: &ItemSpec<'_>);
    /// Rendered width in px, `None` while layout is unavailable.
    fn measure_width(&self, id: ItemId) -> Option<f64>;
    fn layout(&mut self, id: ItemId, layout: &ItemLayout);
    fn reveal(&mut self, id: ItemId);
    fn remove(&mut self, id: ItemId);
    fn clear(&mut self);
}
