//! Turns accepted messages into timed items on the overlay surface.

use std::collections::BTreeMap;

use fastrand::Rng;
use tracing::debug;

use super::config::DanmakuConfig;
use super::lanes::LaneAllocator;
use super::message::Message;
use super::schedule::{Scheduler, Task, TaskHandle};
use super::surface::{ItemId, ItemLayout, ItemSpec, OverlaySurface};

/// A message that is currently on (or about to enter) the overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledItem {
    pub id: ItemId,
    pub message: Message,
    pub lane: usize,
    pub enter_delay_s: f64,
    pub travel_duration_s: f64,
    pub width_px: f64,
    pub speed_px_s: f64,
    pub top_px: f64,
    pub placed_at_ms: f64,
    pub forced: bool,
    reveal: TaskHandle,
    remove: TaskHandle,
}

impl ScheduledItem {
    pub fn enters_at_ms(&self) -> f64 {
        self.placed_at_ms + self.enter_delay_s * 1000.0
    }

    pub fn leaves_at_ms(&self) -> f64 {
        self.enters_at_ms() + self.travel_duration_s * 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rejection {
    /// The best lane is still reserved past the intended entry time.
    LaneBusy { lane: usize, available_at_ms: f64 },
    AtCapacity { live: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    Placed(ScheduledItem),
    Rejected(Rejection),
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// Seconds an item of `width_px` needs to cross a surface of `surface_width_px`.
pub fn travel_duration_s(surface_width_px: f64, width_px: f64, speed_px_s: f64) -> f64 {
    (surface_width_px + width_px) / speed_px_s
}

pub struct PlacementDriver<S> {
    surface: S,
    lanes: LaneAllocator,
    scheduler: Scheduler,
    items: BTreeMap<ItemId, ScheduledItem>,
    next_id: u64,
    lane_height: f64,
    max_concurrent: usize,
    speed_range: (u32, u32),
    gap_px: f64,
    jitter_px: i32,
    fallback_width_px: f64,
}

impl<S: OverlaySurface> PlacementDriver<S> {
    pub fn new(surface: S, cfg: &DanmakuConfig) -> Self {
        let lanes = LaneAllocator::new(cfg.lane_count(surface.viewport_height()));
        let lo = cfg.speed_min.min(cfg.speed_max).max(1);
        let hi = cfg.speed_max.max(lo);
        Self {
            surface,
            lanes,
            scheduler: Scheduler::new(),
            items: BTreeMap::new(),
            next_id: 1,
            lane_height: cfg.lane_height,
            max_concurrent: cfg.max_concurrent,
            speed_range: (lo, hi),
            gap_px: cfg.gap_px,
            jitter_px: i32::try_from(cfg.jitter_px).unwrap_or(i32::MAX),
            fallback_width_px: cfg.fallback_width_px,
        }
    }

    /// Place `message` on the least busy lane, entering after `delay_s`.
    ///
    /// Unforced placements are rejected when the overlay is full or when the
    /// lane would not be clear by the entry time. Forced placements always
    /// go through and may overlap the previous occupant of their lane.
    pub fn place(&mut self, message: Message, delay_s: f64, force: bool, now_ms: f64, rng: &mut Rng) -> Placement {
        if !force && self.items.len() >= self.max_concurrent {
            debug!(live = self.items.len(), text = %message.text, "overlay full, dropping");
            return Placement::Rejected(Rejection::AtCapacity { live: self.items.len() });
        }

        let (lane, available_at_ms) = self.lanes.allocate(now_ms);
        let delay_ms = delay_s.max(0.0) * 1000.0;
        let enter_ms = now_ms + delay_ms;
        if !force && available_at_ms > enter_ms {
            debug!(lane, available_at_ms, text = %message.text, "lane busy, dropping");
            return Placement::Rejected(Rejection::LaneBusy { lane, available_at_ms });
        }

        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.surface.insert(id, &ItemSpec {
            text: &message.text,
            clickable: message.is_clickable(),
            user: message.is_user(),
        });

        let width_px = self
            .surface
            .measure_width(id)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(self.fallback_width_px);
        let speed_px_s = rng.u32(self.speed_range.0..=self.speed_range.1) as f64;
        let travel_s = travel_duration_s(self.surface.viewport_width(), width_px, speed_px_s);
        let jitter = rng.i32(-self.jitter_px..=self.jitter_px) as f64;
        let top_px = lane as f64 * self.lane_height + jitter;

        self.surface.layout(id, &ItemLayout {
            top_px,
            enter_delay_s: delay_ms / 1000.0,
            travel_duration_s: travel_s,
        });

        // A forced item may land on a lane reserved further out; never pull
        // that reservation earlier.
        let clear_at_ms = enter_ms + (width_px + self.gap_px) / speed_px_s * 1000.0;
        self.lanes.reserve(lane, clear_at_ms.max(available_at_ms));

        let reveal = self.scheduler.schedule(enter_ms, Task::Reveal(id));
        let remove = self.scheduler.schedule(enter_ms + travel_s * 1000.0, Task::Remove(id));
        debug!(id = id.0, lane, width_px, speed_px_s, travel_s, force, "placed");

        let item = ScheduledItem {
            id,
            message,
            lane,
            enter_delay_s: delay_ms / 1000.0,
            travel_duration_s: travel_s,
            width_px,
            speed_px_s,
            top_px,
            placed_at_ms: now_ms,
            forced: force,
            reveal,
            remove,
        };
        self.items.insert(id, item.clone());
        Placement::Placed(item)
    }

    /// Fire every reveal/removal due by `now_ms`.
    pub fn run_due(&mut self, now_ms: f64) {
        for task in self.scheduler.drain_due(now_ms) {
            match task {
                Task::Reveal(id) => {
                    if self.items.contains_key(&id) {
                        self.surface.reveal(id);
                    }
                }
                Task::Remove(id) => {
                    if self.items.remove(&id).is_some() {
                        self.surface.remove(id);
                    }
                }
            }
        }
    }

    /// The surface finished an item's travel ahead of our own timer.
    pub fn travel_complete(&mut self, id: ItemId) {
        if let Some(item) = self.items.remove(&id) {
            self.scheduler.cancel(item.reveal);
            self.scheduler.cancel(item.remove);
            self.surface.remove(id);
        }
    }

    /// Drop everything on screen and every pending task.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.items.clear();
        self.scheduler.cancel_all();
        self.lanes.release_all();
    }

    /// Recompute the lane count from the surface's current height.
    pub fn resize(&mut self, lane_count: usize) {
        self.lanes.resize(lane_count);
    }

    pub fn live(&self) -> usize {
        self.items.len()
    }

    pub fn at_capacity(&self) -> bool {
        self.items.len() >= self.max_concurrent
    }

    pub fn items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.items.values()
    }

    pub fn item(&self, id: ItemId) -> Option<&ScheduledItem> {
        self.items.get(&id)
    }

    pub fn lanes(&self) -> &LaneAllocator {
        &self.lanes
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
