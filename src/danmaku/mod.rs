//! Lane-scheduled scrolling comment overlay.
//!
//! Short messages scroll right-to-left across a fixed-height surface. The
//! surface is split into horizontal lanes; a message only enters a lane once
//! the previous occupant has travelled its own width plus a trailing gap, so
//! automatic messages never pile into each other. User input bypasses both
//! the lane check and the concurrency cap so it is always shown.
//!
//! Nothing in here touches the browser. Rendering and persistence sit behind
//! [`OverlaySurface`] and [`KeyValueStore`]; time is passed in by the caller.

mod cache;
mod config;
mod engine;
mod lanes;
mod message;
mod placement;
mod recent;
mod schedule;
mod source;
mod surface;

pub use cache::{CacheError, KeyValueStore, MemoryStore, UserMessageCache};
pub use config::{DanmakuConfig, DEFAULT_CACHE_KEY};
pub use engine::Danmaku;
pub use lanes::{Lane, LaneAllocator};
pub use message::{Message, Origin};
pub use placement::{travel_duration_s, Placement, PlacementDriver, Rejection, ScheduledItem};
pub use recent::RecencyList;
pub use schedule::{Scheduler, Task, TaskHandle};
pub use source::{MessageSource, SloganSets};
pub use surface::{ItemId, ItemLayout, ItemSpec, OverlaySurface};
