use fastrand::Rng;
use tracing::{debug, info, warn};

use super::cache::{KeyValueStore, UserMessageCache};
use super::config::DanmakuConfig;
use super::message::Message;
use super::placement::{Placement, PlacementDriver};
use super::source::{MessageSource, SloganSets};
use super::surface::{ItemId, OverlaySurface};

/// The whole overlay: message source, lanes, placement and the periodic tick.
///
/// Time is always passed in as milliseconds on a monotonic clock
/// (`performance.now()` in the browser), so the engine never reads a clock
/// itself and tests can drive it deterministically.
pub struct Danmaku<S> {
    cfg: DanmakuConfig,
    source: MessageSource,
    driver: PlacementDriver<S>,
    rng: Rng,
    enabled: bool,
    next_tick_ms: Option<f64>,
}

impl<S: OverlaySurface> Danmaku<S> {
    pub fn new(surface: S, store: Box<dyn KeyValueStore>, slogans: SloganSets, cfg: DanmakuConfig) -> Self {
        let user = UserMessageCache::open(store, &cfg.cache_key, cfg.user_capacity);
        let source = MessageSource::new(slogans, user, &cfg);
        let driver = PlacementDriver::new(surface, &cfg);
        let rng = Rng::with_seed(cfg.seed.unwrap_or_else(entropy_seed));
        info!(
            lanes = driver.lanes().len(),
            cached = source.user_messages().len(),
            "danmaku engine ready"
        );
        Self { cfg, source, driver, rng, enabled: true, next_tick_ms: None }
    }

    /// Engine over the site's built-in slogan sets.
    pub fn with_site_slogans(surface: S, store: Box<dyn KeyValueStore>, cfg: DanmakuConfig) -> Self {
        Self::new(surface, store, crate::SITE_SLOGANS, cfg)
    }

    /// Fill the overlay with a shuffled first batch at staggered delays and
    /// queue up the next slice of the shuffle.
    pub fn prepare_initial(&mut self, now_ms: f64) {
        let mut pool = self.source.pool();
        self.rng.shuffle(&mut pool);
        let initial = self.cfg.max_concurrent.min(pool.len());
        let mut placed = 0usize;
        for text in &pool[..initial] {
            let origin = self.source.origin_of(text);
            let delay_s = self.rng.u32(0..=self.cfg.initial_max_delay_s) as f64;
            let msg = Message::new(text.as_str(), origin);
            if self.driver.place(msg, delay_s, false, now_ms, &mut self.rng).is_placed() {
                placed += 1;
            }
        }
        let end = (initial + self.cfg.queue_capacity).min(pool.len());
        self.source.seed_queue(pool[initial..end].iter().cloned());
        debug!(placed, queued = self.source.queue().len(), "initial batch prepared");
    }

    /// One automatic placement attempt. Skipped while disabled or full.
    pub fn tick(&mut self, now_ms: f64) -> Option<Placement> {
        if !self.enabled || self.driver.at_capacity() {
            return None;
        }
        let msg = self.source.next(&mut self.rng);
        Some(self.driver.place(msg, 0.0, false, now_ms, &mut self.rng))
    }

    /// Run due reveals/removals and fire the periodic tick when its
    /// interval has elapsed. Call once per animation frame.
    pub fn advance(&mut self, now_ms: f64) {
        self.driver.run_due(now_ms);
        if !self.enabled {
            return;
        }
        let interval = self.cfg.tick_interval_ms;
        let due = *self.next_tick_ms.get_or_insert(now_ms + interval);
        if now_ms >= due {
            self.tick(now_ms);
            self.driver.run_due(now_ms);
            // A backgrounded tab can fall far behind; skip missed ticks.
            let next = due + interval;
            self.next_tick_ms = Some(if next <= now_ms { now_ms + interval } else { next });
        }
    }

    /// Flip the overlay on/off. Turning off wipes the surface immediately.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.driver.clear();
        }
        self.next_tick_ms = None;
        info!(enabled, "danmaku toggled");
    }

    /// Record and immediately show user input. Blank input is ignored.
    pub fn submit(&mut self, text: &str, now_ms: f64) -> Option<ItemId> {
        let msg = self.source.submit(text)?;
        match self.driver.place(msg, 0.0, true, now_ms, &mut self.rng) {
            Placement::Placed(item) => {
                self.driver.run_due(now_ms);
                Some(item.id)
            }
            Placement::Rejected(reason) => {
                warn!(?reason, "forced placement rejected");
                None
            }
        }
    }

    pub fn place(&mut self, message: Message, delay_s: f64, force: bool, now_ms: f64) -> Placement {
        self.driver.place(message, delay_s, force, now_ms, &mut self.rng)
    }

    /// Re-read the viewport height and recompute the lanes.
    pub fn resize(&mut self) {
        let height = self.driver.surface().viewport_height();
        let lanes = self.cfg.lane_count(height);
        if lanes != self.driver.lanes().len() {
            info!(height, lanes, "danmaku lanes resized");
        }
        self.driver.resize(lanes);
    }

    pub fn travel_complete(&mut self, id: ItemId) {
        self.driver.travel_complete(id);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &DanmakuConfig {
        &self.cfg
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    pub fn driver(&self) -> &PlacementDriver<S> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PlacementDriver<S> {
        &mut self.driver
    }
}

fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            warn!(%err, "no entropy source, using fixed seed");
            0x4e4f_4445_3430_34
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danmaku::cache::MemoryStore;
    use crate::danmaku::surface::{ItemLayout, ItemSpec};

    #[derive(Default)]
    struct CountingSurface {
        live: usize,
    }

    impl OverlaySurface for CountingSurface {
        fn viewport_width(&self) -> f64 {
            800.0
        }
        fn viewport_height(&self) -> f64 {
            360.0
        }
        fn insert(&mut self, _id: ItemId, _spec: &ItemSpec<'_>) {
            self.live += 1;
        }
        fn measure_width(&self, _id: ItemId) -> Option<f64> {
            Some(150.0)
        }
        fn layout(&mut self, _id: ItemId, _layout: &ItemLayout) {}
        fn reveal(&mut self, _id: ItemId) {}
        fn remove(&mut self, _id: ItemId) {
            self.live -= 1;
        }
        fn clear(&mut self) {
            self.live = 0;
        }
    }

    fn engine() -> Danmaku<CountingSurface> {
        let cfg = DanmakuConfig { seed: Some(42), ..DanmakuConfig::default() };
        Danmaku::with_site_slogans(CountingSurface::default(), Box::new(MemoryStore::new()), cfg)
    }

    #[test]
    fn advance_ticks_on_interval() {
        let mut e = engine();
        e.advance(0.0);
        assert_eq!(e.driver().live(), 0);
        e.advance(5_999.0);
        assert_eq!(e.driver().live(), 0);
        e.advance(6_000.0);
        assert_eq!(e.driver().live(), 1);
        e.advance(12_000.0);
        assert_eq!(e.driver().live(), 2);
    }

    #[test]
    fn toggle_off_skips_ticks() {
        let mut e = engine();
        assert!(!e.toggle());
        assert!(e.tick(0.0).is_none());
        e.advance(60_000.0);
        assert_eq!(e.driver().live(), 0);
    }

    #[test]
    fn prepare_initial_respects_capacity_and_queue_bound() {
        let mut e = engine();
        e.prepare_initial(0.0);
        assert!(e.driver().live() <= e.config().max_concurrent);
        assert!(e.source().queue().len() <= e.config().queue_capacity);
    }
}
