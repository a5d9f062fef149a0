//! Picks the next text to scroll.

use fastrand::Rng;

use super::cache::UserMessageCache;
use super::config::DanmakuConfig;
use super::message::{Message, Origin};
use super::recent::RecencyList;

/// Compiled-in slogan sets the source rotates through.
#[derive(Clone, Copy, Debug)]
pub struct SloganSets {
    pub core: &'static [&'static str],
    pub filler: &'static [&'static str],
    pub call_to_action: &'static [&'static str],
}

pub struct MessageSource {
    slogans: SloganSets,
    user: UserMessageCache,
    queue: RecencyList,
    recent: RecencyList,
    special_counter: u32,
    fallback_counter: u32,
    core_cursor: usize,
    cta_cursor: usize,
    call_to_action_every: u32,
    core_every: u32,
    resample_attempts: usize,
}

impl MessageSource {
    pub fn new(slogans: SloganSets, user: UserMessageCache, cfg: &DanmakuConfig) -> Self {
        Self {
            slogans,
            user,
            queue: RecencyList::new(cfg.queue_capacity),
            recent: RecencyList::new(cfg.recent_capacity),
            special_counter: 0,
            fallback_counter: 0,
            core_cursor: 0,
            cta_cursor: 0,
            call_to_action_every: cfg.call_to_action_every,
            core_every: cfg.core_every.max(1),
            resample_attempts: cfg.resample_attempts.max(1),
        }
    }

    pub fn next(&mut self, rng: &mut Rng) -> Message {
        let msg = self.pick(rng);
        self.recent.push_front(msg.text.as_str());
        msg
    }

    fn pick(&mut self, rng: &mut Rng) -> Message {
        self.special_counter = self.special_counter.wrapping_add(1);
        if self.call_to_action_every > 0
            && !self.slogans.call_to_action.is_empty()
            && self.special_counter % self.call_to_action_every == 0
        {
            let text = self.slogans.call_to_action[self.cta_cursor % self.slogans.call_to_action.len()];
            self.cta_cursor += 1;
            return Message::new(text, Origin::CallToAction);
        }

        if let Some(text) = self.queue.pop_front() {
            let origin = self.origin_of(&text);
            return Message::new(text, origin);
        }

        let take_core = self.fallback_counter % self.core_every == 0;
        self.fallback_counter = self.fallback_counter.wrapping_add(1);
        if take_core {
            if let Some(msg) = self.next_core() {
                return msg;
            }
        }

        let pool = self.pool();
        if pool.is_empty() {
            return self.next_core().unwrap_or_else(|| Message::new("", Origin::Filler));
        }
        let mut candidate = pool[rng.usize(..pool.len())].clone();
        for _ in 1..self.resample_attempts {
            if !self.recent.contains(&candidate) {
                break;
            }
            candidate = pool[rng.usize(..pool.len())].clone();
        }
        let origin = self.origin_of(&candidate);
        Message::new(candidate, origin)
    }

    fn next_core(&mut self) -> Option<Message> {
        if self.slogans.core.is_empty() {
            return None;
        }
        let text = self.slogans.core[self.core_cursor % self.slogans.core.len()];
        self.core_cursor += 1;
        Some(Message::new(text, Origin::Core))
    }

    /// Deduplicated union of filler slogans and persisted user messages.
    pub fn pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = Vec::with_capacity(self.slogans.filler.len() + self.user.messages().len());
        let mut add = |text: &str| {
            if !pool.iter().any(|t| t == text) {
                pool.push(text.to_string());
            }
        };
        self.slogans.filler.iter().for_each(|t| add(t));
        self.user.messages().iter().for_each(&mut add);
        pool
    }

    pub(crate) fn origin_of(&self, text: &str) -> Origin {
        if self.slogans.core.contains(&text) {
            Origin::Core
        } else if self.slogans.filler.contains(&text) {
            Origin::Filler
        } else {
            Origin::UserSubmitted
        }
    }

    /// Record a user submission. Returns the live message to force-place, or
    /// `None` when the input is blank.
    pub fn submit(&mut self, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.user.remember(text);
        self.queue.push_front(text);
        Some(Message::new(text, Origin::UserLive))
    }

    /// Replace the pending queue, e.g. with the tail of the initial shuffle.
    pub fn seed_queue<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queue.clear();
        self.queue.extend_back(items);
    }

    pub fn queue(&self) -> &RecencyList {
        &self.queue
    }

    pub fn recent(&self) -> &RecencyList {
        &self.recent
    }

    pub fn user_messages(&self) -> &RecencyList {
        self.user.messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danmaku::cache::MemoryStore;

    const CORE: &[&str] = &["c1", "c2"];
    const FILLER: &[&str] = &["c1", "c2", "f1", "f2", "f3"];
    const CTA: &[&str] = &["donate"];

    fn source(cfg: &DanmakuConfig) -> MessageSource {
        let user = UserMessageCache::open(Box::new(MemoryStore::new()), &cfg.cache_key, cfg.user_capacity);
        MessageSource::new(SloganSets { core: CORE, filler: FILLER, call_to_action: CTA }, user, cfg)
    }

    #[test]
    fn every_fourth_call_is_call_to_action() {
        let cfg = DanmakuConfig::default();
        let mut src = source(&cfg);
        let mut rng = Rng::with_seed(1);
        let origins: Vec<Origin> = (0..8).map(|_| src.next(&mut rng).origin).collect();
        assert_eq!(origins[3], Origin::CallToAction);
        assert_eq!(origins[7], Origin::CallToAction);
        assert!(origins[..3].iter().all(|o| *o != Origin::CallToAction));
    }

    #[test]
    fn call_to_action_disabled_with_zero_cadence() {
        let cfg = DanmakuConfig { call_to_action_every: 0, ..DanmakuConfig::default() };
        let mut src = source(&cfg);
        let mut rng = Rng::with_seed(2);
        assert!((0..20).all(|_| src.next(&mut rng).origin != Origin::CallToAction));
    }

    #[test]
    fn queue_drains_before_fallback() {
        let cfg = DanmakuConfig { call_to_action_every: 0, ..DanmakuConfig::default() };
        let mut src = source(&cfg);
        let mut rng = Rng::with_seed(3);
        src.seed_queue(["f3", "f1"]);
        assert_eq!(src.next(&mut rng).text, "f3");
        assert_eq!(src.next(&mut rng).text, "f1");
        assert_eq!(src.next(&mut rng), Message::new("c1", Origin::Core));
    }

    #[test]
    fn core_rotation_every_third_fallback() {
        let cfg = DanmakuConfig { call_to_action_every: 0, ..DanmakuConfig::default() };
        let mut src = source(&cfg);
        let mut rng = Rng::with_seed(4);
        let picks: Vec<Message> = (0..7).map(|_| src.next(&mut rng)).collect();
        assert_eq!(picks[0], Message::new("c1", Origin::Core));
        assert_eq!(picks[3], Message::new("c2", Origin::Core));
        assert_eq!(picks[6], Message::new("c1", Origin::Core));
    }

    #[test]
    fn submit_ignores_blank_and_trims() {
        let cfg = DanmakuConfig::default();
        let mut src = source(&cfg);
        assert!(src.submit("   ").is_none());
        let msg = src.submit("  hi there ").expect("message");
        assert_eq!(msg, Message::new("hi there", Origin::UserLive));
        assert_eq!(src.user_messages().to_vec(), vec!["hi there"]);
        assert_eq!(src.queue().iter().next(), Some("hi there"));
    }

    #[test]
    fn recent_is_bounded_and_unique() {
        let cfg = DanmakuConfig::default();
        let mut src = source(&cfg);
        let mut rng = Rng::with_seed(5);
        for i in 0..40 {
            src.submit(&format!("user {i}"));
        }
        for _ in 0..100 {
            src.next(&mut rng);
        }
        let recent = src.recent().to_vec();
        assert!(recent.len() <= 20);
        let mut dedup = recent.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), recent.len());
    }

    /// A source whose next pick falls through to a random pool sample.
    fn random_fallback_source(cfg: &DanmakuConfig, recent: &[&str]) -> MessageSource {
        let mut src = source(cfg);
        src.fallback_counter = 1;
        src.recent.clear();
        for text in recent {
            src.recent.push_front(*text);
        }
        src
    }

    #[test]
    fn resampling_skips_recently_shown_texts() {
        let cfg = DanmakuConfig {
            call_to_action_every: 0,
            core_every: 1_000,
            resample_attempts: 200,
            ..DanmakuConfig::default()
        };
        for seed in 0..20 {
            let mut src = random_fallback_source(&cfg, &["c1", "c2", "f1", "f3"]);
            let mut rng = Rng::with_seed(seed);
            assert_eq!(src.next(&mut rng), Message::new("f2", Origin::Filler), "seed {seed}");
        }
    }

    #[test]
    fn exhausted_resampling_accepts_a_recent_text() {
        let cfg = DanmakuConfig { call_to_action_every: 0, core_every: 1_000, ..DanmakuConfig::default() };
        let mut src = random_fallback_source(&cfg, FILLER);
        let mut rng = Rng::with_seed(6);
        let msg = src.next(&mut rng);
        assert!(FILLER.contains(&msg.text.as_str()));
        assert_eq!(src.recent().iter().next(), Some(msg.text.as_str()));
        assert_eq!(src.recent().len(), FILLER.len());
    }

    #[test]
    fn pool_unions_filler_and_user_messages() {
        let cfg = DanmakuConfig::default();
        let mut src = source(&cfg);
        src.submit("f1");
        src.submit("mine");
        let pool = src.pool();
        assert_eq!(pool.len(), FILLER.len() + 1);
        assert!(pool.iter().any(|t| t == "mine"));
    }
}
