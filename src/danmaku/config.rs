use serde::Deserialize;

/// Key under which submitted user messages are cached in local storage.
pub const DEFAULT_CACHE_KEY: &str = "node404-danmaku-latest";

/// Tunables for the overlay. Every field has a default, so a partial JSON
/// object (or none at all) is a valid configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DanmakuConfig {
    /// Height of one horizontal lane band in px.
    pub lane_height: f64,
    pub min_lanes: usize,
    /// Automatic placements are dropped once this many items are live.
    pub max_concurrent: usize,
    pub tick_interval_ms: f64,
    /// Inclusive px/s range a per-item speed is sampled from.
    pub speed_min: u32,
    pub speed_max: u32,
    /// Trailing space kept free behind an item before its lane is reused.
    pub gap_px: f64,
    /// Vertical jitter in px, applied as `[-jitter, +jitter]`.
    pub jitter_px: u32,
    pub fallback_width_px: f64,
    /// Upper bound for the staggered enter delay of the initial batch, seconds.
    pub initial_max_delay_s: u32,
    pub cache_key: String,
    pub user_capacity: usize,
    pub queue_capacity: usize,
    pub recent_capacity: usize,
    pub resample_attempts: usize,
    /// Every n-th fallback pick is a core slogan.
    pub core_every: u32,
    /// Every n-th call returns a call-to-action slogan; 0 disables.
    pub call_to_action_every: u32,
    /// DOM id revealed when a call-to-action item is clicked.
    pub call_to_action_target: String,
    pub log_level: String,
    /// Fixed RNG seed, mostly for reproducible demos and tests.
    pub seed: Option<u64>,
}

impl Default for DanmakuConfig {
    fn default() -> Self {
        Self {
            lane_height: 36.0,
            min_lanes: 4,
            max_concurrent: 20,
            tick_interval_ms: 6_000.0,
            speed_min: 50,
            speed_max: 70,
            gap_px: 80.0,
            jitter_px: 6,
            fallback_width_px: 120.0,
            initial_max_delay_s: 12,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            user_capacity: 50,
            queue_capacity: 30,
            recent_capacity: 20,
            resample_attempts: 10,
            core_every: 3,
            call_to_action_every: 4,
            call_to_action_target: "donationModal".to_string(),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl DanmakuConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// `max(min_lanes, floor(height / lane_height) - 2)`.
    pub fn lane_count(&self, viewport_height: f64) -> usize {
        if self.lane_height <= 0.0 || !viewport_height.is_finite() || viewport_height <= 0.0 {
            return self.min_lanes;
        }
        let fit = (viewport_height / self.lane_height).floor() as i64 - 2;
        fit.max(self.min_lanes as i64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_count_for_360px_viewport() {
        let cfg = DanmakuConfig::default();
        assert_eq!(cfg.lane_count(360.0), 8);
    }

    #[test]
    fn lane_count_never_below_minimum() {
        let cfg = DanmakuConfig::default();
        assert_eq!(cfg.lane_count(50.0), 4);
        assert_eq!(cfg.lane_count(0.0), 4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = DanmakuConfig::from_json(r#"{"max_concurrent": 5, "seed": 7}"#).expect("parse");
        assert_eq!(cfg.max_concurrent, 5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.lane_height, 36.0);
        assert_eq!(cfg.cache_key, DEFAULT_CACHE_KEY);
    }

    #[test]
    fn negative_jitter_is_rejected() {
        assert!(DanmakuConfig::from_json(r#"{"jitter_px": -6}"#).is_err());
        assert_eq!(DanmakuConfig::from_json(r#"{"jitter_px": 10}"#).expect("parse").jitter_px, 10);
    }
}
