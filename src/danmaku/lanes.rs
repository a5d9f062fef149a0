/// One horizontal band of the overlay. `available_at_ms` is the earliest
/// moment a new item may enter without catching up with the previous one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lane {
    pub index: usize,
    pub available_at_ms: f64,
}

/// Lanes are never forgotten once created: shrinking only hides the upper
/// ones, so an item still travelling there keeps its reservation if the
/// viewport grows back.
#[derive(Clone, Debug)]
pub struct LaneAllocator {
    lanes: Vec<Lane>,
    active: usize,
}

impl LaneAllocator {
    pub fn new(count: usize) -> Self {
        let mut alloc = Self { lanes: Vec::new(), active: 0 };
        alloc.resize(count);
        alloc
    }

    /// Use the first `count` lanes (at least one). Known lanes keep their
    /// reservation, never-seen ones start free.
    pub fn resize(&mut self, count: usize) {
        let count = count.max(1);
        let start = self.lanes.len();
        if count > start {
            self.lanes.extend((start..count).map(|index| Lane { index, available_at_ms: 0.0 }));
        }
        self.active = count;
    }

    /// Earliest-available active lane, lowest index on ties.
    pub fn allocate(&self, _now_ms: f64) -> (usize, f64) {
        let active = self.lanes();
        let mut best = active[0];
        for lane in &active[1..] {
            if lane.available_at_ms < best.available_at_ms {
                best = *lane;
            }
        }
        (best.index, best.available_at_ms)
    }

    pub fn reserve(&mut self, index: usize, until_ms: f64) {
        if let Some(lane) = self.lanes.get_mut(index) {
            lane.available_at_ms = until_ms;
        }
    }

    /// Mark every lane free, used after the overlay has been wiped.
    pub fn release_all(&mut self) {
        for lane in &mut self.lanes {
            lane.available_at_ms = 0.0;
        }
    }

    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes[..self.active]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_lanes_pick_lowest_index() {
        let alloc = LaneAllocator::new(4);
        assert_eq!(alloc.allocate(0.0), (0, 0.0));
    }

    #[test]
    fn picks_earliest_available() {
        let mut alloc = LaneAllocator::new(3);
        alloc.reserve(0, 500.0);
        alloc.reserve(1, 200.0);
        alloc.reserve(2, 300.0);
        assert_eq!(alloc.allocate(0.0), (1, 200.0));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let mut alloc = LaneAllocator::new(3);
        alloc.reserve(0, 400.0);
        alloc.reserve(1, 100.0);
        alloc.reserve(2, 100.0);
        assert_eq!(alloc.allocate(0.0).0, 1);
    }

    #[test]
    fn resize_keeps_existing_reservations() {
        let mut alloc = LaneAllocator::new(2);
        alloc.reserve(0, 900.0);
        alloc.resize(4);
        assert_eq!(alloc.len(), 4);
        assert_eq!(alloc.lanes()[0].available_at_ms, 900.0);
        assert_eq!(alloc.lanes()[3].available_at_ms, 0.0);
        alloc.resize(1);
        assert_eq!(alloc.len(), 1);
    }

    #[test]
    fn shrink_then_grow_restores_hidden_reservations() {
        let mut alloc = LaneAllocator::new(4);
        for i in 0..4 {
            alloc.reserve(i, 1_000.0);
        }
        alloc.resize(2);
        assert_eq!(alloc.lanes().len(), 2);
        alloc.resize(6);
        assert_eq!(alloc.lanes()[3].available_at_ms, 1_000.0);
        assert_eq!(alloc.lanes()[5].available_at_ms, 0.0);
        assert_eq!(alloc.allocate(0.0), (4, 0.0));
    }

    #[test]
    fn zero_count_still_yields_one_lane() {
        let alloc = LaneAllocator::new(0);
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc.allocate(0.0), (0, 0.0));
    }
}
