use std::collections::VecDeque;

/// Fixed-capacity ring of recent rate samples
///
/// Always holds exactly `capacity` slots, oldest first. A slot is `None`
/// when no rate was available for that tick.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    slots: VecDeque<Option<f32>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buffer = Self {
            slots: VecDeque::with_capacity(capacity + 1),
            capacity,
        };
        buffer.reset();
        buffer
    }

    /// Append a rate sample, evicting the oldest slot
    pub fn push(&mut self, rate: Option<f32>) {
        self.slots.push_back(rate);
        while self.slots.len() > self.capacity {
            self.slots.pop_front();
        }
    }

    /// Reinitialize every slot to "no data"
    pub fn reset(&mut self) {
        self.slots.clear();
        self.slots.resize(self.capacity, None);
    }

    /// Slots in chronological order (oldest to newest)
    pub fn iter(&self) -> impl Iterator<Item = Option<f32>> + '_ {
        self.slots.iter().copied()
    }

    /// Most recent slot
    pub fn latest(&self) -> Option<f32> {
        self.slots.back().copied().flatten()
    }

    pub fn to_vec(&self) -> Vec<Option<f32>> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest rate currently held, used to scale renderings
    pub fn max_rate(&self) -> Option<f32> {
        self.iter().flatten().reduce(f32::max)
    }
}
