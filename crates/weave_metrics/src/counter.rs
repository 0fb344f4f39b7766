//! Named event counters, reported in name order

use std::collections::BTreeMap;

pub struct Counter {
    counters: BTreeMap<&'static str, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
        }
    }

    pub fn increment(&mut self, name: &'static str, value: u64) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    /// Keep the larger of the stored value and `value`.
    pub fn record_max(&mut self, name: &'static str, value: u64) {
        let slot = self.counters.entry(name).or_insert(0);
        *slot = (*slot).max(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counters.iter().map(|(&name, &value)| (name, value))
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_and_maxima() {
        let mut counter = Counter::new();
        counter.increment("contacts", 3);
        counter.increment("contacts", 4);
        counter.record_max("max_bucket", 5);
        counter.record_max("max_bucket", 2);
        counter.increment("bounces", 1);

        let values: Vec<_> = counter.iter().collect();
        assert_eq!(
            values,
            vec![("bounces", 1), ("contacts", 7), ("max_bucket", 5)]
        );
    }
}
