use std::collections::HashMap;

use super::record::ParsedRecord;

/// Name of the aggregate that sees every reading of the batch.
pub const ALL_SOURCES: &str = "All";

/// Incrementally maintained count, mean, variance and range of one stream
/// of readings (Welford's online algorithm).
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStat {
    name: String,
    lines: u64,
    n: u64,
    /// Running mean.
    a: f64,
    /// Running sum of squared deviations from the mean.
    q: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl RunningStat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: 0,
            n: 0,
            a: 0.0,
            q: 0.0,
            min: None,
            max: None,
        }
    }

    /// Account for one record and each of its readings. A record without
    /// readings still counts as a line.
    pub fn add_line(&mut self, readings: &[f64]) {
        self.lines += 1;
        for &x in readings {
            self.push(x);
        }
    }

    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let n = self.n as f64;
        let delta = x - self.a;
        self.q += (n - 1.0) * delta * delta / n;
        self.a += delta / n;

        if self.n == 1 {
            self.min = Some(x);
            self.max = Some(x);
        } else {
            self.min = self.min.map(|m| m.min(x));
            self.max = self.max.map(|m| m.max(x));
        }
    }

    /// Fold another stream into this one (Chan et al. pairwise update).
    /// The result matches feeding both streams through [`push`](Self::push).
    pub fn merge(&mut self, other: &Self) {
        self.lines += other.lines;
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            self.n = other.n;
            self.a = other.a;
            self.q = other.q;
            self.min = other.min;
            self.max = other.max;
            return;
        }

        let na = self.n as f64;
        let nb = other.n as f64;
        let n = na + nb;
        let delta = other.a - self.a;

        self.q += other.q + delta * delta * na * nb / n;
        self.a += delta * nb / n;
        self.n += other.n;
        self.min = self.min.zip(other.min).map(|(a, b)| a.min(b));
        self.max = self.max.zip(other.max).map(|(a, b)| a.max(b));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records that reached this statistic, with or without readings.
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Readings that reached this statistic.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.a)
    }

    /// Population standard deviation, `sqrt(Q / n)`.
    #[must_use]
    pub fn stddev(&self) -> Option<f64> {
        (self.n > 0).then(|| (self.q / self.n as f64).sqrt())
    }

    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }
}

/// Per-source running statistics plus the "All" aggregate for one batch.
#[derive(Debug, Clone)]
pub struct StatAggregator {
    all: RunningStat,
    sources: Vec<RunningStat>,
    index: HashMap<String, usize>,
}

impl Default for StatAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            all: RunningStat::new(ALL_SOURCES),
            sources: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ParsedRecord>) -> Self {
        let mut aggregator = Self::new();
        for record in records {
            aggregator.ingest(record);
        }
        aggregator
    }

    pub fn ingest(&mut self, record: &ParsedRecord) {
        self.all.add_line(&record.readings);

        let slot = match self.index.get(&record.source) {
            Some(&slot) => slot,
            None => {
                self.sources.push(RunningStat::new(record.source.clone()));
                let slot = self.sources.len() - 1;
                self.index.insert(record.source.clone(), slot);
                slot
            }
        };
        self.sources[slot].add_line(&record.readings);
    }

    #[must_use]
    pub fn stat_for(&self, key: &str) -> Option<&RunningStat> {
        self.index.get(key).map(|&slot| &self.sources[slot])
    }

    /// Source keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(RunningStat::name)
    }

    /// Per-source statistics in first-seen order.
    pub fn stats(&self) -> impl Iterator<Item = &RunningStat> {
        self.sources.iter()
    }

    #[must_use]
    pub const fn all(&self) -> &RunningStat {
        &self.all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, readings: &[f64]) -> ParsedRecord {
        ParsedRecord {
            time: 0.0,
            source: source.to_string(),
            readings: readings.to_vec(),
        }
    }

    #[test]
    fn welford_matches_direct_formulas() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut stat = RunningStat::new("x");
        stat.add_line(&values);

        assert_eq!(stat.count(), 8);
        assert_eq!(stat.lines(), 1);
        assert!((stat.mean().unwrap() - 5.0).abs() < 1e-12);
        assert!((stat.stddev().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(stat.range(), Some((2.0, 9.0)));
    }

    #[test]
    fn empty_stat_reports_no_data() {
        let mut stat = RunningStat::new("idle");
        stat.add_line(&[]);

        assert_eq!(stat.lines(), 1);
        assert_eq!(stat.count(), 0);
        assert_eq!(stat.mean(), None);
        assert_eq!(stat.stddev(), None);
        assert_eq!(stat.range(), None);
    }

    #[test]
    fn single_reading_has_zero_spread() {
        let mut stat = RunningStat::new("one");
        stat.push(-3.5);

        assert_eq!(stat.mean(), Some(-3.5));
        assert_eq!(stat.stddev(), Some(0.0));
        assert_eq!(stat.range(), Some((-3.5, -3.5)));
    }

    #[test]
    fn merge_equals_sequential_ingest() {
        let left = [1.5, 2.5, 10.0];
        let right = [-4.0, 8.25];

        let mut merged = RunningStat::new("k");
        merged.add_line(&left);
        let mut other = RunningStat::new("k");
        other.add_line(&right);
        merged.merge(&other);

        let mut direct = RunningStat::new("k");
        direct.add_line(&left);
        direct.add_line(&right);

        assert_eq!(merged.count(), direct.count());
        assert_eq!(merged.lines(), direct.lines());
        assert!((merged.mean().unwrap() - direct.mean().unwrap()).abs() < 1e-12);
        assert!((merged.stddev().unwrap() - direct.stddev().unwrap()).abs() < 1e-12);
        assert_eq!(merged.range(), direct.range());
    }

    #[test]
    fn merge_into_empty_copies_other() {
        let mut empty = RunningStat::new("k");
        let mut other = RunningStat::new("k");
        other.add_line(&[3.0, 5.0]);
        empty.merge(&other);

        assert_eq!(empty.count(), 2);
        assert_eq!(empty.mean(), Some(4.0));
        assert_eq!(empty.range(), Some((3.0, 5.0)));
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let aggregator = StatAggregator::from_records(&[
            record("Temp", &[68.2]),
            record("Humidity", &[40.0]),
            record("Temp", &[69.0]),
            record("Door", &[]),
        ]);

        let keys: Vec<&str> = aggregator.keys().collect();
        assert_eq!(keys, vec!["Temp", "Humidity", "Door"]);
        assert_eq!(aggregator.all().lines(), 4);
        assert_eq!(aggregator.all().count(), 3);

        let door = aggregator.stat_for("Door").unwrap();
        assert_eq!(door.lines(), 1);
        assert_eq!(door.mean(), None);
        assert!(aggregator.stat_for("Pressure").is_none());
    }
}
