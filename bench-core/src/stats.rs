use std::time::Duration;

use serde::Serialize;

/// Trial durations of one engine and one processing style, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationSeries {
    durations: Vec<Duration>,
}

impl DurationSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            durations: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, duration: Duration) {
        self.durations.push(duration);
    }
}

impl FromIterator<Duration> for DurationSeries {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self {
            durations: iter.into_iter().collect(),
        }
    }
}

/// Min, max and mean of a series, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: u128,
    pub max: u128,
    pub average: f64,
}

impl Summary {
    pub fn from_series(series: &DurationSeries) -> Option<Self> {
        let millis = series.durations.iter().map(Duration::as_millis);
        let min = millis.clone().min()?;
        let max = millis.clone().max()?;
        let total: u128 = millis.sum();
        let count = series.durations.len();
        Some(Self {
            count,
            min,
            max,
            average: total as f64 / count as f64,
        })
    }

    /// `<label> avg=<mean> min=<min> max=<max>`
    pub fn line(&self, label: &str) -> String {
        format!(
            "{} avg={:?} min={} max={}",
            label, self.average, self.min, self.max
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;

    fn series(millis: &[u64]) -> DurationSeries {
        millis.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_summary() {
        let summary = Summary::from_series(&series(&[1, 2, 3, 4, 5])).unwrap();
        assert_eq!(
            summary,
            Summary {
                count: 5,
                min: 1,
                max: 5,
                average: 3.0,
            }
        );
        assert_eq!(summary.line("Event"), "Event avg=3.0 min=1 max=5");
    }

    #[test]
    fn test_fractional_average() {
        let summary = Summary::from_series(&series(&[12, 13])).unwrap();
        assert_eq!(summary.line("Stream"), "Stream avg=12.5 min=12 max=13");
    }

    #[test]
    fn test_sub_millisecond_durations_truncate() {
        let series: DurationSeries = [Duration::from_micros(900), Duration::from_micros(2100)]
            .into_iter()
            .collect();
        let summary = Summary::from_series(&series).unwrap();
        assert_eq!((summary.min, summary.max), (0, 2));
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(Summary::from_series(&DurationSeries::default()), None);
    }
}
