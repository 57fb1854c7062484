/// Frozen statistics of a counter's collection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterStatistics {
    pub count: u64,
    /// Epoch millis at which the counter's current window started.
    pub start_millis: i64,
}

impl CounterStatistics {
    pub fn new(count: u64, start_millis: i64) -> Self {
        Self { count, start_millis }
    }
}

/// Frozen aggregate of a value distribution over one collection window.
///
/// `mean`, `max` and `total` are only meaningful when `count > 0`. Timed
/// metrics carry them in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueStatistics {
    pub count: u64,
    pub mean: i64,
    pub max: i64,
    pub total: i64,
    pub start_millis: i64,
}

impl ValueStatistics {
    pub fn new(count: u64, mean: i64, max: i64, total: i64, start_millis: i64) -> Self {
        Self {
            count,
            mean,
            max,
            total,
            start_millis,
        }
    }

    /// A window in which no events were recorded.
    pub fn empty(start_millis: i64) -> Self {
        Self::new(0, 0, 0, 0, start_millis)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One keyed reading inside a gauge group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember<T> {
    pub key: String,
    pub value: T,
}

impl<T> GroupMember<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A collected metric ready for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricRecord {
    Counter {
        name: String,
        stats: CounterStatistics,
    },
    Gauge {
        name: String,
        value: f64,
    },
    GaugeGroup {
        name: String,
        members: Vec<GroupMember<f64>>,
    },
    GaugeCounter {
        name: String,
        value: i64,
    },
    GaugeCounterGroup {
        name: String,
        members: Vec<GroupMember<i64>>,
    },
    Value {
        name: String,
        stats: ValueStatistics,
    },
    /// Success (`n`) and error (`e`) statistics of a timed operation.
    Timed {
        name: String,
        success: ValueStatistics,
        error: ValueStatistics,
    },
}

impl MetricRecord {
    pub fn counter(name: impl Into<String>, stats: CounterStatistics) -> Self {
        Self::Counter {
            name: name.into(),
            stats,
        }
    }

    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Self::Gauge {
            name: name.into(),
            value,
        }
    }

    pub fn gauge_group(name: impl Into<String>, members: Vec<GroupMember<f64>>) -> Self {
        Self::GaugeGroup {
            name: name.into(),
            members,
        }
    }

    pub fn gauge_counter(name: impl Into<String>, value: i64) -> Self {
        Self::GaugeCounter {
            name: name.into(),
            value,
        }
    }

    pub fn gauge_counter_group(name: impl Into<String>, members: Vec<GroupMember<i64>>) -> Self {
        Self::GaugeCounterGroup {
            name: name.into(),
            members,
        }
    }

    pub fn value(name: impl Into<String>, stats: ValueStatistics) -> Self {
        Self::Value {
            name: name.into(),
            stats,
        }
    }

    pub fn timed(
        name: impl Into<String>,
        success: ValueStatistics,
        error: ValueStatistics,
    ) -> Self {
        Self::Timed {
            name: name.into(),
            success,
            error,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Counter { name, .. }
            | Self::Gauge { name, .. }
            | Self::GaugeGroup { name, .. }
            | Self::GaugeCounter { name, .. }
            | Self::GaugeCounterGroup { name, .. }
            | Self::Value { name, .. }
            | Self::Timed { name, .. } => name,
        }
    }

    /// Wire value of the `type` field.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Counter { .. } => "counter",
            Self::Gauge { .. } => "gauge",
            Self::GaugeGroup { .. } => "gaugeGroup",
            Self::GaugeCounter { .. } => "gaugeCounter",
            Self::GaugeCounterGroup { .. } => "gaugeCounterGroup",
            Self::Value { .. } => "value",
            Self::Timed { .. } => "timed",
        }
    }
}
