use super::{HeaderInfo, MetricRecord};

/// Everything one report cycle sends: who, when, and what.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBatch {
    pub header: HeaderInfo,
    /// Epoch millis captured once when the cycle started.
    pub collection_time_millis: i64,
    pub records: Vec<MetricRecord>,
}

impl ReportBatch {
    pub fn new(header: HeaderInfo, collection_time_millis: i64, records: Vec<MetricRecord>) -> Self {
        Self {
            header,
            collection_time_millis,
            records,
        }
    }
}
