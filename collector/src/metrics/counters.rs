use super::MetricsRecord;
use serde::{
    Deserialize,
    Serialize,
};

/// Visitor counters for today, as reported by the analytics service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsCounters {
    pub active_users: u64,
    pub users_cnt: u64,
    pub unique_users_cnt: u64,
    pub new_users_cnt: u64,
}

impl AnalyticsCounters {
    pub const FIELDS: [&'static str; 4] = ["active_users", "users_cnt", "unique_users_cnt", "new_users_cnt"];
}

impl From<AnalyticsCounters> for MetricsRecord {
    fn from(counters: AnalyticsCounters) -> Self {
        let [active_users, users_cnt, unique_users_cnt, new_users_cnt] = AnalyticsCounters::FIELDS;
        MetricsRecord::from_iter([
            (active_users, counters.active_users),
            (users_cnt, counters.users_cnt),
            (unique_users_cnt, counters.unique_users_cnt),
            (new_users_cnt, counters.new_users_cnt),
        ])
    }
}

/// Run-queue length averaged over 1, 5 and 15 minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub cpu_1: f64,
    pub cpu_5: f64,
    pub cpu_15: f64,
}

impl LoadAverage {
    pub const FIELDS: [&'static str; 3] = ["cpu_1", "cpu_5", "cpu_15"];
}

impl From<LoadAverage> for MetricsRecord {
    fn from(load: LoadAverage) -> Self {
        let [cpu_1, cpu_5, cpu_15] = LoadAverage::FIELDS;
        MetricsRecord::from_iter([(cpu_1, load.cpu_1), (cpu_5, load.cpu_5), (cpu_15, load.cpu_15)])
    }
}
