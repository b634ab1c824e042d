use super::MetricsRecord;
use crate::error::ParseError;
use serde::{
    Deserialize,
    Serialize,
};
use std::str::FromStr;

/// RAM and swap usage in MiB, as printed by `free -m`:
///
/// ```text
///               total        used        free      shared  buff/cache   available
/// Mem:          31753        2772       14548          74       14432       28411
/// Swap:         20475           0       20475
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub total_mem: u64,
    pub used_mem: u64,
    pub free_mem: u64,
    pub shared: u64,
    pub buffers_cache: u64,
    pub available: u64,
    pub total_swap: u64,
    pub used_swap: u64,
    pub free_swap: u64,
}

impl MemoryReport {
    pub const FIELDS: [&'static str; 9] = [
        "total_mem",
        "used_mem",
        "free_mem",
        "shared",
        "buffers_cache",
        "available",
        "total_swap",
        "used_swap",
        "free_swap",
    ];
}

/// Returns the integer columns 1..=N of line `index`, which has to start with `label`.
fn columns<const N: usize>(report: &str, index: usize, label: &'static str) -> Result<[u64; N], ParseError> {
    let line = report
        .lines()
        .nth(index)
        .filter(|line| line.trim_start().starts_with(label))
        .ok_or(ParseError::MissingLine(label))?;
    let mut tokens = line.split_whitespace().skip(1);

    let mut values = [0; N];
    for (index, value) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or(ParseError::MissingColumn {
            line: label,
            column: index + 1,
        })?;
        *value = token.parse().map_err(|_| ParseError::NotAnInteger {
            context: "memory report",
            value: token.to_string(),
        })?;
    }
    Ok(values)
}

impl FromStr for MemoryReport {
    type Err = ParseError;

    fn from_str(report: &str) -> Result<Self, Self::Err> {
        let [total_mem, used_mem, free_mem, shared, buffers_cache, available] = columns::<6>(report, 1, "Mem:")?;
        let [total_swap, used_swap, free_swap] = columns::<3>(report, 2, "Swap:")?;
        Ok(Self {
            total_mem,
            used_mem,
            free_mem,
            shared,
            buffers_cache,
            available,
            total_swap,
            used_swap,
            free_swap,
        })
    }
}

impl From<MemoryReport> for MetricsRecord {
    fn from(report: MemoryReport) -> Self {
        let values = [
            report.total_mem,
            report.used_mem,
            report.free_mem,
            report.shared,
            report.buffers_cache,
            report.available,
            report.total_swap,
            report.used_swap,
            report.free_swap,
        ];
        MetricsRecord::from_iter(MemoryReport::FIELDS.into_iter().zip(values))
    }
}
