use super::MetricsRecord;
use crate::error::ParseError;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    str::FromStr,
};

/// Status code reported when the access log could not be fetched at all.
pub const UNAVAILABLE_STATUS: u16 = 999;

/// Number of requests per HTTP status code, parsed from the output of
/// `cut -d ' ' -f 9 access.log | sort | uniq -c | sort -nr`:
///
/// ```text
/// 541432 200
///   9736 304
///    683 404
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistogram(BTreeMap<u16, u64>);

impl StatusHistogram {
    pub const FIELDS: [&'static str; 1] = ["logs_data"];

    /// The `{999: 1}` marker stored instead of real counts.
    pub fn unavailable() -> Self {
        Self(BTreeMap::from([(UNAVAILABLE_STATUS, 1)]))
    }

    /// Parses a fetched report, substituting [`StatusHistogram::unavailable`]
    /// when nothing could be fetched.
    pub fn from_report(report: Option<&str>) -> Result<Self, ParseError> {
        match report {
            Some(text) => text.parse(),
            None => Ok(Self::unavailable()),
        }
    }

    pub fn count(&self, status: u16) -> Option<u64> {
        self.0.get(&status).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u16, u64)> for StatusHistogram {
    fn from_iter<T: IntoIterator<Item = (u16, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn integer<T: FromStr>(token: &str) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::NotAnInteger {
        context: "access log report",
        value: token.to_string(),
    })
}

impl FromStr for StatusHistogram {
    type Err = ParseError;

    /// Later lines win when a status code appears twice.
    fn from_str(report: &str) -> Result<Self, Self::Err> {
        let mut histogram = BTreeMap::new();
        for line in report.lines().filter(|line| !line.trim().is_empty()) {
            let mut tokens = line.split_whitespace();
            let (Some(count), Some(status)) = (tokens.next(), tokens.next()) else {
                return Err(ParseError::MalformedLine(line.to_string()));
            };
            histogram.insert(integer(status)?, integer(count)?);
        }
        Ok(Self(histogram))
    }
}

impl From<StatusHistogram> for MetricsRecord {
    fn from(histogram: StatusHistogram) -> Self {
        let [logs_data] = StatusHistogram::FIELDS;
        MetricsRecord::from_iter([(logs_data, histogram)])
    }
}
