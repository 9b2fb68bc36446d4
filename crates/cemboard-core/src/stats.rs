//! Statistics over burial records

use crate::models::CemeteryRecord;
use serde::Serialize;

/// Inclusive age range; `max == None` is unbounded above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBucket {
    pub label: &'static str,
    pub min: u32,
    pub max: Option<u32>,
}

impl AgeBucket {
    pub fn contains(&self, age: f64) -> bool {
        age >= f64::from(self.min) && self.max.map(|m| age <= f64::from(m)).unwrap_or(true)
    }
}

pub const AGE_BUCKETS: [AgeBucket; 7] = [
    AgeBucket { label: "0-10", min: 0, max: Some(10) },
    AgeBucket { label: "11-20", min: 11, max: Some(20) },
    AgeBucket { label: "21-30", min: 21, max: Some(30) },
    AgeBucket { label: "31-40", min: 31, max: Some(40) },
    AgeBucket { label: "41-50", min: 41, max: Some(50) },
    AgeBucket { label: "51-60", min: 51, max: Some(60) },
    AgeBucket { label: "61+", min: 61, max: None },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCount {
    pub range: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CemeteryStats {
    pub total: usize,
    pub native: usize,
    pub foreign: usize,
    pub male: usize,
    pub female: usize,
    pub ages: Vec<AgeCount>,
}

impl CemeteryStats {
    pub fn compute(records: &[CemeteryRecord]) -> Self {
        let native = records.iter().filter(|r| r.is_native()).count();
        let ages = AGE_BUCKETS
            .iter()
            .map(|bucket| AgeCount {
                range: bucket.label,
                count: records
                    .iter()
                    .filter_map(|r| r.age)
                    .filter(|age| bucket.contains(*age))
                    .count(),
            })
            .collect();

        Self {
            total: records.len(),
            native,
            foreign: records.len() - native,
            male: records.iter().filter(|r| r.has_gender("male")).count(),
            female: records.iter().filter(|r| r.has_gender("female")).count(),
            ages,
        }
    }

    /// Records that landed in some age bucket
    pub fn aged(&self) -> usize {
        self.ages.iter().map(|a| a.count).sum()
    }
}
