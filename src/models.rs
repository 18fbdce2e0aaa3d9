use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One row of the exam score dataset. Scores that failed to parse are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub gender: String,
    pub parental_level_of_education: String,
    pub math_score: Option<f64>,
    pub reading_score: Option<f64>,
    pub writing_score: Option<f64>,
    pub total_avg_score: Option<f64>,
    pub verbal_avg_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn matches(self, record: &StudentRecord) -> bool {
        record.gender == self.as_str()
    }
}

/// Mean scores for one parental education level.
///
/// An average is `None` when no record in the group carried a usable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverages {
    pub category: String,
    pub count: usize,
    pub total_average: Option<f64>,
    pub math_average: Option<f64>,
    pub reading_average: Option<f64>,
    pub writing_average: Option<f64>,
    /// Field values skipped because they were missing or malformed.
    pub excluded_values: usize,
}

/// Half-open interval `[x0, x1)`; the last bin of a histogram also holds `x1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    /// Samples outside the domain or not finite.
    pub excluded: usize,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AveragesReport {
    pub meta: ReportMeta,
    pub rows: Vec<CategoryAverages>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderHistogram {
    pub gender: Gender,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramReport {
    pub meta: ReportMeta,
    pub field: String,
    pub domain: [f64; 2],
    pub groups: Vec<GenderHistogram>,
    pub max_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderTrend {
    pub gender: Gender,
    pub samples: usize,
    pub regression: Option<Regression>,
    pub line: Option<TrendLine>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterReport {
    pub meta: ReportMeta,
    pub x_max: Option<f64>,
    pub y_max: Option<f64>,
    pub trends: Vec<GenderTrend>,
}
