use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::StudentRecord;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "gender",
    "parental_level_of_education",
    "math_score",
    "reading_score",
    "writing_score",
    "total_avg_score",
    "verbal_avg_score",
];

#[derive(serde::Deserialize)]
struct CsvRow {
    gender: String,
    parental_level_of_education: String,
    math_score: String,
    reading_score: String,
    writing_score: String,
    total_avg_score: String,
    verbal_avg_score: String,
}

/// Reads the whole dataset in one shot. No retries, no timeout.
pub async fn load_records(path: &Path) -> Result<Vec<StudentRecord>, LoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| LoadError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = bytes.len(), "dataset read");
    parse_records(bytes.as_slice())
}

pub fn parse_records<R: Read>(input: R) -> Result<Vec<StudentRecord>, LoadError> {
    let mut reader = csv::Reader::from_reader(input);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // header is line 1
        let line = index + 2;
        records.push(StudentRecord {
            math_score: parse_score(&row.math_score, line, "math_score"),
            reading_score: parse_score(&row.reading_score, line, "reading_score"),
            writing_score: parse_score(&row.writing_score, line, "writing_score"),
            total_avg_score: parse_score(&row.total_avg_score, line, "total_avg_score"),
            verbal_avg_score: parse_score(&row.verbal_avg_score, line, "verbal_avg_score"),
            gender: row.gender,
            parental_level_of_education: row.parental_level_of_education,
        });
    }

    debug!(records = records.len(), "dataset parsed");
    Ok(records)
}

fn parse_score(raw: &str, line: usize, column: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(line, column, value = raw, "malformed score, excluded from aggregates");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score,total_avg_score,verbal_avg_score";

    fn dataset(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn parses_rows_in_file_order() {
        let text = dataset(&[
            "female,group B,bachelor's degree,standard,none,72,72,74,72.67,73",
            "male,group A,associate's degree,free/reduced,none,47,57,44,49.33,50.5",
        ]);
        let records = parse_records(text.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gender, "female");
        assert_eq!(records[0].parental_level_of_education, "bachelor's degree");
        assert_eq!(records[0].math_score, Some(72.0));
        assert_eq!(records[1].verbal_avg_score, Some(50.5));
    }

    #[test]
    fn malformed_score_becomes_absent_without_dropping_record() {
        let text = dataset(&[
            "male,group C,some college,standard,completed,abc,80, 70 ,75,75",
            "male,group C,some college,standard,completed,,80,70,75,NaN",
        ]);
        let records = parse_records(text.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].math_score, None);
        assert_eq!(records[0].reading_score, Some(80.0));
        assert_eq!(records[0].writing_score, Some(70.0));
        assert_eq!(records[1].math_score, None);
        assert_eq!(records[1].verbal_avg_score, None);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let text = "gender,parental_level_of_education,math_score\nmale,high school,50";
        let err = parse_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref name) if name == "reading_score"));
    }

    #[test]
    fn ragged_row_is_malformed() {
        let text = dataset(&["male,group A,high school"]);
        let err = parse_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            dataset(&["female,group D,master's degree,standard,none,90,95,93,92.67,94"])
        )
        .unwrap();

        let records = load_records(file.path()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_avg_score, Some(92.67));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study_performance.csv");

        let err = load_records(&path).await.unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { .. }));
        assert!(err.to_string().starts_with("data unavailable"));
    }
}
