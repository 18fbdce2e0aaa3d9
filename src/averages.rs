use tracing::debug;

use crate::models::{CategoryAverages, StudentRecord};

pub const EDUCATION_LEVELS: [&str; 6] = [
    "high school",
    "some high school",
    "some college",
    "associate's degree",
    "bachelor's degree",
    "master's degree",
];

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
    skipped: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        match value {
            Some(value) => {
                self.sum += value;
                self.count += 1;
            }
            None => self.skipped += 1,
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// One entry per category, in `categories` order, matched by exact string equality.
pub fn average_by_education<S: AsRef<str>>(
    records: &[StudentRecord],
    categories: &[S],
) -> Vec<CategoryAverages> {
    categories
        .iter()
        .map(|category| {
            let category = category.as_ref();
            let mut total = Mean::default();
            let mut math = Mean::default();
            let mut reading = Mean::default();
            let mut writing = Mean::default();
            let mut count = 0usize;

            for record in records
                .iter()
                .filter(|record| record.parental_level_of_education == category)
            {
                count += 1;
                total.push(record.total_avg_score);
                math.push(record.math_score);
                reading.push(record.reading_score);
                writing.push(record.writing_score);
            }

            if count == 0 {
                debug!(category, "no records for category");
            }

            CategoryAverages {
                category: category.to_string(),
                count,
                total_average: total.value(),
                math_average: math.value(),
                reading_average: reading.value(),
                writing_average: writing.value(),
                excluded_values: total.skipped + math.skipped + reading.skipped + writing.skipped,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(education: &str, math: Option<f64>) -> StudentRecord {
        StudentRecord {
            gender: "female".to_string(),
            parental_level_of_education: education.to_string(),
            math_score: math,
            reading_score: Some(70.0),
            writing_score: Some(60.0),
            total_avg_score: Some(65.0),
            verbal_avg_score: Some(65.0),
        }
    }

    #[test]
    fn averages_matching_records() {
        let records = vec![
            record("bachelor's degree", Some(80.0)),
            record("bachelor's degree", Some(90.0)),
        ];
        let rows = average_by_education(&records, &EDUCATION_LEVELS);
        let bachelor = rows
            .iter()
            .find(|row| row.category == "bachelor's degree")
            .unwrap();

        assert_eq!(bachelor.count, 2);
        assert!((bachelor.math_average.unwrap() - 85.0).abs() < 1e-9);
        assert_eq!(bachelor.reading_average, Some(70.0));
    }

    #[test]
    fn output_follows_category_order_not_discovery_order() {
        let records = vec![
            record("master's degree", Some(50.0)),
            record("high school", Some(60.0)),
            record("some college", Some(70.0)),
        ];
        let rows = average_by_education(&records, &EDUCATION_LEVELS);
        let order: Vec<&str> = rows.iter().map(|row| row.category.as_str()).collect();
        assert_eq!(order, EDUCATION_LEVELS.to_vec());
    }

    #[test]
    fn empty_group_is_explicitly_absent() {
        let records = vec![record("high school", Some(60.0))];
        let rows = average_by_education(&records, &["some high school"]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 0);
        assert_eq!(rows[0].math_average, None);
        assert_eq!(rows[0].total_average, None);
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let records = vec![record("High School", Some(60.0)), record("high school ", Some(70.0))];
        let rows = average_by_education(&records, &["high school"]);
        assert_eq!(rows[0].count, 0);
    }

    #[test]
    fn malformed_values_only_leave_their_own_field() {
        let records = vec![
            record("some college", Some(80.0)),
            record("some college", None),
        ];
        let rows = average_by_education(&records, &["some college"]);

        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].math_average, Some(80.0));
        assert_eq!(rows[0].reading_average, Some(70.0));
        assert_eq!(rows[0].excluded_values, 1);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let records = vec![
            record("high school", Some(61.0)),
            record("associate's degree", Some(77.0)),
        ];
        assert_eq!(
            average_by_education(&records, &EDUCATION_LEVELS),
            average_by_education(&records, &EDUCATION_LEVELS)
        );
    }
}
