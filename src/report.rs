use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::averages;
use crate::config::Config;
use crate::histogram::Binner;
use crate::loader;
use crate::models::{
    AveragesReport, Gender, GenderHistogram, GenderTrend, HistogramReport, ReportMeta,
    ScatterReport, StudentRecord,
};
use crate::regression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Averages,
    Histogram,
    Scatter,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Averages, ReportKind::Histogram, ReportKind::Scatter];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Averages => "average_score_by_parent_education_level",
            ReportKind::Histogram => "math_score_histogram_by_gender",
            ReportKind::Scatter => "verbal_math_scatter_plot_by_gender",
        }
    }
}

/// Loads its own copy of the dataset and renders one report.
pub async fn generate(
    kind: ReportKind,
    csv: &Path,
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let records = loader::load_records(csv).await?;
    let source = csv.display().to_string();
    info!(report = kind.name(), records = records.len(), "dataset loaded");

    let rendered = match kind {
        ReportKind::Averages => {
            let report = build_averages(&source, &records, config.averages.categories.as_slice());
            render(&report, format, render_averages)?
        }
        ReportKind::Histogram => {
            let binner = Binner::new(
                config.histogram.lo,
                config.histogram.hi,
                config.histogram.thresholds,
            )
            .context("invalid histogram configuration")?;
            let report = build_histogram(&source, &records, &binner);
            render(&report, format, render_histogram)?
        }
        ReportKind::Scatter => {
            let report = build_scatter(&source, &records);
            render(&report, format, render_scatter)?
        }
    };

    Ok(rendered)
}

/// Runs every report concurrently. A failing report does not stop the others.
pub async fn generate_all(
    csv: &Path,
    config: &Config,
    format: OutputFormat,
) -> Vec<(ReportKind, anyhow::Result<String>)> {
    // each report loads its own copy of the dataset
    let (averages, histogram, scatter) = tokio::join!(
        generate(ReportKind::Averages, csv, config, format),
        generate(ReportKind::Histogram, csv, config, format),
        generate(ReportKind::Scatter, csv, config, format),
    );

    ReportKind::ALL
        .into_iter()
        .zip([averages, histogram, scatter])
        .collect()
}

fn render<T: serde::Serialize>(
    report: &T,
    format: OutputFormat,
    markdown: fn(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(markdown(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")
        }
    }
}

fn meta(source: &str, records: &[StudentRecord]) -> ReportMeta {
    ReportMeta {
        report_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        source: source.to_string(),
        record_count: records.len(),
    }
}

pub fn build_averages<S: AsRef<str>>(
    source: &str,
    records: &[StudentRecord],
    categories: &[S],
) -> AveragesReport {
    AveragesReport {
        meta: meta(source, records),
        rows: averages::average_by_education(records, categories),
    }
}

pub fn build_histogram(source: &str, records: &[StudentRecord], binner: &Binner) -> HistogramReport {
    let groups: Vec<GenderHistogram> = Gender::ALL
        .into_iter()
        .map(|gender| {
            // malformed scores are binned as NaN so they land in `excluded`
            let scores = records
                .iter()
                .filter(|record| gender.matches(record))
                .map(|record| record.math_score.unwrap_or(f64::NAN));
            GenderHistogram {
                gender,
                histogram: binner.bin(scores),
            }
        })
        .collect();
    let max_count = groups
        .iter()
        .map(|group| group.histogram.max_count())
        .max()
        .unwrap_or(0);
    let (lo, hi) = binner.domain();

    HistogramReport {
        meta: meta(source, records),
        field: "math_score".to_string(),
        domain: [lo, hi],
        groups,
        max_count,
    }
}

pub fn build_scatter(source: &str, records: &[StudentRecord]) -> ScatterReport {
    let x_max = max_of(records.iter().filter_map(|record| record.verbal_avg_score));
    let y_max = max_of(records.iter().filter_map(|record| record.math_score));

    let trends = Gender::ALL
        .into_iter()
        .map(|gender| {
            let (x, y): (Vec<f64>, Vec<f64>) = records
                .iter()
                .filter(|record| gender.matches(record))
                .filter_map(|record| Some((record.verbal_avg_score?, record.math_score?)))
                .unzip();

            match regression::linear_regression(&x, &y) {
                Ok(fit) => GenderTrend {
                    gender,
                    samples: x.len(),
                    regression: Some(fit),
                    line: x_max.map(|x_max| regression::trend_line(&fit, x_max)),
                    error: None,
                },
                Err(err) => {
                    warn!(gender = gender.as_str(), error = %err, "trend line unavailable");
                    GenderTrend {
                        gender,
                        samples: x.len(),
                        regression: None,
                        line: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect();

    ScatterReport {
        meta: meta(source, records),
        x_max,
        y_max,
        trends,
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |max, value| match max {
        Some(current) if current >= value => Some(current),
        _ => Some(value),
    })
}

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.2}"))
}

fn header(output: &mut String, title: &str, meta: &ReportMeta) {
    let _ = writeln!(output, "# {title}");
    let _ = writeln!(
        output,
        "Generated {} from {} ({} records, report {})",
        meta.generated_at.format("%Y-%m-%d %H:%M UTC"),
        meta.source,
        meta.record_count,
        meta.report_id
    );
    let _ = writeln!(output);
}

pub fn render_averages(report: &AveragesReport) -> String {
    let mut output = String::new();
    header(
        &mut output,
        "Overall Average Score with Respect to Parent's Education Level",
        &report.meta,
    );

    let _ = writeln!(output, "| Parent education | Students | All subjects | Math | Reading | Writing |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for row in &report.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            row.category,
            row.count,
            score(row.total_average),
            score(row.math_average),
            score(row.reading_average),
            score(row.writing_average)
        );
    }

    let skipped: usize = report.rows.iter().map(|row| row.excluded_values).sum();
    if skipped > 0 {
        let _ = writeln!(output);
        let _ = writeln!(output, "{skipped} malformed score values were left out of the averages.");
    }

    output
}

pub fn render_histogram(report: &HistogramReport) -> String {
    let mut output = String::new();
    header(&mut output, "Math Score Distribution by Gender", &report.meta);

    let _ = write!(output, "| Math score |");
    for group in &report.groups {
        let _ = write!(output, " {} |", group.gender.as_str());
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "|---|{}", "---|".repeat(report.groups.len()));

    let bin_count = report.groups.first().map_or(0, |group| group.histogram.bins.len());
    for index in 0..bin_count {
        let bin = report.groups[0].histogram.bins[index];
        let closing = if index + 1 == bin_count { ']' } else { ')' };
        let _ = write!(output, "| [{}, {}{} |", bin.x0, bin.x1, closing);
        for group in &report.groups {
            let _ = write!(output, " {} |", group.histogram.bins[index].count);
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Tallest bin: {} students.", report.max_count);
    for group in &report.groups {
        let _ = writeln!(
            output,
            "{}: {} students binned.",
            group.gender.as_str(),
            group.histogram.total()
        );
        if group.histogram.excluded > 0 {
            let _ = writeln!(
                output,
                "{} scores missing or outside [{}, {}] for {}.",
                group.histogram.excluded,
                report.domain[0],
                report.domain[1],
                group.gender.as_str()
            );
        }
    }

    output
}

pub fn render_scatter(report: &ScatterReport) -> String {
    let mut output = String::new();
    header(&mut output, "Verbal Score VS. Math Score by Gender", &report.meta);

    let _ = writeln!(
        output,
        "Axes: verbal score 0 to {}, math score 0 to {}.",
        score(report.x_max),
        score(report.y_max)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Lines");

    for trend in &report.trends {
        match (&trend.regression, &trend.line) {
            (Some(fit), Some(line)) => {
                let _ = writeln!(
                    output,
                    "- {}: math = {:.4} * verbal + {:.4} over {} students, from ({:.2}, {:.2}) to ({:.2}, {:.2})",
                    trend.gender.as_str(),
                    fit.slope,
                    fit.intercept,
                    trend.samples,
                    line.x1,
                    line.y1,
                    line.x2,
                    line.y2
                );
            }
            (Some(fit), None) => {
                let _ = writeln!(
                    output,
                    "- {}: math = {:.4} * verbal + {:.4} over {} students",
                    trend.gender.as_str(),
                    fit.slope,
                    fit.intercept,
                    trend.samples
                );
            }
            _ => {
                let _ = writeln!(
                    output,
                    "- {}: unavailable ({})",
                    trend.gender.as_str(),
                    trend.error.as_deref().unwrap_or("no data")
                );
            }
        }
    }

    output
}
