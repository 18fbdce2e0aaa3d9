use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::models::{Bin, Histogram};

/// How the domain is cut into bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "bins", rename_all = "snake_case")]
pub enum Thresholds {
    /// Exactly `n` intervals of equal width.
    EqualWidth(usize),
    /// Round-number thresholds (1, 2 or 5 times a power of ten) giving roughly `n` intervals.
    Nice(usize),
}

/// Fixed bin edges over a closed domain. Reuse one `Binner` for every
/// subgroup that must be compared bin-for-bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Binner {
    edges: Vec<f64>,
}

impl Binner {
    pub fn new(lo: f64, hi: f64, thresholds: Thresholds) -> Result<Self, StatsError> {
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(StatsError::InvalidDomain { lo, hi });
        }

        let mut edges = vec![lo];
        match thresholds {
            Thresholds::EqualWidth(0) | Thresholds::Nice(0) => {
                return Err(StatsError::InvalidBinCount)
            }
            Thresholds::EqualWidth(count) => {
                let width = hi - lo;
                edges.extend((1..count).map(|i| lo + width * i as f64 / count as f64));
            }
            Thresholds::Nice(count) => {
                edges.extend(nice_ticks(lo, hi, count).into_iter().filter(|t| *t > lo && *t < hi));
            }
        }
        edges.push(hi);

        Ok(Self { edges })
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Counts samples per bin. Empty bins are kept; samples outside the
    /// domain or not finite are only tallied in `excluded`.
    pub fn bin<I>(&self, samples: I) -> Histogram
    where
        I: IntoIterator<Item = f64>,
    {
        let (lo, hi) = self.domain();
        let interior = &self.edges[1..self.edges.len() - 1];
        let mut counts = vec![0usize; self.bin_count()];
        let mut excluded = 0usize;

        for value in samples {
            if !value.is_finite() || value < lo || value > hi {
                excluded += 1;
                continue;
            }
            counts[interior.partition_point(|threshold| *threshold <= value)] += 1;
        }

        let bins = self
            .edges
            .windows(2)
            .zip(counts)
            .map(|(edge, count)| Bin {
                x0: edge[0],
                x1: edge[1],
                count,
            })
            .collect();

        Histogram { bins, excluded }
    }
}

/// Tick values in `[start, stop]` spaced by a 1-2-5 step close to `(stop - start) / count`.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(stop > start) {
        return Vec::new();
    }

    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power < 0.0 {
        // step is a fraction; count in multiples of 1/inverse to keep ticks exact
        let inverse = 10f64.powf(-power) / factor;
        let mut i1 = (start * inverse).round();
        let mut i2 = (stop * inverse).round();
        if i1 / inverse < start {
            i1 += 1.0;
        }
        if i2 / inverse > stop {
            i2 -= 1.0;
        }
        steps(i1, i2).map(|i| i / inverse).collect()
    } else {
        let increment = 10f64.powf(power) * factor;
        let mut i1 = (start / increment).round();
        let mut i2 = (stop / increment).round();
        if i1 * increment < start {
            i1 += 1.0;
        }
        if i2 * increment > stop {
            i2 -= 1.0;
        }
        steps(i1, i2).map(|i| i * increment).collect()
    }
}

fn steps(i1: f64, i2: f64) -> impl Iterator<Item = f64> {
    let n = if i2 >= i1 { (i2 - i1) as usize + 1 } else { 0 };
    (0..n).map(move |k| i1 + k as f64)
}
