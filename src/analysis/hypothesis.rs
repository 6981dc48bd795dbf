//! Pearson's chi-squared test of independence on contingency tables.

use crate::model::{AccidentError, AccidentRecord, Result};

/// Observed counts, `counts[row][column]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn new(counts: Vec<Vec<u64>>) -> Result<Self> {
        let width = counts.first().map(Vec::len).unwrap_or(0);
        if width == 0 || counts.iter().any(|row| row.len() != width) {
            return Err(AccidentError::Parse(
                "contingency table must be a non-empty rectangle".to_string(),
            ));
        }
        Ok(Self { counts })
    }

    /// 2×2 table from two classifiers. Records for which `row` returns
    /// `None` are not part of the comparison. Row 0 / column 0 is `true`.
    pub fn from_records<R, C>(records: &[AccidentRecord], row: R, column: C) -> Self
    where
        R: Fn(&AccidentRecord) -> Option<bool>,
        C: Fn(&AccidentRecord) -> bool,
    {
        let mut counts = vec![vec![0u64; 2]; 2];
        for r in records {
            if let Some(in_first_row) = row(r) {
                let i = usize::from(!in_first_row);
                let j = usize::from(!column(r));
                counts[i][j] += 1;
            }
        }
        Self { counts }
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<u64> {
        let width = self.counts.first().map(Vec::len).unwrap_or(0);
        (0..width)
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.row_totals().iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquaredResult {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
    /// Expected counts under independence.
    pub expected: Vec<Vec<f64>>,
}

impl ChiSquaredResult {
    /// Whether independence is rejected at significance level `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Chi-squared test of independence. With `yates`, the continuity
/// correction is applied to tables with one degree of freedom.
pub fn chi_squared(table: &ContingencyTable, yates: bool) -> Result<ChiSquaredResult> {
    let rows = table.row_totals();
    let cols = table.column_totals();
    if rows.contains(&0) || cols.contains(&0) {
        return Err(AccidentError::Parse(
            "contingency table has an empty row or column".to_string(),
        ));
    }

    let n = table.total() as f64;
    let expected: Vec<Vec<f64>> = rows
        .iter()
        .map(|&r| cols.iter().map(|&c| r as f64 * c as f64 / n).collect())
        .collect();
    let dof = (rows.len() - 1) * (cols.len() - 1);

    if dof == 0 {
        return Ok(ChiSquaredResult { statistic: 0.0, dof, p_value: 1.0, expected });
    }

    let correct = yates && dof == 1;
    let mut statistic = 0.0;
    for (observed_row, expected_row) in table.counts.iter().zip(&expected) {
        for (&o, &e) in observed_row.iter().zip(expected_row) {
            let mut diff = (o as f64 - e).abs();
            if correct {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / e;
        }
    }

    Ok(ChiSquaredResult {
        statistic,
        dof,
        p_value: chi_squared_sf(statistic, dof as f64),
        expected,
    })
}

/// Survival function of the chi-squared distribution.
pub fn chi_squared_sf(x: f64, dof: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    gamma_q(dof / 2.0, x / 2.0)
}

// ---------------------------------------------------------------------------
// Incomplete gamma function
// ---------------------------------------------------------------------------

const EPS: f64 = 1e-14;
const FPMIN: f64 = 1e-300;
const MAX_ITER: usize = 1000;

/// ln Γ(x) for x > 0, Lanczos approximation.
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Regularised upper incomplete gamma Q(a, x).
fn gamma_q(a: f64, x: f64) -> f64 {
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut del = sum;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

// ---------------------------------------------------------------------------
// Road class vs. fatality
// ---------------------------------------------------------------------------

pub const FIRST_CLASS_ROAD: u8 = 1;
pub const THIRD_CLASS_ROAD: u8 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RoadClassOutcome {
    /// Rows: first class, third class. Columns: fatal, not fatal.
    pub table: ContingencyTable,
    pub result: ChiSquaredResult,
}

impl RoadClassOutcome {
    /// True when first-class roads see more fatal accidents than expected
    /// under independence.
    pub fn first_class_more_fatal(&self) -> bool {
        self.table.counts[0][0] as f64 > self.result.expected[0][0]
    }
}

/// Tests whether fatal accidents are equally likely on first-class and
/// third-class roads.
pub fn road_class_fatality(records: &[AccidentRecord]) -> Result<RoadClassOutcome> {
    let table = ContingencyTable::from_records(
        records,
        |r| match r.road_kind {
            FIRST_CLASS_ROAD => Some(true),
            THIRD_CLASS_ROAD => Some(false),
            _ => None,
        },
        AccidentRecord::is_fatal,
    );
    let result = chi_squared(&table, true)?;
    Ok(RoadClassOutcome { table, result })
}
