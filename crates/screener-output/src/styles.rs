//! Investment-style statistics.

use ndarray::Array2;
use screener_data::{Security, StyleTag};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// How many passing securities carry a style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StyleCount {
    /// The tag.
    pub style: StyleTag,
    /// Securities carrying it.
    pub count: usize,
}

/// Count each of `styles` over `rows`, keeping the order of `styles`.
pub fn style_counts(rows: &[&Security], styles: &[StyleTag]) -> Vec<StyleCount> {
    styles
        .iter()
        .map(|&style| StyleCount {
            style,
            count: rows.iter().filter(|s| s.has_style(style)).count(),
        })
        .collect()
}

/// Pearson correlation between style tags, treated as 0/1 indicators.
///
/// Entries involving a tag with zero variance over the rows (carried by all
/// or by none) are NaN, diagonal included.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleCorrelation {
    styles: Vec<StyleTag>,
    matrix: Array2<f64>,
}

impl StyleCorrelation {
    /// Correlate `styles` over `rows`.
    ///
    /// Returns `None` for fewer than two styles.
    pub fn compute(rows: &[&Security], styles: &[StyleTag]) -> Option<Self> {
        if styles.len() < 2 {
            return None;
        }

        let n = rows.len();
        let k = styles.len();
        let indicators = Array2::from_shape_fn((n, k), |(i, j)| {
            if rows[i].has_style(styles[j]) { 1.0_f64 } else { 0.0 }
        });

        let mut matrix = Array2::from_elem((k, k), f64::NAN);
        if n > 1 {
            let means = indicators.mean_axis(ndarray::Axis(0))?;
            let centered = &indicators - &means;
            let covariance = centered.t().dot(&centered);

            for a in 0..k {
                for b in 0..k {
                    let denominator = (covariance[[a, a]] * covariance[[b, b]]).sqrt();
                    if denominator > 0.0 {
                        matrix[[a, b]] = if a == b {
                            1.0
                        } else {
                            covariance[[a, b]] / denominator
                        };
                    }
                }
            }
        }

        Some(Self {
            styles: styles.to_vec(),
            matrix,
        })
    }

    /// Row and column labels.
    pub fn styles(&self) -> &[StyleTag] {
        &self.styles
    }

    /// The `k x k` correlation matrix.
    pub const fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Correlation between two tags, if both were correlated.
    pub fn get(&self, a: StyleTag, b: StyleTag) -> Option<f64> {
        let i = self.styles.iter().position(|&s| s == a)?;
        let j = self.styles.iter().position(|&s| s == b)?;
        Some(self.matrix[[i, j]])
    }

    /// Rows of the matrix with NaN as `None`.
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        self.matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| (!v.is_nan()).then_some(v)).collect())
            .collect()
    }

    /// Render as an aligned table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = format!("{:<8}", "");
        for style in &self.styles {
            output.push_str(&format!(" {:>7}", style.column()));
        }
        output.push('\n');

        for (style, row) in self.styles.iter().zip(self.matrix.rows()) {
            output.push_str(&format!("{:<8}", style.column()));
            for value in row {
                if value.is_nan() {
                    output.push_str(&format!(" {:>7}", "-"));
                } else {
                    output.push_str(&format!(" {value:>7.2}"));
                }
            }
            output.push('\n');
        }
        output
    }
}

impl Serialize for StyleCorrelation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StyleCorrelation", 2)?;
        state.serialize_field("styles", &self.styles)?;
        state.serialize_field("matrix", &self.to_rows())?;
        state.end()
    }
}
