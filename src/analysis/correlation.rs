//! Pearson correlation over the numeric columns.

use serde::Serialize;

use super::Aggregation;
use crate::data::filter::FilteredView;
use crate::data::model::NUMERIC_COLUMNS;

/// Symmetric correlation matrix with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is `None` when either column has zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// Pairwise Pearson correlation of every numeric column in the view.
pub fn correlation_matrix(view: &FilteredView<'_>) -> Aggregation<CorrelationMatrix> {
    if view.len() < 2 {
        return Aggregation::NoData;
    }

    let data: Vec<Vec<f64>> = NUMERIC_COLUMNS
        .iter()
        .map(|column| view.iter().filter_map(|r| r.numeric(column)).collect())
        .collect();

    Aggregation::Ready(CorrelationMatrix {
        columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values: pearson(&data),
    })
}

/// Correlation of each pair of equally long series.
fn pearson(series: &[Vec<f64>]) -> Vec<Vec<Option<f64>>> {
    let k = series.len();

    // Centred values and their norms.
    let centred: Vec<Vec<f64>> = series
        .iter()
        .map(|s| {
            let mean = s.iter().sum::<f64>() / s.len() as f64;
            s.iter().map(|v| v - mean).collect()
        })
        .collect();
    let norms: Vec<f64> = centred
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let mut matrix = vec![vec![None; k]; k];
    for i in 0..k {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..k {
            if norms[i] > 0.0 && norms[j] > 0.0 {
                let dot: f64 = centred[i]
                    .iter()
                    .zip(&centred[j])
                    .map(|(a, b)| a * b)
                    .sum();
                let r = (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0);
                matrix[i][j] = Some(r);
                matrix[j][i] = Some(r);
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::test_support::*;

    #[test]
    fn symmetric_with_unit_diagonal() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(m) = correlation_matrix(&view) else {
            panic!("expected data");
        };
        assert_eq!(m.len(), 7);
        for i in 0..m.len() {
            assert!((m.get(i, i).unwrap() - 1.0).abs() < 1e-9);
            for j in 0..m.len() {
                match (m.get(i, j), m.get(j, i)) {
                    (Some(a), Some(b)) => {
                        assert!((a - b).abs() < 1e-9);
                        assert!((-1.0..=1.0).contains(&a));
                    }
                    (None, None) => {}
                    other => panic!("asymmetric at ({i}, {j}): {other:?}"),
                }
            }
        }
    }

    #[test]
    fn perfectly_linear_columns() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(m) = correlation_matrix(&view) else {
            panic!("expected data");
        };
        // tax and gross income are both total - cogs in the sample data
        let tax = m.columns.iter().position(|c| c == "Tax 5%").unwrap();
        let income = m.columns.iter().position(|c| c == "gross income").unwrap();
        let total = m.columns.iter().position(|c| c == "Total").unwrap();
        assert!((m.get(tax, income).unwrap() - 1.0).abs() < 1e-9);
        assert!((m.get(tax, total).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn anti_correlated_and_constant_series() {
        let m = pearson(&[
            vec![1.0, 2.0, 3.0, 4.0],
            vec![8.0, 6.0, 4.0, 2.0],
            vec![5.0, 5.0, 5.0, 5.0],
        ]);
        assert!((m[0][1].unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m[0][2], None);
        assert_eq!(m[2][1], None);
        assert_eq!(m[2][2], Some(1.0));
    }

    #[test]
    fn single_row_has_no_correlation() {
        let ds = sample_dataset();
        let view = apply_filters(
            &ds,
            &FilterSelection {
                product_line: crate::data::filter::Choice::Only("Sports and travel".into()),
                ..Default::default()
            },
        );
        assert_eq!(view.len(), 1);
        assert_eq!(correlation_matrix(&view), Aggregation::NoData);
    }
}
