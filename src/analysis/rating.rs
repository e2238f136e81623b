use std::f64::consts::PI;

use serde::Serialize;

use super::Aggregation;
use crate::data::filter::FilteredView;

/// Histogram bins used by the dashboard.
pub const DEFAULT_BINS: usize = 20;
/// Number of points the density curve is evaluated at.
pub const KDE_GRID_POINTS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
    /// Density rescaled to histogram counts (`density · n · bin_width`).
    pub scaled: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingDistribution {
    pub count: usize,
    pub bins: Vec<HistogramBin>,
    /// `None` with fewer than two ratings or when every rating is equal.
    pub kde: Option<Vec<DensityPoint>>,
}

impl RatingDistribution {
    pub fn bin_width(&self) -> f64 {
        self.bins.first().map_or(0.0, |b| b.upper - b.lower)
    }
}

/// Histogram of `Rating` plus a Gaussian kernel density estimate over the
/// same support.
pub fn rating_distribution(view: &FilteredView<'_>, bins: usize) -> Aggregation<RatingDistribution> {
    let ratings: Vec<f64> = view.iter().map(|r| r.rating).collect();
    if ratings.is_empty() || bins == 0 {
        return Aggregation::NoData;
    }

    let bins = histogram(&ratings, bins);
    let width = bins[0].upper - bins[0].lower;
    let support = (bins[0].lower, bins[bins.len() - 1].upper);
    let kde = gaussian_kde(&ratings, support, KDE_GRID_POINTS).map(|curve| {
        let scale = ratings.len() as f64 * width;
        curve
            .into_iter()
            .map(|(x, density)| DensityPoint {
                x,
                density,
                scaled: density * scale,
            })
            .collect()
    });

    Aggregation::Ready(RatingDistribution {
        count: ratings.len(),
        bins,
        kde,
    })
}

/// Equal-width bins over `[min, max]`. The last bin is closed on the right;
/// a zero-width range is widened by 0.5 on both sides.
fn histogram(values: &[f64], n_bins: usize) -> Vec<HistogramBin> {
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + i as f64 * width,
            upper: if i + 1 == n_bins {
                hi
            } else {
                lo + (i + 1) as f64 * width
            },
            count,
        })
        .collect()
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Gaussian KDE with Scott's bandwidth, evaluated on `points` evenly spaced
/// positions across `support`.
fn gaussian_kde(values: &[f64], support: (f64, f64), points: usize) -> Option<Vec<(f64, f64)>> {
    if values.len() < 2 || points < 2 {
        return None;
    }
    let std = sample_std(values);
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let step = (support.1 - support.0) / (points - 1) as f64;

    Some(
        (0..points)
            .map(|i| {
                let x = support.0 + i as f64 * step;
                let density = values
                    .iter()
                    .map(|v| {
                        let z = (x - v) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::test_support::*;

    #[test]
    fn twenty_bins_cover_every_rating() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(dist) = rating_distribution(&view, DEFAULT_BINS) else {
            panic!("expected data");
        };
        assert_eq!(dist.bins.len(), 20);
        assert_eq!(dist.bins.iter().map(|b| b.count).sum::<usize>(), ds.len());
        assert!((dist.bins[0].lower - 4.1).abs() < 1e-9);
        assert!((dist.bins[19].upper - 9.6).abs() < 1e-9);
        // the maximum falls in the closed last bin
        assert!(dist.bins[19].count >= 1);
    }

    #[test]
    fn bins_are_contiguous() {
        let bins = histogram(&[1.0, 2.0, 3.5, 10.0], 6);
        for pair in bins.windows(2) {
            assert!((pair[0].upper - pair[1].lower).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_ratings_widen_range_and_skip_kde() {
        let bins = histogram(&[5.0, 5.0, 5.0], 20);
        assert!((bins[0].lower - 4.5).abs() < 1e-9);
        assert!((bins[19].upper - 5.5).abs() < 1e-9);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(gaussian_kde(&[5.0, 5.0, 5.0], (4.5, 5.5), 200).is_none());
    }

    #[test]
    fn kde_integrates_to_about_one_on_a_wide_support() {
        let values = [4.0, 5.0, 5.5, 6.0, 7.5, 8.0, 9.0];
        let curve = gaussian_kde(&values, (-10.0, 25.0), 2000).unwrap();
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn kde_curve_matches_histogram_support() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSelection::default());
        let Aggregation::Ready(dist) = rating_distribution(&view, DEFAULT_BINS) else {
            panic!("expected data");
        };
        let kde = dist.kde.as_ref().unwrap();
        assert_eq!(kde.len(), KDE_GRID_POINTS);
        assert!((kde[0].x - dist.bins[0].lower).abs() < 1e-9);
        assert!((kde[KDE_GRID_POINTS - 1].x - dist.bins[19].upper).abs() < 1e-9);
        let scale = ds.len() as f64 * dist.bin_width();
        assert!(kde.iter().all(|p| (p.scaled - p.density * scale).abs() < 1e-12));
    }
}
