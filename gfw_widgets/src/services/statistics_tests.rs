#[cfg(test)]
mod tests {
    use crate::models::{DensifiedPoint, StatusBand};
    use crate::services::statistics::{
        compute_latest_stats, compute_stats, population_std_dev, weekly_means_excluding,
    };
    use crate::time::week_start;

    fn point(year: i32, week: u32, count: f64) -> DensifiedPoint {
        DensifiedPoint {
            year,
            week,
            count: Some(count),
            date: week_start(year, week).unwrap(),
        }
    }

    /// Weeks 1..=10 of 2018..=2021, all 10 except 2021 week 5.
    fn spike_series(spike: f64) -> Vec<DensifiedPoint> {
        let mut points = Vec::new();
        for year in 2018..=2021 {
            for week in 1..=10 {
                let count = if year == 2021 && week == 5 { spike } else { 10.0 };
                points.push(point(year, week, count));
            }
        }
        points
    }

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[4.0, 4.0]), 0.0);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_spike_is_unusually_high() {
        let stats = compute_stats(&spike_series(40.0), 2021);
        assert_eq!(stats.len(), 10);

        let week_5 = &stats[4];
        assert_eq!(week_5.mean, 10.0);
        // own series: nine 10s and one 40 -> population sd 9
        assert!((week_5.std_dev - 9.0).abs() < 1e-12);
        assert_eq!(week_5.status(), StatusBand::UnusuallyHigh);
    }

    #[test]
    fn test_mean_is_leave_one_out() {
        let mut points = spike_series(1000.0);
        points.push(point(2017, 5, 2.0));

        let means = weekly_means_excluding(&points, 2021);
        assert_eq!(means[&5], (10.0 * 3.0 + 2.0) / 4.0);

        let stats = compute_stats(&points, 2021);
        assert_eq!(stats[4].mean, means[&5]);
    }

    #[test]
    fn test_two_std_dev_bands_use_previous_week_mean() {
        // other years ramp up week by week so each week has a distinct mean
        let mut points = Vec::new();
        for year in 2019..=2020 {
            for week in 1..=4 {
                points.push(point(year, week, week as f64 * 10.0));
            }
        }
        for week in 1..=4 {
            points.push(point(2021, week, 0.0));
        }
        points[8].count = Some(6.0); // 2021 week 1, gives a non-zero sd

        let stats = compute_stats(&points, 2021);
        let sd = stats[0].std_dev;
        assert!(sd > 0.0);

        // first index falls back to its own mean
        assert_eq!(stats[0].two_plus_std_dev, [10.0, 10.0 + sd]);
        // later indices are offset by one week
        assert_eq!(stats[1].mean, 20.0);
        assert_eq!(stats[1].two_plus_std_dev, [10.0, 10.0 + sd]);
        assert_eq!(stats[1].two_minus_std_dev, [10.0 - sd, 10.0]);
        assert_eq!(stats[3].two_plus_std_dev, [30.0, 30.0 + sd]);
        // the one-sigma bands stay on the point's own mean
        assert_eq!(stats[1].plus_std_dev, [20.0, 20.0 + sd]);
        assert_eq!(stats[1].minus_std_dev, [20.0 - sd, 20.0]);
    }

    #[test]
    fn test_week_without_other_years_has_zero_mean() {
        let points = vec![point(2020, 1, 3.0), point(2021, 1, 4.0), point(2021, 2, 8.0)];
        let stats = compute_stats(&points, 2021);
        assert_eq!(stats[0].mean, 3.0);
        assert_eq!(stats[1].mean, 0.0);
    }

    #[test]
    fn test_null_counts_are_skipped() {
        let mut points = vec![point(2020, 1, 3.0), point(2021, 1, 5.0), point(2021, 2, 5.0)];
        points.push(DensifiedPoint {
            count: None,
            ..point(2021, 3, 0.0)
        });

        let stats = compute_stats(&points, 2021);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].std_dev, 0.0);
        assert_eq!(stats[2].status(), StatusBand::UnusuallyLow);
    }

    #[test]
    fn test_flat_series_defaults_to_unusually_low() {
        let stats = compute_stats(&spike_series(10.0), 2021);
        assert!(stats.iter().all(|s| s.std_dev == 0.0));
        assert!(stats.iter().all(|s| s.status() == StatusBand::UnusuallyLow));
    }

    #[test]
    fn test_latest_stats() {
        assert!(compute_latest_stats(&[]).is_none());
        let stats = compute_latest_stats(&spike_series(40.0)).unwrap();
        assert!(stats.iter().all(|s| s.year() == 2021));
    }

    #[test]
    fn test_missing_target_year() {
        assert!(compute_stats(&spike_series(40.0), 2010).is_empty());
    }
}
