/// X (seconds) and Y (score) upper bounds for the results chart.
/// Both stay at least 1 so the axes never collapse.
pub fn compute_chart_params(points: &[(f64, f64)], time_used_secs: f64) -> (f64, f64) {
    let highest_score = points.iter().map(|&(_, score)| score).fold(0.0, f64::max);
    let last_sample = points.last().map(|&(t, _)| t).unwrap_or(0.0);

    let overall_duration = last_sample.max(time_used_secs).max(1.0);
    (overall_duration, highest_score.max(1.0))
}

pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timeline_uses_time_used() {
        assert_eq!(compute_chart_params(&[], 12.0), (12.0, 1.0));
        assert_eq!(compute_chart_params(&[], 0.0), (1.0, 1.0));
    }

    #[test]
    fn bounds_cover_highest_score() {
        let points = [(0.0, 0.0), (2.6, 180.0), (5.1, 320.0)];
        assert_eq!(compute_chart_params(&points, 4.0), (5.1, 320.0));
    }

    #[test]
    fn labels() {
        assert_eq!(format_label(60.0), "60");
        assert_eq!(format_label(5.14), "5.1");
    }
}
