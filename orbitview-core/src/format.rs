//! Compact number formatting shared by node labels and summary panels

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Abbreviate a metric: `K` from 1,000, `M` from 1,000,000, one decimal place.
///
/// Values below 1,000 are rounded to one decimal and printed without a
/// trailing `.0`. Non-finite values print as-is (`NaN`, `inf`).
pub fn format_metric(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let abs = value.abs();
    // a value that rounds up into the next tier is printed in that tier
    if abs >= 1_000_000.0 || round1(abs / 1_000.0) >= 1_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 || round1(abs) >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        let rounded = round1(value);
        if rounded == 0.0 {
            "0".to_string()
        } else {
            rounded.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(format_metric(999.0), "999");
        assert_eq!(format_metric(1_000.0), "1.0K");
        assert_eq!(format_metric(1_500_000.0), "1.5M");
        assert_eq!(format_metric(12_345.0), "12.3K");
        assert_eq!(format_metric(2_000_000_000.0), "2000.0M");
    }

    #[test]
    fn test_small_values() {
        assert_eq!(format_metric(0.0), "0");
        assert_eq!(format_metric(-0.01), "0");
        assert_eq!(format_metric(12.34), "12.3");
        assert_eq!(format_metric(7.0), "7");
    }

    #[test]
    fn test_rounding_promotes_to_next_tier() {
        assert_eq!(format_metric(999.97), "1.0K");
        assert_eq!(format_metric(999_960.0), "1.0M");
    }

    #[test]
    fn test_negative_values_keep_sign() {
        assert_eq!(format_metric(-2_500.0), "-2.5K");
        assert_eq!(format_metric(-42.0), "-42");
    }

    #[test]
    fn test_non_finite_values_are_visible() {
        assert_eq!(format_metric(f64::NAN), "NaN");
        assert_eq!(format_metric(f64::INFINITY), "inf");
    }
}
