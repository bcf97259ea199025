//! Human-readable sentence durations.

/// Split fractional years into whole years and rounded months.
///
/// Months are rounded half up. A rounding result of 12 months carries into
/// the years component, so the month part is always in `0..12`.
pub fn years_and_months(value: f64) -> (u64, u32) {
    if !value.is_finite() || value <= 0.0 {
        return (0, 0);
    }

    let mut years = value.floor() as u64;
    let mut months = round_half_up((value - value.floor()) * 12.0);
    if months >= 12 {
        years += 1;
        months = 0;
    }
    (years, months)
}

/// Round a non-negative month count, halves going up.
pub fn round_half_up(months: f64) -> u32 {
    // f64::round rounds half away from zero, which is half-up for months >= 0
    months.max(0.0).round() as u32
}

/// Format fractional years as `"<Y> years and <M> months"`.
///
/// Either clause is dropped when it is zero; both zero gives an empty string.
///
/// ```rust
/// use prisonstatslib::query::format_duration;
///
/// assert_eq!(format_duration(7.5), "7 years and 6 months");
/// assert_eq!(format_duration(11.0), "11 years");
/// assert_eq!(format_duration(0.25), "3 months");
/// assert_eq!(format_duration(0.0), "");
/// ```
pub fn format_duration(value: f64) -> String {
    let (years, months) = years_and_months(value);

    let mut clauses = Vec::with_capacity(2);
    if years > 0 {
        clauses.push(format!("{} years", years));
    }
    if months > 0 {
        clauses.push(format!("{} months", months));
    }
    clauses.join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_duration(0.0), "");
    }

    #[test]
    fn test_format_whole_years() {
        assert_eq!(format_duration(1.0), "1 years");
        assert_eq!(format_duration(15.0), "15 years");
    }

    #[test]
    fn test_format_months_only() {
        assert_eq!(format_duration(0.5), "6 months");
    }

    #[test]
    fn test_format_years_and_months() {
        assert_eq!(format_duration(1.5), "1 years and 6 months");
        assert_eq!(format_duration(7.5), "7 years and 6 months");
    }

    #[test]
    fn test_month_carry_normalizes() {
        assert_eq!(years_and_months(1.999996), (2, 0));
        assert_eq!(format_duration(1.999996), "2 years");
        assert_eq!(format_duration(0.99999), "1 years");
    }

    #[test]
    fn test_round_half_up_boundaries() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(1.5), 2);
        // Half-even would give 2 here
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn test_half_month_in_duration() {
        // 0.125 years is exactly 1.5 months, 0.375 years exactly 4.5 months
        assert_eq!(format_duration(1.125), "1 years and 2 months");
        assert_eq!(format_duration(0.375), "5 months");
        assert_eq!(format_duration(10.875), "10 years and 11 months");
    }

    #[test]
    fn test_out_of_domain_is_empty() {
        assert_eq!(format_duration(-3.0), "");
        assert_eq!(format_duration(f64::NAN), "");
        assert_eq!(format_duration(f64::INFINITY), "");
    }
}
