//! Human-readable rendering of raw simulation output.
//!
//! The engine hands off plain log-space values and second counts; turning
//! them into scientific notation and time units happens here, at the edge.

/// Render a log-space value as `3.63e6`-style scientific notation.
pub fn log_to_exp(value: f64, decimals: u32) -> String {
    if value == f64::NEG_INFINITY {
        return "0".to_string();
    }
    let whole = value.floor();
    let frac = round(10f64.powf(value - whole), decimals);
    if frac >= 10.0 {
        format!("{}e{}", frac / 10.0, (whole + 1.0) as i64)
    } else {
        format!("{}e{}", frac, whole as i64)
    }
}

/// Render a duration in seconds as years/days/hours/minutes. Minutes are
/// dropped once the duration crosses a year.
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let mins = ((secs / 60.0) % 60.0).floor() as u64;
    let hrs = ((secs / 3600.0) % 24.0).floor() as u64;
    let days = ((secs / 86_400.0) % 365.0).floor() as u64;
    let years = (secs / 31_536_000.0).floor() as u64;

    let mut out = String::new();
    if years > 0 {
        if years < 1_000_000 {
            out.push_str(&years.to_string());
        } else {
            out.push_str(&log_to_exp((years as f64).log10(), 3));
        }
        out.push('y');
    }
    if days > 0 {
        out.push_str(&format!("{days}d"));
    }
    out.push_str(&format!("{hrs:02}h"));
    if years == 0 {
        out.push_str(&format!("{mins:02}m"));
    }
    out
}

/// Six-significant-digit rendering for multipliers and rates.
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).max(0) as usize;
    format!("{value:.decimals$}")
}

fn round(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
