//! Display helpers shared by both surfaces

/// Format seconds as `m:ss`
///
/// Minutes are not wrapped into hours. Non-finite and negative values
/// render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Format an optional duration, with a placeholder when unknown
pub fn format_duration(seconds: Option<f64>) -> String {
    seconds.map_or_else(|| "--:--".to_string(), format_time)
}
