//! Human-readable sizes.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count in the largest unit where the value is at least 1.
///
/// At most two decimals are shown and trailing zeros are dropped: `1536` is `"1.5 KB"`,
/// `1024` is `"1 KB"`, `0` is `"0 Bytes"`. Sizes beyond the GB range stay in GB.
pub fn format_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    if unit == 0 {
        return format!("{} {}", bytes, UNITS[0]);
    }

    let value = bytes as f64 / divisor as f64;
    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_boundaries() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1 GB");
    }

    #[test]
    fn test_format_size_rounding() {
        assert_eq!(format_size(1300), "1.27 KB");
        assert_eq!(format_size(2 * 1024 * 1024 + 1024 * 1024 / 10), "2.1 MB");
        assert_eq!(format_size(1024 * 1024 - 1), "1024 KB");
    }

    #[test]
    fn test_format_size_stays_in_gb() {
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }
}
