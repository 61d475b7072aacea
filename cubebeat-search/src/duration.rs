use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DURATION: Regex =
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?)?$").unwrap();
}

/// Parses an ISO-8601 duration such as `PT4M13S` into whole seconds.
/// Returns [None] if the string isn't a duration or doesn't fit in a [u32].
pub fn parse_iso_duration(duration: &str) -> Option<u32> {
    let captures = ISO_DURATION.captures(duration.trim())?;

    let mut parts: [Option<u64>; 4] = [None; 4];

    for (i, part) in parts.iter_mut().enumerate() {
        if let Some(m) = captures.get(i + 1) {
            *part = Some(m.as_str().parse().ok()?);
        }
    }

    if parts.iter().all(Option::is_none) {
        return None;
    }

    let [days, hours, minutes, seconds] = parts.map(Option::unwrap_or_default);

    let total = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;

    u32::try_from(total).ok()
}

/// Converts a millisecond length into whole seconds, saturating at [u32::MAX]
pub fn millis_to_seconds(millis: u64) -> u32 {
    u32::try_from(millis / 1000).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_iso_durations() {
        assert_eq!(parse_iso_duration("PT4M13S"), Some(253));
        assert_eq!(parse_iso_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso_duration("PT45S"), Some(45));
        assert_eq!(parse_iso_duration("PT3M"), Some(180));
        assert_eq!(parse_iso_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso_duration("PT12.5S"), Some(12));
        assert_eq!(parse_iso_duration("P0D"), Some(0));
    }

    #[test]
    fn test_invalid_durations() {
        assert_eq!(parse_iso_duration(""), None);
        assert_eq!(parse_iso_duration("PT"), None);
        assert_eq!(parse_iso_duration("4:13"), None);
        assert_eq!(parse_iso_duration("P"), None);
    }

    #[test]
    fn test_oversized_durations() {
        assert_eq!(parse_iso_duration("P50000D"), None);
        assert_eq!(parse_iso_duration("PT99999999999999999999S"), None);
        assert_eq!(parse_iso_duration("PT1M99999999999999999999S"), None);
        assert_eq!(parse_iso_duration("PT4294967295S"), Some(u32::MAX));
        assert_eq!(parse_iso_duration("PT4294967296S"), None);
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis_to_seconds(253_999), 253);
        assert_eq!(millis_to_seconds(999), 0);
        assert_eq!(millis_to_seconds(u64::MAX), u32::MAX);
    }
}
