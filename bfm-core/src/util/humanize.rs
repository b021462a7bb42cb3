//! src/util/humanize.rs

use std::time::SystemTime;

use bytesize::ByteSize;

pub fn human_readable_size(size: u64) -> String {
    ByteSize::b(size).to_string()
}

/// Age of `modified` at `now` in its largest whole unit: `3y`, `2m`, `1w`,
/// `4d` or `5h`. Timestamps in the future read as `0h`.
pub fn compact_age(modified: SystemTime, now: SystemTime) -> String {
    let hours = now
        .duration_since(modified)
        .map_or(0, |age| age.as_secs() / 3600);

    let units: [(u64, &str); 4] = [(8640, "y"), (720, "m"), (168, "w"), (24, "d")];
    for (per_unit, suffix) in units {
        if hours >= per_unit {
            return format!("{}{suffix}", hours / per_unit);
        }
    }
    format!("{hours}h")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_compact_age_picks_largest_unit() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(400 * 24 * 3600);
        let ago = |hours: u64| now - Duration::from_secs(hours * 3600);

        assert_eq!(compact_age(ago(5), now), "5h");
        assert_eq!(compact_age(ago(49), now), "2d");
        assert_eq!(compact_age(ago(24 * 15), now), "2w");
        assert_eq!(compact_age(ago(24 * 61), now), "2m");
        assert_eq!(compact_age(ago(24 * 365), now), "1y");
        assert_eq!(compact_age(now + Duration::from_secs(60), now), "0h");
    }

    #[test]
    fn test_size_is_nonempty() {
        assert!(!human_readable_size(0).is_empty());
        assert_ne!(human_readable_size(1), human_readable_size(5 * 1024 * 1024));
    }
}
