//! Display helpers for timestamps and star ratings

use std::fmt;

/// Number of glyphs in a rendered rating
pub const STAR_SLOTS: u8 = 5;

/// Format a playback position as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Fractions are floored. Negative and non-finite input yields `"00:00"`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size of a picked file, in 1024-based units up to GB.
///
/// At most two decimals, trailing zeros dropped: `1536` is `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// A 0-10 rating folded onto five stars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: u8,
    pub has_half: bool,
    pub empty: u8,
}

impl StarRating {
    pub fn total(&self) -> u8 {
        self.full + u8::from(self.has_half) + self.empty
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.full {
            f.write_str("★")?;
        }
        if self.has_half {
            f.write_str("⯪")?;
        }
        for _ in 0..self.empty {
            f.write_str("☆")?;
        }
        Ok(())
    }
}

/// Split a 0-10 rating into full, half and empty stars.
///
/// The rating is clamped to `[0, 10]` first (NaN counts as 0), so the parts
/// always add up to [`STAR_SLOTS`].
pub fn generate_stars(rating: f64) -> StarRating {
    let rating = if rating.is_nan() { 0.0 } else { rating.clamp(0.0, 10.0) };

    let full = (rating / 2.0).floor() as u8;
    let has_half = rating % 2.0 >= 1.0;
    let empty = STAR_SLOTS - full - u8::from(has_half);

    StarRating {
        full,
        has_half,
        empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_clock(s: &str) -> u64 {
        s.split(':').fold(0, |acc, part| acc * 60 + part.parse::<u64>().unwrap())
    }

    #[test]
    fn short_and_long_positions() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(75.0), "1:15");
        assert_eq!(format_time(3599.99), "59:59");
        assert_eq!(format_time(3600.0), "1:00:00");
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(36_000.0), "10:00:00");
    }

    #[test]
    fn invalid_positions() {
        assert_eq!(format_time(-1.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
    }

    #[test]
    fn formatting_preserves_order() {
        let mut prev = 0;
        let mut t = 0.0;
        while t < 10_000.0 {
            let v = parse_clock(&format_time(t));
            assert!(v >= prev, "{} went backwards", t);
            assert_eq!(v, t.floor() as u64);
            prev = v;
            t += 37.3;
        }
    }

    #[test]
    fn stars_bounds() {
        assert_eq!(
            generate_stars(0.0),
            StarRating { full: 0, has_half: false, empty: 5 }
        );
        assert_eq!(
            generate_stars(10.0),
            StarRating { full: 5, has_half: false, empty: 0 }
        );
        assert_eq!(
            generate_stars(7.3),
            StarRating { full: 3, has_half: true, empty: 1 }
        );
        assert_eq!(generate_stars(7.3).to_string(), "★★★⯪☆");
    }

    #[test]
    fn stars_always_sum_to_five() {
        let mut r = -3.0;
        while r <= 13.0 {
            assert_eq!(generate_stars(r).total(), STAR_SLOTS, "rating {}", r);
            r += 0.1;
        }
        assert_eq!(generate_stars(f64::NAN).total(), STAR_SLOTS);
        assert_eq!(generate_stars(42.0).full, 5);
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1000), "1000 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_572_864), "1.5 MB");
        assert_eq!(format_file_size(734_003_200), "700 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
        // no unit past GB
        assert_eq!(format_file_size(5 * 1024_u64.pow(4)), "5120 GB");
    }
}
