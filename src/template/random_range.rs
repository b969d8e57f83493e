//! `<random:lo:hi>` numeric tags.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

static RANDOM_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<random:(-?\d*\.?\d+):(-?\d*\.?\d+)>").expect("valid random tag pattern")
});

/// Bounds of one `<random:lo:hi>` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomRange {
    pub low: f64,
    pub high: f64,
}

impl RandomRange {
    /// Uniform draw between the bounds, rounded to 4 decimal places.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let value = self.low + (self.high - self.low) * rng.gen::<f64>();
        (value * 10_000.0).round() / 10_000.0
    }
}

/// Format a float the way prompt text expects: whole numbers keep `.0`.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Replace every random tag with a fresh draw.
pub fn resolve_random_ranges<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    RANDOM_TAG
        .replace_all(text, |caps: &regex::Captures| {
            match (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
                (Ok(low), Ok(high)) => format_decimal(RandomRange { low, high }.sample(rng)),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_value_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let out = resolve_random_ranges("<random:0.5:1.5>", &mut rng);
            let value: f64 = out.parse().unwrap();
            assert!((0.5..=1.5).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn test_rounds_to_four_places() {
        let mut rng = StdRng::seed_from_u64(11);
        let out = resolve_random_ranges("<random:0:1>", &mut rng);
        let decimals = out.split('.').nth(1).unwrap_or("");
        assert!(decimals.len() <= 4, "{out}");
    }

    #[test]
    fn test_equal_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_random_ranges("w=<random:2:2>", &mut rng), "w=2.0");
        assert_eq!(resolve_random_ranges("<random:-.5:-.5>", &mut rng), "-0.5");
    }

    #[test]
    fn test_non_tags_untouched() {
        let mut rng = StdRng::seed_from_u64(0);
        let text = "<random:a:b> <random:1> <lora:x:0.8>";
        assert_eq!(resolve_random_ranges(text, &mut rng), text);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1.0), "1.0");
        assert_eq!(format_decimal(-3.0), "-3.0");
        assert_eq!(format_decimal(0.1234), "0.1234");
    }
}
