/// Cadence of the metrics tick while racing.
pub const TICK_INTERVAL_MS: u32 = 1_000;

/// Whitespace-delimited tokens; a partially typed word counts as one.
/// Empty or all-whitespace input counts as zero words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words per minute, rounded to the nearest integer.
///
/// Zero elapsed time reports 0 rather than an unbounded rate.
pub fn words_per_minute(words: usize, elapsed_ms: u64) -> u32 {
    if elapsed_ms == 0 {
        return 0;
    }
    let minutes = elapsed_ms as f64 / 60_000.0;
    (words as f64 / minutes).round() as u32
}

/// WPM for `typed` at `now_ms`, given the race started at `started_ms`.
pub fn wpm_at(typed: &str, started_ms: u64, now_ms: u64) -> u32 {
    words_per_minute(count_words(typed), now_ms.saturating_sub(started_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("the"), 1);
        assert_eq!(count_words("the quick brown fox ju"), 5);
        assert_eq!(count_words("the\tquick\nfox "), 3);
    }

    #[test]
    fn test_words_per_minute() {
        // 5 words in 30 seconds = 10 WPM
        assert_eq!(words_per_minute(5, 30_000), 10);

        // 1 word in 1 second = 60 WPM
        assert_eq!(words_per_minute(1, 1_000), 60);

        // 7 words in 40 seconds = 10.5, rounds up
        assert_eq!(words_per_minute(7, 40_000), 11);

        // Edge case: 0 elapsed
        assert_eq!(words_per_minute(12, 0), 0);
    }

    #[test]
    fn first_tick_with_nothing_typed_is_zero() {
        assert_eq!(wpm_at("", 10_000, 11_000), 0);
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        assert_eq!(wpm_at("hello there", 10_000, 9_000), 0);
    }
}
