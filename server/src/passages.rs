use rand::seq::SliceRandom;

/// Built-in race texts, used when no passage database is configured.
pub const PASSAGES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog. This pangram contains every letter of the alphabet at least once.",
    "All happy families are alike; each unhappy family is unhappy in its own way.",
    "It was the best of times, it was the worst of times, it was the age of wisdom, it was the age of foolishness.",
    "A journey of a thousand miles begins with a single step, and every race begins with a single keystroke.",
    "Typing fast is less about moving your fingers quickly and more about never having to go back and fix a mistake.",
    "Rust empowers everyone to build reliable and efficient software. It prevents segfaults and guarantees thread safety.",
    "Far out in the uncharted backwaters of the unfashionable end of the western spiral arm of the galaxy lies a small unregarded yellow sun.",
    "The sea was calm that morning, and the fishing boats drifted out past the harbor wall one after another.",
];

pub fn random_passage() -> &'static str {
    PASSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PASSAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passages_are_usable_race_texts() {
        assert!(PASSAGES.len() >= 5);
        for passage in PASSAGES {
            assert!(!passage.is_empty());
            assert_eq!(passage.trim(), *passage);
        }
    }

    #[test]
    fn random_passage_comes_from_the_list() {
        for _ in 0..20 {
            assert!(PASSAGES.contains(&random_passage()));
        }
    }
}
