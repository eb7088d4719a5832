/// Outcome of comparing typed text against the reference paragraph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Validation {
    pub is_correct: bool,
    /// Percentage in `[0, 100]` of the paragraph reproduced as a contiguous prefix.
    pub progress: f64,
    /// Number of leading characters that match the paragraph.
    pub correct_len: usize,
}

impl Validation {
    pub const EMPTY: Validation = Validation {
        is_correct: true,
        progress: 0.0,
        correct_len: 0,
    };

    pub fn is_complete(&self) -> bool {
        self.progress == 100.0
    }
}

impl Default for Validation {
    fn default() -> Self {
        Validation::EMPTY
    }
}

/// Prefix-wise check of `typed` against `paragraph`.
///
/// Comparison is case and whitespace sensitive. Any divergence drops progress
/// to zero until the text is corrected back into a prefix; nothing earned
/// before the mismatch is retained. An empty paragraph has nothing to
/// validate yet and reports zero progress.
pub fn validate(typed: &str, paragraph: &str) -> Validation {
    if paragraph.is_empty() {
        return Validation::EMPTY;
    }

    let correct_len = common_prefix_len(typed, paragraph);
    let typed_len = typed.chars().count();
    let is_correct = correct_len == typed_len;

    let progress = if !is_correct {
        0.0
    } else if typed == paragraph {
        100.0
    } else {
        typed_len as f64 / paragraph.chars().count() as f64 * 100.0
    };

    Validation {
        is_correct,
        progress,
        correct_len,
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
