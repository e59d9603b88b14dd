//! Fuzzy answer matching: normalization, edit distance, synonym support.

/// Normalize a guess or target for comparison: canonicalize Hebrew and
/// typographic quote variants, collapse whitespace runs, trim, case-fold.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.trim().chars() {
        let ch = match ch {
            '״' | '\u{201C}' | '\u{201D}' => '"',
            '׳' | '\u{2018}' | '\u{2019}' => '\'',
            c => c,
        };

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }

    out
}

/// Classic Levenshtein distance (single-character insert, delete,
/// substitute), computed over code points so Hebrew input is compared
/// consistently on both sides.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Decide whether a guess matches the target word or any of its synonyms:
/// exact post-normalization equality, or edit distance of at most one
/// (a single typo). Pure; safe for empty and unequal-length inputs.
pub fn is_correct(guess: &str, target: &str, synonyms: &[String]) -> bool {
    let guess = normalize(guess);

    let candidate_matches = |candidate: &str| {
        let candidate = normalize(candidate);
        if guess.is_empty() {
            // An empty guess never matches a real word.
            return candidate.is_empty();
        }
        guess == candidate || levenshtein(&guess, &candidate) <= 1
    };

    candidate_matches(target) || synonyms.iter().any(|s| candidate_matches(s))
}
