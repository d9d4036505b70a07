// ==============================================================================
// "Did you mean" Hints
// ==============================================================================
//
// Used by the loader when a type string is neither a primitive nor a named
// type defined so far, which is usually a typo (`strnig`) or a name whose
// definition comes later in the file.

/// Edit distance between two strings, counted in chars.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Largest edit distance still worth suggesting for a name of this length.
fn threshold(len: usize) -> usize {
    if len <= 4 { 1 } else { 2 }
}

/// The candidate closest to `unknown`, if any is close enough. Ties go to the
/// earliest candidate, so hints are deterministic.
pub(crate) fn closest<'c>(
    unknown: &str,
    candidates: impl IntoIterator<Item = &'c str>,
) -> Option<&'c str> {
    let limit = threshold(unknown.chars().count());
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        let distance = levenshtein(unknown, candidate);
        if distance <= limit && best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, name)| name)
}
