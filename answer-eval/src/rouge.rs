//! ROUGE-N unigram overlap and ROUGE-L longest common subsequence.

use std::collections::HashMap;

use crate::Score;

/// ROUGE-1: clipped unigram overlap between the two token sequences.
pub fn rouge1(reference: &[String], generated: &[String]) -> Score {
    if reference.is_empty() || generated.is_empty() {
        return Score::default();
    }
    let ref_counts = counts(reference);
    let gen_counts = counts(generated);

    let overlap: usize = gen_counts
        .iter()
        .map(|(tok, &n)| n.min(ref_counts.get(tok).copied().unwrap_or(0)))
        .sum();

    Score::from_overlap(overlap, reference.len(), generated.len())
}

/// ROUGE-L: longest common subsequence over token sequences.
pub fn rouge_l(reference: &[String], generated: &[String]) -> Score {
    if reference.is_empty() || generated.is_empty() {
        return Score::default();
    }
    let lcs = lcs_len(reference, generated);
    Score::from_overlap(lcs, reference.len(), generated.len())
}

fn counts(tokens: &[String]) -> HashMap<&str, usize> {
    let mut m = HashMap::new();
    for t in tokens {
        *m.entry(t.as_str()).or_insert(0) += 1;
    }
    m
}

/// Two-row dynamic programming table.
fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
