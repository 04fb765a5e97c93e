//! Lexical answer scoring.
//!
//! [`score`] takes a reference answer and a generated answer and reports
//! ROUGE-1 and ROUGE-L precision, recall and F-measure. Both texts are
//! lowercased, reduced to `[a-z0-9]` tokens and stemmed before comparison.
//! Scoring is pure and infallible.

mod rouge;
mod tokenize;

pub use tokenize::tokenize;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Precision, recall and harmonic mean, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl Score {
    /// `overlap` matched units against reference and generated lengths.
    pub(crate) fn from_overlap(overlap: usize, reference_len: usize, generated_len: usize) -> Self {
        if reference_len == 0 || generated_len == 0 {
            return Self::default();
        }
        let precision = overlap as f64 / generated_len as f64;
        let recall = overlap as f64 / reference_len as f64;
        let fmeasure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            fmeasure,
        }
    }
}

/// Scores for one generated/reference pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub rouge1: Score,
    #[serde(rename = "rougeL")]
    pub rouge_l: Score,
}

/// Scores `generated` against `reference` with stemming enabled.
///
/// Precision is measured over the generated tokens, recall over the
/// reference tokens.
pub fn score(reference: &str, generated: &str) -> ScoreReport {
    score_with(reference, generated, true)
}

/// Same as [`score`], with stemming optional.
pub fn score_with(reference: &str, generated: &str, use_stemmer: bool) -> ScoreReport {
    let stemmer = use_stemmer.then(tokenize::english_stemmer);
    let gen_toks = tokenize(generated, stemmer.as_ref());
    let ref_toks = tokenize(reference, stemmer.as_ref());

    let report = ScoreReport {
        rouge1: rouge::rouge1(&ref_toks, &gen_toks),
        rouge_l: rouge::rouge_l(&ref_toks, &gen_toks),
    };
    debug!(
        generated_tokens = gen_toks.len(),
        reference_tokens = ref_toks.len(),
        rouge1_f = report.rouge1.fmeasure,
        rouge_l_f = report.rouge_l.fmeasure,
        "scored answer"
    );
    report
}
