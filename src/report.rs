//! Human-readable output: training summary, per-document predictions and
//! the final accuracy line.

use std::io::{self, Write};

use crate::bayes::{Classifier, Document, Prediction};

/// Significant digits used for every printed score.
const PRECISION: usize = 3;

/// Formats a score like `printf("%.3g")`: three significant digits, trailing
/// zeros dropped, scientific notation for very small or large magnitudes.
pub fn format_score(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        let zero = if value.is_sign_negative() { "-0" } else { "0" };
        return zero.to_string();
    }

    let sci = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub fn write_training_rows<W: Write>(out: &mut W, docs: &[Document]) -> io::Result<()> {
    writeln!(out, "training data:")?;
    for doc in docs {
        writeln!(out, "  label = {}, content = {}", doc.label, doc.content)?;
    }
    Ok(())
}

/// Prints the document count and, in debug mode, the vocabulary size, every
/// class prior and every non-zero per-label likelihood.
pub fn write_training_summary<W: Write>(
    out: &mut W,
    classifier: &Classifier,
    debug: bool,
) -> io::Result<()> {
    writeln!(out, "trained on {} examples", classifier.num_documents())?;
    if !debug {
        return Ok(());
    }

    writeln!(out, "vocabulary size = {}", classifier.vocabulary_size())?;
    writeln!(out)?;

    writeln!(out, "classes:")?;
    for label in classifier.labels() {
        if let Some(prior) = classifier.log_prior(label) {
            writeln!(
                out,
                "  {}, {} examples, log-prior = {}",
                label,
                classifier.label_count(label),
                format_score(prior)
            )?;
        }
    }

    writeln!(out, "classifier parameters:")?;
    for (label, token, count) in classifier.parameters() {
        if let Some(likelihood) = classifier.log_likelihood(label, token) {
            writeln!(
                out,
                "  {}:{}, count = {}, log-likelihood = {}",
                label,
                token,
                count,
                format_score(likelihood)
            )?;
        }
    }
    writeln!(out)?;

    Ok(())
}

/// Running tally of correct predictions over a labeled test set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    correct: usize,
    total: usize,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one test document; returns whether the prediction was right.
    pub fn record(&mut self, expected: &str, prediction: &Prediction) -> bool {
        let hit = prediction.label == expected;
        if hit {
            self.correct += 1;
        }
        self.total += 1;
        hit
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `correct / total`, or `None` when nothing was evaluated.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

pub fn write_prediction<W: Write>(
    out: &mut W,
    expected: &str,
    content: &str,
    prediction: &Prediction,
) -> io::Result<()> {
    writeln!(
        out,
        "  correct = {}, predicted = {}, log-probability score = {}",
        expected,
        prediction.label,
        format_score(prediction.score)
    )?;
    writeln!(out, "  content = {}", content)?;
    writeln!(out)
}

pub fn write_performance<W: Write>(out: &mut W, eval: &Evaluation) -> io::Result<()> {
    writeln!(
        out,
        "performance: {} / {} posts predicted correctly",
        eval.correct(),
        eval.total()
    )
}
