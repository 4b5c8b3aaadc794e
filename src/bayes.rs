use std::collections::{hash_map::Entry, BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::tokenize::distinct_tokens;

/// One labeled unit of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub label: String,
    pub content: String,
}

/// The winning label for a document and its log-posterior score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

// Every count here is a number of documents, never a raw term frequency.
#[derive(Debug, Default)]
struct Frequencies {
    num_docs: usize,
    vocabulary: BTreeSet<String>,
    word_freq: HashMap<String, usize>,
    label_freq: HashMap<String, usize>,
    // label -> token -> count
    joint_freq: HashMap<String, HashMap<String, usize>>,
}

/// Accumulates document statistics. Call [`Trainer::finish`] once the
/// corpus is exhausted to get a read-only [`Classifier`].
#[derive(Debug, Default)]
pub struct Trainer {
    freqs: Frequencies,
    training_set: Vec<Document>,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one labeled document into the model. Empty content is allowed
    /// and only contributes to the label count.
    pub fn ingest(&mut self, label: &str, content: &str) {
        let tokens = distinct_tokens(content);
        let freqs = &mut self.freqs;

        for &token in &tokens {
            if !freqs.vocabulary.contains(token) {
                freqs.vocabulary.insert(token.to_string());
            }
            *freqs.word_freq.entry(token.to_string()).or_insert(0) += 1;
        }

        *freqs.label_freq.entry(label.to_string()).or_insert(0) += 1;

        let joint = match freqs.joint_freq.entry(label.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(HashMap::new()),
        };
        for &token in &tokens {
            *joint.entry(token.to_string()).or_insert(0) += 1;
        }

        self.training_set.push(Document {
            label: label.to_string(),
            content: content.to_string(),
        });
        freqs.num_docs += 1;

        tracing::trace!(label, distinct_tokens = tokens.len(), "ingested document");
    }

    pub fn num_documents(&self) -> usize {
        self.freqs.num_docs
    }

    /// Ends training. The returned classifier has no way to mutate the
    /// counts, so it can be shared freely between threads.
    pub fn finish(self) -> Classifier {
        let freqs = self.freqs;

        let label_total: usize = freqs.label_freq.values().sum();
        assert_eq!(
            label_total, freqs.num_docs,
            "label counts must add up to the document count"
        );
        debug_assert_eq!(self.training_set.len(), freqs.num_docs);

        tracing::info!(
            documents = freqs.num_docs,
            labels = freqs.label_freq.len(),
            vocabulary = freqs.vocabulary.len(),
            "training finished"
        );

        Classifier {
            freqs,
            training_set: self.training_set,
        }
    }
}

/// A trained, immutable Naive Bayes model over document-presence counts.
#[derive(Debug)]
pub struct Classifier {
    freqs: Frequencies,
    training_set: Vec<Document>,
}

impl Classifier {
    /// Total number of training documents (`N`).
    pub fn num_documents(&self) -> usize {
        self.freqs.num_docs
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.freqs.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.freqs.vocabulary.len()
    }

    /// The training documents in the order they were ingested.
    pub fn documents(&self) -> &[Document] {
        &self.training_set
    }

    /// Known labels in ascending lexicographic order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.freqs.label_freq.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    pub fn label_count(&self, label: &str) -> usize {
        self.freqs.label_freq.get(label).copied().unwrap_or(0)
    }

    pub fn word_count(&self, token: &str) -> usize {
        self.freqs.word_freq.get(token).copied().unwrap_or(0)
    }

    pub fn joint_count(&self, label: &str, token: &str) -> usize {
        self.freqs
            .joint_freq
            .get(label)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Every non-zero `(label, token, count)` triple, sorted by label then token.
    pub fn parameters(&self) -> Vec<(&str, &str, usize)> {
        let mut params: Vec<(&str, &str, usize)> = self
            .freqs
            .joint_freq
            .iter()
            .flat_map(|(label, tokens)| {
                tokens
                    .iter()
                    .filter(|(_, count)| **count > 0)
                    .map(move |(token, &count)| (label.as_str(), token.as_str(), count))
            })
            .collect();
        params.sort_unstable();
        params
    }

    /// `ln(P(label))`, or `None` if the label was never seen.
    pub fn log_prior(&self, label: &str) -> Option<f64> {
        let count = self.label_count(label);
        if count == 0 {
            return None;
        }
        Some((count as f64 / self.freqs.num_docs as f64).ln())
    }

    /// `ln(P(token | label))` estimated from training counts, or `None` if
    /// the token never appeared under the label.
    pub fn log_likelihood(&self, label: &str, token: &str) -> Option<f64> {
        let joint = self.joint_count(label, token);
        if joint == 0 {
            return None;
        }
        Some((joint as f64 / self.label_count(label) as f64).ln())
    }

    /// Scores `content` against every known label, in ascending label order.
    pub fn score_all(&self, content: &str) -> Result<Vec<(&str, f64)>> {
        if self.freqs.num_docs == 0 || self.freqs.label_freq.is_empty() {
            return Err(Error::ModelNotTrained);
        }

        let query = distinct_tokens(content);
        Ok(self
            .labels()
            .into_iter()
            .map(|label| (label, self.score_label(label, &query)))
            .collect())
    }

    /// Picks the label with the greatest log-posterior score.
    ///
    /// Labels are visited in ascending lexicographic order and the running
    /// best is only replaced by a strictly greater score, so an exact tie is
    /// won by the smallest label.
    pub fn predict(&self, content: &str) -> Result<Prediction> {
        let scores = self.score_all(content)?;

        let mut scores = scores.into_iter();
        let (mut best_label, mut best_score) = scores.next().ok_or(Error::ModelNotTrained)?;
        for (label, score) in scores {
            if score > best_score {
                best_label = label;
                best_score = score;
            }
        }

        tracing::debug!(label = best_label, score = best_score, "predicted");

        Ok(Prediction {
            label: best_label.to_string(),
            score: best_score,
        })
    }

    fn score_label(&self, label: &str, query: &BTreeSet<&str>) -> f64 {
        let num_docs = self.freqs.num_docs as f64;
        let label_count = self.label_count(label);
        let joint = self.freqs.joint_freq.get(label);

        let mut score = (label_count as f64 / num_docs).ln();
        for &token in query {
            let joint_count = joint
                .and_then(|tokens| tokens.get(token))
                .copied()
                .unwrap_or(0);
            debug_assert!(joint_count <= label_count);

            // Tokens never seen under this label fall back to their global
            // document frequency, and unseen tokens to 1 / N.
            score += if joint_count > 0 {
                (joint_count as f64 / label_count as f64).ln()
            } else {
                match self.word_count(token) {
                    0 => (1.0 / num_docs).ln(),
                    word_count => (word_count as f64 / num_docs).ln(),
                }
            };
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn train(rows: &[(&str, &str)]) -> Classifier {
        let mut trainer = Trainer::new();
        for (label, content) in rows {
            trainer.ingest(label, content);
        }
        trainer.finish()
    }

    #[test]
    fn spam_ham_counts() {
        let model = train(&[("spam", "buy now"), ("ham", "meeting now")]);

        assert_eq!(model.num_documents(), 2);
        assert_eq!(model.label_count("spam"), 1);
        assert_eq!(model.label_count("ham"), 1);
        assert_eq!(model.word_count("buy"), 1);
        assert_eq!(model.word_count("now"), 2);
        assert_eq!(model.word_count("meeting"), 1);
        assert_eq!(model.joint_count("spam", "now"), 1);
        assert_eq!(model.joint_count("ham", "now"), 1);
        assert_eq!(model.joint_count("spam", "buy"), 1);
        assert_eq!(model.joint_count("ham", "buy"), 0);
        assert_eq!(model.vocabulary_size(), 3);
    }

    #[test]
    fn spam_ham_tie_goes_to_smaller_label() {
        let model = train(&[("spam", "buy now"), ("ham", "meeting now")]);

        let prediction = model.predict("now").unwrap();
        assert_eq!(prediction.label, "ham");
        assert_close(prediction.score, 0.5f64.ln());
    }

    #[test]
    fn repeated_tokens_count_once_per_document() {
        let model = train(&[("a", "x x x y"), ("a", "x")]);

        assert_eq!(model.word_count("x"), 2);
        assert_eq!(model.joint_count("a", "x"), 2);
        assert_eq!(model.word_count("y"), 1);

        // Repetition in the query must not change the score either.
        let once = model.predict("x y").unwrap();
        let many = model.predict("x x y y y").unwrap();
        assert_eq!(once, many);
    }

    #[test]
    fn label_counts_sum_to_document_count() {
        let rows = [
            ("a", "one two"),
            ("b", "two three"),
            ("a", ""),
            ("c", "three three four"),
            ("b", "one"),
        ];
        let model = train(&rows);

        let total: usize = model.labels().iter().map(|l| model.label_count(l)).sum();
        assert_eq!(total, rows.len());
        assert_eq!(model.num_documents(), rows.len());
        assert_eq!(model.documents().len(), rows.len());
    }

    #[test]
    fn joint_counts_are_bounded() {
        let model = train(&[
            ("a", "one two"),
            ("b", "two three"),
            ("a", "two"),
            ("c", "three four"),
        ]);

        for label in model.labels() {
            for token in model.vocabulary() {
                let joint = model.joint_count(label, token);
                assert!(joint <= model.label_count(label));
                assert!(joint <= model.word_count(token));
            }
        }
    }

    #[test]
    fn empty_content_only_counts_the_label() {
        let model = train(&[("a", ""), ("b", "word")]);

        assert_eq!(model.label_count("a"), 1);
        assert_eq!(model.num_documents(), 2);
        assert_eq!(model.vocabulary_size(), 1);
        assert!(model.parameters().iter().all(|&(label, _, _)| label == "b"));
    }

    #[test]
    fn training_set_keeps_ingest_order() {
        let model = train(&[("b", "second"), ("a", "first")]);
        let labels: Vec<&str> = model.documents().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn untrained_model_is_rejected() {
        let model = Trainer::new().finish();

        assert!(matches!(model.predict("anything"), Err(Error::ModelNotTrained)));
        assert!(matches!(model.predict(""), Err(Error::ModelNotTrained)));
        assert!(matches!(model.score_all("x"), Err(Error::ModelNotTrained)));
    }

    #[test]
    fn single_label_corpus_always_wins() {
        let model = train(&[("only", "alpha beta"), ("only", "beta gamma")]);

        assert_close(model.log_prior("only").unwrap(), 0.0);

        let prediction = model.predict("beta").unwrap();
        assert_eq!(prediction.label, "only");
        assert_close(prediction.score, 0.0);

        // Unseen token falls back to ln(1 / N).
        let prediction = model.predict("delta").unwrap();
        assert_eq!(prediction.label, "only");
        assert_close(prediction.score, 0.5f64.ln());
    }

    #[test]
    fn exact_tie_prefers_lexicographically_smaller_label() {
        // Ingest the larger label first so that ingest order can't explain the result.
        let model = train(&[("zebra", "common"), ("apple", "common")]);

        let scores = model.score_all("common unseen").unwrap();
        assert_eq!(scores[0].1, scores[1].1);
        assert_eq!(model.predict("common unseen").unwrap().label, "apple");
    }

    #[test]
    fn three_fallback_tiers() {
        let model = train(&[("A", "x"), ("A", "x y"), ("B", "y")]);
        let n = 3.0f64;

        // Tier a: seen under the label.
        let scores = model.score_all("x").unwrap();
        assert_eq!(scores[0].0, "A");
        assert_close(scores[0].1, (2.0 / n).ln() + (2.0f64 / 2.0).ln());

        // Tier b: seen only under another label, uses WordFrequency / N.
        assert_eq!(scores[1].0, "B");
        assert_close(scores[1].1, (1.0 / n).ln() + (2.0 / n).ln());

        // Tier c: never seen, uses 1 / N.
        let scores = model.score_all("z").unwrap();
        assert_close(scores[1].1, (1.0 / n).ln() + (1.0 / n).ln());
    }

    #[test]
    fn strictly_better_label_wins() {
        let model = train(&[
            ("sports", "goal match team"),
            ("sports", "team win"),
            ("tech", "cpu code"),
        ]);

        let prediction = model.predict("team goal").unwrap();
        assert_eq!(prediction.label, "sports");

        let prediction = model.predict("cpu").unwrap();
        assert_eq!(prediction.label, "tech");
        assert!(prediction.score <= 0.0);
    }

    #[test]
    fn predict_is_deterministic() {
        let model = train(&[("a", "p q r"), ("b", "q r s"), ("c", "r s t")]);

        let first = model.predict("q s unknown").unwrap();
        let second = model.predict("q s unknown").unwrap();
        assert_eq!(first.label, second.label);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
    }

    #[test]
    fn debug_parameters_are_sorted() {
        let model = train(&[("b", "y x"), ("a", "z")]);

        assert_eq!(
            model.parameters(),
            vec![("a", "z", 1), ("b", "x", 1), ("b", "y", 1)]
        );
        assert_close(model.log_likelihood("b", "x").unwrap(), 0.0);
        assert_eq!(model.log_likelihood("a", "x"), None);
        assert_eq!(model.log_prior("missing"), None);
    }

    #[test]
    fn classifier_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Classifier>();

        let model = train(&[("a", "one"), ("b", "two")]);
        let expected = model.predict("two").unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| model.predict("two").unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
