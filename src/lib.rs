//! Naive Bayes text classification over short labeled documents.
//!
//! Training counts, per label and per token, how many documents contain each
//! token. Prediction sums log-probabilities built from those counts and
//! returns the highest scoring label.

pub mod bayes;
pub mod corpus;
pub mod error;
pub mod report;
pub mod tokenize;

pub use bayes::{Classifier, Document, Prediction, Trainer};
pub use corpus::CorpusReader;
pub use error::{Error, Result};
