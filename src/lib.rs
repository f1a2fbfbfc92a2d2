//! # Natural language detection library
//!
//! Detects the language of a text by scoring it against per-language
//! character ngram trees. A tree is learned from a corpus with
//! [`GramTreeBuilder`], optionally pruned, frozen into an immutable
//! [`GramTree`], and registered into a [`Detector`] under a language code.
//! Frozen trees can be persisted as versioned binary models and loaded back
//! as a bundle.
//!
//! # Example
//! ```rust
//! use langtree::{Detector, GramTreeBuilder, NgramBounds};
//!
//! let bounds = NgramBounds::new(1, 3).unwrap();
//!
//! let mut english = GramTreeBuilder::new(bounds);
//! english.learn("the quick brown fox jumps over the lazy dog").unwrap();
//!
//! let mut french = GramTreeBuilder::new(bounds);
//! french.learn("le renard brun saute par-dessus le chien paresseux").unwrap();
//!
//! let detector = Detector::new();
//! detector.register("en", english.build()).unwrap();
//! detector.register("fr", french.build()).unwrap();
//!
//! assert_eq!(detector.detect("the quick brown fox").as_deref(), Some("en"));
//! ```
//!
//! Training many languages at once is parallelized by
//! [`ParallelTrainer`], one worker and one builder per language.

mod bin_model;
mod detector;
mod error;
mod ngrams;
mod trainer;
mod tree;

pub use bin_model::{
    decode_model, encode_model, model_file_name, read_model_file, write_model_file,
};
pub use detector::Detector;
pub use error::{ConfigError, ModelError, RegistryError, TrainError};
pub use ngrams::{NgramBounds, Ngrams};
pub use trainer::{CorpusJob, ParallelTrainer, TrainerConfig, TrainingOutcome};
pub use tree::{GramTree, GramTreeBuilder};
