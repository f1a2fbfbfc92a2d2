use crate::{
    bin_model,
    error::RegistryError,
    tree::GramTree,
};
use ::core::cmp::Ordering;
use ::std::{fs, io, path::Path, sync::Arc};
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use itertools::Itertools;
use parking_lot::RwLock;

#[cfg(test)]
mod tests;

struct Profiles {
    by_code: AHashMap<CompactString, Arc<GramTree>>,
    sealed: bool,
}

/// Registry of per-language gram trees with best-match detection.
///
/// Registration is serialized against queries; queries clone the tree
/// handles out of the lock and score without holding it, so any number of
/// threads may detect concurrently.
///
/// A detector holding a pre-trained bundle can be [`seal`](Self::seal)ed:
/// further registration then fails with [`RegistryError::Sealed`] instead of
/// mutating shared state. Share a sealed detector via `Arc` where a
/// process-wide instance is wanted.
pub struct Detector {
    profiles: RwLock<Profiles>,
}

impl Default for Detector {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Creates an empty, mutable detector.
    #[inline]
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(Profiles {
                by_code: AHashMap::new(),
                sealed: false,
            }),
        }
    }

    /// Loads every `<code>_tree.bin` model found in `dir` and returns a
    /// sealed detector.
    ///
    /// Unreadable or incompatible models are skipped with a warning, so a
    /// bundle stays usable when single languages fail to load.
    pub fn from_models_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let mut by_code = AHashMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(code) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(bin_model::model_file_code)
            else {
                continue;
            };

            match bin_model::read_model_file(&path) {
                Ok(tree) => {
                    by_code.insert(CompactString::from(code), Arc::new(tree));
                }
                Err(e) => {
                    tracing::warn!(code, error = %e, "skipping language model");
                }
            }
        }

        tracing::info!(languages = by_code.len(), "model bundle loaded");
        Ok(Self {
            profiles: RwLock::new(Profiles {
                by_code,
                sealed: true,
            }),
        })
    }

    /// Registers (or overwrites) the tree for a language code.
    pub fn register(
        &self,
        code: impl Into<CompactString>,
        tree: GramTree,
    ) -> Result<(), RegistryError> {
        let mut profiles = self.profiles.write();
        if profiles.sealed {
            return Err(RegistryError::Sealed);
        }
        profiles.by_code.insert(code.into(), Arc::new(tree));
        Ok(())
    }

    /// Registers a language from a persisted model blob.
    pub fn register_bytes(
        &self,
        code: impl Into<CompactString>,
        bytes: &[u8],
    ) -> Result<(), RegistryError> {
        let tree = bin_model::decode_model(bytes)?;
        self.register(code, tree)
    }

    /// Forbids any further registration. One-way.
    #[inline]
    pub fn seal(&self) {
        self.profiles.write().sealed = true;
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.profiles.read().sealed
    }

    /// Registered language codes, sorted.
    pub fn languages(&self) -> Vec<CompactString> {
        let mut codes: Vec<_> = self.profiles.read().by_code.keys().cloned().collect();
        codes.sort_unstable();
        codes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.profiles.read().by_code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.profiles.read().by_code.is_empty()
    }

    /// Detects the language of `text` among all registered languages.
    ///
    /// A language is only ever returned on a strictly positive score; a text
    /// matching nothing (including the empty text) yields [`None`].
    #[inline]
    pub fn detect(&self, text: &str) -> Option<CompactString> {
        self.detect_scan(text, None)
    }

    /// Detects the language of `text` among `allowed` registered languages.
    #[inline]
    pub fn detect_among<'a>(
        &self,
        text: &str,
        allowed: impl IntoIterator<Item = &'a str>,
    ) -> Option<CompactString> {
        let allowed: AHashSet<&str> = allowed.into_iter().collect();
        self.detect_scan(text, Some(&allowed))
    }

    /// Scores `text` against every registered language.
    ///
    /// Result is sorted by score in a descending order, ties broken by
    /// language code. All scores are returned, including non-positive ones.
    #[inline]
    pub fn rank(&self, text: &str) -> Vec<(CompactString, f64)> {
        self.rank_scan(text, None)
    }

    /// Scores `text` against the `allowed` registered languages.
    #[inline]
    pub fn rank_among<'a>(
        &self,
        text: &str,
        allowed: impl IntoIterator<Item = &'a str>,
    ) -> Vec<(CompactString, f64)> {
        let allowed: AHashSet<&str> = allowed.into_iter().collect();
        self.rank_scan(text, Some(&allowed))
    }

    /// Snapshot of the selected profiles in lexicographic code order, so
    /// every scan is deterministic.
    fn snapshot(&self, allowed: Option<&AHashSet<&str>>) -> Vec<(CompactString, Arc<GramTree>)> {
        let profiles = self.profiles.read();
        let mut selected: Vec<_> = profiles
            .by_code
            .iter()
            .filter(|(code, _)| allowed.map_or(true, |set| set.contains(code.as_str())))
            .map(|(code, tree)| (code.clone(), Arc::clone(tree)))
            .collect();
        drop(profiles);
        selected.sort_unstable_by(|first, second| first.0.cmp(&second.0));
        selected
    }

    fn detect_scan(&self, text: &str, allowed: Option<&AHashSet<&str>>) -> Option<CompactString> {
        let mut best = 0.0;
        let mut best_code = None;
        for (code, tree) in self.snapshot(allowed) {
            let score = tree.score_text(text);
            tracing::debug!(%code, score, "language scored");
            if score > best {
                best = score;
                best_code = Some(code);
            }
        }
        best_code
    }

    fn rank_scan(
        &self,
        text: &str,
        allowed: Option<&AHashSet<&str>>,
    ) -> Vec<(CompactString, f64)> {
        self.snapshot(allowed)
            .into_iter()
            .map(|(code, tree)| {
                let score = tree.score_text(text);
                (code, score)
            })
            .sorted_unstable_by(order_by_score_and_code)
            .collect()
    }
}

#[inline]
fn order_by_score_and_code(
    first: &(CompactString, f64),
    second: &(CompactString, f64),
) -> Ordering {
    second
        .1
        .total_cmp(&first.1)
        .then_with(|| first.0.cmp(&second.0))
}
