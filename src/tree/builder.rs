use super::{GramTree, Node};
use crate::{
    error::{ConfigError, TrainError},
    ngrams::NgramBounds,
};

/// Mutable trie accumulating gram frequencies during training.
///
/// Single-writer: learning into the same builder from multiple threads is
/// not possible by construction (`learn` takes `&mut self`). The one-way
/// [`build`](Self::build) conversion consumes the builder, so learning into
/// an already built tree is unrepresentable.
pub struct GramTreeBuilder {
    root: GrowNode,
    bounds: NgramBounds,
    gram_count: u64,
    truncation_threshold: f64,
}

impl GramTreeBuilder {
    #[inline]
    pub fn new(bounds: NgramBounds) -> Self {
        Self {
            root: GrowNode::new('\0'),
            bounds,
            gram_count: 0,
            truncation_threshold: 1.0,
        }
    }

    /// Sets the pruning quantile used by [`build`](Self::build).
    ///
    /// `1.0` (the default) keeps every node; lowering the threshold prunes
    /// an increasing share of the least frequent nodes.
    #[inline]
    pub fn set_truncation_threshold(&mut self, threshold: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidTruncationThreshold(threshold));
        }
        self.truncation_threshold = threshold;
        Ok(())
    }

    #[inline]
    pub fn gram_count(&self) -> u64 {
        self.gram_count
    }

    /// Adds ngram statistics of `text` to the trie.
    pub fn learn(&mut self, text: &str) -> Result<(), TrainError> {
        let chars: Vec<char> = text.chars().collect();
        for gram in self.bounds.ngrams(&chars) {
            self.add_gram(gram)?;
        }
        Ok(())
    }

    fn add_gram(&mut self, gram: &[char]) -> Result<(), TrainError> {
        let mut cur = &mut self.root;
        for &ch in gram {
            cur = cur.child_or_insert(ch);
        }
        cur.inc()?;
        self.gram_count += 1;
        Ok(())
    }

    /// Prunes the trie and freezes it into an immutable [`GramTree`].
    ///
    /// Node frequencies are sorted ascending and the frequency found at the
    /// `(1.0 - threshold)` quantile becomes the minimum a node must reach to
    /// survive. Pruning a node drops its whole subtree. The root survives
    /// unconditionally, and `gram_count` stays at the learned total.
    pub fn build(self) -> GramTree {
        let mut freqs = Vec::new();
        self.root.collect_freqs(&mut freqs);
        freqs.sort_unstable();

        let cutoff_index = ((freqs.len() as f64) * (1.0 - self.truncation_threshold)) as usize;
        let min_freq = freqs[cutoff_index.min(freqs.len() - 1)];

        let root = self.root.freeze(min_freq);
        tracing::debug!(
            min_freq,
            nodes = freqs.len(),
            kept = root.count_nodes(),
            "gram tree built"
        );
        GramTree::from_parts(root, self.bounds, self.gram_count)
    }
}

/// A node of the growing trie. Children stay sorted by character on insert.
struct GrowNode {
    ch: char,
    freq: u32,
    children: Vec<GrowNode>,
}

impl GrowNode {
    #[inline]
    fn new(ch: char) -> Self {
        Self {
            ch,
            freq: 0,
            children: Vec::new(),
        }
    }

    fn child_or_insert(&mut self, ch: char) -> &mut GrowNode {
        match self.children.binary_search_by(|node| node.ch.cmp(&ch)) {
            Ok(i) => &mut self.children[i],
            Err(i) => {
                self.children.insert(i, GrowNode::new(ch));
                &mut self.children[i]
            }
        }
    }

    #[inline]
    fn inc(&mut self) -> Result<(), TrainError> {
        self.freq = self
            .freq
            .checked_add(1)
            .ok_or(TrainError::FrequencyOverflow)?;
        Ok(())
    }

    fn collect_freqs(&self, freqs: &mut Vec<u32>) {
        freqs.push(self.freq);
        for child in &self.children {
            child.collect_freqs(freqs);
        }
    }

    fn freeze(self, min_freq: u32) -> Node {
        let children: Box<[Node]> = self
            .children
            .into_iter()
            .filter(|child| child.freq >= min_freq)
            .map(|child| child.freeze(min_freq))
            .collect();
        Node {
            ch: self.ch,
            freq: self.freq,
            children,
        }
    }
}
