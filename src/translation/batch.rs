/*!
 * Batch partitioning.
 *
 * Splits an ordered column of texts into contiguous batches bounded by a
 * character budget. Batches are created in input order and never reorder,
 * drop or duplicate a text; that order is what the reassembler relies on.
 */

/// A contiguous, immutable run of input texts sent in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in creation order
    index: usize,
    /// Input position of the first text in this batch
    offset: usize,
    /// The texts, in input order
    texts: Vec<String>,
    /// Sum of the character counts of `texts`
    char_count: usize,
}

impl Batch {
    /// Position of this batch in creation order
    pub fn index(&self) -> usize {
        self.index
    }

    /// Input position of the first text
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The batch texts
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Total characters across all texts, without per-item overhead
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Number of texts in the batch
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the batch holds no texts
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Budget cost of the batch: characters plus one per item
    pub fn budget_cost(&self) -> usize {
        self.char_count + self.texts.len()
    }

    /// Take the texts out of the batch
    pub fn into_texts(self) -> Vec<String> {
        self.texts
    }
}

/// Accumulates texts into the batch currently being filled
struct BatchBuilder {
    batches: Vec<Batch>,
    current: Vec<String>,
    current_length: usize,
    current_offset: usize,
}

impl BatchBuilder {
    fn new() -> Self {
        Self {
            batches: Vec::new(),
            current: Vec::new(),
            current_length: 0,
            current_offset: 0,
        }
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }

        let texts = std::mem::take(&mut self.current);
        let offset = self.current_offset;
        self.current_offset += texts.len();

        self.batches.push(Batch {
            index: self.batches.len(),
            offset,
            texts,
            char_count: self.current_length,
        });
        self.current_length = 0;
    }
}

/// Partition `texts` into batches of at most `max_chars`
///
/// A text joins the current batch when
/// `current_length + text_length + current_item_count <= max_chars`,
/// lengths counted in characters. Otherwise the current batch is sealed and a
/// new one starts with that text. A text longer than the budget on its own
/// becomes a single-item batch; texts are never split.
pub fn partition(texts: &[String], max_chars: usize) -> Vec<Batch> {
    let mut builder = BatchBuilder::new();

    for text in texts {
        let length = text.chars().count();

        if builder.current_length + length + builder.current.len() > max_chars {
            builder.seal();
        }

        builder.current.push(text.clone());
        builder.current_length += length;
    }

    builder.seal();
    builder.batches
}
