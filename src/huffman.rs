//! Huffman tree stored as a weight-sorted array of nodes.
//!
//! There are no child pointers. Slots are numbered from 1 and kept sorted by
//! weight (ties in insertion order). Building consumes slots two at a time
//! from the front: merge `k` takes slots `2k - 1` and `2k` and inserts their
//! sum as `Tag::Internal(k)`. The odd slot of a pair is the `1` branch, the
//! even slot the `0` branch. Two tables track where things moved to:
//! symbol -> leaf slot and merge id -> slot of the node that merge created.

use log::{debug, trace};

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;

/// Identifies one merge; merges are numbered from 1 in the order they happen.
pub type MergeId = usize;

/// Root-first codeword bits.
pub type Codeword = Vec<bool>;

/// Codeword per symbol, indexed by byte value. Absent symbols map to an empty
/// codeword.
pub type CodeTable = Vec<Codeword>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Leaf(u8),
    Internal(MergeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub weight: u64,
}

#[derive(Debug, Clone)]
pub struct NodeSequence {
    nodes: Vec<Node>,
    // 0 means the symbol has no leaf.
    leaf_slot: [usize; 256],
    // merge_slot[k - 1] is the slot of Tag::Internal(k).
    merge_slot: Vec<usize>,
    consumed: usize,
    built: bool,
}

impl NodeSequence {
    /// Empty sequence with room for a tree over `active_symbols` leaves.
    pub fn with_capacity(active_symbols: usize) -> Result<Self> {
        let slots = (2 * active_symbols).saturating_sub(1);
        let merges = active_symbols.saturating_sub(1);

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(slots)
            .map_err(|_| HuffmanError::OutOfMemory { size: slots })?;
        let mut merge_slot = Vec::new();
        merge_slot
            .try_reserve_exact(merges)
            .map_err(|_| HuffmanError::OutOfMemory { size: merges })?;

        Ok(NodeSequence {
            nodes,
            leaf_slot: [0; 256],
            merge_slot,
            consumed: 0,
            built: false,
        })
    }

    /// Builds the full tree for every symbol of `frequencies` with a non-zero count.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        Self::from_weights(frequencies.active_symbols(), frequencies.iter())
    }

    /// Builds the full tree from `(symbol, weight)` pairs in ascending symbol order.
    pub fn from_entries(entries: &[(u8, u32)]) -> Result<Self> {
        Self::from_weights(
            entries.len(),
            entries.iter().map(|&(symbol, weight)| (symbol, weight as u64)),
        )
    }

    fn from_weights(active: usize, weights: impl Iterator<Item = (u8, u64)>) -> Result<Self> {
        debug!("Building Huffman Tree from {} unique symbols", active);
        let mut sequence = Self::with_capacity(active)?;
        for (symbol, weight) in weights {
            sequence.insert_leaf(symbol, weight)?;
        }
        sequence.build();
        debug!(
            "Tree construction complete: {} nodes, {} merges",
            sequence.len(),
            sequence.merge_slot.len()
        );
        Ok(sequence)
    }

    /// Inserts a leaf behind every node of equal or lower weight.
    /// Returns the slot it landed in.
    pub fn insert_leaf(&mut self, symbol: u8, weight: u64) -> Result<usize> {
        if self.built {
            return Err(HuffmanError::tree("leaf inserted after build"));
        }
        if weight == 0 {
            return Err(HuffmanError::tree(format!(
                "symbol {:#04x} has zero weight",
                symbol
            )));
        }
        if self.leaf_slot[symbol as usize] != 0 {
            return Err(HuffmanError::tree(format!(
                "symbol {:#04x} inserted twice",
                symbol
            )));
        }
        let slot = self.insert(Tag::Leaf(symbol), weight);
        self.leaf_slot[symbol as usize] = slot;
        Ok(slot)
    }

    /// Inserts the node produced by merge `merge_id`. Merges must arrive in
    /// order 1, 2, 3, ...
    pub(crate) fn insert_internal(&mut self, merge_id: MergeId, weight: u64) -> usize {
        debug_assert_eq!(merge_id, self.merge_slot.len() + 1);
        let slot = self.insert(Tag::Internal(merge_id), weight);
        self.merge_slot.push(slot);
        slot
    }

    fn insert(&mut self, tag: Tag, weight: u64) -> usize {
        let mut index = self.nodes.len();
        while index > 0 && self.nodes[index - 1].weight > weight {
            index -= 1;
        }
        self.nodes.insert(index, Node { tag, weight });
        for moved in index + 1..self.nodes.len() {
            let tag = self.nodes[moved].tag;
            self.record_slot(tag, moved + 1);
        }
        index + 1
    }

    fn record_slot(&mut self, tag: Tag, slot: usize) {
        match tag {
            Tag::Leaf(symbol) => self.leaf_slot[symbol as usize] = slot,
            Tag::Internal(id) => self.merge_slot[id - 1] = slot,
        }
    }

    /// Merges slot pairs from the front until only the root is unconsumed.
    ///
    /// A merged node weighs at least as much as the pair it replaces, so it is
    /// always inserted after them and consumed slots never move.
    pub fn build(&mut self) {
        if self.built {
            return;
        }
        while self.consumed + 1 < self.nodes.len() {
            let odd = self.consumed + 1;
            let even = odd + 1;
            self.consumed += 2;
            let weight = self.node(odd).weight + self.node(even).weight;
            let slot = self.insert_internal(even / 2, weight);
            trace!(
                "Merged slots {} and {} into slot {} (weight {})",
                odd,
                even,
                slot,
                weight
            );
        }
        self.built = true;
    }

    fn node(&self, slot: usize) -> &Node {
        &self.nodes[slot - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in slot order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn internal_count(&self) -> usize {
        self.merge_slot.len()
    }

    /// Leaves as `(symbol, weight)` in ascending symbol order.
    pub fn leaves(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=255u8).filter_map(move |symbol| match self.leaf_slot[symbol as usize] {
            0 => None,
            slot => Some((symbol, self.node(slot).weight)),
        })
    }

    /// Tag of the last slot once the tree is built; `None` for an empty tree.
    pub fn root(&self) -> Option<Tag> {
        if !self.built {
            return None;
        }
        self.nodes.last().map(|node| node.tag)
    }

    /// Root-first path to `symbol`'s leaf. A tree with a single leaf gives
    /// every occurrence the one-bit codeword `0`.
    pub fn codeword_for(&self, symbol: u8) -> Option<Codeword> {
        let mut slot = self.leaf_slot[symbol as usize];
        if !self.built || slot == 0 {
            return None;
        }
        let root = self.nodes.len();
        if root == 1 {
            return Some(vec![false]);
        }
        let mut bits = Vec::new();
        while slot < root {
            bits.push(slot % 2 == 1);
            slot = self.merge_slot[(slot + 1) / 2 - 1];
        }
        bits.reverse();
        Some(bits)
    }

    pub fn code_table(&self) -> CodeTable {
        (0..=255u8)
            .map(|symbol| {
                let code = self.codeword_for(symbol).unwrap_or_default();
                if !code.is_empty() {
                    trace!(
                        "Assigning code to byte {:#04x} ('{}') : '{}'",
                        symbol,
                        symbol.escape_ascii(),
                        code.iter().map(|&b| if b { '1' } else { '0' }).collect::<String>()
                    );
                }
                code
            })
            .collect()
    }

    /// One step down the tree. Reaching a `Tag::Leaf` means its symbol is
    /// decoded. A leaf root consumes the bit and yields itself; its only valid
    /// codeword is `0`, which the caller checks.
    pub fn descend(&self, current: Tag, bit: bool) -> Tag {
        match current {
            Tag::Leaf(_) => current,
            Tag::Internal(id) => self.node(2 * id - bit as usize).tag,
        }
    }
}
