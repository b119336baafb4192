//! # Huffman Coding
//!
//! Builds an optimal prefix code for the byte distribution of one message.
//!
//! ## Pipeline
//! 1. [`FrequencyTable::from_message`] counts every byte value
//! 2. [`HuffmanTree::build`] repeatedly merges the two lightest nodes
//! 3. [`HuffmanTree::code_table`] walks the tree (left = 0, right = 1)
//! 4. [`CodeTable::compress`] / [`CodeTable::decompress`] translate between
//!    bytes and a [`BitVec`]
//!
//! ## Determinism
//! Leaves enter the queue in ascending byte order and every node carries the
//! sequence number it was inserted with. Nodes of equal weight leave the
//! queue in insertion order, so the same message always yields the same
//! codes on every platform.

use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::common::bits::BitVec;
use crate::common::error::{Result, StegoError};

/// Occurrence count of every byte value in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    pub fn from_message(message: &[u8]) -> Result<Self> {
        if message.is_empty() {
            return Err(StegoError::EmptyInput);
        }

        let mut counts = [0u64; 256];
        for &byte in message {
            counts[byte as usize] += 1;
        }
        Ok(FrequencyTable { counts })
    }

    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Present symbols in ascending byte order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=255u8)
            .map(move |byte| (byte, self.counts[byte as usize]))
            .filter(|&(_, count)| count > 0)
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// `left` is the node that left the queue first.
    fn merge(left: Self, right: Self) -> Self {
        HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn collect_codes(&self, path: &mut Vec<bool>, codes: &mut BTreeMap<u8, BitVec>) {
        match self {
            HuffNode::Leaf { byte, .. } => {
                codes.insert(*byte, path.iter().copied().collect());
            }
            HuffNode::Internal { left, right, .. } => {
                path.push(false);
                left.collect_codes(path, codes);
                path.pop();

                path.push(true);
                right.collect_codes(path, codes);
                path.pop();
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Queue slot ordered so that `BinaryHeap` pops the lightest, oldest node.
struct QueueEntry {
    sequence: usize,
    node: HuffNode,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the max-heap must surface the smallest (weight, sequence).
        other
            .node
            .weight()
            .cmp(&self.node.weight())
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        let mut queue = BinaryHeap::new();
        let mut sequence = 0;
        for (byte, weight) in frequencies.symbols() {
            queue.push(QueueEntry {
                sequence,
                node: HuffNode::Leaf { weight, byte },
            });
            sequence += 1;
        }

        while let Some(first) = queue.pop() {
            let Some(second) = queue.pop() else {
                let tree = HuffmanTree { root: first.node };
                debug!(
                    "Huffman tree built: {} symbols, depth {}",
                    frequencies.distinct(),
                    tree.root.depth()
                );
                return Ok(tree);
            };

            queue.push(QueueEntry {
                sequence,
                node: HuffNode::merge(first.node, second.node),
            });
            sequence += 1;
        }

        Err(StegoError::EmptyInput)
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Derive the code of every leaf from its root-to-leaf path.
    ///
    /// A tree made of a single leaf gets the one-bit code `0` so that every
    /// byte still produces at least one bit.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut codes: BTreeMap<u8, BitVec> = BTreeMap::new();
        match &self.root {
            HuffNode::Leaf { byte, .. } => {
                codes.insert(*byte, std::iter::once(false).collect());
            }
            internal => internal.collect_codes(&mut Vec::new(), &mut codes),
        }
        CodeTable::from_codes(codes)
    }
}

/// Binary trie over the codes of a [`CodeTable`], used for decoding.
#[derive(Debug, Clone)]
struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

#[derive(Debug, Clone, Copy, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

impl DecodeTrie {
    /// Fails with a description when two codes break the prefix property.
    fn build(codes: &BTreeMap<u8, BitVec>) -> std::result::Result<Self, String> {
        let mut nodes = vec![TrieNode::default()];

        for (&symbol, code) in codes {
            if code.is_empty() {
                return Err(format!("symbol {symbol:#04x} has an empty code"));
            }

            let mut current = 0;
            for bit in code.iter() {
                if let Some(owner) = nodes[current].symbol {
                    return Err(format!(
                        "code of {owner:#04x} is a prefix of the code of {symbol:#04x}"
                    ));
                }
                current = match nodes[current].children[bit as usize] {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::default());
                        let next = nodes.len() - 1;
                        nodes[current].children[bit as usize] = Some(next);
                        next
                    }
                };
            }

            let node = &mut nodes[current];
            if let Some(owner) = node.symbol {
                return Err(format!("{owner:#04x} and {symbol:#04x} share a code"));
            }
            if node.children.iter().any(Option::is_some) {
                return Err(format!("code of {symbol:#04x} is a prefix of another code"));
            }
            node.symbol = Some(symbol);
        }

        Ok(DecodeTrie { nodes })
    }
}

/// Mapping from byte value to its variable-length code.
///
/// Every instance satisfies the prefix property: construction goes either
/// through [`HuffmanTree::code_table`] or through a validating constructor.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitVec>,
    decoder: DecodeTrie,
}

impl PartialEq for CodeTable {
    fn eq(&self, other: &Self) -> bool {
        self.codes == other.codes
    }
}

impl Eq for CodeTable {}

impl CodeTable {
    /// Count, build and derive in one step.
    pub fn for_message(message: &[u8]) -> Result<Self> {
        let frequencies = FrequencyTable::from_message(message)?;
        HuffmanTree::build(&frequencies)?.code_table()
    }

    /// Build a table from explicit codes, rejecting anything that is not a
    /// non-empty prefix code.
    pub fn from_codes(codes: BTreeMap<u8, BitVec>) -> Result<Self> {
        if codes.is_empty() {
            return Err(StegoError::InvalidTable("table has no symbols".to_string()));
        }
        let decoder = DecodeTrie::build(&codes).map_err(StegoError::InvalidTable)?;
        Ok(CodeTable { codes, decoder })
    }

    pub fn get(&self, byte: u8) -> Option<&BitVec> {
        self.codes.get(&byte)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitVec)> {
        self.codes.iter().map(|(&byte, code)| (byte, code))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(BitVec::len).max().unwrap_or(0)
    }

    /// Pairwise check that no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&BitVec> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes.iter().enumerate().all(|(j, b)| {
                i == j || a.len() > b.len() || !a.iter().zip(b.iter()).all(|(x, y)| x == y)
            })
        })
    }

    /// Concatenate the code of every byte in message order.
    pub fn compress(&self, message: &[u8]) -> Result<BitVec> {
        if message.is_empty() {
            return Err(StegoError::EmptyInput);
        }

        let mut bits = BitVec::new();
        for &byte in message {
            let code = self.get(byte).ok_or(StegoError::UnknownSymbol(byte))?;
            bits.extend_from(code);
        }

        debug!("Compressed {} bytes into {} bits", message.len(), bits.len());
        Ok(bits)
    }

    /// Decode a bit stream produced by [`CodeTable::compress`].
    ///
    /// # Errors
    /// - [`StegoError::TrailingBits`] when the byte storage holds non-zero
    ///   bits past the declared length
    /// - [`StegoError::InvalidEncoding`] when a bit path matches no code or
    ///   the stream stops in the middle of a code
    pub fn decompress(&self, bits: &BitVec) -> Result<Vec<u8>> {
        if !bits.has_clean_padding() {
            return Err(StegoError::TrailingBits {
                count: bits.padding_len(),
            });
        }

        let nodes = &self.decoder.nodes;
        let mut message = Vec::new();
        let mut current = 0;
        let mut code_start = 0;

        for (position, bit) in bits.iter().enumerate() {
            if current == 0 {
                code_start = position;
            }
            let next = nodes[current].children[bit as usize]
                .ok_or(StegoError::InvalidEncoding { position })?;
            match nodes[next].symbol {
                Some(symbol) => {
                    message.push(symbol);
                    current = 0;
                }
                None => current = next,
            }
        }

        if current != 0 {
            return Err(StegoError::InvalidEncoding {
                position: code_start,
            });
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_string(table: &CodeTable, byte: u8) -> String {
        table.get(byte).unwrap().to_string()
    }

    #[test]
    fn test_frequency_table() {
        let freq = FrequencyTable::from_message(b"abracadabra").unwrap();
        assert_eq!(freq.count(b'a'), 5);
        assert_eq!(freq.count(b'b'), 2);
        assert_eq!(freq.count(b'z'), 0);
        assert_eq!(freq.distinct(), 5);
        assert_eq!(freq.total(), 11);

        let order: Vec<u8> = freq.symbols().map(|(b, _)| b).collect();
        assert_eq!(order, b"abcdr".to_vec());
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_eq!(
            FrequencyTable::from_message(b"").unwrap_err(),
            StegoError::EmptyInput
        );
        assert_eq!(CodeTable::for_message(b"").unwrap_err(), StegoError::EmptyInput);
    }

    #[test]
    fn test_tie_breaking_follows_insertion_order() {
        let table = CodeTable::for_message(b"AAAAAAAABBBBCCCCDDDD").unwrap();
        assert_eq!(code_string(&table, b'B'), "00");
        assert_eq!(code_string(&table, b'C'), "01");
        assert_eq!(code_string(&table, b'D'), "10");
        assert_eq!(code_string(&table, b'A'), "11");
    }

    #[test]
    fn test_skewed_distribution() {
        let table = CodeTable::for_message(b"aaaaabbbc").unwrap();
        assert_eq!(code_string(&table, b'a'), "1");
        assert_eq!(code_string(&table, b'c'), "00");
        assert_eq!(code_string(&table, b'b'), "01");

        let bits = table.compress(b"aaaaabbbc").unwrap();
        assert_eq!(bits.len(), 5 + 3 * 2 + 2);
    }

    #[test]
    fn test_root_weight_is_message_length() {
        let freq = FrequencyTable::from_message(b"hello huffman").unwrap();
        let tree = HuffmanTree::build(&freq).unwrap();
        assert_eq!(tree.root().weight(), 13);
    }

    #[test]
    fn test_degenerate_alphabet() {
        let table = CodeTable::for_message(b"AAAA").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(code_string(&table, b'A'), "0");

        let bits = table.compress(b"AAAA").unwrap();
        assert_eq!(bits.to_string(), "0000");
        assert_eq!(table.decompress(&bits).unwrap(), b"AAAA");
    }

    #[test]
    fn test_prefix_property_on_deep_tree() {
        // Fibonacci counts produce the deepest possible tree.
        let fib = [1usize, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        let mut message = Vec::new();
        for (byte, &count) in fib.iter().enumerate() {
            message.extend(std::iter::repeat(byte as u8).take(count));
        }

        let table = CodeTable::for_message(&message).unwrap();
        assert!(table.is_prefix_free());
        assert_eq!(table.max_code_len(), 9);

        let bits = table.compress(&message).unwrap();
        assert_eq!(table.decompress(&bits).unwrap(), message);
    }

    #[test]
    fn test_full_alphabet_round_trip() {
        let mut message = Vec::new();
        for byte in 0..=255u8 {
            message.extend(std::iter::repeat(byte).take(1 + byte as usize % 7));
        }

        let table = CodeTable::for_message(&message).unwrap();
        assert_eq!(table.len(), 256);
        assert!(table.is_prefix_free());

        let bits = table.compress(&message).unwrap();
        assert_eq!(table.decompress(&bits).unwrap(), message);
    }

    #[test]
    fn test_same_message_same_table() {
        let a = CodeTable::for_message(b"the quick brown fox").unwrap();
        let b = CodeTable::for_message(b"the quick brown fox").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_symbol() {
        let table = CodeTable::for_message(b"abc").unwrap();
        assert_eq!(
            table.compress(b"abz").unwrap_err(),
            StegoError::UnknownSymbol(b'z')
        );
    }

    #[test]
    fn test_bits_outside_code_tree() {
        let table = CodeTable::for_message(b"AAAA").unwrap();
        let bits: BitVec = [false, true].into_iter().collect();
        assert_eq!(
            table.decompress(&bits).unwrap_err(),
            StegoError::InvalidEncoding { position: 1 }
        );
    }

    #[test]
    fn test_truncated_stream() {
        let table = CodeTable::for_message(b"aaaaabbbc").unwrap();
        // "1" = a, then half of "01"
        let bits: BitVec = [true, false].into_iter().collect();
        assert_eq!(
            table.decompress(&bits).unwrap_err(),
            StegoError::InvalidEncoding { position: 1 }
        );
    }

    #[test]
    fn test_dirty_padding_is_trailing_bits() {
        let table = CodeTable::for_message(b"aaaaabbbc").unwrap();
        let bits = BitVec::from_bytes(vec![0b1110_0001], 3).unwrap();
        assert_eq!(
            table.decompress(&bits).unwrap_err(),
            StegoError::TrailingBits { count: 5 }
        );

        let clean = BitVec::from_bytes(vec![0b1110_0000], 3).unwrap();
        assert_eq!(table.decompress(&clean).unwrap(), b"aaa");
    }

    #[test]
    fn test_from_codes_rejects_prefix_conflict() {
        let mut codes = BTreeMap::new();
        codes.insert(b'a', [false].into_iter().collect());
        codes.insert(b'b', [false, true].into_iter().collect());
        assert!(matches!(
            CodeTable::from_codes(codes),
            Err(StegoError::InvalidTable(_))
        ));

        assert!(matches!(
            CodeTable::from_codes(BTreeMap::new()),
            Err(StegoError::InvalidTable(_))
        ));
    }
}
