//! The encoding dictionary, a prefix tree over byte sequences.
use crate::{Code, LzwError, BASE_ENTRIES};

/// Index of a node in the arena of a [`Tree`].
pub(crate) type NodeId = u32;

const ROOT: NodeId = 0;
const NO_SUCCESSOR: NodeId = NodeId::max_value();
const SHORT: usize = 16;

/// One node for each known prefix, stored in a single arena and addressed by index.
///
/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search over at most `SHORT` bytes.
/// Nodes with more successors get a full table indexed by the byte.
pub(crate) struct Tree {
    nodes: Vec<Node>,
    simples: Vec<Simple>,
    complex: Vec<Full>,
    /// The number of nodes that are words.
    entries: usize,
    capacity: usize,
}

#[derive(Clone, Copy)]
struct Node {
    /// The code of the word, meaningless unless `is_word` is set.
    code: Code,
    is_word: bool,
    successors: Successors,
}

#[derive(Clone, Copy)]
enum Successors {
    NoSuccessor,
    Simple(u32),
    Full(u32),
}

#[derive(Clone, Copy)]
struct Simple {
    nodes: [NodeId; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [NodeId; 256],
}

impl Tree {
    /// Create a dictionary holding the 256 single byte words with their own byte as code.
    ///
    /// The capacity counts words, including those initial ones.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(BASE_ENTRIES);
        let mut tree = Tree {
            nodes: Vec::with_capacity(capacity + 1),
            simples: Vec::new(),
            complex: Vec::new(),
            entries: 0,
            capacity,
        };

        // The root branches on every byte so it starts out in full form.
        tree.complex.push(Full {
            char_continuation: [NO_SUCCESSOR; 256],
        });
        tree.nodes.push(Node {
            successors: Successors::Full(0),
            ..Node::default()
        });
        for byte in 0..=u8::max_value() {
            let inserted = tree.insert(&[byte], Code::from(byte));
            debug_assert!(inserted.is_ok());
        }

        tree
    }

    /// Register `sequence` with `code`, overwriting the code of a known sequence.
    pub(crate) fn insert(&mut self, sequence: &[u8], code: Code) -> Result<(), LzwError> {
        debug_assert!(!sequence.is_empty());
        if self.lookup(sequence).is_none() && self.is_full() {
            return Err(LzwError::DictionaryFull);
        }

        let mut node = ROOT;
        for &byte in sequence {
            node = self.child_or_insert(node, byte);
        }
        self.mark(node, code);
        Ok(())
    }

    /// The code of `sequence` if it was inserted before.
    pub(crate) fn lookup(&self, sequence: &[u8]) -> Option<Code> {
        let mut node = ROOT;
        for &byte in sequence {
            node = self.child(node, byte)?;
        }

        let node = &self.nodes[node as usize];
        if node.is_word {
            Some(node.code)
        } else {
            None
        }
    }

    /// The word that extends the word at `node` by `byte`, if it is known.
    pub(crate) fn step(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let next = self.child(node, byte)?;
        if self.nodes[next as usize].is_word {
            Some(next)
        } else {
            None
        }
    }

    /// Insert the word at `node` extended by `byte`.
    ///
    /// This is `insert` for a sequence whose prefix is already at hand.
    pub(crate) fn append(&mut self, node: NodeId, byte: u8, code: Code) -> Result<NodeId, LzwError> {
        if self.step(node, byte).is_none() && self.is_full() {
            return Err(LzwError::DictionaryFull);
        }

        let next = self.child_or_insert(node, byte);
        self.mark(next, code);
        Ok(next)
    }

    /// The node of the single byte word.
    pub(crate) fn base(&self, byte: u8) -> NodeId {
        self.complex[0].char_continuation[usize::from(byte)]
    }

    pub(crate) fn code(&self, node: NodeId) -> Code {
        self.nodes[node as usize].code
    }

    /// The number of words in the dictionary.
    pub(crate) fn len(&self) -> usize {
        self.entries
    }

    pub(crate) fn is_full(&self) -> bool {
        self.entries >= self.capacity
    }

    fn mark(&mut self, node: NodeId, code: Code) {
        let node = &mut self.nodes[node as usize];
        if !node.is_word {
            node.is_word = true;
            self.entries += 1;
        }
        node.code = code;
    }

    fn child(&self, node: NodeId, ch: u8) -> Option<NodeId> {
        match self.nodes[node as usize].successors {
            Successors::NoSuccessor => None,
            Successors::Simple(idx) => {
                let nexts = &self.simples[idx as usize];
                nexts
                    .chars
                    .iter()
                    .zip(nexts.nodes.iter())
                    .take(usize::from(nexts.count))
                    .find(|&(&sch, _)| sch == ch)
                    .map(|(_, &snode)| snode)
            }
            Successors::Full(idx) => {
                let next = self.complex[idx as usize].char_continuation[usize::from(ch)];
                if next == NO_SUCCESSOR {
                    None
                } else {
                    Some(next)
                }
            }
        }
    }

    fn child_or_insert(&mut self, node: NodeId, ch: u8) -> NodeId {
        if let Some(next) = self.child(node, ch) {
            return next;
        }

        let next = self.nodes.len() as NodeId;
        self.nodes.push(Node::default());

        let successors = self.nodes[node as usize].successors;
        match successors {
            Successors::NoSuccessor => {
                let mut simple = Simple::default();
                simple.nodes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.nodes[node as usize].successors =
                    Successors::Simple(self.simples.len() as u32);
                self.simples.push(simple);
            }
            Successors::Simple(idx) if usize::from(self.simples[idx as usize].count) < SHORT => {
                let nexts = &mut self.simples[idx as usize];
                let slot = usize::from(nexts.count);
                nexts.chars[slot] = ch;
                nexts.nodes[slot] = next;
                nexts.count += 1;
            }
            Successors::Simple(idx) => {
                let simple = &self.simples[idx as usize];
                let mut full = Full {
                    char_continuation: [NO_SUCCESSOR; 256],
                };
                for (&sch, &snode) in simple.chars.iter().zip(simple.nodes.iter()) {
                    full.char_continuation[usize::from(sch)] = snode;
                }
                full.char_continuation[usize::from(ch)] = next;
                self.nodes[node as usize].successors = Successors::Full(self.complex.len() as u32);
                self.complex.push(full);
            }
            Successors::Full(idx) => {
                self.complex[idx as usize].char_continuation[usize::from(ch)] = next;
            }
        }

        next
    }
}

impl Default for Node {
    fn default() -> Self {
        Node {
            code: 0,
            is_word: false,
            successors: Successors::NoSuccessor,
        }
    }
}

impl Default for Simple {
    fn default() -> Self {
        Simple {
            nodes: [NO_SUCCESSOR; SHORT],
            chars: [0; SHORT],
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::LzwError;

    #[test]
    fn single_bytes_preassigned() {
        let tree = Tree::new(512);
        assert_eq!(tree.len(), 256);
        for byte in 0..=255u8 {
            assert_eq!(tree.lookup(&[byte]), Some(u16::from(byte)));
            assert_eq!(tree.code(tree.base(byte)), u16::from(byte));
        }
        assert_eq!(tree.lookup(b"ab"), None);
        assert_eq!(tree.lookup(b""), None);
    }

    #[test]
    fn prefixes_are_not_words() {
        let mut tree = Tree::new(512);
        tree.insert(b"abc", 256).unwrap();
        assert_eq!(tree.lookup(b"abc"), Some(256));
        assert_eq!(tree.lookup(b"ab"), None);
        assert_eq!(tree.lookup(b"abcd"), None);
        assert_eq!(tree.len(), 257);

        // The intermediate node exists but only becomes a word on insertion.
        let a = tree.base(b'a');
        assert_eq!(tree.step(a, b'b'), None);
        let ab = tree.append(a, b'b', 257).unwrap();
        assert_eq!(tree.lookup(b"ab"), Some(257));
        assert_eq!(tree.step(ab, b'c').map(|node| tree.code(node)), Some(256));
    }

    #[test]
    fn many_successors() {
        let mut tree = Tree::new(1 << 16);
        let a = tree.base(b'a');
        for (i, byte) in (0..=255u8).enumerate() {
            tree.append(a, byte, 256 + i as u16).unwrap();
        }
        for (i, byte) in (0..=255u8).enumerate() {
            assert_eq!(tree.lookup(&[b'a', byte]), Some(256 + i as u16));
        }
        assert_eq!(tree.len(), 512);
    }

    #[test]
    fn overwrite_keeps_count() {
        let mut tree = Tree::new(512);
        tree.insert(b"xy", 300).unwrap();
        tree.insert(b"xy", 301).unwrap();
        assert_eq!(tree.lookup(b"xy"), Some(301));
        assert_eq!(tree.len(), 257);
    }

    #[test]
    fn rejects_beyond_capacity() {
        let mut tree = Tree::new(258);
        tree.insert(b"ab", 256).unwrap();
        let b = tree.base(b'b');
        tree.append(b, b'c', 257).unwrap();
        assert!(tree.is_full());

        assert_eq!(tree.insert(b"cd", 258), Err(LzwError::DictionaryFull));
        assert_eq!(tree.append(b, b'd', 258), Err(LzwError::DictionaryFull));
        assert_eq!(tree.lookup(b"cd"), None);

        // Known words stay available and may still be overwritten.
        assert_eq!(tree.lookup(b"bc"), Some(257));
        tree.insert(b"ab", 256).unwrap();
        assert_eq!(tree.len(), 258);
    }
}
