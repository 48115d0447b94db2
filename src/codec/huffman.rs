//! Static Huffman coding over byte symbols.
//!
//! The code table is stored in `meta` as `{"table": {"<byte>": "<bits>"}, "pad": n}`
//! where `pad` is the number of zero bits appended to reach a byte boundary.
//! Bits are packed MSB-first.
//!
//! Tree construction is deterministic: leaves are ordered by
//! `(frequency, symbol)` and internal nodes by `(frequency, smallest symbol
//! in the subtree)`. Subtrees never share symbols, so this is a total order
//! and two encoders given the same input always emit the same table.

use super::{Codec, CodecMeta, CodecResult};
use crate::error::CodecError;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

pub const VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl Codec for HuffmanCodec {
    fn name(&self) -> &'static str {
        "huffman"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn compress(&self, data: &[u8], _mime: &str) -> Result<CodecResult, CodecError> {
        let (compressed, table, pad) = encode(data);
        Ok(CodecResult {
            compressed,
            meta: table_to_meta(&table, pad),
        })
    }

    fn decompress(&self, data: &[u8], meta: &CodecMeta) -> Result<Vec<u8>, CodecError> {
        let pad = parse_pad(meta, data.len())?;
        let trie = Trie::from_table(parse_table(meta)?)?;
        trie.decode(data, pad)
    }
}

/// Symbol to code, as a string of `'0'`/`'1'`
pub type CodeTable = BTreeMap<u8, String>;

enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// Build the code table for a byte-frequency histogram
pub fn build_code_table(freqs: &[u64; 256]) -> CodeTable {
    let mut nodes: Vec<Node> = Vec::new();
    let mut heap = BinaryHeap::new();

    for (symbol, &freq) in freqs.iter().enumerate() {
        if freq > 0 {
            let symbol = symbol as u8;
            heap.push(Reverse((freq, symbol, nodes.len())));
            nodes.push(Node::Leaf(symbol));
        }
    }

    let mut table = CodeTable::new();
    match heap.len() {
        0 => return table,
        1 => {
            // Lone symbol sits left of a dummy parent
            if let Some(Reverse((_, symbol, _))) = heap.pop() {
                table.insert(symbol, "0".to_string());
            }
            return table;
        }
        _ => {}
    }

    while let (Some(Reverse(first)), Some(Reverse(second))) = (heap.pop(), heap.pop()) {
        let (freq_a, min_a, left) = first;
        let (freq_b, min_b, right) = second;
        let parent = nodes.len();
        nodes.push(Node::Internal { left, right });
        heap.push(Reverse((freq_a + freq_b, min_a.min(min_b), parent)));
        if heap.len() == 1 {
            break;
        }
    }

    let root = nodes.len() - 1;
    let mut stack = vec![(root, String::new())];
    while let Some((idx, prefix)) = stack.pop() {
        match nodes[idx] {
            Node::Leaf(symbol) => {
                table.insert(symbol, prefix);
            }
            Node::Internal { left, right } => {
                stack.push((right, format!("{prefix}1")));
                stack.push((left, format!("{prefix}0")));
            }
        }
    }
    table
}

/// Encode `data`, returning packed bits, the table, and the pad count
fn encode(data: &[u8]) -> (Vec<u8>, CodeTable, u8) {
    let mut freqs = [0u64; 256];
    for &b in data {
        freqs[b as usize] += 1;
    }
    let table = build_code_table(&freqs);

    let mut codes: Vec<&[u8]> = vec![&[]; 256];
    for (&symbol, code) in &table {
        codes[symbol as usize] = code.as_bytes();
    }

    let mut writer = BitWriter::new();
    for &b in data {
        for &bit in codes[b as usize] {
            writer.push(bit == b'1');
        }
    }
    let (bytes, pad) = writer.finish();
    (bytes, table, pad)
}

fn table_to_meta(table: &CodeTable, pad: u8) -> CodecMeta {
    let table: serde_json::Map<String, Value> = table
        .iter()
        .map(|(symbol, code)| (symbol.to_string(), Value::String(code.clone())))
        .collect();

    let mut meta = CodecMeta::new();
    meta.insert("table".into(), Value::Object(table));
    meta.insert("pad".into(), Value::from(pad));
    meta
}

fn parse_pad(meta: &CodecMeta, data_len: usize) -> Result<u8, CodecError> {
    let pad = meta
        .get("pad")
        .and_then(Value::as_u64)
        .ok_or_else(|| CodecError::InvalidMeta("pad must be a non-negative integer".into()))?;
    if pad > 7 {
        return Err(CodecError::InvalidMeta(format!("pad {pad} exceeds 7")));
    }
    if pad > 8 * data_len as u64 {
        return Err(CodecError::InvalidMeta(format!(
            "pad {pad} exceeds {} available bits",
            8 * data_len
        )));
    }
    Ok(pad as u8)
}

fn parse_table(meta: &CodecMeta) -> Result<Vec<(u8, &str)>, CodecError> {
    let table = meta
        .get("table")
        .and_then(Value::as_object)
        .ok_or_else(|| CodecError::InvalidMeta("table must be an object".into()))?;

    let mut entries = Vec::with_capacity(table.len());
    for (key, code) in table {
        let symbol = key
            .parse::<u8>()
            .map_err(|_| CodecError::InvalidMeta(format!("symbol {key:?} is not 0-255")))?;
        let code = code
            .as_str()
            .filter(|c| !c.is_empty() && c.bytes().all(|b| b == b'0' || b == b'1'))
            .ok_or_else(|| {
                CodecError::InvalidMeta(format!("code for symbol {symbol} is not a bit string"))
            })?;
        entries.push((symbol, code));
    }
    Ok(entries)
}

#[derive(Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

/// Binary decoding trie; one step per input bit
struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    /// Build from `(symbol, code)` pairs, rejecting tables that are not
    /// prefix-free or that map one symbol twice
    fn from_table(entries: Vec<(u8, &str)>) -> Result<Self, CodecError> {
        let mut nodes = vec![TrieNode::default()];
        let mut seen = [false; 256];

        for (symbol, code) in entries {
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(CodecError::InvalidMeta(format!("symbol {symbol} listed twice")));
            }

            let mut current = 0;
            for bit in code.bytes() {
                if nodes[current].symbol.is_some() {
                    return Err(not_prefix_free(code));
                }
                let branch = (bit == b'1') as usize;
                current = match nodes[current].children[branch] {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::default());
                        let next = nodes.len() - 1;
                        nodes[current].children[branch] = Some(next);
                        next
                    }
                };
            }

            let leaf = &mut nodes[current];
            if leaf.symbol.is_some() || leaf.children.iter().any(Option::is_some) {
                return Err(not_prefix_free(code));
            }
            leaf.symbol = Some(symbol);
        }

        Ok(Self { nodes })
    }

    fn decode(&self, data: &[u8], pad: u8) -> Result<Vec<u8>, CodecError> {
        let total_bits = data.len() * 8 - pad as usize;
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut current = 0;

        for i in 0..total_bits {
            let bit = (data[i / 8] >> (7 - i % 8)) & 1;
            current = self.nodes[current].children[bit as usize]
                .ok_or_else(|| CodecError::CorruptStream(format!("no code matches at bit {i}")))?;
            if let Some(symbol) = self.nodes[current].symbol {
                out.push(symbol);
                current = 0;
            }
        }

        if current != 0 {
            return Err(CodecError::CorruptStream("stream ends inside a code".into()));
        }
        Ok(out)
    }
}

fn not_prefix_free(code: &str) -> CodecError {
    CodecError::InvalidMeta(format!("code table is not prefix-free at {code:?}"))
}

/// Packs bits MSB-first, zero-padding the final byte
struct BitWriter {
    bytes: Vec<u8>,
    buffer: u8,
    count: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            buffer: 0,
            count: 0,
        }
    }

    fn push(&mut self, bit: bool) {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.count += 1;
        if self.count == 8 {
            self.bytes.push(self.buffer);
            self.buffer = 0;
            self.count = 0;
        }
    }

    /// Returns the bytes and how many pad bits were added
    fn finish(mut self) -> (Vec<u8>, u8) {
        if self.count == 0 {
            return (self.bytes, 0);
        }
        let pad = 8 - self.count;
        self.bytes.push(self.buffer << pad);
        (self.bytes, pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn roundtrip(data: &[u8]) -> CodecResult {
        let result = HuffmanCodec.compress(data, "text/plain").unwrap();
        let restored = HuffmanCodec.decompress(&result.compressed, &result.meta).unwrap();
        assert_eq!(restored, data);
        result
    }

    fn meta(value: serde_json::Value) -> CodecMeta {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_single_symbol() {
        let result = roundtrip(b"aaaaaaaaaa");
        assert_eq!(result.meta["table"], json!({"97": "0"}));
        assert_eq!(result.meta["pad"], json!(6));
        assert_eq!(result.compressed, vec![0u8, 0u8]);
    }

    #[test]
    fn test_empty_input() {
        let result = roundtrip(b"");
        assert!(result.compressed.is_empty());
        assert_eq!(result.meta["table"], json!({}));
        assert_eq!(result.meta["pad"], json!(0));
    }

    #[test]
    fn test_skewed_input_shrinks() {
        let result = roundtrip(&[b'a'; 1000]);
        assert!(result.compressed.len() < 1000);

        let mut text = b"aaaaaaaabbbbccd".repeat(50);
        text.push(b'z');
        let result = roundtrip(&text);
        assert!(result.compressed.len() < text.len());
    }

    #[test]
    fn test_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
        let result = roundtrip(&data);
        assert_eq!(result.meta["table"].as_object().unwrap().len(), 256);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let result = roundtrip(b"ab");
        assert_eq!(result.meta["table"], json!({"97": "0", "98": "1"}));
        assert_eq!(result.compressed, vec![0b0100_0000]);

        let result = roundtrip(b"abcc");
        assert_eq!(result.meta["table"], json!({"97": "00", "98": "01", "99": "1"}));

        // reversed input order yields the same table
        let again = roundtrip(b"ccba");
        assert_eq!(again.meta["table"], result.meta["table"]);
    }

    #[test]
    fn test_table_is_prefix_free() {
        let mut freqs = [0u64; 256];
        for (i, f) in freqs.iter_mut().enumerate().take(40) {
            *f = (i as u64 % 7) + 1;
        }
        let table = build_code_table(&freqs);
        assert_eq!(table.len(), 40);
        for (a, code_a) in &table {
            for (b, code_b) in &table {
                if a != b {
                    assert!(!code_b.starts_with(code_a.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_meta() {
        let cases = [
            json!({"pad": 0}),
            json!({"table": {"97": "0"}}),
            json!({"table": {"97": "0"}, "pad": 8}),
            json!({"table": {"97": "0"}, "pad": -1}),
            json!({"table": {"256": "0"}, "pad": 0}),
            json!({"table": {"x": "0"}, "pad": 0}),
            json!({"table": {"97": ""}, "pad": 0}),
            json!({"table": {"97": "02"}, "pad": 0}),
            json!({"table": {"97": 0}, "pad": 0}),
            json!({"table": {"97": "0", "98": "01"}, "pad": 0}),
            json!({"table": {"97": "01", "98": "0"}, "pad": 0}),
            json!({"table": {"97": "0", "98": "0"}, "pad": 0}),
        ];
        for case in cases {
            let err = HuffmanCodec.decompress(&[0x00], &meta(case.clone())).unwrap_err();
            assert!(matches!(err, CodecError::InvalidMeta(_)), "{case}: {err:?}");
        }
    }

    #[test]
    fn test_pad_larger_than_data() {
        let err = HuffmanCodec
            .decompress(b"", &meta(json!({"table": {"97": "0"}, "pad": 3})))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidMeta(_)));
    }

    #[test]
    fn test_stream_ends_inside_code() {
        let table = json!({"97": "00", "98": "01", "99": "1"});
        // 1 00 0 + pad 4: trailing lone 0 is half a code
        let err = HuffmanCodec
            .decompress(&[0b1000_0000], &meta(json!({"table": table, "pad": 4})))
            .unwrap_err();
        assert!(matches!(err, CodecError::CorruptStream(_)));

        let ok = HuffmanCodec
            .decompress(&[0b1000_0000], &meta(json!({"table": table, "pad": 5})))
            .unwrap();
        assert_eq!(ok, b"ca");
    }

    #[test]
    fn test_missing_branch() {
        let err = HuffmanCodec
            .decompress(&[0b1000_0000], &meta(json!({"table": {"97": "0"}, "pad": 7})))
            .unwrap_err();
        assert!(matches!(err, CodecError::CorruptStream(_)));

        let err = HuffmanCodec
            .decompress(&[0x00], &meta(json!({"table": {}, "pad": 0})))
            .unwrap_err();
        assert!(matches!(err, CodecError::CorruptStream(_)));
    }

    #[test]
    fn test_empty_table_and_data() {
        let out = HuffmanCodec
            .decompress(b"", &meta(json!({"table": {}, "pad": 0})))
            .unwrap();
        assert!(out.is_empty());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let result = HuffmanCodec.compress(&data, "text/plain").unwrap();
            let restored = HuffmanCodec.decompress(&result.compressed, &result.meta).unwrap();
            prop_assert_eq!(restored, data);
        }

        #[test]
        fn prop_table_is_deterministic(data in proptest::collection::vec(0u8..8, 1..256)) {
            let a = HuffmanCodec.compress(&data, "").unwrap();
            let b = HuffmanCodec.compress(&data, "").unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
