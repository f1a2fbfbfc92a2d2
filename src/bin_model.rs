use crate::{
    error::ModelError,
    ngrams::NgramBounds,
    tree::{GramTree, Node},
};
use ::std::{
    fs::{create_dir_all, File},
    io::{self, Cursor, Read, Write},
    path::Path,
};
use brotli::{CompressorWriter, Decompressor};
use serde::{Deserialize, Serialize};

// One persisted language model: a 5 byte header (magic + version) followed
// by a brotli-compressed encom document of the tree. The header is checked
// before the payload is touched.
const MAGIC: [u8; 4] = *b"LTRM";
const VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;
const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

/// Deterministic model file name for a language code.
#[inline]
pub fn model_file_name(code: &str) -> String {
    format!("{code}_tree.bin")
}

/// Language code of a model file name, if it is one.
#[inline]
pub(crate) fn model_file_code(file_name: &str) -> Option<&str> {
    file_name.strip_suffix("_tree.bin").filter(|c| !c.is_empty())
}

#[derive(Serialize, Deserialize)]
struct BinModel {
    min: usize,
    max: usize,
    gram_count: u64,
    root: BinNode,
}

#[derive(Serialize, Deserialize)]
struct BinNode {
    c: u32,
    f: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    n: Vec<BinNode>,
}

impl BinNode {
    fn pack(node: &Node) -> Self {
        Self {
            c: node.ch as u32,
            f: node.freq,
            n: node.children.iter().map(Self::pack).collect(),
        }
    }

    fn unpack(self) -> Result<Node, ModelError> {
        let ch = char::from_u32(self.c).ok_or(ModelError::Invalid("bad code point"))?;
        let children: Box<[Node]> = self
            .n
            .into_iter()
            .map(Self::unpack)
            .collect::<Result<_, _>>()?;
        if !children.windows(2).all(|pair| pair[0].ch < pair[1].ch) {
            return Err(ModelError::Invalid("children out of order"));
        }
        Ok(Node {
            ch,
            freq: self.f,
            children,
        })
    }
}

/// Encodes a tree into a versioned model blob.
pub fn encode_model(tree: &GramTree) -> io::Result<Vec<u8>> {
    let model = BinModel {
        min: tree.bounds().min(),
        max: tree.bounds().max(),
        gram_count: tree.gram_count(),
        root: BinNode::pack(tree.root()),
    };
    let ser = serde_encom::to_string(&model)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + (ser.len() >> 2));
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    {
        let mut compressor =
            CompressorWriter::new(&mut out, BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_LG_WINDOW);
        compressor.write_all(ser.as_bytes())?;
    }
    Ok(out)
}

/// Decodes a model blob back into a tree.
pub fn decode_model(bytes: &[u8]) -> Result<GramTree, ModelError> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(ModelError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != VERSION {
        return Err(ModelError::UnsupportedVersion { found: version });
    }

    let mut decompressor = Decompressor::new(Cursor::new(&bytes[HEADER_LEN..]), BROTLI_BUFFER);
    let mut content = String::new();
    decompressor
        .read_to_string(&mut content)
        .map_err(ModelError::Read)?;

    let model: BinModel = serde_encom::from_str(&content).map_err(|e| ModelError::Decode(e.into()))?;
    let bounds = NgramBounds::new(model.min, model.max)
        .map_err(|_| ModelError::Invalid("bad ngram bounds"))?;
    let root = model.root.unpack()?;
    Ok(GramTree::from_parts(root, bounds, model.gram_count))
}

/// Writes a tree as a model blob, creating parent directories as needed.
pub fn write_model_file(tree: &GramTree, file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent)?;
    }
    let bytes = encode_model(tree)?;
    let mut file = File::create(file_path)?;
    file.write_all(&bytes)
}

/// Reads a model blob from a file.
pub fn read_model_file(file_path: &Path) -> Result<GramTree, ModelError> {
    let mut file = File::open(file_path).map_err(ModelError::Open)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(ModelError::Read)?;
    decode_model(&bytes)
}
