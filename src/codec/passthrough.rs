use super::{Codec, CodecMeta, CodecResult};
use crate::error::CodecError;

/// Identity codec for content that is already compressed
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl Codec for PassthroughCodec {
    fn name(&self) -> &'static str {
        "none"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn compress(&self, data: &[u8], _mime: &str) -> Result<CodecResult, CodecError> {
        Ok(CodecResult {
            compressed: data.to_vec(),
            meta: CodecMeta::new(),
        })
    }

    fn decompress(&self, data: &[u8], _meta: &CodecMeta) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}
