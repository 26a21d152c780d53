use super::Output;
use crate::common::encoding::wire_len;
use crate::common::{Codec, Encodable, Typed};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// The outputs an fx starts an asset with.
///
/// Outputs are written in the order of their typed encoding; the states of an asset are written
/// in fx id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialState {
    pub fx_id: u32,
    pub outputs: Vec<Output>,
    pub codec: Codec,
}

impl InitialState {
    pub fn new(fx_id: u32) -> InitialState {
        InitialState {
            fx_id,
            outputs: vec![],
            codec: Codec::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> InitialState {
        self.codec = codec;
        self
    }

    /// Add an output. Can be used in a chain.
    pub fn add_output(&mut self, output: Output) -> &mut Self {
        self.outputs.push(output);
        self
    }

    fn sorted_outputs(&self) -> Result<Vec<Vec<u8>>> {
        let mut encoded = Vec::with_capacity(self.outputs.len());
        for o in &self.outputs {
            let mut v = Vec::with_capacity(o.typed_size() as usize);
            o.write_typed(self.codec, &mut v)?;
            encoded.push(v);
        }
        encoded.sort();
        Ok(encoded)
    }
}

impl Encodable for InitialState {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let fx_id = buffer.try_get_u32()?;
        let count = buffer.try_get_u32()? as usize;
        let mut outputs = Vec::with_capacity(count.min(buffer.remaining()));
        let mut codec = None;
        for _ in 0..count {
            let (o, c) = Output::read_typed(buffer)?;
            match codec {
                Some(first) if first != c => return Err(Error::CodecId(c.id())),
                _ => codec = Some(c),
            }
            outputs.push(o);
        }
        let codec = codec.unwrap_or_default();
        Ok(InitialState {
            fx_id,
            outputs,
            codec,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.fx_id);
        buffer.put_u32(wire_len(self.outputs.len(), "initial state outputs")?);
        for o in self.sorted_outputs()? {
            buffer.put_slice(&o);
        }
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        4 + 4 + self.outputs.iter().map(|o| o.typed_size()).sum::<u64>()
    }
}
