use super::{SECP_INPUT_ID, SECP_TRANSFER_OUTPUT_ID};
use crate::common::{Encodable, SecpTransferInput, SecpTransferOutput};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

fn expect_type_id(buffer: &mut dyn Buf, expected: u32, context: &'static str) -> Result<()> {
    let type_id = buffer.try_get_u32()?;
    if type_id != expected {
        return Err(Error::UnknownTypeId { context, type_id });
    }
    Ok(())
}

/// An amount that can be used for staking but not spent until `locktime`.
///
/// Wire form: `locktime, 7, secp transfer output body`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeableLockOut {
    pub locktime: u64,
    pub output: SecpTransferOutput,
}

impl Encodable for StakeableLockOut {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let locktime = buffer.try_get_u64()?;
        expect_type_id(buffer, SECP_TRANSFER_OUTPUT_ID, "stakeable lock output")?;
        let output = SecpTransferOutput::from_binary(buffer)?;
        Ok(StakeableLockOut { locktime, output })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u64(self.locktime);
        buffer.put_u32(SECP_TRANSFER_OUTPUT_ID);
        self.output.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        8 + 4 + self.output.encoded_size()
    }
}

/// Spends a [StakeableLockOut] whose lock has not expired.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeableLockIn {
    pub locktime: u64,
    pub input: SecpTransferInput,
}

impl Encodable for StakeableLockIn {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let locktime = buffer.try_get_u64()?;
        expect_type_id(buffer, SECP_INPUT_ID, "stakeable lock input")?;
        let input = SecpTransferInput::from_binary(buffer)?;
        Ok(StakeableLockIn { locktime, input })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u64(self.locktime);
        buffer.put_u32(SECP_INPUT_ID);
        self.input.to_binary(buffer)
    }

    fn encoded_size(&self) -> u64 {
        8 + 4 + self.input.encoded_size()
    }
}
