use crate::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Read & write data structures to and from binary in the node's wire format.
///
/// All integers are big-endian. Decoding reads from a cursor and leaves it positioned after the
/// structure, which is what lets a transaction variant decode the shared prefix and then carry on
/// with its own fields.
pub trait Encodable {
    /// Read the data structure from a buffer.
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized;

    /// Write the data structure to a buffer.
    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()>;

    /// Return the size of the encoded form.
    // Implementations must compute this from the fields rather than by encoding, it is used to
    // size the buffer for the encoding.
    fn encoded_size(&self) -> u64;

    /// Encode into a new byte vector.
    fn to_binary_buf(&self) -> Result<Vec<u8>> {
        let mut v = Vec::with_capacity(self.encoded_size() as usize);
        self.to_binary(&mut v)?;
        Ok(v)
    }

    /// Decode from the start of a byte slice. Trailing bytes are ignored.
    fn from_binary_buf(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        let mut buffer = bytes;
        Self::from_binary(&mut buffer)
    }

    /// Decode starting at `offset`, returning the value and the offset just past it.
    fn from_binary_at(bytes: &[u8], offset: usize) -> Result<(Self, usize)>
    where
        Self: Sized,
    {
        let mut buffer = bytes.get(offset..).ok_or(Error::BufferSize {
            requested: offset,
            available: bytes.len(),
        })?;
        let start = buffer.len();
        let value = Self::from_binary(&mut buffer)?;
        Ok((value, offset + start - buffer.len()))
    }
}

/// Selects between the historical wire layouts of the same logical types.
///
/// Codec 1 only changes type ids on the asset chain; the layout of every body is the same.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    #[default]
    V0 = 0,
    V1 = 1,
}

impl Codec {
    pub const SIZE: u64 = 2;
    pub const LATEST: Codec = Codec::V0;

    pub fn id(self) -> u16 {
        self as u16
    }
}

/// Fail with [Error::CodecId] naming the first codec that is not `expected`.
pub(crate) fn check_codecs(expected: Codec, found: impl IntoIterator<Item = Codec>) -> Result<()> {
    match found.into_iter().find(|c| *c != expected) {
        Some(other) => Err(Error::CodecId(other.id())),
        None => Ok(()),
    }
}

impl TryFrom<u16> for Codec {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Codec::V0),
            1 => Ok(Codec::V1),
            other => Err(Error::CodecId(other)),
        }
    }
}

impl Encodable for Codec {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        Codec::try_from(buffer.try_get_u16()?)
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u16(self.id());
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE
    }
}

/// A closed family of kinds whose encoding is a 4-byte type id followed by the kind's body.
///
/// The owner of the value (a transferable wrapper or a transaction field) writes the type id; the
/// kinds themselves only know their body. Decoding dispatches on the type id, and reports which
/// codec the id belongs to so the owner can re-encode with the same ids.
pub trait Typed: Sized {
    /// The type id of this kind under the given codec.
    fn type_id(&self, codec: Codec) -> u32;

    /// Decode the body of the kind selected by `type_id`.
    fn from_typed_binary(type_id: u32, buffer: &mut dyn Buf) -> Result<(Self, Codec)>;

    /// Write the body, without the type id.
    fn body_to_binary(&self, buffer: &mut dyn BufMut) -> Result<()>;

    /// Size of the body, without the type id.
    fn body_size(&self) -> u64;

    /// Read a type id and the body that follows it.
    fn read_typed(buffer: &mut dyn Buf) -> Result<(Self, Codec)> {
        let type_id = buffer.try_get_u32()?;
        Self::from_typed_binary(type_id, buffer)
    }

    /// Write the type id and the body.
    fn write_typed(&self, codec: Codec, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u32(self.type_id(codec));
        self.body_to_binary(buffer)
    }

    fn typed_size(&self) -> u64 {
        4 + self.body_size()
    }
}

/// Fail with [Error::BufferSize] unless the buffer holds at least `needed` more bytes.
pub(crate) fn check_remaining(buffer: &dyn Buf, needed: usize) -> Result<()> {
    if buffer.remaining() < needed {
        Err(Error::BufferSize {
            requested: needed,
            available: buffer.remaining(),
        })
    } else {
        Ok(())
    }
}

/// Read a fixed-size byte array.
pub(crate) fn read_array<const N: usize>(buffer: &mut dyn Buf) -> Result<[u8; N]> {
    check_remaining(buffer, N)?;
    let mut value = [0u8; N];
    buffer.copy_to_slice(&mut value);
    Ok(value)
}

/// Read `len` bytes.
pub(crate) fn read_bytes(buffer: &mut dyn Buf, len: usize) -> Result<Vec<u8>> {
    check_remaining(buffer, len)?;
    let mut value = vec![0u8; len];
    buffer.copy_to_slice(&mut value);
    Ok(value)
}

/// Convert a collection length to the 4-byte count written on the wire.
pub(crate) fn wire_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::BadArgument(format!("too many {}: {}", what, len)))
}

/// Read a byte blob prefixed by a 4-byte length.
pub fn read_var_bytes(buffer: &mut dyn Buf) -> Result<Vec<u8>> {
    let len = buffer.try_get_u32()? as usize;
    read_bytes(buffer, len)
}

/// Write a byte blob prefixed by a 4-byte length.
pub fn write_var_bytes(buffer: &mut dyn BufMut, data: &[u8]) -> Result<()> {
    buffer.put_u32(wire_len(data.len(), "bytes")?);
    buffer.put_slice(data);
    Ok(())
}

/// Read a UTF-8 string prefixed by a 2-byte length.
pub fn read_short_string(buffer: &mut dyn Buf) -> Result<String> {
    let len = buffer.try_get_u16()? as usize;
    Ok(String::from_utf8(read_bytes(buffer, len)?)?)
}

/// Write a UTF-8 string prefixed by a 2-byte length.
pub fn write_short_string(buffer: &mut dyn BufMut, value: &str) -> Result<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| Error::BadArgument(format!("string too long: {} bytes", value.len())))?;
    buffer.put_u16(len);
    buffer.put_slice(value.as_bytes());
    Ok(())
}

/// Read a list prefixed by a 4-byte count.
pub fn read_list<T: Encodable>(buffer: &mut dyn Buf) -> Result<Vec<T>> {
    let count = buffer.try_get_u32()? as usize;
    // the count comes off the wire, don't trust it for the allocation
    let mut items = Vec::with_capacity(count.min(buffer.remaining()));
    for _ in 0..count {
        items.push(T::from_binary(buffer)?);
    }
    Ok(items)
}

/// Write a list prefixed by a 4-byte count.
pub fn write_list<'a, T, I>(buffer: &mut dyn BufMut, items: I) -> Result<()>
where
    T: Encodable + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    buffer.put_u32(wire_len(items.len(), "list items")?);
    for item in items {
        item.to_binary(buffer)?;
    }
    Ok(())
}

/// Encoded size of a count-prefixed list.
pub(crate) fn list_size<T: Encodable>(items: &[T]) -> u64 {
    4 + items.iter().map(|i| i.encoded_size()).sum::<u64>()
}

/// Order items by their encoded bytes, the canonical order of outputs and operations.
///
/// Returns references in canonical order and leaves the slice untouched. The sort is stable so
/// identical encodings keep their relative order.
pub fn canonical_order<T: Encodable>(items: &[T]) -> Result<Vec<&T>> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        keyed.push((item.to_binary_buf()?, item));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
