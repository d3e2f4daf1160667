use crate::Error;

/// A forward-only cursor over a COMPOUND's decoded byte stream.
///
/// XDR encodes everything in 4-byte units; every primitive read here
/// advances the cursor by a multiple of 4, matching the wire layout RFC 8881
/// mandates. The core never needs to decode the op-specific payloads (that
/// is the filesystem abstraction's job), but it does need to walk past them
/// — for the v4.0-only arg-skipper, and for locating the next operation's
/// header in the stream.
pub struct XdrReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> XdrReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read a big-endian u32, the XDR base unit.
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let word = self.take(4)?;
        Ok(u32::from_be_bytes(word.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let hi = self.read_u32()? as u64;
        let lo = self.read_u32()? as u64;
        Ok((hi << 32) | lo)
    }

    /// Read a fixed-size opaque field, padded to a 4-byte boundary.
    pub fn read_fixed(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let padded = pad4(len);
        let chunk = self.take(padded)?;
        Ok(&chunk[..len])
    }

    /// Read a variable-length opaque field: a u32 length prefix followed by
    /// that many bytes, padded to a 4-byte boundary.
    pub fn read_opaque(&mut self, max_len: u32) -> Result<&'a [u8], Error> {
        let len = self.read_u32()?;
        if len > max_len {
            return Err(Error::BadXdr);
        }

        self.read_fixed(len as usize)
    }

    /// Skip forward without interpreting the bytes. Used by the v4.0-only
    /// arg-skipper, which must still consume an op's arguments from the
    /// stream without invoking its (forbidden) handler.
    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }

    pub fn skip_opaque(&mut self, max_len: u32) -> Result<(), Error> {
        self.read_opaque(max_len).map(|_| ())
    }

    /// Take the rest of the stream, for ops whose body is the remainder of
    /// the current operation slice (the dispatcher slices the stream by op
    /// boundaries before handing it to a handler).
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        rest
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::BadXdr);
        }

        let chunk = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(chunk)
    }
}

fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_u32_big_endian() {
        let mut r = XdrReader::new(&[0x00, 0x00, 0x00, 0x2a]);
        assert_eq!(r.read_u32().unwrap(), 42);
        assert!(r.is_empty());
    }

    #[test]
    fn reads_u64_as_two_words() {
        let mut r = XdrReader::new(&[0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(r.read_u64().unwrap(), (1u64 << 32) | 2);
    }

    #[test]
    fn opaque_respects_padding_and_cap() {
        // len=5, data="abcde", padded to 8 bytes.
        let mut buf = vec![0, 0, 0, 5];
        buf.extend_from_slice(b"abcde\0\0\0");
        let mut r = XdrReader::new(&buf);
        assert_eq!(r.read_opaque(1024).unwrap(), b"abcde");
        assert!(r.is_empty());
    }

    #[test]
    fn opaque_over_cap_is_bad_xdr() {
        let buf = [0, 0, 0, 10];
        let mut r = XdrReader::new(&buf);
        assert!(matches!(r.read_opaque(4), Err(Error::BadXdr)));
    }

    #[test]
    fn short_read_is_bad_xdr() {
        let mut r = XdrReader::new(&[0, 0]);
        assert!(matches!(r.read_u32(), Err(Error::BadXdr)));
    }
}
