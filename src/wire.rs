//! Shared wire-format primitives: big-endian append helpers and a
//! bounds-checked byte cursor used by the DNS and WebSocket codecs.

/// Returned when a read would run past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated;

/// Appends a big-endian u16.
#[inline]
pub fn put_u16_be(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Appends a big-endian u64.
#[inline]
pub fn put_u64_be(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Cursor over a byte slice. Every read checks the remaining length and
/// fails with [`Truncated`] instead of panicking.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn check(&self, len: usize) -> Result<(), Truncated> {
        if self.pos + len <= self.data.len() {
            Ok(())
        } else {
            Err(Truncated)
        }
    }

    pub fn peek_u8(&self) -> Result<u8, Truncated> {
        self.check(1)?;
        Ok(self.data[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        self.check(1)?;
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, Truncated> {
        self.check(2)?;
        let b = &self.data[self.pos..self.pos + 2];
        self.pos += 2;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u64_be(&mut self) -> Result<u64, Truncated> {
        self.check(8)?;
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_be_bytes(b))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Truncated> {
        self.check(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Truncated> {
        self.check(len)?;
        self.pos += len;
        Ok(())
    }

    /// Position of the cursor from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }
}
