use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Big-endian reader over an in-memory class file.
///
/// Offsets reported in errors are absolute: a cursor carved out of a larger
/// buffer with [`ByteCursor::sub_cursor`] remembers where its slice started.
pub struct ByteCursor<'a> {
    r: Cursor<&'a [u8]>,
    base: usize,
}
impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self {
            r: Cursor::new(buf),
            base,
        }
    }

    /// Position relative to the start of this cursor's buffer.
    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    /// Position relative to the start of the outermost buffer.
    pub fn offset(&self) -> usize {
        self.base + self.position()
    }

    pub fn len(&self) -> usize {
        self.r.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.len() {
            return Err(ClassFileError::UnexpectedEof {
                offset: self.base + pos,
                needed: pos - self.position(),
                available: self.remaining(),
            });
        }
        self.r.set_position(pos as u64);
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.r.set_position((self.position() + n) as u64);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.r.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.r.read_i32::<Endian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.r.read_i64::<Endian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.r.read_f32::<Endian>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.r.read_f64::<Endian>()?)
    }

    /// Reads `count` big-endian u16 values, the shape of every index table in
    /// the format.
    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        self.ensure(count * 2)?;
        let mut values = vec![0u16; count];
        self.r.read_u16_into::<Endian>(&mut values)?;
        Ok(values)
    }

    /// A u16 count followed by that many u16 values.
    pub fn read_u16_table(&mut self) -> Result<Vec<u16>> {
        let count = self.read_u16()?;
        self.read_u16_vec(count as usize)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.position();
        let buf: &'a [u8] = *self.r.get_ref();
        self.r.set_position((start + n) as u64);
        Ok(&buf[start..start + n])
    }

    /// Splits the next `n` bytes off into their own cursor and advances past
    /// them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>> {
        let base = self.offset();
        let bytes = self.read_bytes(n)?;
        Ok(ByteCursor::with_base(bytes, base))
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(ClassFileError::UnexpectedEof {
                offset: self.offset(),
                needed,
                available,
            });
        }
        Ok(())
    }
}
