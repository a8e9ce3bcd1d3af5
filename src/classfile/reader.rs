//! Bounds-checked big-endian cursor over class-file bytes

use crate::error::{ClassFileError, ClassFileErrorKind};

pub type ReadResult<T> = Result<T, ClassFileError>;

/// Reads big-endian values from a byte slice.
///
/// A reader created with [`ByteReader::sub_reader`] keeps track of where
/// its window starts in the enclosing file, so errors always carry the
/// absolute offset at which decoding failed.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            base: 0,
        }
    }

    /// Position relative to the start of this reader's window
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position relative to the start of the class file
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn error(&self, kind: ClassFileErrorKind) -> ClassFileError {
        ClassFileError {
            offset: self.offset(),
            kind,
        }
    }

    pub fn take(&mut self, len: usize) -> ReadResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(ClassFileErrorKind::Truncated {
                needed: len - self.remaining(),
            }));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> ReadResult<()> {
        self.take(len).map(|_| ())
    }

    /// Splits off the next `len` bytes as an independent reader
    pub fn sub_reader(&mut self, len: usize) -> ReadResult<ByteReader<'a>> {
        let base = self.offset();
        let bytes = self.take(len)?;
        Ok(ByteReader { bytes, pos: 0, base })
    }

    pub fn u1(&mut self) -> ReadResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u2(&mut self) -> ReadResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u4(&mut self) -> ReadResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i4(&mut self) -> ReadResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a u4 length and splits off that many bytes
    pub fn length_prefixed(&mut self) -> ReadResult<ByteReader<'a>> {
        let len = self.u4()? as usize;
        self.sub_reader(len)
    }
}
