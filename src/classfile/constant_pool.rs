//! Constant pool decoding

use std::borrow::Cow;

use super::reader::{ByteReader, ReadResult};
use crate::error::{ClassFileError, ClassFileErrorKind};

mod tag {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant<'a> {
    Utf8(Cow<'a, str>),
    /// Integer, float, long, double and string literals
    Literal,
    Class {
        name_index: u16,
    },
    MemberRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    /// `CONSTANT_Dynamic` and `CONSTANT_InvokeDynamic`
    Dynamic {
        name_and_type_index: u16,
    },
    /// Module and package names are not types
    Named,
    /// Index 0 and the slot after a long or double
    Unusable,
}

/// Owner, name and descriptor of a field or method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'p> {
    pub owner: &'p str,
    pub name: &'p str,
    pub descriptor: &'p str,
}

#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    entries: Vec<Constant<'a>>,
}

impl<'a> ConstantPool<'a> {
    pub fn parse(reader: &mut ByteReader<'a>) -> ReadResult<Self> {
        let count = reader.u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let tag = reader.u1()?;
            let constant = match tag {
                tag::UTF8 => {
                    let len = reader.u2()? as usize;
                    let start = reader.offset();
                    let bytes = reader.take(len)?;
                    Constant::Utf8(decode_modified_utf8(bytes).ok_or(ClassFileError {
                        offset: start,
                        kind: ClassFileErrorKind::BadUtf8,
                    })?)
                }
                tag::INTEGER | tag::FLOAT => {
                    reader.skip(4)?;
                    Constant::Literal
                }
                tag::LONG | tag::DOUBLE => {
                    reader.skip(8)?;
                    entries.push(Constant::Literal);
                    Constant::Unusable
                }
                tag::CLASS => Constant::Class {
                    name_index: reader.u2()?,
                },
                tag::STRING => {
                    reader.skip(2)?;
                    Constant::Literal
                }
                tag::FIELD_REF | tag::METHOD_REF | tag::INTERFACE_METHOD_REF => {
                    Constant::MemberRef {
                        class_index: reader.u2()?,
                        name_and_type_index: reader.u2()?,
                    }
                }
                tag::NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.u2()?,
                    descriptor_index: reader.u2()?,
                },
                tag::METHOD_HANDLE => {
                    reader.skip(1)?;
                    Constant::MethodHandle {
                        reference_index: reader.u2()?,
                    }
                }
                tag::METHOD_TYPE => Constant::MethodType {
                    descriptor_index: reader.u2()?,
                },
                tag::DYNAMIC | tag::INVOKE_DYNAMIC => {
                    reader.skip(2)?;
                    Constant::Dynamic {
                        name_and_type_index: reader.u2()?,
                    }
                }
                tag::MODULE | tag::PACKAGE => {
                    reader.skip(2)?;
                    Constant::Named
                }
                other => {
                    return Err(ClassFileError {
                        offset: reader.offset() - 1,
                        kind: ClassFileErrorKind::UnknownConstantTag(other),
                    });
                }
            };
            entries.push(constant);
        }

        // A long or double in the last slot pushes one entry too many
        if entries.len() > count && count > 0 {
            return Err(reader.error(ClassFileErrorKind::BadConstantIndex(count as u16)));
        }

        Ok(Self { entries })
    }

    /// Looks up an entry; `offset` is where the index was read from
    pub fn get(&self, index: u16, offset: usize) -> ReadResult<&Constant<'a>> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFileError {
                offset,
                kind: ClassFileErrorKind::BadConstantIndex(index),
            }),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16, offset: usize) -> ReadResult<&str> {
        match self.get(index, offset)? {
            Constant::Utf8(value) => Ok(value.as_ref()),
            _ => Err(unexpected(index, offset, "Utf8")),
        }
    }

    /// Internal name held by a `CONSTANT_Class` entry
    pub fn class_name(&self, index: u16, offset: usize) -> ReadResult<&str> {
        match self.get(index, offset)? {
            Constant::Class { name_index } => self.utf8(*name_index, offset),
            _ => Err(unexpected(index, offset, "Class")),
        }
    }

    pub fn name_and_type(&self, index: u16, offset: usize) -> ReadResult<(&str, &str)> {
        match self.get(index, offset)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((
                self.utf8(*name_index, offset)?,
                self.utf8(*descriptor_index, offset)?,
            )),
            _ => Err(unexpected(index, offset, "NameAndType")),
        }
    }

    pub fn member_ref(&self, index: u16, offset: usize) -> ReadResult<MemberRef<'_>> {
        match self.get(index, offset)? {
            Constant::MemberRef {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index, offset)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index, offset)?;
                Ok(MemberRef {
                    owner,
                    name,
                    descriptor,
                })
            }
            _ => Err(unexpected(index, offset, "field or method reference")),
        }
    }

    /// Descriptor of a `CONSTANT_InvokeDynamic` or `CONSTANT_Dynamic` entry
    pub fn dynamic_descriptor(&self, index: u16, offset: usize) -> ReadResult<&str> {
        match self.get(index, offset)? {
            Constant::Dynamic {
                name_and_type_index,
            } => Ok(self.name_and_type(*name_and_type_index, offset)?.1),
            _ => Err(unexpected(index, offset, "InvokeDynamic")),
        }
    }

    // Convenience readers that take the index from the stream

    pub fn read_utf8(&self, reader: &mut ByteReader<'_>) -> ReadResult<&str> {
        let offset = reader.offset();
        self.utf8(reader.u2()?, offset)
    }

    pub fn read_class_name(&self, reader: &mut ByteReader<'_>) -> ReadResult<&str> {
        let offset = reader.offset();
        self.class_name(reader.u2()?, offset)
    }

    /// Like [`ConstantPool::read_class_name`], but index 0 means "none"
    pub fn read_optional_class_name(&self, reader: &mut ByteReader<'_>) -> ReadResult<Option<&str>> {
        let offset = reader.offset();
        match reader.u2()? {
            0 => Ok(None),
            index => self.class_name(index, offset).map(Some),
        }
    }
}

fn unexpected(index: u16, offset: usize, expected: &'static str) -> ClassFileError {
    ClassFileError {
        offset,
        kind: ClassFileErrorKind::UnexpectedConstant { index, expected },
    }
}

/// Decodes the class-file flavour of UTF-8: NUL is encoded as `C0 80` and
/// supplementary characters as surrogate pairs of three-byte sequences.
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        return std::str::from_utf8(bytes).ok().map(Cow::Borrowed);
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x01..=0x7F => {
                units.push(b as u16);
                i += 1;
            }
            0xC0..=0xDF => {
                let b2 = continuation(bytes.get(i + 1))?;
                units.push((((b & 0x1F) as u16) << 6) | b2);
                i += 2;
            }
            0xE0..=0xEF => {
                let b2 = continuation(bytes.get(i + 1))?;
                let b3 = continuation(bytes.get(i + 2))?;
                units.push((((b & 0x0F) as u16) << 12) | (b2 << 6) | b3);
                i += 3;
            }
            _ => return None,
        }
    }

    Some(Cow::Owned(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    ))
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    match byte {
        Some(&b) if b & 0xC0 == 0x80 => Some((b & 0x3F) as u16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_entry(value: &str) -> Vec<u8> {
        let mut out = vec![tag::UTF8];
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value.as_bytes());
        out
    }

    #[test]
    fn test_parses_class_and_member_refs() {
        let mut bytes = vec![0x00, 0x08];
        bytes.extend(utf8_entry("java/lang/String")); // 1
        bytes.extend([tag::CLASS, 0x00, 0x01]); // 2
        bytes.extend(utf8_entry("length")); // 3
        bytes.extend(utf8_entry("()I")); // 4
        bytes.extend([tag::NAME_AND_TYPE, 0x00, 0x03, 0x00, 0x04]); // 5
        bytes.extend([tag::METHOD_REF, 0x00, 0x02, 0x00, 0x05]); // 6
        bytes.extend([tag::INTEGER, 0, 0, 0, 1]); // 7

        let mut reader = ByteReader::new(&bytes);
        let pool = ConstantPool::parse(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(pool.entries.len(), 8);
        assert_eq!(pool.class_name(2, 0).unwrap(), "java/lang/String");

        let member = pool.member_ref(6, 0).unwrap();
        assert_eq!(member.owner, "java/lang/String");
        assert_eq!(member.name, "length");
        assert_eq!(member.descriptor, "()I");
    }

    #[test]
    fn test_long_takes_two_slots() {
        let mut bytes = vec![0x00, 0x04];
        bytes.extend([tag::LONG, 0, 0, 0, 0, 0, 0, 0, 1]); // 1 and 2
        bytes.extend(utf8_entry("x")); // 3

        let pool = ConstantPool::parse(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(pool.utf8(3, 0).unwrap(), "x");
        assert!(matches!(
            pool.get(2, 0).unwrap_err().kind,
            ClassFileErrorKind::BadConstantIndex(2)
        ));
    }

    #[test]
    fn test_index_zero_and_out_of_range() {
        let mut bytes = vec![0x00, 0x02];
        bytes.extend(utf8_entry("a"));
        let pool = ConstantPool::parse(&mut ByteReader::new(&bytes)).unwrap();

        assert!(pool.get(0, 10).is_err());
        let err = pool.get(9, 10).unwrap_err();
        assert_eq!(err.offset, 10);
        assert_eq!(err.kind, ClassFileErrorKind::BadConstantIndex(9));
    }

    #[test]
    fn test_wrong_entry_kind() {
        let mut bytes = vec![0x00, 0x02];
        bytes.extend(utf8_entry("a"));
        let pool = ConstantPool::parse(&mut ByteReader::new(&bytes)).unwrap();

        let err = pool.class_name(1, 0).unwrap_err();
        assert_eq!(
            err.kind,
            ClassFileErrorKind::UnexpectedConstant {
                index: 1,
                expected: "Class"
            }
        );
    }

    #[test]
    fn test_unknown_tag() {
        let bytes = [0x00, 0x02, 0x02, 0x00];
        let err = ConstantPool::parse(&mut ByteReader::new(&bytes)).unwrap_err();
        assert_eq!(err.kind, ClassFileErrorKind::UnknownConstantTag(2));
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_truncated_pool() {
        let mut bytes = vec![0x00, 0x03];
        bytes.extend(utf8_entry("a"));
        let err = ConstantPool::parse(&mut ByteReader::new(&bytes)).unwrap_err();
        assert!(matches!(err.kind, ClassFileErrorKind::Truncated { .. }));
    }

    #[test]
    fn test_modified_utf8() {
        assert_eq!(decode_modified_utf8(b"plain").unwrap(), "plain");
        assert_eq!(decode_modified_utf8(&[0xC0, 0x80]).unwrap(), "\0");
        assert_eq!(decode_modified_utf8(&[0xC3, 0xA9]).unwrap(), "é");
        // U+1F600 as a surrogate pair
        assert_eq!(
            decode_modified_utf8(&[0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]).unwrap(),
            "😀"
        );
        assert!(decode_modified_utf8(&[0x00]).is_none());
        assert!(decode_modified_utf8(&[0xC3]).is_none());
        assert!(decode_modified_utf8(&[0xF0, 0x9F, 0x98, 0x80]).is_none());
    }
}
