//! Single-pass traversal of a compiled class
//!
//! [`scan`] walks the class header, fields, methods, bytecode, exception
//! tables and every annotation attachment point, and records each mention
//! of a type as a [`TypeUse`]. Nothing is decomposed here: descriptors and
//! signatures are kept verbatim and expanded lazily by
//! [`ClassReferences::references`].

use super::constant_pool::{Constant, ConstantPool};
use super::reader::{ByteReader, ReadResult};
use super::references::{ClassReferences, ReferenceKind, TypeUse};
use crate::constants::classfile::{MAGIC, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION};
use crate::core::ClassName;
use crate::error::{ClassFileError, ClassFileErrorKind};

mod opcode {
    pub const BIPUSH: u8 = 0x10;
    pub const SIPUSH: u8 = 0x11;
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const LDC2_W: u8 = 0x14;
    pub const IINC: u8 = 0x84;
    pub const GOTO_W: u8 = 0xc8;
    pub const JSR_W: u8 = 0xc9;
    pub const RET: u8 = 0xa9;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const GETSTATIC: u8 = 0xb2;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const INVOKEDYNAMIC: u8 = 0xba;
    pub const NEW: u8 = 0xbb;
    pub const NEWARRAY: u8 = 0xbc;
    pub const ANEWARRAY: u8 = 0xbd;
    pub const CHECKCAST: u8 = 0xc0;
    pub const INSTANCEOF: u8 = 0xc1;
    pub const WIDE: u8 = 0xc4;
    pub const MULTIANEWARRAY: u8 = 0xc5;
    pub const IFNULL: u8 = 0xc6;
    pub const IFNONNULL: u8 = 0xc7;
    pub const BREAKPOINT: u8 = 0xca;
    pub const IMPDEP1: u8 = 0xfe;
    pub const IMPDEP2: u8 = 0xff;
}

/// Scans one compiled class.
///
/// Fails only when the bytes are not a structurally valid class file.
/// Malformed signatures inside a valid file are not detected here; they
/// surface when the returned references are expanded.
pub fn scan(bytes: &[u8]) -> Result<ClassReferences, ClassFileError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u4()?;
    if magic != MAGIC {
        return Err(ClassFileError {
            offset: 0,
            kind: ClassFileErrorKind::BadMagic(magic),
        });
    }
    let minor = reader.u2()?;
    let major = reader.u2()?;
    if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major) {
        return Err(ClassFileError {
            offset: 6,
            kind: ClassFileErrorKind::UnsupportedVersion { major, minor },
        });
    }

    let pool = ConstantPool::parse(&mut reader)?;
    let mut scanner = Scanner {
        pool: &pool,
        uses: Vec::new(),
    };

    reader.skip(2)?; // access_flags
    let class_name = ClassName::from_internal(pool.read_class_name(&mut reader)?);
    if let Some(superclass) = pool.read_optional_class_name(&mut reader)? {
        scanner.name(ReferenceKind::Superclass, superclass);
    }
    for _ in 0..reader.u2()? {
        let interface = pool.read_class_name(&mut reader)?;
        scanner.name(ReferenceKind::Interface, interface);
    }

    for _ in 0..reader.u2()? {
        scanner.field(&mut reader)?;
    }
    for _ in 0..reader.u2()? {
        scanner.method(&mut reader)?;
    }
    scanner.class_attributes(&mut reader)?;

    Ok(ClassReferences {
        class_name,
        type_uses: scanner.uses,
    })
}

struct Scanner<'p, 'a> {
    pool: &'p ConstantPool<'a>,
    uses: Vec<TypeUse>,
}

struct LocalVariable<'p> {
    start: u16,
    index: u16,
    name: &'p str,
    descriptor: &'p str,
}

impl LocalVariable<'_> {
    fn is_pseudo_variable(&self) -> bool {
        self.name == "this" || self.name == "super"
    }

    fn same_slot(&self, other: &LocalVariable<'_>) -> bool {
        self.start == other.start && self.index == other.index
    }
}

impl<'p, 'a> Scanner<'p, 'a> {
    fn name(&mut self, kind: ReferenceKind, internal_name: &str) {
        self.uses.push(TypeUse::internal_name(kind, internal_name));
    }

    fn signature(&mut self, kind: ReferenceKind, signature: &str) {
        self.uses.push(TypeUse::signature(kind, signature));
    }

    fn attributes(
        &mut self,
        reader: &mut ByteReader<'a>,
        mut visit: impl FnMut(&mut Self, &'p str, ByteReader<'a>) -> ReadResult<()>,
    ) -> ReadResult<()> {
        let pool = self.pool;
        for _ in 0..reader.u2()? {
            let name = pool.read_utf8(reader)?;
            let body = reader.length_prefixed()?;
            visit(self, name, body)?;
        }
        Ok(())
    }

    /// Annotation attributes that may appear on any structure
    fn annotation_attribute(&mut self, name: &str, mut body: ByteReader<'a>) -> ReadResult<()> {
        match name {
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                self.annotations(&mut body)
            }
            "RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations" => {
                self.type_annotations(&mut body)
            }
            _ => Ok(()),
        }
    }

    fn class_attributes(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        self.attributes(reader, |s, name, mut body| match name {
            "Signature" => {
                let signature = pool.read_utf8(&mut body)?;
                s.signature(ReferenceKind::ClassSignature, signature);
                Ok(())
            }
            "Record" => s.record_components(&mut body),
            _ => s.annotation_attribute(name, body),
        })
    }

    fn record_components(&mut self, body: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        for _ in 0..body.u2()? {
            body.skip(2)?; // name
            let descriptor = pool.read_utf8(body)?;
            let mut signature = None;
            self.attributes(body, |s, name, mut attr| match name {
                "Signature" => {
                    signature = Some(pool.read_utf8(&mut attr)?);
                    Ok(())
                }
                _ => s.annotation_attribute(name, attr),
            })?;
            self.signature(ReferenceKind::RecordComponent, signature.unwrap_or(descriptor));
        }
        Ok(())
    }

    fn field(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        reader.skip(4)?; // access_flags, name_index
        let descriptor = pool.read_utf8(reader)?;
        let mut signature = None;

        self.attributes(reader, |s, name, mut body| match name {
            "Signature" => {
                signature = Some(pool.read_utf8(&mut body)?);
                Ok(())
            }
            "ConstantValue" => {
                let offset = body.offset();
                let index = body.u2()?;
                if let Constant::Class { .. } = pool.get(index, offset)? {
                    s.name(ReferenceKind::FieldConstant, pool.class_name(index, offset)?);
                }
                Ok(())
            }
            _ => s.annotation_attribute(name, body),
        })?;

        self.signature(ReferenceKind::FieldType, signature.unwrap_or(descriptor));
        Ok(())
    }

    fn method(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        reader.skip(4)?; // access_flags, name_index
        let descriptor = pool.read_utf8(reader)?;
        let mut signature = None;

        self.attributes(reader, |s, name, mut body| match name {
            "Signature" => {
                signature = Some(pool.read_utf8(&mut body)?);
                Ok(())
            }
            "Exceptions" => {
                for _ in 0..body.u2()? {
                    let exception = pool.read_class_name(&mut body)?;
                    s.name(ReferenceKind::ThrownException, exception);
                }
                Ok(())
            }
            "Code" => s.code(&mut body),
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                for _ in 0..body.u1()? {
                    s.annotations(&mut body)?;
                }
                Ok(())
            }
            "AnnotationDefault" => s.element_value(&mut body),
            _ => s.annotation_attribute(name, body),
        })?;

        self.signature(ReferenceKind::MethodType, signature.unwrap_or(descriptor));
        Ok(())
    }

    fn code(&mut self, body: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        body.skip(4)?; // max_stack, max_locals
        let mut code = body.length_prefixed()?;
        self.instructions(&mut code)?;

        for _ in 0..body.u2()? {
            body.skip(6)?; // start_pc, end_pc, handler_pc
            // catch_type 0 is a finally block
            if let Some(catch_type) = pool.read_optional_class_name(body)? {
                self.name(ReferenceKind::CatchType, catch_type);
            }
        }

        let mut locals = Vec::new();
        let mut typed_locals = Vec::new();
        self.attributes(body, |s, name, mut attr| match name {
            "LocalVariableTable" => read_local_variables(pool, &mut attr, &mut locals),
            "LocalVariableTypeTable" => read_local_variables(pool, &mut attr, &mut typed_locals),
            _ => s.annotation_attribute(name, attr),
        })?;

        for local in locals.iter().filter(|l| !l.is_pseudo_variable()) {
            let descriptor = typed_locals
                .iter()
                .find(|typed| typed.same_slot(local))
                .map_or(local.descriptor, |typed| typed.descriptor);
            self.signature(ReferenceKind::LocalVariable, descriptor);
        }
        for typed in typed_locals.iter().filter(|t| !t.is_pseudo_variable()) {
            if !locals.iter().any(|local| local.same_slot(typed)) {
                self.signature(ReferenceKind::LocalVariable, typed.descriptor);
            }
        }
        Ok(())
    }

    fn instructions(&mut self, code: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        while !code.is_empty() {
            let opcode_offset = code.offset();
            let op = code.u1()?;
            match op {
                opcode::LDC => {
                    let offset = code.offset();
                    let index = code.u1()? as u16;
                    self.constant_load(index, offset)?;
                }
                opcode::LDC_W | opcode::LDC2_W => {
                    let offset = code.offset();
                    let index = code.u2()?;
                    self.constant_load(index, offset)?;
                }
                opcode::GETSTATIC..=opcode::INVOKEINTERFACE => {
                    let offset = code.offset();
                    let member = pool.member_ref(code.u2()?, offset)?;
                    self.name(ReferenceKind::MemberOwner, member.owner);
                    self.signature(ReferenceKind::MemberType, member.descriptor);
                    if op == opcode::INVOKEINTERFACE {
                        code.skip(2)?; // count, 0
                    }
                }
                opcode::INVOKEDYNAMIC => {
                    let offset = code.offset();
                    let descriptor = pool.dynamic_descriptor(code.u2()?, offset)?;
                    self.signature(ReferenceKind::CallSite, descriptor);
                    code.skip(2)?;
                }
                opcode::NEW | opcode::ANEWARRAY | opcode::CHECKCAST | opcode::INSTANCEOF => {
                    let operand = pool.read_class_name(code)?;
                    self.name(ReferenceKind::InstructionOperand, operand);
                }
                opcode::MULTIANEWARRAY => {
                    let array_type = pool.read_class_name(code)?;
                    self.name(ReferenceKind::ArrayCreation, array_type);
                    code.skip(1)?; // dimensions
                }
                opcode::TABLESWITCH => {
                    skip_padding(code)?;
                    code.skip(4)?; // default
                    let low = code.i4()?;
                    let high = code.i4()?;
                    if high < low {
                        return Err(code.error(ClassFileErrorKind::BadSwitch));
                    }
                    let targets = (high as i64 - low as i64 + 1) as usize;
                    code.skip(targets.saturating_mul(4))?;
                }
                opcode::LOOKUPSWITCH => {
                    skip_padding(code)?;
                    code.skip(4)?; // default
                    let pairs = code.i4()?;
                    if pairs < 0 {
                        return Err(code.error(ClassFileErrorKind::BadSwitch));
                    }
                    code.skip((pairs as usize).saturating_mul(8))?;
                }
                opcode::WIDE => match code.u1()? {
                    opcode::IINC => code.skip(4)?,
                    0x15..=0x19 | 0x36..=0x3a | opcode::RET => code.skip(2)?,
                    other => {
                        return Err(ClassFileError {
                            offset: opcode_offset + 1,
                            kind: ClassFileErrorKind::BadOpcode(other),
                        });
                    }
                },
                opcode::BIPUSH | 0x15..=0x19 | 0x36..=0x3a | opcode::RET | opcode::NEWARRAY => {
                    code.skip(1)?
                }
                opcode::SIPUSH
                | opcode::IINC
                | 0x99..=0xa8
                | opcode::IFNULL
                | opcode::IFNONNULL => code.skip(2)?,
                opcode::GOTO_W | opcode::JSR_W => code.skip(4)?,
                0x00..=0x0f
                | 0x1a..=0x35
                | 0x3b..=0x83
                | 0x85..=0x98
                | 0xac..=0xb1
                | 0xbe
                | 0xbf
                | 0xc2
                | 0xc3
                | opcode::BREAKPOINT
                | opcode::IMPDEP1
                | opcode::IMPDEP2 => {}
                other => {
                    return Err(ClassFileError {
                        offset: opcode_offset,
                        kind: ClassFileErrorKind::BadOpcode(other),
                    });
                }
            }
        }
        Ok(())
    }

    fn constant_load(&mut self, index: u16, offset: usize) -> ReadResult<()> {
        let pool = self.pool;
        match pool.get(index, offset)? {
            Constant::Class { name_index } => {
                self.name(ReferenceKind::ConstantLoad, pool.utf8(*name_index, offset)?);
            }
            Constant::MethodType { descriptor_index } => {
                self.signature(ReferenceKind::ConstantLoad, pool.utf8(*descriptor_index, offset)?);
            }
            Constant::MethodHandle { reference_index } => {
                let member = pool.member_ref(*reference_index, offset)?;
                self.name(ReferenceKind::MemberOwner, member.owner);
                self.signature(ReferenceKind::MemberType, member.descriptor);
            }
            Constant::Dynamic { .. } => {
                let descriptor = pool.dynamic_descriptor(index, offset)?;
                self.signature(ReferenceKind::ConstantLoad, descriptor);
            }
            _ => {}
        }
        Ok(())
    }

    fn annotations(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        for _ in 0..reader.u2()? {
            self.annotation(reader)?;
        }
        Ok(())
    }

    fn annotation(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        let annotation_type = pool.read_utf8(reader)?;
        self.signature(ReferenceKind::Annotation, annotation_type);
        for _ in 0..reader.u2()? {
            reader.skip(2)?; // element_name_index
            self.element_value(reader)?;
        }
        Ok(())
    }

    fn element_value(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        let pool = self.pool;
        let tag_offset = reader.offset();
        match reader.u1()? {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => reader.skip(2)?,
            b'e' => {
                let enum_type = pool.read_utf8(reader)?;
                self.signature(ReferenceKind::AnnotationValue, enum_type);
                reader.skip(2)?; // const_name_index
            }
            b'c' => {
                let class_info = pool.read_utf8(reader)?;
                if class_info != "V" {
                    self.signature(ReferenceKind::AnnotationValue, class_info);
                }
            }
            b'@' => self.annotation(reader)?,
            b'[' => {
                for _ in 0..reader.u2()? {
                    self.element_value(reader)?;
                }
            }
            other => {
                return Err(ClassFileError {
                    offset: tag_offset,
                    kind: ClassFileErrorKind::BadElementTag(other),
                });
            }
        }
        Ok(())
    }

    fn type_annotations(&mut self, reader: &mut ByteReader<'a>) -> ReadResult<()> {
        for _ in 0..reader.u2()? {
            skip_target_info(reader)?;
            let path_length = reader.u1()? as usize;
            reader.skip(path_length * 2)?;
            self.annotation(reader)?;
        }
        Ok(())
    }
}

fn read_local_variables<'p>(
    pool: &'p ConstantPool<'_>,
    attr: &mut ByteReader<'_>,
    out: &mut Vec<LocalVariable<'p>>,
) -> ReadResult<()> {
    for _ in 0..attr.u2()? {
        let start = attr.u2()?;
        attr.skip(2)?; // length
        let name = pool.read_utf8(attr)?;
        let descriptor = pool.read_utf8(attr)?;
        let index = attr.u2()?;
        out.push(LocalVariable {
            start,
            index,
            name,
            descriptor,
        });
    }
    Ok(())
}

/// tableswitch and lookupswitch operands start on a four-byte boundary
/// relative to the start of the code array
fn skip_padding(code: &mut ByteReader<'_>) -> ReadResult<()> {
    let padding = (4 - code.position() % 4) % 4;
    code.skip(padding)
}

fn skip_target_info(reader: &mut ByteReader<'_>) -> ReadResult<()> {
    let offset = reader.offset();
    let len = match reader.u1()? {
        // type parameter
        0x00 | 0x01 => 1,
        // supertype
        0x10 => 2,
        // type parameter bound
        0x11 | 0x12 => 2,
        // field, return, receiver
        0x13..=0x15 => 0,
        // formal parameter
        0x16 => 1,
        // throws
        0x17 => 2,
        // local variable, resource variable
        0x40 | 0x41 => reader.u2()? as usize * 6,
        // catch
        0x42 => 2,
        // instanceof, new, method references
        0x43..=0x46 => 2,
        // casts and type arguments
        0x47..=0x4b => 3,
        other => {
            return Err(ClassFileError {
                offset,
                kind: ClassFileErrorKind::BadTargetType(other),
            });
        }
    };
    reader.skip(len)
}
