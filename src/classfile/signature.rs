//! Generic signature and descriptor parsing
//!
//! Accepts every string form that names types in a class file: field
//! descriptors (`[Ljava/lang/String;`), method descriptors
//! (`(ILjava/util/List;)V`) and the generic class, method and field
//! signatures that extend them with type parameters, type arguments,
//! wildcards, type variables and inner-class segments.
//!
//! Only class types are reported. Primitive types, `void` and type
//! variables contribute nothing; arrays contribute their element type.

use crate::core::ClassName;
use crate::error::SignatureError;

/// Calls `on_class` for every class type named in `signature`.
///
/// If the signature is malformed nothing is reported, so a caller that
/// treats the error as recoverable never sees a partial result.
pub fn parse_signature(
    signature: &str,
    mut on_class: impl FnMut(ClassName),
) -> Result<(), SignatureError> {
    class_types(signature)?.into_iter().for_each(&mut on_class);
    Ok(())
}

/// Collects every class type named in `signature`, in order of appearance
/// with inner types after their outer type.
pub fn class_types(signature: &str) -> Result<Vec<ClassName>, SignatureError> {
    let mut parser = SignatureParser {
        signature,
        bytes: signature.as_bytes(),
        pos: 0,
        found: Vec::new(),
    };
    parser.parse()?;
    Ok(parser.found)
}

struct SignatureParser<'s> {
    signature: &'s str,
    bytes: &'s [u8],
    pos: usize,
    found: Vec<ClassName>,
}

impl SignatureParser<'_> {
    fn parse(&mut self) -> Result<(), SignatureError> {
        if self.bytes.is_empty() {
            return Err(self.fail("empty signature"));
        }

        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }

        if self.peek() == Some(b'(') {
            return self.method_tail();
        }

        // Class signature (superclass then interfaces) or a field type
        if self.at_end() {
            return Err(self.fail("missing type after type parameters"));
        }
        while !self.at_end() {
            self.java_type()?;
        }
        Ok(())
    }

    fn method_tail(&mut self) -> Result<(), SignatureError> {
        self.expect(b'(')?;
        while self.peek() != Some(b')') {
            if self.at_end() {
                return Err(self.fail("unterminated parameter list"));
            }
            self.java_type()?;
        }
        self.expect(b')')?;

        match self.peek() {
            Some(b'V') => self.bump(),
            _ => self.java_type()?,
        }

        while self.peek() == Some(b'^') {
            self.bump();
            match self.peek() {
                Some(b'T') => self.type_variable()?,
                Some(b'L') => self.class_type()?,
                _ => return Err(self.fail("expected class type or type variable after '^'")),
            }
        }

        if !self.at_end() {
            return Err(self.fail("trailing characters after method signature"));
        }
        Ok(())
    }

    fn type_parameters(&mut self) -> Result<(), SignatureError> {
        self.expect(b'<')?;
        if self.peek() == Some(b'>') {
            return Err(self.fail("empty type parameter list"));
        }
        while self.peek() != Some(b'>') {
            self.identifier(b":")?;
            self.expect(b':')?;
            // The class bound may be empty when only interface bounds follow
            if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.bump();
                self.reference_type()?;
            }
            if self.at_end() {
                return Err(self.fail("unterminated type parameter list"));
            }
        }
        self.expect(b'>')
    }

    fn java_type(&mut self) -> Result<(), SignatureError> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.bump();
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<(), SignatureError> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => self.type_variable(),
            Some(b'[') => {
                self.bump();
                self.java_type()
            }
            None => Err(self.fail("unexpected end of signature")),
            Some(_) => Err(self.fail("expected a type")),
        }
    }

    fn type_variable(&mut self) -> Result<(), SignatureError> {
        self.expect(b'T')?;
        self.identifier(b";")?;
        self.expect(b';')
    }

    fn class_type(&mut self) -> Result<(), SignatureError> {
        self.expect(b'L')?;
        let mut name = self.identifier(b"<.;")?.to_string();
        if self.peek() == Some(b'<') {
            self.type_arguments()?;
        }
        self.found.push(ClassName::from_internal(&name));

        while self.peek() == Some(b'.') {
            self.bump();
            let inner = self.identifier(b"<.;")?;
            name.push('$');
            name.push_str(inner);
            if self.peek() == Some(b'<') {
                self.type_arguments()?;
            }
            self.found.push(ClassName::from_internal(&name));
        }

        self.expect(b';')
    }

    fn type_arguments(&mut self) -> Result<(), SignatureError> {
        self.expect(b'<')?;
        if self.peek() == Some(b'>') {
            return Err(self.fail("empty type argument list"));
        }
        while self.peek() != Some(b'>') {
            match self.peek() {
                Some(b'*') => self.bump(),
                Some(b'+' | b'-') => {
                    self.bump();
                    self.reference_type()?;
                }
                None => return Err(self.fail("unterminated type argument list")),
                Some(_) => self.reference_type()?,
            }
        }
        self.expect(b'>')
    }

    /// Reads a non-empty run of characters up to one of `terminators`
    fn identifier(&mut self, terminators: &[u8]) -> Result<&str, SignatureError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if terminators.contains(&b) {
                break;
            }
            if matches!(b, b'<' | b'>' | b';' | b'[' | b':') {
                return Err(self.fail("unexpected character in identifier"));
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.fail("expected an identifier"));
        }
        if self.at_end() {
            return Err(self.fail("unexpected end of signature"));
        }
        // Terminators are ASCII, so `start..pos` lies on char boundaries
        Ok(&self.signature[start..self.pos])
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn expect(&mut self, expected: u8) -> Result<(), SignatureError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.bump();
                Ok(())
            }
            None => Err(self.fail("unexpected end of signature")),
            Some(_) => Err(self.fail("unexpected character")),
        }
    }

    fn fail(&self, reason: &'static str) -> SignatureError {
        SignatureError {
            signature: self.signature.to_string(),
            position: self.pos,
            reason,
        }
    }
}
