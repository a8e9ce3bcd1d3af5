//! Typed reference events produced by the class-file scanner

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::signature::class_types;
use crate::core::ClassName;
use crate::error::SignatureError;

/// Where in a class file a type was mentioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    Superclass,
    Interface,
    ClassSignature,
    FieldType,
    FieldConstant,
    MethodType,
    ThrownException,
    Annotation,
    AnnotationValue,
    RecordComponent,
    MemberOwner,
    MemberType,
    InstructionOperand,
    ArrayCreation,
    ConstantLoad,
    CallSite,
    CatchType,
    LocalVariable,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Superclass => "superclass",
            ReferenceKind::Interface => "interface",
            ReferenceKind::ClassSignature => "class-signature",
            ReferenceKind::FieldType => "field-type",
            ReferenceKind::FieldConstant => "field-constant",
            ReferenceKind::MethodType => "method-type",
            ReferenceKind::ThrownException => "thrown-exception",
            ReferenceKind::Annotation => "annotation",
            ReferenceKind::AnnotationValue => "annotation-value",
            ReferenceKind::RecordComponent => "record-component",
            ReferenceKind::MemberOwner => "member-owner",
            ReferenceKind::MemberType => "member-type",
            ReferenceKind::InstructionOperand => "instruction-operand",
            ReferenceKind::ArrayCreation => "array-creation",
            ReferenceKind::ConstantLoad => "constant-load",
            ReferenceKind::CallSite => "call-site",
            ReferenceKind::CatchType => "catch-type",
            ReferenceKind::LocalVariable => "local-variable",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type as it appears in the class file, before decomposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    /// `CONSTANT_Class` name: `java/lang/String`, or an array descriptor
    /// such as `[Ljava/lang/String;`
    InternalName(String),
    /// Field or method descriptor, or a generic signature
    Signature(String),
}

/// One mention of a type in a class file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeUse {
    pub kind: ReferenceKind,
    pub raw: RawType,
}

impl TypeUse {
    pub fn internal_name(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            raw: RawType::InternalName(name.into()),
        }
    }

    pub fn signature(kind: ReferenceKind, signature: impl Into<String>) -> Self {
        Self {
            kind,
            raw: RawType::Signature(signature.into()),
        }
    }

    /// Decomposes the raw form into the class names it mentions. Array
    /// names are decomposed into their element type.
    pub fn class_names(&self) -> Result<Vec<ClassName>, SignatureError> {
        match &self.raw {
            RawType::InternalName(name) if name.starts_with('[') => class_types(name),
            RawType::InternalName(name) => Ok(vec![ClassName::from_internal(name)]),
            RawType::Signature(signature) => class_types(signature),
        }
    }
}

/// A class named by a compiled class, with the place it was named
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub class_name: ClassName,
}

/// Everything one compiled class mentions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReferences {
    pub class_name: ClassName,
    pub type_uses: Vec<TypeUse>,
}

impl ClassReferences {
    /// Lazily decomposes every type use. Each malformed signature yields
    /// one `Err` in place of the references it would have produced.
    pub fn references(&self) -> impl Iterator<Item = Result<Reference, SignatureError>> + '_ {
        self.type_uses.iter().flat_map(|type_use| {
            let expanded: Vec<_> = match type_use.class_names() {
                Ok(names) => names
                    .into_iter()
                    .map(|class_name| {
                        Ok(Reference {
                            kind: type_use.kind,
                            class_name,
                        })
                    })
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            expanded
        })
    }

    /// Folds the references into the set of external classes this class
    /// uses: its own name and anonymous classes are left out, malformed
    /// signatures are skipped and returned alongside.
    pub fn referenced_classes(&self) -> ReferencedClasses {
        self.references().fold(ReferencedClasses::default(), |mut acc, reference| {
            match reference {
                Ok(Reference { class_name, .. }) => {
                    if class_name != self.class_name && !class_name.is_anonymous_inner_class() {
                        acc.classes.insert(class_name);
                    }
                }
                Err(e) => acc.skipped_signatures.push(e),
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedClasses {
    pub classes: BTreeSet<ClassName>,
    pub skipped_signatures: Vec<SignatureError>,
}
