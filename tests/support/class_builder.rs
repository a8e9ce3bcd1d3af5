//! Assembles class files byte by byte for the scanner and analysis tests

use std::collections::HashMap;

const MAGIC: u32 = 0xCAFE_BABE;
const JAVA_17: u16 = 61;

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next_index: u16,
    interned: HashMap<Vec<u8>, u16>,
}

impl Pool {
    fn new() -> Self {
        Self {
            next_index: 1,
            ..Self::default()
        }
    }

    fn intern(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(&index) = self.interned.get(&entry) {
            return index;
        }
        let index = self.next_index;
        self.bytes.extend_from_slice(&entry);
        self.next_index += slots;
        self.interned.insert(entry, index);
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
        entry.extend_from_slice(text.as_bytes());
        self.intern(entry, 1)
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.intern(tagged(7, &[name]), 1)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.intern(tagged(12, &[name, descriptor]), 1)
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.intern(tagged(tag, &[owner, name_and_type]), 1)
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.intern(entry, 1)
    }

    fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.intern(entry, 2)
    }

    fn method_type(&mut self, descriptor: &str) -> u16 {
        let descriptor = self.utf8(descriptor);
        self.intern(tagged(16, &[descriptor]), 1)
    }

    fn method_handle(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let method = self.member(10, owner, name, descriptor);
        let mut entry = vec![15, 6]; // REF_invokeStatic
        entry.extend_from_slice(&method.to_be_bytes());
        self.intern(entry, 1)
    }

    fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.intern(tagged(18, &[0, name_and_type]), 1)
    }
}

fn tagged(tag: u8, indexes: &[u16]) -> Vec<u8> {
    let mut entry = vec![tag];
    for index in indexes {
        entry.extend_from_slice(&index.to_be_bytes());
    }
    entry
}

fn u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn attribute(pool: &mut Pool, out: &mut Vec<u8>, name: &str, body: &[u8]) {
    u2(out, pool.utf8(name));
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
}

/// Annotation element values
#[derive(Clone)]
pub enum Value {
    Int(i32),
    Str(String),
    Enum(String, String),
    Class(String),
    Nested(Annotation),
    Array(Vec<Value>),
}

#[derive(Clone)]
pub struct Annotation {
    descriptor: String,
    elements: Vec<(String, Value)>,
    invisible: bool,
}

impl Annotation {
    pub fn new(descriptor: &str) -> Self {
        Self {
            descriptor: descriptor.to_string(),
            elements: Vec::new(),
            invisible: false,
        }
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }

    /// Retained in the class file but not visible at runtime
    pub fn invisible(mut self) -> Self {
        self.invisible = true;
        self
    }

    fn encode(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        u2(out, pool.utf8(&self.descriptor));
        u2(out, self.elements.len() as u16);
        for (name, value) in &self.elements {
            u2(out, pool.utf8(name));
            value.encode(pool, out);
        }
    }
}

impl Value {
    fn encode(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        match self {
            Value::Int(v) => {
                out.push(b'I');
                u2(out, pool.integer(*v));
            }
            Value::Str(s) => {
                out.push(b's');
                u2(out, pool.utf8(s));
            }
            Value::Enum(descriptor, constant) => {
                out.push(b'e');
                u2(out, pool.utf8(descriptor));
                u2(out, pool.utf8(constant));
            }
            Value::Class(descriptor) => {
                out.push(b'c');
                u2(out, pool.utf8(descriptor));
            }
            Value::Nested(annotation) => {
                out.push(b'@');
                annotation.encode(pool, out);
            }
            Value::Array(values) => {
                out.push(b'[');
                u2(out, values.len() as u16);
                for value in values {
                    value.encode(pool, out);
                }
            }
        }
    }
}

/// An annotation on a type use. `target` is the raw target_type byte
/// followed by its target_info.
#[derive(Clone)]
pub struct TypeAnnotation {
    target: Vec<u8>,
    path: Vec<(u8, u8)>,
    annotation: Annotation,
}

impl TypeAnnotation {
    pub fn new(target: &[u8], annotation: Annotation) -> Self {
        Self {
            target: target.to_vec(),
            path: Vec::new(),
            annotation,
        }
    }

    /// Appends a type_path step, e.g. `(3, 0)` for the first type argument
    pub fn path(mut self, kind: u8, argument: u8) -> Self {
        self.path.push((kind, argument));
        self
    }

    fn encode(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.target);
        out.push(self.path.len() as u8);
        for (kind, argument) in &self.path {
            out.extend_from_slice(&[*kind, *argument]);
        }
        self.annotation.encode(pool, out);
    }
}

/// Writes the visible and invisible attributes for `items`, returning how
/// many attributes were written
fn split_by_visibility<T>(
    pool: &mut Pool,
    out: &mut Vec<u8>,
    items: &[T],
    names: [&str; 2],
    is_invisible: impl Fn(&T) -> bool,
    encode: impl Fn(&T, &mut Pool, &mut Vec<u8>),
) -> u16 {
    let mut count = 0;
    for (invisible, name) in [(false, names[0]), (true, names[1])] {
        let group: Vec<&T> = items.iter().filter(|i| is_invisible(*i) == invisible).collect();
        if group.is_empty() {
            continue;
        }
        let mut body = Vec::new();
        u2(&mut body, group.len() as u16);
        for item in group {
            encode(item, pool, &mut body);
        }
        attribute(pool, out, name, &body);
        count += 1;
    }
    count
}

fn annotations_attributes(pool: &mut Pool, out: &mut Vec<u8>, annotations: &[Annotation]) -> u16 {
    split_by_visibility(
        pool,
        out,
        annotations,
        ["RuntimeVisibleAnnotations", "RuntimeInvisibleAnnotations"],
        |a| a.invisible,
        |a, pool, body| a.encode(pool, body),
    )
}

fn type_annotations_attributes(
    pool: &mut Pool,
    out: &mut Vec<u8>,
    annotations: &[TypeAnnotation],
) -> u16 {
    split_by_visibility(
        pool,
        out,
        annotations,
        [
            "RuntimeVisibleTypeAnnotations",
            "RuntimeInvisibleTypeAnnotations",
        ],
        |a| a.annotation.invisible,
        |a, pool, body| a.encode(pool, body),
    )
}

/// Bytecode instructions the tests need
#[derive(Clone)]
pub enum Insn {
    /// Opcodes without operands, e.g. `aload_0` (0x2a) or `return` (0xb1)
    Op(u8),
    New(String),
    CheckCast(String),
    InstanceOf(String),
    ANewArray(String),
    MultiANewArray(String, u8),
    GetStatic(String, String, String),
    InvokeVirtual(String, String, String),
    InvokeStatic(String, String, String),
    InvokeInterface(String, String, String),
    InvokeDynamic(String, String),
    LdcClass(String),
    LdcInt(i32),
    Ldc2Long(i64),
    LdcMethodType(String),
    LdcMethodHandle(String, String, String),
    TableSwitch { low: i32, high: i32 },
    LookupSwitch(u32),
    WideIinc,
}

impl Insn {
    fn encode(&self, pool: &mut Pool, code: &mut Vec<u8>) {
        match self {
            Insn::Op(op) => code.push(*op),
            Insn::New(class) => op_u2(code, 0xbb, pool.class(class)),
            Insn::CheckCast(class) => op_u2(code, 0xc0, pool.class(class)),
            Insn::InstanceOf(class) => op_u2(code, 0xc1, pool.class(class)),
            Insn::ANewArray(class) => op_u2(code, 0xbd, pool.class(class)),
            Insn::MultiANewArray(class, dimensions) => {
                op_u2(code, 0xc5, pool.class(class));
                code.push(*dimensions);
            }
            Insn::GetStatic(owner, name, descriptor) => {
                op_u2(code, 0xb2, pool.member(9, owner, name, descriptor))
            }
            Insn::InvokeVirtual(owner, name, descriptor) => {
                op_u2(code, 0xb6, pool.member(10, owner, name, descriptor))
            }
            Insn::InvokeStatic(owner, name, descriptor) => {
                op_u2(code, 0xb8, pool.member(10, owner, name, descriptor))
            }
            Insn::InvokeInterface(owner, name, descriptor) => {
                op_u2(code, 0xb9, pool.member(11, owner, name, descriptor));
                code.extend_from_slice(&[1, 0]);
            }
            Insn::InvokeDynamic(name, descriptor) => {
                op_u2(code, 0xba, pool.invoke_dynamic(name, descriptor));
                code.extend_from_slice(&[0, 0]);
            }
            Insn::LdcClass(class) => op_u2(code, 0x13, pool.class(class)),
            Insn::LdcInt(value) => {
                let index = pool.integer(*value);
                assert!(index < 256, "ldc needs a one-byte index");
                code.extend_from_slice(&[0x12, index as u8]);
            }
            Insn::Ldc2Long(value) => op_u2(code, 0x14, pool.long(*value)),
            Insn::LdcMethodType(descriptor) => op_u2(code, 0x13, pool.method_type(descriptor)),
            Insn::LdcMethodHandle(owner, name, descriptor) => {
                op_u2(code, 0x13, pool.method_handle(owner, name, descriptor))
            }
            Insn::TableSwitch { low, high } => {
                code.push(0xaa);
                pad(code);
                code.extend_from_slice(&0i32.to_be_bytes());
                code.extend_from_slice(&low.to_be_bytes());
                code.extend_from_slice(&high.to_be_bytes());
                for _ in *low..=*high {
                    code.extend_from_slice(&0i32.to_be_bytes());
                }
            }
            Insn::LookupSwitch(pairs) => {
                code.push(0xab);
                pad(code);
                code.extend_from_slice(&0i32.to_be_bytes());
                code.extend_from_slice(&pairs.to_be_bytes());
                for key in 0..*pairs {
                    code.extend_from_slice(&(key as i32).to_be_bytes());
                    code.extend_from_slice(&0i32.to_be_bytes());
                }
            }
            Insn::WideIinc => code.extend_from_slice(&[0xc4, 0x84, 0, 1, 0, 1]),
        }
    }
}

fn op_u2(code: &mut Vec<u8>, op: u8, index: u16) {
    code.push(op);
    u2(code, index);
}

fn pad(code: &mut Vec<u8>) {
    while code.len() % 4 != 0 {
        code.push(0);
    }
}

/// One row of a LocalVariableTable or LocalVariableTypeTable
#[derive(Clone)]
pub struct Local {
    pub start: u16,
    pub index: u16,
    pub name: String,
    /// Descriptor in the variable table, signature in the type table
    pub descriptor: String,
}

impl Local {
    pub fn new(index: u16, name: &str, descriptor: &str) -> Self {
        Self {
            start: 0,
            index,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

#[derive(Clone, Default)]
pub struct Code {
    pub instructions: Vec<Insn>,
    /// Catch types of the exception table; `None` is a finally handler
    pub catch_types: Vec<Option<String>>,
    pub locals: Vec<Local>,
    pub typed_locals: Vec<Local>,
    pub type_annotations: Vec<TypeAnnotation>,
}

impl Code {
    pub fn new(instructions: Vec<Insn>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    fn encode(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        let mut code = Vec::new();
        for insn in &self.instructions {
            insn.encode(pool, &mut code);
        }

        let mut body = Vec::new();
        u2(&mut body, 8); // max_stack
        u2(&mut body, 8); // max_locals
        body.extend_from_slice(&(code.len() as u32).to_be_bytes());
        body.extend_from_slice(&code);

        u2(&mut body, self.catch_types.len() as u16);
        for catch_type in &self.catch_types {
            body.extend_from_slice(&[0, 0, 0, 1, 0, 0]);
            let index = catch_type.as_deref().map_or(0, |c| pool.class(c));
            u2(&mut body, index);
        }

        let mut attributes = Vec::new();
        let mut count = 0;
        for (name, table) in [
            ("LocalVariableTable", &self.locals),
            ("LocalVariableTypeTable", &self.typed_locals),
        ] {
            if table.is_empty() {
                continue;
            }
            let mut rows = Vec::new();
            u2(&mut rows, table.len() as u16);
            for local in table {
                u2(&mut rows, local.start);
                u2(&mut rows, code.len() as u16);
                u2(&mut rows, pool.utf8(&local.name));
                u2(&mut rows, pool.utf8(&local.descriptor));
                u2(&mut rows, local.index);
            }
            attribute(pool, &mut attributes, name, &rows);
            count += 1;
        }
        count += type_annotations_attributes(pool, &mut attributes, &self.type_annotations);
        u2(&mut body, count);
        body.extend_from_slice(&attributes);

        attribute(pool, out, "Code", &body);
    }
}

#[derive(Clone, Default)]
pub struct Method {
    name: String,
    descriptor: String,
    signature: Option<String>,
    exceptions: Vec<String>,
    code: Option<Code>,
    annotations: Vec<Annotation>,
    type_annotations: Vec<TypeAnnotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    annotation_default: Option<Value>,
}

impl Method {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            ..Self::default()
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn throws(mut self, exception: &str) -> Self {
        self.exceptions.push(exception.to_string());
        self
    }

    pub fn code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn type_annotation(mut self, annotation: TypeAnnotation) -> Self {
        self.type_annotations.push(annotation);
        self
    }

    pub fn parameter_annotations(mut self, parameters: Vec<Vec<Annotation>>) -> Self {
        self.parameter_annotations = parameters;
        self
    }

    pub fn annotation_default(mut self, value: Value) -> Self {
        self.annotation_default = Some(value);
        self
    }

    fn encode(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        u2(out, 0x0001);
        u2(out, pool.utf8(&self.name));
        u2(out, pool.utf8(&self.descriptor));

        let mut attributes = Vec::new();
        let mut count = 0;
        if let Some(signature) = &self.signature {
            let mut body = Vec::new();
            u2(&mut body, pool.utf8(signature));
            attribute(pool, &mut attributes, "Signature", &body);
            count += 1;
        }
        if !self.exceptions.is_empty() {
            let mut body = Vec::new();
            u2(&mut body, self.exceptions.len() as u16);
            for exception in &self.exceptions {
                u2(&mut body, pool.class(exception));
            }
            attribute(pool, &mut attributes, "Exceptions", &body);
            count += 1;
        }
        if let Some(code) = &self.code {
            code.encode(pool, &mut attributes);
            count += 1;
        }
        count += annotations_attributes(pool, &mut attributes, &self.annotations);
        count += type_annotations_attributes(pool, &mut attributes, &self.type_annotations);
        if !self.parameter_annotations.is_empty() {
            let mut body = vec![self.parameter_annotations.len() as u8];
            for parameter in &self.parameter_annotations {
                u2(&mut body, parameter.len() as u16);
                for annotation in parameter {
                    annotation.encode(pool, &mut body);
                }
            }
            attribute(pool, &mut attributes, "RuntimeVisibleParameterAnnotations", &body);
            count += 1;
        }
        if let Some(value) = &self.annotation_default {
            let mut body = Vec::new();
            value.encode(pool, &mut body);
            attribute(pool, &mut attributes, "AnnotationDefault", &body);
            count += 1;
        }

        u2(out, count);
        out.extend_from_slice(&attributes);
    }
}

#[derive(Clone, Default)]
struct Field {
    name: String,
    descriptor: String,
    signature: Option<String>,
    /// Class constant of a ConstantValue attribute
    constant: Option<String>,
    annotations: Vec<Annotation>,
    type_annotations: Vec<TypeAnnotation>,
}

#[derive(Clone)]
struct RecordComponent {
    name: String,
    descriptor: String,
    signature: Option<String>,
}

/// Builds one class file
#[derive(Clone)]
pub struct ClassBuilder {
    name: String,
    major: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    annotations: Vec<Annotation>,
    type_annotations: Vec<TypeAnnotation>,
    record_components: Vec<RecordComponent>,
}

impl ClassBuilder {
    /// A class extending `java/lang/Object`
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            major: JAVA_17,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            type_annotations: Vec::new(),
            record_components: Vec::new(),
        }
    }

    pub fn major_version(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn super_class(mut self, super_class: Option<&str>) -> Self {
        self.super_class = super_class.map(str::to_string);
        self
    }

    pub fn interface(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.push_field(name, descriptor, |_| {})
    }

    pub fn generic_field(self, name: &str, descriptor: &str, signature: &str) -> Self {
        self.push_field(name, descriptor, |f| f.signature = Some(signature.to_string()))
    }

    pub fn annotated_field(self, name: &str, descriptor: &str, annotation: Annotation) -> Self {
        self.push_field(name, descriptor, |f| f.annotations.push(annotation))
    }

    pub fn type_annotated_field(
        self,
        name: &str,
        descriptor: &str,
        annotation: TypeAnnotation,
    ) -> Self {
        self.push_field(name, descriptor, |f| f.type_annotations.push(annotation))
    }

    /// A field whose ConstantValue attribute points at a class constant
    pub fn constant_field(self, name: &str, descriptor: &str, class: &str) -> Self {
        self.push_field(name, descriptor, |f| f.constant = Some(class.to_string()))
    }

    fn push_field(
        mut self,
        name: &str,
        descriptor: &str,
        configure: impl FnOnce(&mut Field),
    ) -> Self {
        let mut field = Field {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            ..Field::default()
        };
        configure(&mut field);
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn type_annotation(mut self, annotation: TypeAnnotation) -> Self {
        self.type_annotations.push(annotation);
        self
    }

    pub fn record_component(
        mut self,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
    ) -> Self {
        self.record_components.push(RecordComponent {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::new();
        let mut tail = Vec::new();

        u2(&mut tail, 0x0021); // public super
        u2(&mut tail, pool.class(&self.name));
        let super_index = self.super_class.as_deref().map_or(0, |s| pool.class(s));
        u2(&mut tail, super_index);

        u2(&mut tail, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            u2(&mut tail, pool.class(interface));
        }

        u2(&mut tail, self.fields.len() as u16);
        for field in &self.fields {
            u2(&mut tail, 0x0002);
            u2(&mut tail, pool.utf8(&field.name));
            u2(&mut tail, pool.utf8(&field.descriptor));

            let mut attributes = Vec::new();
            let mut count = 0;
            if let Some(signature) = &field.signature {
                let mut body = Vec::new();
                u2(&mut body, pool.utf8(signature));
                attribute(&mut pool, &mut attributes, "Signature", &body);
                count += 1;
            }
            if let Some(class) = &field.constant {
                let mut body = Vec::new();
                u2(&mut body, pool.class(class));
                attribute(&mut pool, &mut attributes, "ConstantValue", &body);
                count += 1;
            }
            count += annotations_attributes(&mut pool, &mut attributes, &field.annotations);
            count +=
                type_annotations_attributes(&mut pool, &mut attributes, &field.type_annotations);
            u2(&mut tail, count);
            tail.extend_from_slice(&attributes);
        }

        u2(&mut tail, self.methods.len() as u16);
        for method in &self.methods {
            method.encode(&mut pool, &mut tail);
        }

        let mut attributes = Vec::new();
        let mut count = 0;
        if let Some(signature) = &self.signature {
            let mut body = Vec::new();
            u2(&mut body, pool.utf8(signature));
            attribute(&mut pool, &mut attributes, "Signature", &body);
            count += 1;
        }
        count += annotations_attributes(&mut pool, &mut attributes, &self.annotations);
        count += type_annotations_attributes(&mut pool, &mut attributes, &self.type_annotations);
        if !self.record_components.is_empty() {
            let mut body = Vec::new();
            u2(&mut body, self.record_components.len() as u16);
            for component in &self.record_components {
                u2(&mut body, pool.utf8(&component.name));
                u2(&mut body, pool.utf8(&component.descriptor));
                match &component.signature {
                    Some(signature) => {
                        u2(&mut body, 1);
                        let mut signature_body = Vec::new();
                        u2(&mut signature_body, pool.utf8(signature));
                        attribute(&mut pool, &mut body, "Signature", &signature_body);
                    }
                    None => u2(&mut body, 0),
                }
            }
            attribute(&mut pool, &mut attributes, "Record", &body);
            count += 1;
        }
        u2(&mut tail, count);
        tail.extend_from_slice(&attributes);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_be_bytes());
        u2(&mut bytes, 0);
        u2(&mut bytes, self.major);
        u2(&mut bytes, pool.next_index);
        bytes.extend_from_slice(&pool.bytes);
        bytes.extend_from_slice(&tail);
        bytes
    }
}
