//! Assembles class files byte by byte, so tests do not depend on a Java
//! compiler.

#![allow(dead_code)]

pub const MAGIC: [u8; 4] = [0xca, 0xfe, 0xba, 0xbe];

#[derive(Default)]
pub struct ConstantPoolBuilder {
    bytes: Vec<u8>,
    slots: u16,
}
impl ConstantPoolBuilder {
    fn push(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.slots + 1;
        self.bytes.extend_from_slice(entry);
        self.slots += slots;
        index
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        let encoded = cesu8::to_java_cesu8(s);
        let mut entry = vec![1];
        entry.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        entry.extend_from_slice(&encoded);
        self.push(&entry, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry, 2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.push(&entry, 1)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut entry = vec![12];
        entry.extend_from_slice(&name_index.to_be_bytes());
        entry.extend_from_slice(&descriptor_index.to_be_bytes());
        self.push(&entry, 1)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let mut entry = vec![10];
        entry.extend_from_slice(&class_index.to_be_bytes());
        entry.extend_from_slice(&name_and_type_index.to_be_bytes());
        self.push(&entry, 1)
    }

    /// `constant_pool_count` followed by the entries.
    pub fn build(&self) -> Vec<u8> {
        let mut bytes = (self.slots + 1).to_be_bytes().to_vec();
        bytes.extend_from_slice(&self.bytes);
        bytes
    }
}

/// One attribute record: name index, length and payload.
pub fn attribute(name_index: u16, info: &[u8]) -> Vec<u8> {
    let mut bytes = name_index.to_be_bytes().to_vec();
    bytes.extend_from_slice(&(info.len() as u32).to_be_bytes());
    bytes.extend_from_slice(info);
    bytes
}

/// A u16 count followed by the records.
pub fn table(records: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = (records.len() as u16).to_be_bytes().to_vec();
    for record in records {
        bytes.extend_from_slice(record);
    }
    bytes
}

/// A field_info or method_info record.
pub fn member(
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: &[Vec<u8>],
) -> Vec<u8> {
    let mut bytes = access_flags.to_be_bytes().to_vec();
    bytes.extend_from_slice(&name_index.to_be_bytes());
    bytes.extend_from_slice(&descriptor_index.to_be_bytes());
    bytes.extend_from_slice(&table(attributes));
    bytes
}

pub struct ClassFileBuilder {
    pub major_version: u16,
    pub minor_version: u16,
    pub constant_pool: ConstantPoolBuilder,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Vec<u8>>,
    pub methods: Vec<Vec<u8>>,
    pub attributes: Vec<Vec<u8>>,
}
impl Default for ClassFileBuilder {
    fn default() -> Self {
        Self {
            major_version: 52,
            minor_version: 0,
            constant_pool: ConstantPoolBuilder::default(),
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        }
    }
}
impl ClassFileBuilder {
    /// A class named `name` extending `java/lang/Object`.
    pub fn class(name: &str) -> Self {
        let mut builder = Self::default();
        builder.this_class = builder.constant_pool.class(name);
        builder.super_class = builder.constant_pool.class("java/lang/Object");
        builder
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&self.minor_version.to_be_bytes());
        bytes.extend_from_slice(&self.major_version.to_be_bytes());
        bytes.extend_from_slice(&self.constant_pool.build());
        bytes.extend_from_slice(&self.access_flags.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        bytes.extend_from_slice(&table(&self.fields));
        bytes.extend_from_slice(&table(&self.methods));
        bytes.extend_from_slice(&table(&self.attributes));
        bytes
    }
}
