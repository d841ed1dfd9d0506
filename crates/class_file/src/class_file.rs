use std::io::Read;

use crate::{
    access_flags::{flag_predicates, ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    attributes::Attributes,
    parser::{Parser, MAGIC},
    ConstantPool, LookupError, ParseOptions, Result,
};

/// A decoded class file. Indices are kept as they appear in the file and
/// resolved on demand against `constant_pool`.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: u16,
    /// Zero only for `java/lang/Object`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<ClassFile> {
        Parser::new(bytes).with_options(options).parse()
    }

    /// Reads `reader` to the end, then decodes the bytes.
    pub fn from_reader(mut reader: impl Read) -> Result<ClassFile> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }

    pub fn class_name(&self) -> Result<&str, LookupError> {
        self.constant_pool.get_class_name(self.this_class)
    }

    /// `None` when this class file has no superclass, i.e. it is
    /// `java/lang/Object`.
    pub fn super_class(&self) -> Result<Option<&str>, LookupError> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.constant_pool.get_class_name(self.super_class).map(Some)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>, LookupError> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.get_class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str, LookupError> {
        self.constant_pool.get_utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str, LookupError> {
        self.constant_pool.get_utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str, LookupError> {
        self.constant_pool.get_utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str, LookupError> {
        self.constant_pool.get_utf8(method.descriptor_index)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|field| self.field_name(field).map_or(false, |n| n == name))
    }

    /// Looks a method up by name, and by descriptor too when one is given
    /// (names alone are ambiguous for overloads).
    pub fn find_method(&self, name: &str, descriptor: Option<&str>) -> Option<&MethodInfo> {
        self.methods.iter().find(|method| {
            self.method_name(method).map_or(false, |n| n == name)
                && descriptor.map_or(true, |d| {
                    self.method_descriptor(method).map_or(false, |md| md == d)
                })
        })
    }

    pub fn source_file(&self) -> Option<&str> {
        let index = self.attributes.source_file_index()?;
        self.constant_pool.get_utf8(index).ok()
    }

    pub fn magic_hex(&self) -> String {
        format!("0x{:08X}", self.magic)
    }

    /// `major.minor`, with the Java release appended when it is known,
    /// e.g. `52.0 (Java 8)`.
    pub fn version_string(&self) -> String {
        match self.java_release() {
            Some(release) => format!(
                "{}.{} (Java {})",
                self.major_version, self.minor_version, release
            ),
            None => format!("{}.{}", self.major_version, self.minor_version),
        }
    }

    /// Release name for the major version: "1.1" through "1.4", then "5",
    /// "6" and so on.
    pub fn java_release(&self) -> Option<String> {
        match self.major_version {
            45 => Some("1.1".into()),
            46..=48 => Some(format!("1.{}", self.major_version - 44)),
            49..=255 => Some((self.major_version - 44).to_string()),
            _ => None,
        }
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }

    flag_predicates!(ClassAccessFlags {
        is_public => PUBLIC,
        is_final => FINAL,
        is_super => SUPER,
        is_interface => INTERFACE,
        is_abstract => ABSTRACT,
        is_synthetic => SYNTHETIC,
        is_annotation => ANNOTATION,
        is_enum => ENUM,
        is_module => MODULE,
    });
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access_flags: FieldAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl FieldInfo {
    flag_predicates!(FieldAccessFlags {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_volatile => VOLATILE,
        is_transient => TRANSIENT,
        is_synthetic => SYNTHETIC,
        is_enum => ENUM,
    });
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl MethodInfo {
    flag_predicates!(MethodAccessFlags {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_synchronized => SYNCHRONIZED,
        is_bridge => BRIDGE,
        is_varargs => VARARGS,
        is_native => NATIVE,
        is_abstract => ABSTRACT,
        is_strict => STRICT,
        is_synthetic => SYNTHETIC,
    });
}
