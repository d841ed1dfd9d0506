use std::fmt;

use thiserror::Error;

use crate::{attributes::AttributeHost, constant_pool::ConstantTag};

/// Failure to decode a class file. Any of these aborts the whole decode.
#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Unexpected end of input at offset 0x{offset:X}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Invalid magic identifier: 0x{0:X}")]
    BadMagic(u32),
    #[error("Unknown constant pool tag {tag} at offset 0x{offset:X}")]
    UnknownConstantTag { tag: u8, offset: usize },
    #[error("Malformed constant #{index} at offset 0x{offset:X}: {reason}")]
    MalformedConstant {
        index: u16,
        offset: usize,
        reason: String,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("Attribute {name} is not allowed on {host}")]
    IllegalAttributeForHost { name: String, host: AttributeHost },
    #[error("{name} declares {declared} bytes but {consumed} were consumed")]
    LengthMismatch {
        name: String,
        declared: usize,
        consumed: usize,
    },
    #[error("Unknown element value tag 0x{tag:02X} at offset 0x{offset:X}")]
    UnknownElementValueTag { tag: u8, offset: usize },
    #[error("Unknown verification type {tag} at offset 0x{offset:X}")]
    UnknownVerificationType { tag: u8, offset: usize },
    #[error("Unknown stack map frame type {frame_type} at offset 0x{offset:X}")]
    UnknownStackMapFrameType { frame_type: u8, offset: usize },
    #[error("Unknown type annotation target 0x{target_type:02X} at offset 0x{offset:X}")]
    UnknownTypeAnnotationTarget { target_type: u8, offset: usize },
    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("{section} (offset 0x{offset:X}): {source}")]
    Context {
        section: Section,
        offset: usize,
        #[source]
        source: Box<ClassFileError>,
    },
}
impl ClassFileError {
    pub(crate) fn context(self, section: Section, offset: usize) -> Self {
        ClassFileError::Context {
            section,
            offset,
            source: Box::new(self),
        }
    }

    /// The error that started the failure, with all section context peeled
    /// off.
    pub fn root_cause(&self) -> &ClassFileError {
        let mut e = self;
        while let ClassFileError::Context { source, .. } = e {
            e = source;
        }
        e
    }

    /// Sections the failure happened in, outermost first.
    pub fn sections(&self) -> Vec<&Section> {
        let mut sections = Vec::new();
        let mut e = self;
        while let ClassFileError::Context {
            section, source, ..
        } = e
        {
            sections.push(section);
            e = source;
        }
        sections
    }
}

/// Where in the class file a decode failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Magic,
    Version,
    ConstantPool,
    ConstantPoolEntry(u16),
    AccessFlags,
    ThisSuperClass,
    Interfaces,
    Fields,
    Field(u16),
    Methods,
    Method(u16),
    Attributes,
    Attribute { index: u16, name: Option<String> },
    RecordComponent(u16),
}
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Magic => write!(f, "in magic"),
            Section::Version => write!(f, "in version"),
            Section::ConstantPool => write!(f, "in constant pool"),
            Section::ConstantPoolEntry(index) => write!(f, "in constant #{}", index),
            Section::AccessFlags => write!(f, "in access flags"),
            Section::ThisSuperClass => write!(f, "in this/super class"),
            Section::Interfaces => write!(f, "in interfaces"),
            Section::Fields => write!(f, "in fields"),
            Section::Field(index) => write!(f, "in field #{}", index),
            Section::Methods => write!(f, "in methods"),
            Section::Method(index) => write!(f, "in method #{}", index),
            Section::Attributes => write!(f, "in attributes"),
            Section::Attribute { index, name: None } => write!(f, "in attribute #{}", index),
            Section::Attribute {
                index,
                name: Some(name),
            } => write!(f, "in attribute #{} ({})", index, name),
            Section::RecordComponent(index) => write!(f, "in record component #{}", index),
        }
    }
}

/// Failure to resolve a constant pool index. Local to the one query; the
/// decoded class file stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Constant pool index {index} out of range (valid indices are 1 to {size})")]
    IndexOutOfRange { index: u16, size: usize },
    #[error("Constant pool index {0} is the unusable slot after a Long or Double")]
    PhantomSlot(u16),
    #[error("Expected {expected} at constant pool index {index}, found {found}")]
    UnexpectedTag {
        index: u16,
        expected: ConstantTag,
        found: ConstantTag,
    },
    #[error(
        "Expected a Fieldref, Methodref or InterfaceMethodref at constant pool index {index}, found {found}"
    )]
    NotAMemberRef { index: u16, found: ConstantTag },
}

pub(crate) trait WithSection<T> {
    fn in_section(self, section: Section, offset: usize) -> Result<T, ClassFileError>;
}
impl<T, E: Into<ClassFileError>> WithSection<T> for Result<T, E> {
    fn in_section(self, section: Section, offset: usize) -> Result<T, ClassFileError> {
        self.map_err(|e| e.into().context(section, offset))
    }
}
