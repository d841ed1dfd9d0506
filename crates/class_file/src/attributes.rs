use std::fmt;

use crate::{
    access_flags::{InnerClassAccessFlags, MethodParameterFlags},
    annotations::{Annotation, ElementValue, TypeAnnotation},
    module::ModuleAttribute,
    stack_map::StackMapFrame,
    ConstantPool, LookupError,
};

/// An attribute record: the name index and declared length shared by every
/// attribute, plus its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub attribute_length: u32,
    pub info: AttributeInfo,
}
impl Attribute {
    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<&'a str, LookupError> {
        constant_pool.get_utf8(self.attribute_name_index)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| a.name(constant_pool).map_or(false, |n| n == name))
    }

    pub fn code_attribute(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn line_number_table(&self) -> Option<&[LineNumber]> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::LineNumberTable(table) => Some(table.as_slice()),
            _ => None,
        })
    }

    pub fn source_file_index(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::SourceFile { sourcefile_index } => Some(sourcefile_index),
            _ => None,
        })
    }

    pub fn signature_index(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::Signature { signature_index } => Some(signature_index),
            _ => None,
        })
    }

    pub fn bootstrap_methods(&self) -> Option<&[BootstrapMethod]> {
        self.0.iter().find_map(|a| match &a.info {
            AttributeInfo::BootstrapMethods(methods) => Some(methods.as_slice()),
            _ => None,
        })
    }

    pub fn is_deprecated(&self) -> bool {
        self.0
            .iter()
            .any(|a| matches!(a.info, AttributeInfo::Deprecated))
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue {
        constantvalue_index: u16,
    },
    Code(CodeAttribute),
    StackMapTable(Vec<StackMapFrame>),
    Exceptions(Vec<u16>),
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod {
        class_index: u16,
        /// Zero when the class is not enclosed by a method.
        method_index: u16,
    },
    Synthetic,
    Signature {
        signature_index: u16,
    },
    SourceFile {
        sourcefile_index: u16,
    },
    /// Modified UTF-8 without a length prefix; see [`AttributeInfo::debug_extension`].
    SourceDebugExtension(Vec<u8>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    LocalVariableTypeTable(Vec<LocalVariableType>),
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    Module(ModuleAttribute),
    ModulePackages(Vec<u16>),
    ModuleMainClass {
        main_class_index: u16,
    },
    NestHost {
        host_class_index: u16,
    },
    NestMembers(Vec<u16>),
    Record(Vec<RecordComponent>),
    PermittedSubclasses(Vec<u16>),
    /// An attribute this parser does not know, kept byte for byte.
    Unknown {
        name: String,
        info: Vec<u8>,
    },
}
impl AttributeInfo {
    pub fn kind(&self) -> Option<AttributeKind> {
        let kind = match self {
            AttributeInfo::ConstantValue { .. } => AttributeKind::ConstantValue,
            AttributeInfo::Code(_) => AttributeKind::Code,
            AttributeInfo::StackMapTable(_) => AttributeKind::StackMapTable,
            AttributeInfo::Exceptions(_) => AttributeKind::Exceptions,
            AttributeInfo::InnerClasses(_) => AttributeKind::InnerClasses,
            AttributeInfo::EnclosingMethod { .. } => AttributeKind::EnclosingMethod,
            AttributeInfo::Synthetic => AttributeKind::Synthetic,
            AttributeInfo::Signature { .. } => AttributeKind::Signature,
            AttributeInfo::SourceFile { .. } => AttributeKind::SourceFile,
            AttributeInfo::SourceDebugExtension(_) => AttributeKind::SourceDebugExtension,
            AttributeInfo::LineNumberTable(_) => AttributeKind::LineNumberTable,
            AttributeInfo::LocalVariableTable(_) => AttributeKind::LocalVariableTable,
            AttributeInfo::LocalVariableTypeTable(_) => AttributeKind::LocalVariableTypeTable,
            AttributeInfo::Deprecated => AttributeKind::Deprecated,
            AttributeInfo::RuntimeVisibleAnnotations(_) => AttributeKind::RuntimeVisibleAnnotations,
            AttributeInfo::RuntimeInvisibleAnnotations(_) => {
                AttributeKind::RuntimeInvisibleAnnotations
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeVisibleParameterAnnotations
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => {
                AttributeKind::RuntimeInvisibleParameterAnnotations
            }
            AttributeInfo::RuntimeVisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeVisibleTypeAnnotations
            }
            AttributeInfo::RuntimeInvisibleTypeAnnotations(_) => {
                AttributeKind::RuntimeInvisibleTypeAnnotations
            }
            AttributeInfo::AnnotationDefault(_) => AttributeKind::AnnotationDefault,
            AttributeInfo::BootstrapMethods(_) => AttributeKind::BootstrapMethods,
            AttributeInfo::MethodParameters(_) => AttributeKind::MethodParameters,
            AttributeInfo::Module(_) => AttributeKind::Module,
            AttributeInfo::ModulePackages(_) => AttributeKind::ModulePackages,
            AttributeInfo::ModuleMainClass { .. } => AttributeKind::ModuleMainClass,
            AttributeInfo::NestHost { .. } => AttributeKind::NestHost,
            AttributeInfo::NestMembers(_) => AttributeKind::NestMembers,
            AttributeInfo::Record(_) => AttributeKind::Record,
            AttributeInfo::PermittedSubclasses(_) => AttributeKind::PermittedSubclasses,
            AttributeInfo::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// The text of a `SourceDebugExtension`, decoded leniently.
    pub fn debug_extension(&self) -> Option<String> {
        match self {
            AttributeInfo::SourceDebugExtension(bytes) => Some(
                cesu8::from_java_cesu8(bytes)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
            ),
            _ => None,
        }
    }
}

/// The structures an attribute table can hang off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeHost {
    ClassFile,
    Field,
    Method,
    Code,
    RecordComponent,
}
impl fmt::Display for AttributeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeHost::ClassFile => "ClassFile",
            AttributeHost::Field => "field_info",
            AttributeHost::Method => "method_info",
            AttributeHost::Code => "Code",
            AttributeHost::RecordComponent => "record_component_info",
        };
        f.write_str(name)
    }
}

/// Every attribute name this parser decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    ConstantValue,
    Code,
    StackMapTable,
    Exceptions,
    InnerClasses,
    EnclosingMethod,
    Synthetic,
    Signature,
    SourceFile,
    SourceDebugExtension,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    Deprecated,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
    AnnotationDefault,
    BootstrapMethods,
    MethodParameters,
    Module,
    ModulePackages,
    ModuleMainClass,
    NestHost,
    NestMembers,
    Record,
    PermittedSubclasses,
}
impl AttributeKind {
    pub const ALL: [AttributeKind; 30] = [
        AttributeKind::ConstantValue,
        AttributeKind::Code,
        AttributeKind::StackMapTable,
        AttributeKind::Exceptions,
        AttributeKind::InnerClasses,
        AttributeKind::EnclosingMethod,
        AttributeKind::Synthetic,
        AttributeKind::Signature,
        AttributeKind::SourceFile,
        AttributeKind::SourceDebugExtension,
        AttributeKind::LineNumberTable,
        AttributeKind::LocalVariableTable,
        AttributeKind::LocalVariableTypeTable,
        AttributeKind::Deprecated,
        AttributeKind::RuntimeVisibleAnnotations,
        AttributeKind::RuntimeInvisibleAnnotations,
        AttributeKind::RuntimeVisibleParameterAnnotations,
        AttributeKind::RuntimeInvisibleParameterAnnotations,
        AttributeKind::RuntimeVisibleTypeAnnotations,
        AttributeKind::RuntimeInvisibleTypeAnnotations,
        AttributeKind::AnnotationDefault,
        AttributeKind::BootstrapMethods,
        AttributeKind::MethodParameters,
        AttributeKind::Module,
        AttributeKind::ModulePackages,
        AttributeKind::ModuleMainClass,
        AttributeKind::NestHost,
        AttributeKind::NestMembers,
        AttributeKind::Record,
        AttributeKind::PermittedSubclasses,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::ConstantValue => "ConstantValue",
            AttributeKind::Code => "Code",
            AttributeKind::StackMapTable => "StackMapTable",
            AttributeKind::Exceptions => "Exceptions",
            AttributeKind::InnerClasses => "InnerClasses",
            AttributeKind::EnclosingMethod => "EnclosingMethod",
            AttributeKind::Synthetic => "Synthetic",
            AttributeKind::Signature => "Signature",
            AttributeKind::SourceFile => "SourceFile",
            AttributeKind::SourceDebugExtension => "SourceDebugExtension",
            AttributeKind::LineNumberTable => "LineNumberTable",
            AttributeKind::LocalVariableTable => "LocalVariableTable",
            AttributeKind::LocalVariableTypeTable => "LocalVariableTypeTable",
            AttributeKind::Deprecated => "Deprecated",
            AttributeKind::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            AttributeKind::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            AttributeKind::RuntimeVisibleParameterAnnotations => {
                "RuntimeVisibleParameterAnnotations"
            }
            AttributeKind::RuntimeInvisibleParameterAnnotations => {
                "RuntimeInvisibleParameterAnnotations"
            }
            AttributeKind::RuntimeVisibleTypeAnnotations => "RuntimeVisibleTypeAnnotations",
            AttributeKind::RuntimeInvisibleTypeAnnotations => "RuntimeInvisibleTypeAnnotations",
            AttributeKind::AnnotationDefault => "AnnotationDefault",
            AttributeKind::BootstrapMethods => "BootstrapMethods",
            AttributeKind::MethodParameters => "MethodParameters",
            AttributeKind::Module => "Module",
            AttributeKind::ModulePackages => "ModulePackages",
            AttributeKind::ModuleMainClass => "ModuleMainClass",
            AttributeKind::NestHost => "NestHost",
            AttributeKind::NestMembers => "NestMembers",
            AttributeKind::Record => "Record",
            AttributeKind::PermittedSubclasses => "PermittedSubclasses",
        }
    }

    /// Hosts the format allows this attribute on (JVMS table 4.7-C).
    pub fn hosts(self) -> &'static [AttributeHost] {
        use AttributeHost::*;

        match self {
            AttributeKind::ConstantValue => &[Field],
            AttributeKind::Code
            | AttributeKind::Exceptions
            | AttributeKind::RuntimeVisibleParameterAnnotations
            | AttributeKind::RuntimeInvisibleParameterAnnotations
            | AttributeKind::AnnotationDefault
            | AttributeKind::MethodParameters => &[Method],
            AttributeKind::StackMapTable
            | AttributeKind::LineNumberTable
            | AttributeKind::LocalVariableTable
            | AttributeKind::LocalVariableTypeTable => &[Code],
            AttributeKind::InnerClasses
            | AttributeKind::EnclosingMethod
            | AttributeKind::SourceFile
            | AttributeKind::SourceDebugExtension
            | AttributeKind::BootstrapMethods
            | AttributeKind::Module
            | AttributeKind::ModulePackages
            | AttributeKind::ModuleMainClass
            | AttributeKind::NestHost
            | AttributeKind::NestMembers
            | AttributeKind::Record
            | AttributeKind::PermittedSubclasses => &[ClassFile],
            AttributeKind::Synthetic | AttributeKind::Deprecated => &[ClassFile, Field, Method],
            AttributeKind::Signature
            | AttributeKind::RuntimeVisibleAnnotations
            | AttributeKind::RuntimeInvisibleAnnotations => {
                &[ClassFile, Field, Method, RecordComponent]
            }
            AttributeKind::RuntimeVisibleTypeAnnotations
            | AttributeKind::RuntimeInvisibleTypeAnnotations => {
                &[ClassFile, Field, Method, Code, RecordComponent]
            }
        }
    }

    pub fn is_allowed_on(self, host: AttributeHost) -> bool {
        self.hosts().contains(&host)
    }
}
impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero for a handler that catches everything (`finally`).
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    /// Source line of the instruction at `pc`, from the nested
    /// `LineNumberTable`s.
    pub fn line_number(&self, pc: u16) -> Option<u16> {
        self.attributes
            .iter()
            .filter_map(|a| match &a.info {
                AttributeInfo::LineNumberTable(table) => Some(table),
                _ => None,
            })
            .flatten()
            .filter(|entry| entry.start_pc <= pc)
            .max_by_key(|entry| entry.start_pc)
            .map(|entry| entry.line_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: InnerClassAccessFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableType {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub signature_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodParameter {
    /// Zero for a parameter without a name.
    pub name_index: u16,
    pub access_flags: MethodParameterFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
