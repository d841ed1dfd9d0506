// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.16

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Utf8 field descriptor of the annotation interface.
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    Const {
        kind: ConstKind,
        const_value_index: u16,
    },
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    Class {
        class_info_index: u16,
    },
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}
impl ElementValue {
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Const { kind, .. } => kind.tag(),
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class { .. } => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
        }
    }

    /// How many arrays and annotations deep this value goes.
    pub fn depth(&self) -> usize {
        match self {
            ElementValue::Annotation(annotation) => {
                1 + annotation
                    .element_value_pairs
                    .iter()
                    .map(|pair| pair.value.depth())
                    .max()
                    .unwrap_or(0)
            }
            ElementValue::Array(values) => {
                1 + values.iter().map(ElementValue::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Element value tags whose payload is a single constant pool index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstKind {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    String,
}
impl ConstKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'B' => Some(ConstKind::Byte),
            b'C' => Some(ConstKind::Char),
            b'D' => Some(ConstKind::Double),
            b'F' => Some(ConstKind::Float),
            b'I' => Some(ConstKind::Int),
            b'J' => Some(ConstKind::Long),
            b'S' => Some(ConstKind::Short),
            b'Z' => Some(ConstKind::Boolean),
            b's' => Some(ConstKind::String),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            ConstKind::Byte => b'B',
            ConstKind::Char => b'C',
            ConstKind::Double => b'D',
            ConstKind::Float => b'F',
            ConstKind::Int => b'I',
            ConstKind::Long => b'J',
            ConstKind::Short => b'S',
            ConstKind::Boolean => b'Z',
            ConstKind::String => b's',
        }
    }
}

// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.20

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub target_type: u8,
    pub target_info: TargetInfo,
    pub target_path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInfo {
    /// 0x00, 0x01
    TypeParameter { type_parameter_index: u8 },
    /// 0x10; `supertype_index` 65535 means the superclass.
    Supertype { supertype_index: u16 },
    /// 0x11, 0x12
    TypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    /// 0x13, 0x14, 0x15
    Empty,
    /// 0x16
    FormalParameter { formal_parameter_index: u8 },
    /// 0x17
    Throws { throws_type_index: u16 },
    /// 0x40, 0x41
    LocalVar(Vec<LocalVarTargetEntry>),
    /// 0x42
    Catch { exception_table_index: u16 },
    /// 0x43 to 0x46
    Offset { offset: u16 },
    /// 0x47 to 0x4B
    TypeArgument { offset: u16, type_argument_index: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVarTargetEntry {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePathEntry {
    pub type_path_kind: u8,
    pub type_argument_index: u8,
}
