// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

pub mod access_flags;
pub mod annotations;
pub mod attributes;
mod class_file;
pub mod constant_pool;
mod cursor;
mod error;
pub mod module;
mod options;
mod parser;
pub mod stack_map;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use constant_pool::{ConstantPool, ConstantTag, CpInfo};
pub use cursor::ByteCursor;
pub use error::{ClassFileError, LookupError, Section};
pub use options::{AttributePolicy, ParseOptions, MAX_NESTING_DEPTH};
pub use parser::{Parser, MAGIC};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
