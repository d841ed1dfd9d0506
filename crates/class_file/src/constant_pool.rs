use std::{convert::TryFrom, fmt};

use crate::LookupError;

type Result<T, E = LookupError> = std::result::Result<T, E>;

macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index)? {
            CpInfo::$i(n) => Ok(n),
            c => Err(LookupError::UnexpectedTag {
                index: $index,
                expected: ConstantTag::$i,
                found: c.tag(),
            }),
        }
    };
}

/// The constant pool, indexed from 1. A Long or Double takes two slots; the
/// second one holds [`CpInfo::Unusable`] and cannot be looked up.
#[derive(Debug, Default, Clone)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Number of index slots, i.e. `constant_pool_count - 1`.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    /// The `constant_pool_count` as it appears in the class file.
    pub fn count(&self) -> usize {
        self.len() + 1
    }

    /// Number of logical entries; a Long or Double counts once.
    pub fn entry_count(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> Entries<'_> {
        Entries {
            inner: self.cp_infos.iter(),
            index: 0,
        }
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        if index == 0 || index as usize > self.cp_infos.len() {
            return Err(LookupError::IndexOutOfRange {
                index,
                size: self.cp_infos.len(),
            });
        }

        match &self.cp_infos[index as usize - 1] {
            CpInfo::Unusable => Err(LookupError::PhantomSlot(index)),
            cp_info => Ok(cp_info),
        }
    }

    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn get_integer(&self, index: u16) -> Result<i32> {
        matches_cp_info!(self, index, Integer).copied()
    }

    pub fn get_float(&self, index: u16) -> Result<f32> {
        matches_cp_info!(self, index, Float).copied()
    }

    pub fn get_long(&self, index: u16) -> Result<i64> {
        matches_cp_info!(self, index, Long).copied()
    }

    pub fn get_double(&self, index: u16) -> Result<f64> {
        matches_cp_info!(self, index, Double).copied()
    }

    pub fn get_class(&self, index: u16) -> Result<&ClassInfo> {
        matches_cp_info!(self, index, Class)
    }

    /// Resolves a Class entry to its name, in internal (slash separated) form.
    pub fn get_class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = self.get_class(index)?;
        self.get_utf8(*name_index)
    }

    /// Resolves a String entry to its text.
    pub fn get_string(&self, index: u16) -> Result<&str> {
        let StringInfo { string_index } = matches_cp_info!(self, index, String)?;
        self.get_utf8(*string_index)
    }

    /// Resolves a NameAndType entry to `(name, descriptor)`.
    pub fn get_name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        let NameAndTypeInfo {
            name_index,
            descriptor_index,
        } = matches_cp_info!(self, index, NameAndType)?;
        Ok((self.get_utf8(*name_index)?, self.get_utf8(*descriptor_index)?))
    }

    pub fn get_field_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, FieldRef)
    }

    pub fn get_method_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, MethodRef)
    }

    pub fn get_interface_method_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, InterfaceMethodRef)
    }

    /// Resolves any of Fieldref, Methodref or InterfaceMethodref to its owner,
    /// name and descriptor.
    pub fn get_member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let (kind, ref_info) = match self.get(index)? {
            CpInfo::FieldRef(r) => (ConstantTag::FieldRef, r),
            CpInfo::MethodRef(r) => (ConstantTag::MethodRef, r),
            CpInfo::InterfaceMethodRef(r) => (ConstantTag::InterfaceMethodRef, r),
            c => {
                return Err(LookupError::NotAMemberRef {
                    index,
                    found: c.tag(),
                })
            }
        };
        let class_name = self.get_class_name(ref_info.class_index)?;
        let (name, descriptor) = self.get_name_and_type(ref_info.name_and_type_index)?;

        Ok(MemberRef {
            kind,
            class_name,
            name,
            descriptor,
        })
    }

    pub fn get_method_handle(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }

    /// Resolves a MethodType entry to its method descriptor.
    pub fn get_method_type(&self, index: u16) -> Result<&str> {
        let MethodTypeInfo { descriptor_index } = matches_cp_info!(self, index, MethodType)?;
        self.get_utf8(*descriptor_index)
    }

    pub fn get_dynamic(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, Dynamic)
    }

    pub fn get_invoke_dynamic(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, InvokeDynamic)
    }

    pub fn get_module_name(&self, index: u16) -> Result<&str> {
        let ModuleInfo { name_index } = matches_cp_info!(self, index, Module)?;
        self.get_utf8(*name_index)
    }

    pub fn get_package_name(&self, index: u16) -> Result<&str> {
        let PackageInfo { name_index } = matches_cp_info!(self, index, Package)?;
        self.get_utf8(*name_index)
    }

    /// Resolves the target of a `ConstantValue` attribute or a constant
    /// annotation element.
    pub fn get_constant_value(&self, index: u16) -> Result<ConstantValue<'_>> {
        match self.get(index)? {
            CpInfo::Integer(i) => Ok(ConstantValue::Integer(*i)),
            CpInfo::Float(f) => Ok(ConstantValue::Float(*f)),
            CpInfo::Long(l) => Ok(ConstantValue::Long(*l)),
            CpInfo::Double(d) => Ok(ConstantValue::Double(*d)),
            CpInfo::String(StringInfo { string_index }) => {
                Ok(ConstantValue::String(self.get_utf8(*string_index)?))
            }
            CpInfo::Utf8(s) => Ok(ConstantValue::String(s)),
            c => Err(LookupError::UnexpectedTag {
                index,
                expected: ConstantTag::Integer,
                found: c.tag(),
            }),
        }
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (u16, &'a CpInfo);
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates `(index, entry)` pairs, skipping the unusable slots.
pub struct Entries<'a> {
    inner: std::slice::Iter<'a, CpInfo>,
    index: u16,
}
impl<'a> Iterator for Entries<'a> {
    type Item = (u16, &'a CpInfo);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cp_info = self.inner.next()?;
            self.index += 1;
            if !matches!(cp_info, CpInfo::Unusable) {
                return Some((self.index, cp_info));
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
    Unusable,
}
impl CpInfo {
    pub fn tag(&self) -> ConstantTag {
        match self {
            CpInfo::Utf8(_) => ConstantTag::Utf8,
            CpInfo::Integer(_) => ConstantTag::Integer,
            CpInfo::Float(_) => ConstantTag::Float,
            CpInfo::Long(_) => ConstantTag::Long,
            CpInfo::Double(_) => ConstantTag::Double,
            CpInfo::Class(_) => ConstantTag::Class,
            CpInfo::String(_) => ConstantTag::String,
            CpInfo::FieldRef(_) => ConstantTag::FieldRef,
            CpInfo::MethodRef(_) => ConstantTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => ConstantTag::NameAndType,
            CpInfo::MethodHandle(_) => ConstantTag::MethodHandle,
            CpInfo::MethodType(_) => ConstantTag::MethodType,
            CpInfo::Dynamic(_) => ConstantTag::Dynamic,
            CpInfo::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
            CpInfo::Module(_) => ConstantTag::Module,
            CpInfo::Package(_) => ConstantTag::Package,
            CpInfo::Unusable => ConstantTag::Unusable,
        }
    }
}

/// Constant pool tag bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantTag {
    /// Not a real tag: the second slot of a Long or Double.
    Unusable = 0,
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}
impl ConstantTag {
    /// Number of index slots an entry with this tag occupies.
    pub fn slot_size(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}
impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ConstantTag::Utf8),
            3 => Ok(ConstantTag::Integer),
            4 => Ok(ConstantTag::Float),
            5 => Ok(ConstantTag::Long),
            6 => Ok(ConstantTag::Double),
            7 => Ok(ConstantTag::Class),
            8 => Ok(ConstantTag::String),
            9 => Ok(ConstantTag::FieldRef),
            10 => Ok(ConstantTag::MethodRef),
            11 => Ok(ConstantTag::InterfaceMethodRef),
            12 => Ok(ConstantTag::NameAndType),
            15 => Ok(ConstantTag::MethodHandle),
            16 => Ok(ConstantTag::MethodType),
            17 => Ok(ConstantTag::Dynamic),
            18 => Ok(ConstantTag::InvokeDynamic),
            19 => Ok(ConstantTag::Module),
            20 => Ok(ConstantTag::Package),
            _ => Err(value),
        }
    }
}
impl fmt::Display for ConstantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstantTag::Unusable => "(unusable)",
            ConstantTag::Utf8 => "Utf8",
            ConstantTag::Integer => "Integer",
            ConstantTag::Float => "Float",
            ConstantTag::Long => "Long",
            ConstantTag::Double => "Double",
            ConstantTag::Class => "Class",
            ConstantTag::String => "String",
            ConstantTag::FieldRef => "Fieldref",
            ConstantTag::MethodRef => "Methodref",
            ConstantTag::InterfaceMethodRef => "InterfaceMethodref",
            ConstantTag::NameAndType => "NameAndType",
            ConstantTag::MethodHandle => "MethodHandle",
            ConstantTag::MethodType => "MethodType",
            ConstantTag::Dynamic => "Dynamic",
            ConstantTag::InvokeDynamic => "InvokeDynamic",
            ConstantTag::Module => "Module",
            ConstantTag::Package => "Package",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: ReferenceKind,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

/// Shared by `CONSTANT_Dynamic` and `CONSTANT_InvokeDynamic`.
#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModuleInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PackageInfo {
    pub name_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}
impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ReferenceKind::GetField),
            2 => Ok(ReferenceKind::GetStatic),
            3 => Ok(ReferenceKind::PutField),
            4 => Ok(ReferenceKind::PutStatic),
            5 => Ok(ReferenceKind::InvokeVirtual),
            6 => Ok(ReferenceKind::InvokeStatic),
            7 => Ok(ReferenceKind::InvokeSpecial),
            8 => Ok(ReferenceKind::NewInvokeSpecial),
            9 => Ok(ReferenceKind::InvokeInterface),
            _ => Err(value),
        }
    }
}
impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::GetField => "REF_getField",
            ReferenceKind::GetStatic => "REF_getStatic",
            ReferenceKind::PutField => "REF_putField",
            ReferenceKind::PutStatic => "REF_putStatic",
            ReferenceKind::InvokeVirtual => "REF_invokeVirtual",
            ReferenceKind::InvokeStatic => "REF_invokeStatic",
            ReferenceKind::InvokeSpecial => "REF_invokeSpecial",
            ReferenceKind::NewInvokeSpecial => "REF_newInvokeSpecial",
            ReferenceKind::InvokeInterface => "REF_invokeInterface",
        };
        f.write_str(name)
    }
}

/// A resolved Fieldref, Methodref or InterfaceMethodref.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MemberRef<'a> {
    pub kind: ConstantTag,
    pub class_name: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConstantValue<'a> {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(&'a str),
}
impl fmt::Display for ConstantValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Integer(i) => write!(f, "{}", i),
            ConstantValue::Float(v) => write!(f, "{}f", v),
            ConstantValue::Long(l) => write!(f, "{}l", l),
            ConstantValue::Double(d) => write!(f, "{}d", d),
            ConstantValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[cfg(test)]
mod constant_pool_tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8("java/lang/Object".into()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Long(1 << 40),
            CpInfo::Unusable,
            CpInfo::String(StringInfo { string_index: 1 }),
            CpInfo::Utf8("hashCode".into()),
            CpInfo::Utf8("()I".into()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 6,
                descriptor_index: 7,
            }),
            CpInfo::MethodRef(RefInfo {
                class_index: 2,
                name_and_type_index: 8,
            }),
        ])
    }

    #[test]
    fn it_should_reject_index_zero_and_past_the_end() {
        let pool = pool();

        assert_eq!(
            pool.get(0),
            Err(LookupError::IndexOutOfRange { index: 0, size: 9 })
        );
        assert_eq!(
            pool.get(10),
            Err(LookupError::IndexOutOfRange { index: 10, size: 9 })
        );
        assert!(pool.get(9).is_ok());
    }

    #[test]
    fn it_should_reject_the_phantom_slot() {
        let pool = pool();

        assert_eq!(pool.get_long(3), Ok(1 << 40));
        assert_eq!(pool.get(4), Err(LookupError::PhantomSlot(4)));
        assert_eq!(pool.len(), 9);
        assert_eq!(pool.entry_count(), 8);
    }

    #[test]
    fn it_should_check_the_tag() {
        let pool = pool();

        assert_eq!(
            pool.get_utf8(2),
            Err(LookupError::UnexpectedTag {
                index: 2,
                expected: ConstantTag::Utf8,
                found: ConstantTag::Class,
            })
        );
    }

    #[test]
    fn it_should_resolve_class_names_verbatim() {
        assert_eq!(pool().get_class_name(2), Ok("java/lang/Object"));
    }

    #[test]
    fn it_should_resolve_member_refs() {
        assert_eq!(
            pool().get_member_ref(9),
            Ok(MemberRef {
                kind: ConstantTag::MethodRef,
                class_name: "java/lang/Object",
                name: "hashCode",
                descriptor: "()I",
            })
        );
    }

    #[test]
    fn it_should_reject_a_member_ref_of_another_kind() {
        let e = pool().get_member_ref(2).unwrap_err();

        assert_eq!(
            e,
            LookupError::NotAMemberRef {
                index: 2,
                found: ConstantTag::Class
            }
        );
        assert!(e.to_string().contains("Fieldref, Methodref or InterfaceMethodref"));
    }

    #[test]
    fn it_should_resolve_constant_values() {
        let pool = pool();

        assert_eq!(
            pool.get_constant_value(5),
            Ok(ConstantValue::String("java/lang/Object"))
        );
        assert_eq!(pool.get_constant_value(3), Ok(ConstantValue::Long(1 << 40)));
        assert!(pool.get_constant_value(2).is_err());
    }

    #[test]
    fn it_should_iterate_with_indices_skipping_phantom_slots() {
        let pool = pool();
        let indices = pool.iter().map(|(i, _)| i).collect::<Vec<_>>();

        assert_eq!(indices, vec![1, 2, 3, 5, 6, 7, 8, 9]);
    }
}
