use std::convert::TryFrom;

use log::trace;

use crate::{
    constant_pool::{
        ClassInfo, ConstantTag, CpInfo, DynamicInfo, MethodHandleInfo, MethodTypeInfo,
        ModuleInfo, NameAndTypeInfo, PackageInfo, RefInfo, ReferenceKind, StringInfo,
    },
    cursor::ByteCursor,
    error::{Section, WithSection},
    ClassFileError, ConstantPool, Result,
};

/// Decodes `constant_pool_count` followed by the pool itself. The loop runs
/// by slot, since a Long or Double takes two.
pub(super) fn parse_constant_pool(r: &mut ByteCursor<'_>) -> Result<ConstantPool> {
    let constant_pool_count = r.read_u16()?;
    let slots = (constant_pool_count as usize).saturating_sub(1);

    let mut cp_infos = Vec::with_capacity(slots);
    while cp_infos.len() < slots {
        let index = cp_infos.len() as u16 + 1;
        let offset = r.offset();
        let cp_info =
            parse_cp_info(r, index).in_section(Section::ConstantPoolEntry(index), offset)?;
        trace!("#{} = {:?}", index, cp_info);

        let slot_size = cp_info.tag().slot_size();
        if cp_infos.len() + slot_size > slots {
            return Err(ClassFileError::MalformedConstant {
                index,
                offset,
                reason: format!("{} needs two slots but is the last entry", cp_info.tag()),
            });
        }

        cp_infos.push(cp_info);
        if slot_size == 2 {
            cp_infos.push(CpInfo::Unusable);
        }
    }

    Ok(ConstantPool::new(cp_infos))
}

fn parse_cp_info(r: &mut ByteCursor<'_>, index: u16) -> Result<CpInfo> {
    let offset = r.offset();
    let tag = r.read_u8()?;
    let tag = ConstantTag::try_from(tag)
        .map_err(|tag| ClassFileError::UnknownConstantTag { tag, offset })?;

    let cp_info = match tag {
        ConstantTag::Utf8 => parse_utf8(r, index)?,
        ConstantTag::Integer => CpInfo::Integer(r.read_i32()?),
        ConstantTag::Float => CpInfo::Float(r.read_f32()?),
        ConstantTag::Long => CpInfo::Long(r.read_i64()?),
        ConstantTag::Double => CpInfo::Double(r.read_f64()?),
        ConstantTag::Class => CpInfo::Class(ClassInfo {
            name_index: r.read_u16()?,
        }),
        ConstantTag::String => CpInfo::String(StringInfo {
            string_index: r.read_u16()?,
        }),
        ConstantTag::FieldRef => CpInfo::FieldRef(parse_ref_info(r)?),
        ConstantTag::MethodRef => CpInfo::MethodRef(parse_ref_info(r)?),
        ConstantTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(parse_ref_info(r)?),
        ConstantTag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
            name_index: r.read_u16()?,
            descriptor_index: r.read_u16()?,
        }),
        ConstantTag::MethodHandle => parse_method_handle(r, index)?,
        ConstantTag::MethodType => CpInfo::MethodType(MethodTypeInfo {
            descriptor_index: r.read_u16()?,
        }),
        ConstantTag::Dynamic => CpInfo::Dynamic(parse_dynamic_info(r)?),
        ConstantTag::InvokeDynamic => CpInfo::InvokeDynamic(parse_dynamic_info(r)?),
        ConstantTag::Module => CpInfo::Module(ModuleInfo {
            name_index: r.read_u16()?,
        }),
        ConstantTag::Package => CpInfo::Package(PackageInfo {
            name_index: r.read_u16()?,
        }),
        ConstantTag::Unusable => {
            return Err(ClassFileError::UnknownConstantTag {
                tag: ConstantTag::Unusable as u8,
                offset,
            })
        }
    };

    Ok(cp_info)
}

fn parse_utf8(r: &mut ByteCursor<'_>, index: u16) -> Result<CpInfo> {
    let length = r.read_u16()?;
    let offset = r.offset();
    let bytes = r.read_bytes(length as usize)?;

    let string = cesu8::from_java_cesu8(bytes).map_err(|_| ClassFileError::MalformedConstant {
        index,
        offset,
        reason: "invalid modified UTF-8".into(),
    })?;

    Ok(CpInfo::Utf8(string.into_owned()))
}

fn parse_ref_info(r: &mut ByteCursor<'_>) -> Result<RefInfo> {
    let class_index = r.read_u16()?;
    let name_and_type_index = r.read_u16()?;

    Ok(RefInfo {
        class_index,
        name_and_type_index,
    })
}

fn parse_method_handle(r: &mut ByteCursor<'_>, index: u16) -> Result<CpInfo> {
    let offset = r.offset();
    let reference_kind = ReferenceKind::try_from(r.read_u8()?).map_err(|kind| {
        ClassFileError::MalformedConstant {
            index,
            offset,
            reason: format!("invalid method handle reference kind {}", kind),
        }
    })?;
    let reference_index = r.read_u16()?;

    Ok(CpInfo::MethodHandle(MethodHandleInfo {
        reference_kind,
        reference_index,
    }))
}

fn parse_dynamic_info(r: &mut ByteCursor<'_>) -> Result<DynamicInfo> {
    let bootstrap_method_attr_index = r.read_u16()?;
    let name_and_type_index = r.read_u16()?;

    Ok(DynamicInfo {
        bootstrap_method_attr_index,
        name_and_type_index,
    })
}
