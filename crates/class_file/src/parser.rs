mod annotations;
mod attributes;
mod constant_pool;

use log::{debug, warn};

use crate::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    attributes::AttributeHost,
    class_file::{FieldInfo, MethodInfo},
    cursor::ByteCursor,
    error::{Section, WithSection},
    ClassFile, ClassFileError, ParseOptions, Result,
};

pub(crate) use self::attributes::AttributeParser;
use self::constant_pool::parse_constant_pool;

pub const MAGIC: u32 = 0xCAFEBABE;

/// Decodes one class file in a single forward pass: magic, version, constant
/// pool, access flags, this/super class, interfaces, fields, methods and
/// attributes, in that order.
pub struct Parser<'a> {
    r: ByteCursor<'a>,
    options: ParseOptions,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: ByteCursor::new(buf),
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.section(Section::Magic, parse_magic_identifier)?;
        let (major_version, minor_version) = self.section(Section::Version, parse_version)?;
        debug!("Class file version {}.{}", major_version, minor_version);

        let constant_pool = self.section(Section::ConstantPool, parse_constant_pool)?;
        debug!(
            "Constant pool: {} entries in {} slots",
            constant_pool.entry_count(),
            constant_pool.len()
        );

        let options = self.options.clone();
        let attribute_parser = AttributeParser::new(&constant_pool, &options);

        let access_flags = self.section(Section::AccessFlags, |r| {
            Ok(ClassAccessFlags::from_bits_truncate(r.read_u16()?))
        })?;

        let (this_class, super_class) = self.section(Section::ThisSuperClass, |r| {
            let this_class = r.read_u16()?;
            let super_class = r.read_u16()?;
            if options.is_strict() {
                constant_pool.get_class_name(this_class)?;
                if super_class != 0 {
                    constant_pool.get_class_name(super_class)?;
                }
            }
            Ok((this_class, super_class))
        })?;

        let interfaces = self.section(Section::Interfaces, |r| r.read_u16_table())?;

        let fields_count = self.section(Section::Fields, |r| r.read_u16())?;
        let fields = (0..fields_count)
            .map(|i| {
                self.section(Section::Field(i), |r| {
                    parse_field_info(r, &attribute_parser)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.section(Section::Methods, |r| r.read_u16())?;
        let methods = (0..methods_count)
            .map(|i| {
                self.section(Section::Method(i), |r| {
                    parse_method_info(r, &attribute_parser)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.section(Section::Attributes, |r| {
            attribute_parser.parse_attributes(r, AttributeHost::ClassFile)
        })?;

        debug!(
            "Decoded {} interfaces, {} fields, {} methods, {} attributes",
            interfaces.len(),
            fields.len(),
            methods.len(),
            attributes.len()
        );

        if self.r.remaining() > 0 {
            if options.is_strict() {
                return Err(ClassFileError::LengthMismatch {
                    name: "ClassFile".into(),
                    declared: self.r.len(),
                    consumed: self.r.position(),
                });
            }
            warn!(
                "Ignoring {} trailing bytes after the class file",
                self.r.remaining()
            );
        }

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Runs one decoding step, tagging any failure with the section and the
    /// offset the step started at.
    fn section<T>(
        &mut self,
        section: Section,
        f: impl FnOnce(&mut ByteCursor<'a>) -> Result<T>,
    ) -> Result<T> {
        let offset = self.r.offset();
        f(&mut self.r).in_section(section, offset)
    }
}

fn parse_magic_identifier(r: &mut ByteCursor<'_>) -> Result<u32> {
    match r.read_u32()? {
        MAGIC => Ok(MAGIC),
        magic_identifier => Err(ClassFileError::BadMagic(magic_identifier)),
    }
}

fn parse_version(r: &mut ByteCursor<'_>) -> Result<(u16, u16)> {
    let minor = r.read_u16()?;
    let major = r.read_u16()?;
    Ok((major, minor))
}

fn parse_field_info(
    r: &mut ByteCursor<'_>,
    attribute_parser: &AttributeParser<'_>,
) -> Result<FieldInfo> {
    let access_flags = FieldAccessFlags::from_bits_truncate(r.read_u16()?);
    let name_index = r.read_u16()?;
    let descriptor_index = r.read_u16()?;
    let attributes = attribute_parser.parse_attributes(r, AttributeHost::Field)?;

    Ok(FieldInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

fn parse_method_info(
    r: &mut ByteCursor<'_>,
    attribute_parser: &AttributeParser<'_>,
) -> Result<MethodInfo> {
    let access_flags = MethodAccessFlags::from_bits_truncate(r.read_u16()?);
    let name_index = r.read_u16()?;
    let descriptor_index = r.read_u16()?;
    let attributes = attribute_parser.parse_attributes(r, AttributeHost::Method)?;

    Ok(MethodInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}
