use std::fmt;

use jdump_class_file::{
    attributes::{Attribute, AttributeInfo, Attributes},
    ClassFile, ConstantPool, CpInfo, LookupError,
};

/// Human-readable rendering of a decoded class file.
pub struct Dump<'a> {
    class_file: &'a ClassFile,
    dotted: bool,
}
impl<'a> Dump<'a> {
    pub fn new(class_file: &'a ClassFile, dotted: bool) -> Self {
        Self {
            class_file,
            dotted,
        }
    }

    fn class_name(&self, name: Result<&str, LookupError>) -> String {
        match name {
            Ok(name) if self.dotted => name.replace('/', "."),
            Ok(name) => name.to_owned(),
            Err(e) => format!("<{}>", e),
        }
    }

    fn fmt_constant_pool(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constant_pool = &self.class_file.constant_pool;

        writeln!(
            f,
            "Constant pool ({} entries, count {}):",
            constant_pool.entry_count(),
            constant_pool.count()
        )?;
        for (index, cp_info) in constant_pool {
            let entry = format!("#{}", index);
            write!(f, " {:>6} = {:<18} ", entry, cp_info.tag().to_string())?;
            writeln!(f, "{}", describe(constant_pool, cp_info))?;
        }

        Ok(())
    }

    fn fmt_attributes(
        &self,
        f: &mut fmt::Formatter<'_>,
        attributes: &Attributes,
        indent: usize,
    ) -> fmt::Result {
        for attribute in attributes {
            self.fmt_attribute(f, attribute, indent)?;
        }
        Ok(())
    }

    fn fmt_attribute(
        &self,
        f: &mut fmt::Formatter<'_>,
        attribute: &Attribute,
        indent: usize,
    ) -> fmt::Result {
        let constant_pool = &self.class_file.constant_pool;
        let pad = " ".repeat(indent);
        let name = attribute
            .name(constant_pool)
            .unwrap_or("<unnamed attribute>");

        match &attribute.info {
            AttributeInfo::Code(code) => {
                writeln!(
                    f,
                    "{}{}: stack={}, locals={}, code_length={}, exception_table_length={}",
                    pad,
                    name,
                    code.max_stack,
                    code.max_locals,
                    code.code.len(),
                    code.exception_table.len()
                )?;
                for entry in &code.exception_table {
                    let catch_type = match entry.catch_type {
                        0 => "any".to_owned(),
                        index => self.class_name(constant_pool.get_class_name(index)),
                    };
                    writeln!(
                        f,
                        "{}  {:>5} {:>5} {:>5}   {}",
                        pad, entry.start_pc, entry.end_pc, entry.handler_pc, catch_type
                    )?;
                }
                self.fmt_attributes(f, &code.attributes, indent + 2)
            }
            AttributeInfo::LineNumberTable(table) => {
                writeln!(f, "{}{}:", pad, name)?;
                for entry in table {
                    writeln!(
                        f,
                        "{}  line {}: {}",
                        pad, entry.line_number, entry.start_pc
                    )?;
                }
                Ok(())
            }
            AttributeInfo::SourceFile { sourcefile_index } => writeln!(
                f,
                "{}{}: {}",
                pad,
                name,
                lookup(constant_pool.get_utf8(*sourcefile_index))
            ),
            AttributeInfo::Signature { signature_index } => writeln!(
                f,
                "{}{}: {}",
                pad,
                name,
                lookup(constant_pool.get_utf8(*signature_index))
            ),
            AttributeInfo::ConstantValue {
                constantvalue_index,
            } => writeln!(
                f,
                "{}{}: {}",
                pad,
                name,
                match constant_pool.get_constant_value(*constantvalue_index) {
                    Ok(value) => value.to_string(),
                    Err(e) => format!("<{}>", e),
                }
            ),
            AttributeInfo::Exceptions(exceptions) => {
                let names = exceptions
                    .iter()
                    .map(|&index| self.class_name(constant_pool.get_class_name(index)))
                    .collect::<Vec<_>>();
                writeln!(f, "{}{}: {}", pad, name, names.join(", "))
            }
            AttributeInfo::StackMapTable(frames) => {
                writeln!(f, "{}{}: {} frames", pad, name, frames.len())
            }
            AttributeInfo::Unknown { info, .. } => {
                writeln!(f, "{}{}: ({} bytes, not decoded)", pad, name, info.len())
            }
            _ => writeln!(f, "{}{} ({} bytes)", pad, name, attribute.attribute_length),
        }
    }
}
impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_file = self.class_file;

        writeln!(f, " Magic:          {}", class_file.magic_hex())?;
        writeln!(f, " Version:        {}", class_file.version_string())?;
        writeln!(f, " Access Flags:   {:?}", class_file.access_flags)?;
        writeln!(
            f,
            " This Class:     {}",
            self.class_name(class_file.class_name())
        )?;
        let super_class = match class_file.super_class() {
            Ok(Some(name)) => self.class_name(Ok(name)),
            Ok(None) => "(none)".to_owned(),
            Err(e) => format!("<{}>", e),
        };
        writeln!(f, " Super Class:    {}", super_class)?;
        writeln!(f)?;

        self.fmt_constant_pool(f)?;
        writeln!(f)?;

        writeln!(f, "Interfaces ({}):", class_file.interfaces.len())?;
        for &index in &class_file.interfaces {
            writeln!(
                f,
                "  {}",
                self.class_name(class_file.constant_pool.get_class_name(index))
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Fields ({}):", class_file.fields.len())?;
        for field in &class_file.fields {
            writeln!(
                f,
                "  {} {} [{:?}]",
                lookup(class_file.field_name(field)),
                lookup(class_file.field_descriptor(field)),
                field.access_flags
            )?;
            self.fmt_attributes(f, &field.attributes, 4)?;
        }
        writeln!(f)?;

        writeln!(f, "Methods ({}):", class_file.methods.len())?;
        for method in &class_file.methods {
            writeln!(
                f,
                "  {}{} [{:?}]",
                lookup(class_file.method_name(method)),
                lookup(class_file.method_descriptor(method)),
                method.access_flags
            )?;
            self.fmt_attributes(f, &method.attributes, 4)?;
        }
        writeln!(f)?;

        writeln!(f, "Attributes ({}):", class_file.attributes.len())?;
        self.fmt_attributes(f, &class_file.attributes, 2)
    }
}

fn lookup(value: Result<&str, LookupError>) -> String {
    match value {
        Ok(s) => s.to_owned(),
        Err(e) => format!("<{}>", e),
    }
}

/// The right-hand side of a constant pool listing line.
fn describe(constant_pool: &ConstantPool, cp_info: &CpInfo) -> String {
    match cp_info {
        CpInfo::Utf8(s) => format!("{:?}", s),
        CpInfo::Integer(i) => i.to_string(),
        CpInfo::Float(v) => format!("{}f", v),
        CpInfo::Long(l) => format!("{}l", l),
        CpInfo::Double(d) => format!("{}d", d),
        CpInfo::Class(class) => format!(
            "#{:<12} // {}",
            class.name_index,
            lookup(constant_pool.get_utf8(class.name_index))
        ),
        CpInfo::String(string) => format!(
            "#{:<12} // {}",
            string.string_index,
            lookup(constant_pool.get_utf8(string.string_index))
        ),
        CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
            let resolved = match (
                constant_pool.get_class_name(r.class_index),
                constant_pool.get_name_and_type(r.name_and_type_index),
            ) {
                (Ok(class), Ok((name, descriptor))) => {
                    format!("{}.{}:{}", class, name, descriptor)
                }
                (Err(e), _) | (_, Err(e)) => format!("<{}>", e),
            };
            format!(
                "{:<13} // {}",
                format!("#{}.#{}", r.class_index, r.name_and_type_index),
                resolved
            )
        }
        CpInfo::NameAndType(nat) => format!(
            "{:<13} // {}:{}",
            format!("#{}:#{}", nat.name_index, nat.descriptor_index),
            lookup(constant_pool.get_utf8(nat.name_index)),
            lookup(constant_pool.get_utf8(nat.descriptor_index))
        ),
        CpInfo::MethodHandle(handle) => format!(
            "{}:#{}",
            handle.reference_kind, handle.reference_index
        ),
        CpInfo::MethodType(method_type) => format!(
            "#{:<12} // {}",
            method_type.descriptor_index,
            lookup(constant_pool.get_utf8(method_type.descriptor_index))
        ),
        CpInfo::Dynamic(dynamic) | CpInfo::InvokeDynamic(dynamic) => {
            let resolved = match constant_pool.get_name_and_type(dynamic.name_and_type_index) {
                Ok((name, descriptor)) => format!("{}:{}", name, descriptor),
                Err(e) => format!("<{}>", e),
            };
            format!(
                "{:<13} // {}",
                format!(
                    "#{}:#{}",
                    dynamic.bootstrap_method_attr_index, dynamic.name_and_type_index
                ),
                resolved
            )
        }
        CpInfo::Module(module) => format!(
            "#{:<12} // {}",
            module.name_index,
            lookup(constant_pool.get_utf8(module.name_index))
        ),
        CpInfo::Package(package) => format!(
            "#{:<12} // {}",
            package.name_index,
            lookup(constant_pool.get_utf8(package.name_index))
        ),
        CpInfo::Unusable => String::new(),
    }
}
