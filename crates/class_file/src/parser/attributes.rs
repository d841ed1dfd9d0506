use log::{trace, warn};

use crate::{
    access_flags::{
        ExportsFlags, InnerClassAccessFlags, MethodParameterFlags, ModuleFlags, RequiresFlags,
    },
    attributes::{
        Attribute, AttributeHost, AttributeInfo, AttributeKind, Attributes, BootstrapMethod,
        CodeAttribute, ExceptionTableEntry, InnerClass, LineNumber, LocalVariable,
        LocalVariableType, MethodParameter, RecordComponent,
    },
    cursor::ByteCursor,
    error::{Section, WithSection},
    module::{Exports, ModuleAttribute, Opens, Provides, Requires},
    stack_map::{StackMapFrame, VerificationType},
    ClassFileError, ConstantPool, ParseOptions, Result,
};

use super::annotations::AnnotationParser;

/// Decodes attribute tables against an already decoded constant pool.
pub(crate) struct AttributeParser<'p> {
    constant_pool: &'p ConstantPool,
    options: &'p ParseOptions,
    annotations: AnnotationParser,
}
impl<'p> AttributeParser<'p> {
    pub fn new(constant_pool: &'p ConstantPool, options: &'p ParseOptions) -> Self {
        Self {
            constant_pool,
            options,
            annotations: AnnotationParser::new(options.nesting_limit()),
        }
    }

    /// An `attributes_count` followed by that many attributes, all hung off
    /// `host`.
    pub fn parse_attributes(
        &self,
        r: &mut ByteCursor<'_>,
        host: AttributeHost,
    ) -> Result<Attributes> {
        self.parse_attributes_at(r, host, 0)
    }

    fn parse_attributes_at(
        &self,
        r: &mut ByteCursor<'_>,
        host: AttributeHost,
        depth: usize,
    ) -> Result<Attributes> {
        let limit = self.options.nesting_limit();
        if depth > limit {
            return Err(ClassFileError::NestingTooDeep(limit));
        }

        let attributes_count = r.read_u16()?;
        let attributes = (0..attributes_count)
            .map(|index| {
                let offset = r.offset();
                let mut name = None;
                self.parse_attribute(r, host, depth, &mut name)
                    .in_section(Section::Attribute { index, name }, offset)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Attributes(attributes))
    }

    fn parse_attribute(
        &self,
        r: &mut ByteCursor<'_>,
        host: AttributeHost,
        depth: usize,
        resolved_name: &mut Option<String>,
    ) -> Result<Attribute> {
        let attribute_name_index = r.read_u16()?;
        let attribute_length = r.read_u32()?;
        let name = self.constant_pool.get_utf8(attribute_name_index)?;
        *resolved_name = Some(name.to_owned());
        trace!("{} attribute {} ({} bytes)", host, name, attribute_length);

        let mut info_r = r.sub_cursor(attribute_length as usize)?;
        let info = match self.attribute_kind(name, host)? {
            Some(kind) => self.parse_attribute_info(&mut info_r, kind, depth)?,
            None => AttributeInfo::Unknown {
                name: name.to_owned(),
                info: info_r.read_bytes(info_r.remaining())?.to_vec(),
            },
        };

        if info_r.remaining() > 0 {
            return Err(ClassFileError::LengthMismatch {
                name: name.to_owned(),
                declared: info_r.len(),
                consumed: info_r.position(),
            });
        }

        Ok(Attribute {
            attribute_name_index,
            attribute_length,
            info,
        })
    }

    /// Which decoder handles `name` on `host`, or `None` to keep the payload
    /// raw.
    fn attribute_kind(&self, name: &str, host: AttributeHost) -> Result<Option<AttributeKind>> {
        let kind = match AttributeKind::from_name(name) {
            Some(kind) => kind,
            None => {
                trace!("Keeping unknown attribute {} as raw bytes", name);
                return Ok(None);
            }
        };

        if host == AttributeHost::Code && !self.options.decode_code_attributes {
            return Ok(None);
        }

        if !kind.is_allowed_on(host) {
            if self.options.is_strict() {
                return Err(ClassFileError::IllegalAttributeForHost {
                    name: name.to_owned(),
                    host,
                });
            }
            warn!("Attribute {} is not allowed on {}, decoding it anyway", name, host);
        }

        Ok(Some(kind))
    }

    fn parse_attribute_info(
        &self,
        r: &mut ByteCursor<'_>,
        kind: AttributeKind,
        depth: usize,
    ) -> Result<AttributeInfo> {
        let info = match kind {
            AttributeKind::ConstantValue => AttributeInfo::ConstantValue {
                constantvalue_index: r.read_u16()?,
            },
            AttributeKind::Code => AttributeInfo::Code(self.parse_code(r, depth)?),
            AttributeKind::StackMapTable => {
                AttributeInfo::StackMapTable(parse_stack_map_table(r)?)
            }
            AttributeKind::Exceptions => AttributeInfo::Exceptions(r.read_u16_table()?),
            AttributeKind::InnerClasses => AttributeInfo::InnerClasses(parse_inner_classes(r)?),
            AttributeKind::EnclosingMethod => AttributeInfo::EnclosingMethod {
                class_index: r.read_u16()?,
                method_index: r.read_u16()?,
            },
            AttributeKind::Synthetic => AttributeInfo::Synthetic,
            AttributeKind::Signature => AttributeInfo::Signature {
                signature_index: r.read_u16()?,
            },
            AttributeKind::SourceFile => AttributeInfo::SourceFile {
                sourcefile_index: r.read_u16()?,
            },
            AttributeKind::SourceDebugExtension => {
                AttributeInfo::SourceDebugExtension(r.read_bytes(r.remaining())?.to_vec())
            }
            AttributeKind::LineNumberTable => {
                AttributeInfo::LineNumberTable(parse_line_number_table(r)?)
            }
            AttributeKind::LocalVariableTable => {
                AttributeInfo::LocalVariableTable(parse_local_variable_table(r)?)
            }
            AttributeKind::LocalVariableTypeTable => {
                AttributeInfo::LocalVariableTypeTable(parse_local_variable_type_table(r)?)
            }
            AttributeKind::Deprecated => AttributeInfo::Deprecated,
            AttributeKind::RuntimeVisibleAnnotations => {
                AttributeInfo::RuntimeVisibleAnnotations(self.annotations.parse_annotations(r)?)
            }
            AttributeKind::RuntimeInvisibleAnnotations => {
                AttributeInfo::RuntimeInvisibleAnnotations(self.annotations.parse_annotations(r)?)
            }
            AttributeKind::RuntimeVisibleParameterAnnotations => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(
                    self.annotations.parse_parameter_annotations(r)?,
                )
            }
            AttributeKind::RuntimeInvisibleParameterAnnotations => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(
                    self.annotations.parse_parameter_annotations(r)?,
                )
            }
            AttributeKind::RuntimeVisibleTypeAnnotations => {
                AttributeInfo::RuntimeVisibleTypeAnnotations(
                    self.annotations.parse_type_annotations(r)?,
                )
            }
            AttributeKind::RuntimeInvisibleTypeAnnotations => {
                AttributeInfo::RuntimeInvisibleTypeAnnotations(
                    self.annotations.parse_type_annotations(r)?,
                )
            }
            AttributeKind::AnnotationDefault => {
                AttributeInfo::AnnotationDefault(self.annotations.parse_default_value(r)?)
            }
            AttributeKind::BootstrapMethods => {
                AttributeInfo::BootstrapMethods(parse_bootstrap_methods(r)?)
            }
            AttributeKind::MethodParameters => {
                AttributeInfo::MethodParameters(parse_method_parameters(r)?)
            }
            AttributeKind::Module => AttributeInfo::Module(parse_module(r)?),
            AttributeKind::ModulePackages => AttributeInfo::ModulePackages(r.read_u16_table()?),
            AttributeKind::ModuleMainClass => AttributeInfo::ModuleMainClass {
                main_class_index: r.read_u16()?,
            },
            AttributeKind::NestHost => AttributeInfo::NestHost {
                host_class_index: r.read_u16()?,
            },
            AttributeKind::NestMembers => AttributeInfo::NestMembers(r.read_u16_table()?),
            AttributeKind::Record => AttributeInfo::Record(self.parse_record(r, depth)?),
            AttributeKind::PermittedSubclasses => {
                AttributeInfo::PermittedSubclasses(r.read_u16_table()?)
            }
        };

        Ok(info)
    }

    fn parse_code(&self, r: &mut ByteCursor<'_>, depth: usize) -> Result<CodeAttribute> {
        let max_stack = r.read_u16()?;
        let max_locals = r.read_u16()?;
        let code_length = r.read_u32()?;
        let code = r.read_bytes(code_length as usize)?.to_vec();

        let exception_table_length = r.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| {
                Ok(ExceptionTableEntry {
                    start_pc: r.read_u16()?,
                    end_pc: r.read_u16()?,
                    handler_pc: r.read_u16()?,
                    catch_type: r.read_u16()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes_at(r, AttributeHost::Code, depth + 1)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_record(&self, r: &mut ByteCursor<'_>, depth: usize) -> Result<Vec<RecordComponent>> {
        let components_count = r.read_u16()?;
        (0..components_count)
            .map(|index| {
                let offset = r.offset();
                self.parse_record_component(r, depth)
                    .in_section(Section::RecordComponent(index), offset)
            })
            .collect()
    }

    fn parse_record_component(
        &self,
        r: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<RecordComponent> {
        let name_index = r.read_u16()?;
        let descriptor_index = r.read_u16()?;
        let attributes = self.parse_attributes_at(r, AttributeHost::RecordComponent, depth + 1)?;

        Ok(RecordComponent {
            name_index,
            descriptor_index,
            attributes,
        })
    }
}

fn parse_stack_map_table(r: &mut ByteCursor<'_>) -> Result<Vec<StackMapFrame>> {
    let number_of_entries = r.read_u16()?;
    (0..number_of_entries)
        .map(|_| parse_stack_map_frame(r))
        .collect()
}

fn parse_stack_map_frame(r: &mut ByteCursor<'_>) -> Result<StackMapFrame> {
    let offset = r.offset();
    let frame_type = r.read_u8()?;

    let frame = match frame_type {
        0..=63 => StackMapFrame::Same {
            offset_delta: frame_type as u16,
        },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            offset_delta: frame_type as u16 - 64,
            stack: parse_verification_type(r)?,
        },
        247 => StackMapFrame::SameLocals1StackItemExtended {
            offset_delta: r.read_u16()?,
            stack: parse_verification_type(r)?,
        },
        248..=250 => StackMapFrame::Chop {
            chopped: 251 - frame_type,
            offset_delta: r.read_u16()?,
        },
        251 => StackMapFrame::SameExtended {
            offset_delta: r.read_u16()?,
        },
        252..=254 => {
            let offset_delta = r.read_u16()?;
            let locals = (0..frame_type - 251)
                .map(|_| parse_verification_type(r))
                .collect::<Result<Vec<_>>>()?;
            StackMapFrame::Append {
                offset_delta,
                locals,
            }
        }
        255 => {
            let offset_delta = r.read_u16()?;
            let locals = parse_verification_types(r)?;
            let stack = parse_verification_types(r)?;
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            }
        }
        _ => {
            return Err(ClassFileError::UnknownStackMapFrameType { frame_type, offset });
        }
    };

    Ok(frame)
}

fn parse_verification_types(r: &mut ByteCursor<'_>) -> Result<Vec<VerificationType>> {
    let count = r.read_u16()?;
    (0..count).map(|_| parse_verification_type(r)).collect()
}

fn parse_verification_type(r: &mut ByteCursor<'_>) -> Result<VerificationType> {
    let offset = r.offset();
    let tag = r.read_u8()?;

    let verification_type = match tag {
        0 => VerificationType::Top,
        1 => VerificationType::Integer,
        2 => VerificationType::Float,
        3 => VerificationType::Double,
        4 => VerificationType::Long,
        5 => VerificationType::Null,
        6 => VerificationType::UninitializedThis,
        7 => VerificationType::Object {
            cpool_index: r.read_u16()?,
        },
        8 => VerificationType::Uninitialized {
            offset: r.read_u16()?,
        },
        _ => return Err(ClassFileError::UnknownVerificationType { tag, offset }),
    };

    Ok(verification_type)
}

fn parse_inner_classes(r: &mut ByteCursor<'_>) -> Result<Vec<InnerClass>> {
    let number_of_classes = r.read_u16()?;
    (0..number_of_classes)
        .map(|_| {
            Ok(InnerClass {
                inner_class_info_index: r.read_u16()?,
                outer_class_info_index: r.read_u16()?,
                inner_name_index: r.read_u16()?,
                inner_class_access_flags: InnerClassAccessFlags::from_bits_truncate(
                    r.read_u16()?,
                ),
            })
        })
        .collect()
}

fn parse_line_number_table(r: &mut ByteCursor<'_>) -> Result<Vec<LineNumber>> {
    let line_number_table_length = r.read_u16()?;
    (0..line_number_table_length)
        .map(|_| {
            Ok(LineNumber {
                start_pc: r.read_u16()?,
                line_number: r.read_u16()?,
            })
        })
        .collect()
}

fn parse_local_variable_table(r: &mut ByteCursor<'_>) -> Result<Vec<LocalVariable>> {
    let local_variable_table_length = r.read_u16()?;
    (0..local_variable_table_length)
        .map(|_| {
            Ok(LocalVariable {
                start_pc: r.read_u16()?,
                length: r.read_u16()?,
                name_index: r.read_u16()?,
                descriptor_index: r.read_u16()?,
                index: r.read_u16()?,
            })
        })
        .collect()
}

fn parse_local_variable_type_table(r: &mut ByteCursor<'_>) -> Result<Vec<LocalVariableType>> {
    let local_variable_type_table_length = r.read_u16()?;
    (0..local_variable_type_table_length)
        .map(|_| {
            Ok(LocalVariableType {
                start_pc: r.read_u16()?,
                length: r.read_u16()?,
                name_index: r.read_u16()?,
                signature_index: r.read_u16()?,
                index: r.read_u16()?,
            })
        })
        .collect()
}

fn parse_bootstrap_methods(r: &mut ByteCursor<'_>) -> Result<Vec<BootstrapMethod>> {
    let num_bootstrap_methods = r.read_u16()?;
    (0..num_bootstrap_methods)
        .map(|_| {
            Ok(BootstrapMethod {
                bootstrap_method_ref: r.read_u16()?,
                bootstrap_arguments: r.read_u16_table()?,
            })
        })
        .collect()
}

fn parse_method_parameters(r: &mut ByteCursor<'_>) -> Result<Vec<MethodParameter>> {
    let parameters_count = r.read_u8()?;
    (0..parameters_count)
        .map(|_| {
            Ok(MethodParameter {
                name_index: r.read_u16()?,
                access_flags: MethodParameterFlags::from_bits_truncate(r.read_u16()?),
            })
        })
        .collect()
}

fn parse_module(r: &mut ByteCursor<'_>) -> Result<ModuleAttribute> {
    let module_name_index = r.read_u16()?;
    let module_flags = ModuleFlags::from_bits_truncate(r.read_u16()?);
    let module_version_index = r.read_u16()?;

    let requires_count = r.read_u16()?;
    let requires = (0..requires_count)
        .map(|_| {
            Ok(Requires {
                requires_index: r.read_u16()?,
                requires_flags: RequiresFlags::from_bits_truncate(r.read_u16()?),
                requires_version_index: r.read_u16()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let exports_count = r.read_u16()?;
    let exports = (0..exports_count)
        .map(|_| {
            Ok(Exports {
                exports_index: r.read_u16()?,
                exports_flags: ExportsFlags::from_bits_truncate(r.read_u16()?),
                exports_to_index: r.read_u16_table()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let opens_count = r.read_u16()?;
    let opens = (0..opens_count)
        .map(|_| {
            Ok(Opens {
                opens_index: r.read_u16()?,
                opens_flags: ExportsFlags::from_bits_truncate(r.read_u16()?),
                opens_to_index: r.read_u16_table()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let uses = r.read_u16_table()?;

    let provides_count = r.read_u16()?;
    let provides = (0..provides_count)
        .map(|_| {
            Ok(Provides {
                provides_index: r.read_u16()?,
                provides_with_index: r.read_u16_table()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ModuleAttribute {
        module_name_index,
        module_flags,
        module_version_index,
        requires,
        exports,
        opens,
        uses,
        provides,
    })
}
