use crate::{
    annotations::{
        Annotation, ConstKind, ElementValue, ElementValuePair, LocalVarTargetEntry, TargetInfo,
        TypeAnnotation, TypePathEntry,
    },
    cursor::ByteCursor,
    ClassFileError, Result,
};

/// Decodes annotations, bounding how deep element values may nest.
#[derive(Debug, Clone, Copy)]
pub(super) struct AnnotationParser {
    max_depth: usize,
}
impl AnnotationParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// A u16 count followed by that many annotations.
    pub fn parse_annotations(&self, r: &mut ByteCursor<'_>) -> Result<Vec<Annotation>> {
        let num_annotations = r.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(r, 0))
            .collect()
    }

    /// A u8 parameter count, then an annotation table per parameter.
    pub fn parse_parameter_annotations(
        &self,
        r: &mut ByteCursor<'_>,
    ) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = r.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations(r))
            .collect()
    }

    pub fn parse_type_annotations(&self, r: &mut ByteCursor<'_>) -> Result<Vec<TypeAnnotation>> {
        let num_annotations = r.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_type_annotation(r))
            .collect()
    }

    /// The payload of `AnnotationDefault`: one bare element value.
    pub fn parse_default_value(&self, r: &mut ByteCursor<'_>) -> Result<ElementValue> {
        self.parse_element_value(r, 0)
    }

    fn parse_annotation(&self, r: &mut ByteCursor<'_>, depth: usize) -> Result<Annotation> {
        let type_index = r.read_u16()?;
        let num_element_value_pairs = r.read_u16()?;
        let element_value_pairs = (0..num_element_value_pairs)
            .map(|_| {
                let element_name_index = r.read_u16()?;
                let value = self.parse_element_value(r, depth + 1)?;
                Ok(ElementValuePair {
                    element_name_index,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }

    fn parse_element_value(&self, r: &mut ByteCursor<'_>, depth: usize) -> Result<ElementValue> {
        if depth > self.max_depth {
            return Err(ClassFileError::NestingTooDeep(self.max_depth));
        }

        let offset = r.offset();
        let tag = r.read_u8()?;
        if let Some(kind) = ConstKind::from_tag(tag) {
            return Ok(ElementValue::Const {
                kind,
                const_value_index: r.read_u16()?,
            });
        }

        let element_value = match tag {
            b'e' => ElementValue::Enum {
                type_name_index: r.read_u16()?,
                const_name_index: r.read_u16()?,
            },
            b'c' => ElementValue::Class {
                class_info_index: r.read_u16()?,
            },
            b'@' => ElementValue::Annotation(self.parse_annotation(r, depth)?),
            b'[' => {
                let num_values = r.read_u16()?;
                let values = (0..num_values)
                    .map(|_| self.parse_element_value(r, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                ElementValue::Array(values)
            }
            _ => return Err(ClassFileError::UnknownElementValueTag { tag, offset }),
        };

        Ok(element_value)
    }

    fn parse_type_annotation(&self, r: &mut ByteCursor<'_>) -> Result<TypeAnnotation> {
        let offset = r.offset();
        let target_type = r.read_u8()?;
        let target_info = match target_type {
            0x00 | 0x01 => TargetInfo::TypeParameter {
                type_parameter_index: r.read_u8()?,
            },
            0x10 => TargetInfo::Supertype {
                supertype_index: r.read_u16()?,
            },
            0x11 | 0x12 => TargetInfo::TypeParameterBound {
                type_parameter_index: r.read_u8()?,
                bound_index: r.read_u8()?,
            },
            0x13..=0x15 => TargetInfo::Empty,
            0x16 => TargetInfo::FormalParameter {
                formal_parameter_index: r.read_u8()?,
            },
            0x17 => TargetInfo::Throws {
                throws_type_index: r.read_u16()?,
            },
            0x40 | 0x41 => {
                let table_length = r.read_u16()?;
                let table = (0..table_length)
                    .map(|_| {
                        Ok(LocalVarTargetEntry {
                            start_pc: r.read_u16()?,
                            length: r.read_u16()?,
                            index: r.read_u16()?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                TargetInfo::LocalVar(table)
            }
            0x42 => TargetInfo::Catch {
                exception_table_index: r.read_u16()?,
            },
            0x43..=0x46 => TargetInfo::Offset {
                offset: r.read_u16()?,
            },
            0x47..=0x4b => TargetInfo::TypeArgument {
                offset: r.read_u16()?,
                type_argument_index: r.read_u8()?,
            },
            _ => {
                return Err(ClassFileError::UnknownTypeAnnotationTarget {
                    target_type,
                    offset,
                })
            }
        };

        let path_length = r.read_u8()?;
        let target_path = (0..path_length)
            .map(|_| {
                Ok(TypePathEntry {
                    type_path_kind: r.read_u8()?,
                    type_argument_index: r.read_u8()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let annotation = self.parse_annotation(r, 0)?;

        Ok(TypeAnnotation {
            target_type,
            target_info,
            target_path,
            annotation,
        })
    }
}

#[cfg(test)]
mod annotation_parser_tests {
    use super::*;

    fn nested_arrays(levels: usize) -> Vec<u8> {
        // One annotation with a single pair whose value is `levels` nested
        // one-element arrays around an int constant.
        let mut bytes = vec![0x00, 0x01, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
        for _ in 0..levels {
            bytes.extend_from_slice(&[b'[', 0x00, 0x01]);
        }
        bytes.extend_from_slice(&[b'I', 0x00, 0x04]);
        bytes
    }

    #[test]
    fn it_should_parse_an_annotation_with_every_value_kind() {
        let bytes = [
            0x00, 0x01, // num_annotations
            0x00, 0x01, 0x00, 0x04, // type, 4 pairs
            0x00, 0x02, b's', 0x00, 0x03, // name = "..."
            0x00, 0x02, b'e', 0x00, 0x05, 0x00, 0x06, // enum
            0x00, 0x02, b'c', 0x00, 0x07, // class
            0x00, 0x02, b'@', 0x00, 0x08, 0x00, 0x00, // nested, no pairs
        ];

        let annotations = AnnotationParser::new(64)
            .parse_annotations(&mut ByteCursor::new(&bytes))
            .unwrap();

        let values: Vec<_> = annotations[0]
            .element_value_pairs
            .iter()
            .map(|pair| pair.value.clone())
            .collect();
        assert_eq!(
            values,
            vec![
                ElementValue::Const {
                    kind: ConstKind::String,
                    const_value_index: 3
                },
                ElementValue::Enum {
                    type_name_index: 5,
                    const_name_index: 6
                },
                ElementValue::Class {
                    class_info_index: 7
                },
                ElementValue::Annotation(Annotation {
                    type_index: 8,
                    element_value_pairs: vec![]
                }),
            ]
        );
    }

    #[test]
    fn it_should_accept_deeply_nested_arrays_within_the_limit() {
        let annotations = AnnotationParser::new(64)
            .parse_annotations(&mut ByteCursor::new(&nested_arrays(50)))
            .unwrap();

        assert_eq!(annotations[0].element_value_pairs[0].value.depth(), 50);
    }

    #[test]
    fn it_should_reject_nesting_past_the_limit() {
        assert!(matches!(
            AnnotationParser::new(64).parse_annotations(&mut ByteCursor::new(&nested_arrays(100))),
            Err(ClassFileError::NestingTooDeep(64))
        ));
    }

    #[test]
    fn it_should_fail_on_an_unknown_element_value_tag() {
        assert!(matches!(
            AnnotationParser::new(64)
                .parse_default_value(&mut ByteCursor::new(&[b'x', 0x00, 0x01])),
            Err(ClassFileError::UnknownElementValueTag { tag: b'x', offset: 0 })
        ));
    }

    #[test]
    fn it_should_parse_parameter_annotations() {
        let bytes = [
            0x02, // num_parameters
            0x00, 0x00, // none on the first
            0x00, 0x01, 0x00, 0x09, 0x00, 0x00, // one on the second
        ];

        let parameters = AnnotationParser::new(64)
            .parse_parameter_annotations(&mut ByteCursor::new(&bytes))
            .unwrap();

        assert_eq!(parameters.len(), 2);
        assert!(parameters[0].is_empty());
        assert_eq!(parameters[1][0].type_index, 9);
    }

    #[test]
    fn it_should_parse_a_type_annotation_on_a_local_variable() {
        let bytes = [
            0x00, 0x01, // num_annotations
            0x40, // local variable target
            0x00, 0x01, 0x00, 0x02, 0x00, 0x05, 0x00, 0x01, // one range
            0x01, 0x03, 0x00, // type_path: one type argument step
            0x00, 0x0a, 0x00, 0x00, // annotation
        ];

        let annotations = AnnotationParser::new(64)
            .parse_type_annotations(&mut ByteCursor::new(&bytes))
            .unwrap();

        assert_eq!(
            annotations[0].target_info,
            TargetInfo::LocalVar(vec![LocalVarTargetEntry {
                start_pc: 2,
                length: 5,
                index: 1
            }])
        );
        assert_eq!(
            annotations[0].target_path,
            vec![TypePathEntry {
                type_path_kind: 3,
                type_argument_index: 0
            }]
        );
        assert_eq!(annotations[0].annotation.type_index, 10);
    }

    #[test]
    fn it_should_fail_on_an_unknown_type_annotation_target() {
        assert!(matches!(
            AnnotationParser::new(64)
                .parse_type_annotations(&mut ByteCursor::new(&[0x00, 0x01, 0x30])),
            Err(ClassFileError::UnknownTypeAnnotationTarget {
                target_type: 0x30,
                offset: 2
            })
        ));
    }
}
