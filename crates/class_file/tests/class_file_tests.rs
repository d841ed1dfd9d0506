mod common;

use jdump_class_file::{
    access_flags::{FieldAccessFlags, MethodAccessFlags},
    attributes::{AttributeInfo, ExceptionTableEntry},
    ClassFile, ClassFileError, LookupError, ParseOptions, Section, MAX_NESTING_DEPTH,
};

use common::{attribute, member, table, ClassFileBuilder};

/// `my/MyClass` with a `private final int myField`, a constructor with a
/// Code attribute and a `SourceFile`.
fn my_class() -> ClassFileBuilder {
    let mut builder = ClassFileBuilder::class("my/MyClass");
    let pool = &mut builder.constant_pool;

    let field_name = pool.utf8("myField");
    let int_descriptor = pool.utf8("I");
    let init = pool.utf8("<init>");
    let void_descriptor = pool.utf8("()V");
    let object_init = pool.method_ref("java/lang/Object", "<init>", "()V");
    let code = pool.utf8("Code");
    let line_number_table = pool.utf8("LineNumberTable");
    let source_file = pool.utf8("SourceFile");
    let source_file_name = pool.utf8("MyClass.java");

    let line_numbers = attribute(line_number_table, &[0x00, 0x01, 0x00, 0x00, 0x00, 0x03]);
    let mut code_info = vec![0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05];
    code_info.extend_from_slice(&[0x2a, 0xb7]);
    code_info.extend_from_slice(&object_init.to_be_bytes());
    code_info.push(0xb1);
    code_info.extend_from_slice(&[0x00, 0x00]);
    code_info.extend_from_slice(&table(&[line_numbers]));

    builder.fields = vec![member(0x0012, field_name, int_descriptor, &[])];
    builder.methods = vec![member(
        0x0001,
        init,
        void_descriptor,
        &[attribute(code, &code_info)],
    )];
    builder.attributes = vec![attribute(source_file, &source_file_name.to_be_bytes())];
    builder
}

fn with_class_file(f: impl FnOnce(ClassFile)) {
    let _ = pretty_env_logger::try_init();

    f(ClassFile::parse(&my_class().build()).unwrap());
}

#[test]
fn test_minimal_class_file() {
    let bytes = [
        0xca, 0xfe, 0xba, 0xbe, // magic
        0x00, 0x00, 0x00, 0x34, // version 52.0
        0x00, 0x01, // empty constant pool
        0x00, 0x21, // access flags
        0x00, 0x00, 0x00, 0x00, // this/super class
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // counts
    ];

    let class_file = ClassFile::parse(&bytes).unwrap();

    assert_eq!(class_file.major_version, 52);
    assert_eq!(class_file.constant_pool.entry_count(), 0);
    assert!(class_file.interfaces.is_empty());
    assert!(class_file.fields.is_empty());
    assert!(class_file.methods.is_empty());
    assert!(class_file.attributes.is_empty());
    assert!(matches!(
        class_file.class_name(),
        Err(LookupError::IndexOutOfRange { index: 0, .. })
    ));
}

#[test]
fn test_bad_magic() {
    let mut bytes = my_class().build();
    bytes[3] = 0xbf;

    let e = ClassFile::parse(&bytes).unwrap_err();

    assert!(matches!(e.root_cause(), ClassFileError::BadMagic(0xCAFEBABF)));
    assert_eq!(e.sections(), vec![&Section::Magic]);
}

#[test]
fn test_class_name() {
    with_class_file(|class_file| assert_eq!(Ok("my/MyClass"), class_file.class_name()));
}

#[test]
fn test_super_class() {
    with_class_file(|class_file| {
        assert_eq!(Ok(Some("java/lang/Object")), class_file.super_class())
    });
}

#[test]
fn test_field_name() {
    with_class_file(|class_file| {
        assert_eq!(Ok("myField"), class_file.field_name(&class_file.fields[0]))
    });
}

#[test]
fn test_int_field_type() {
    with_class_file(|class_file| {
        assert_eq!(Ok("I"), class_file.field_descriptor(&class_file.fields[0]))
    });
}

#[test]
fn test_field_access_flags() {
    with_class_file(|class_file| {
        let field = &class_file.fields[0];

        assert_eq!(
            FieldAccessFlags::FINAL | FieldAccessFlags::PRIVATE,
            field.access_flags
        );
        assert!(field.is_private());
        assert!(!field.is_static());
    });
}

#[test]
fn test_constructor() {
    with_class_file(|class_file| {
        let constructor = class_file.find_method("<init>", Some("()V")).unwrap();

        assert_eq!(MethodAccessFlags::PUBLIC, constructor.access_flags);
        assert!(class_file.find_method("<init>", Some("(I)V")).is_none());
    });
}

#[test]
fn test_code_attribute() {
    with_class_file(|class_file| {
        let attribute = &class_file.methods[0].attributes.0[0];
        let code = class_file.methods[0].attributes.code_attribute().unwrap();

        assert_eq!(code.max_stack, 1);
        assert_eq!(code.code.len(), 5);
        assert!(code.exception_table.is_empty());
        assert_eq!(code.line_number(4), Some(3));
        // 12 fixed bytes, 5 of code, 12 for the LineNumberTable record.
        assert_eq!(attribute.attribute_length, 29);
    });
}

#[test]
fn test_source_file() {
    with_class_file(|class_file| assert_eq!(Some("MyClass.java"), class_file.source_file()));
}

#[test]
fn test_resolve_method_ref() {
    with_class_file(|class_file| {
        let (index, _) = class_file
            .constant_pool
            .iter()
            .find(|(_, cp_info)| cp_info.tag() == jdump_class_file::ConstantTag::MethodRef)
            .unwrap();
        let method_ref = class_file.constant_pool.get_member_ref(index).unwrap();

        assert_eq!(method_ref.class_name, "java/lang/Object");
        assert_eq!(method_ref.name, "<init>");
        assert_eq!(method_ref.descriptor, "()V");
    });
}

#[test]
fn test_exception_table() {
    let mut builder = ClassFileBuilder::class("my/Catcher");
    let pool = &mut builder.constant_pool;
    let run = pool.utf8("run");
    let void_descriptor = pool.utf8("()V");
    let code = pool.utf8("Code");
    let exception = pool.class("java/lang/Exception");

    let mut code_info = vec![0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x04];
    code_info.extend_from_slice(&[0x00, 0xb1, 0x4c, 0xb1]);
    code_info.extend_from_slice(&[0x00, 0x02]);
    code_info.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x02]);
    code_info.extend_from_slice(&exception.to_be_bytes());
    code_info.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00]);
    code_info.extend_from_slice(&[0x00, 0x00]);
    let declared = code_info.len() as u32;
    builder.methods = vec![member(0x0001, run, void_descriptor, &[attribute(code, &code_info)])];

    let class_file = ClassFile::parse(&builder.build()).unwrap();
    let method = class_file.find_method("run", None).unwrap();
    let code = method.attributes.code_attribute().unwrap();

    assert_eq!(declared, 2 + 2 + 4 + 4 + 2 + 2 * 8 + 2);
    assert_eq!(method.attributes.0[0].attribute_length, declared);
    assert_eq!(
        code.exception_table,
        vec![
            ExceptionTableEntry {
                start_pc: 0,
                end_pc: 1,
                handler_pc: 2,
                catch_type: exception
            },
            ExceptionTableEntry {
                start_pc: 0,
                end_pc: 1,
                handler_pc: 2,
                catch_type: 0
            },
        ]
    );
    assert_eq!(
        class_file.constant_pool.get_class_name(code.exception_table[0].catch_type),
        Ok("java/lang/Exception")
    );
}

#[test]
fn test_unknown_attribute_round_trip() {
    let mut builder = ClassFileBuilder::class("my/Tagged");
    let name = builder.constant_pool.utf8("com.example.Custom");
    let payload = [0x00, 0xff, 0x10, 0x20, 0xca, 0xfe];
    builder.attributes = vec![attribute(name, &payload)];

    let class_file = ClassFile::parse(&builder.build()).unwrap();

    assert_eq!(
        class_file.attributes.0[0].info,
        AttributeInfo::Unknown {
            name: "com.example.Custom".into(),
            info: payload.to_vec()
        }
    );
}

#[test]
fn test_long_phantom_slot() {
    let mut builder = ClassFileBuilder::default();
    let long = builder.constant_pool.long(-2);
    let after = builder.constant_pool.integer(9);

    let class_file = ClassFile::parse(&builder.build()).unwrap();
    let constant_pool = &class_file.constant_pool;

    assert_eq!(constant_pool.get_long(long), Ok(-2));
    assert_eq!(constant_pool.get(long + 1), Err(LookupError::PhantomSlot(long + 1)));
    assert_eq!(constant_pool.get_integer(after), Ok(9));
    assert_eq!(constant_pool.entry_count(), 2);
    assert_eq!(constant_pool.len(), 3);
}

#[test]
fn test_lookup_failures_leave_the_class_file_usable() {
    with_class_file(|class_file| {
        let utf8 = class_file.fields[0].name_index;

        assert!(matches!(
            class_file.constant_pool.get_class_name(utf8),
            Err(LookupError::UnexpectedTag { .. })
        ));
        assert!(matches!(
            class_file.constant_pool.get(0),
            Err(LookupError::IndexOutOfRange { .. })
        ));
        assert_eq!(Ok("<init>"), class_file.method_name(&class_file.methods[0]));
    });
}

#[test]
fn test_truncated_constant_pool() {
    let bytes = my_class().build();
    // Cut inside the length prefix of the first Utf8 entry.
    let truncated = &bytes[..12];

    let e = ClassFile::parse(truncated).unwrap_err();

    assert!(matches!(
        e.root_cause(),
        ClassFileError::UnexpectedEof { offset: 11, .. }
    ));
    assert_eq!(e.sections()[0], &Section::ConstantPool);
}

#[test]
fn test_error_context_names_the_method_and_attribute() {
    let mut builder = ClassFileBuilder::class("my/Broken");
    let pool = &mut builder.constant_pool;
    let name = pool.utf8("broken");
    let void_descriptor = pool.utf8("()V");
    let code = pool.utf8("Code");
    // code_length runs past the end of the attribute.
    let code_info = [0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x40, 0xb1];
    builder.methods = vec![
        member(0x0001, name, void_descriptor, &[]),
        member(0x0001, name, void_descriptor, &[attribute(code, &code_info)]),
    ];

    let e = ClassFile::parse(&builder.build()).unwrap_err();

    assert!(matches!(e.root_cause(), ClassFileError::UnexpectedEof { .. }));
    assert_eq!(
        e.sections(),
        vec![
            &Section::Method(1),
            &Section::Attribute {
                index: 0,
                name: Some("Code".into())
            }
        ]
    );
}

#[test]
fn test_strict_and_permissive_host_policy() {
    let mut builder = ClassFileBuilder::class("my/Odd");
    let pool = &mut builder.constant_pool;
    let name = pool.utf8("value");
    let int_descriptor = pool.utf8("I");
    let line_number_table = pool.utf8("LineNumberTable");
    // LineNumberTable belongs in Code, not on a field.
    builder.fields = vec![member(
        0x0000,
        name,
        int_descriptor,
        &[attribute(line_number_table, &[0x00, 0x00])],
    )];
    let bytes = builder.build();

    let class_file = ClassFile::parse(&bytes).unwrap();
    assert_eq!(
        class_file.fields[0].attributes.0[0].info,
        AttributeInfo::LineNumberTable(vec![])
    );

    let e = ClassFile::parse_with(&bytes, ParseOptions::strict()).unwrap_err();
    assert!(matches!(
        e.root_cause(),
        ClassFileError::IllegalAttributeForHost { .. }
    ));
    assert_eq!(e.sections()[0], &Section::Field(0));
}

#[test]
fn test_trailing_bytes() {
    let mut bytes = my_class().build();
    bytes.push(0x00);

    assert!(ClassFile::parse(&bytes).is_ok());
    assert!(matches!(
        ClassFile::parse_with(&bytes, ParseOptions::strict()),
        Err(ClassFileError::LengthMismatch { .. })
    ));
}

#[test]
fn test_from_reader() {
    let bytes = my_class().build();

    let class_file = ClassFile::from_reader(std::io::Cursor::new(bytes)).unwrap();

    assert_eq!(Ok("my/MyClass"), class_file.class_name());
}

fn annotated_with_nested_arrays(levels: usize) -> Vec<u8> {
    let mut builder = ClassFileBuilder::class("my/Annotated");
    let pool = &mut builder.constant_pool;
    let annotations = pool.utf8("RuntimeVisibleAnnotations");
    let annotation_type = pool.utf8("Lmy/Matrix;");
    let value = pool.utf8("value");
    let one = pool.integer(1);

    let mut info = vec![0x00, 0x01];
    info.extend_from_slice(&annotation_type.to_be_bytes());
    info.extend_from_slice(&[0x00, 0x01]);
    info.extend_from_slice(&value.to_be_bytes());
    for _ in 0..levels {
        info.extend_from_slice(&[b'[', 0x00, 0x01]);
    }
    info.push(b'I');
    info.extend_from_slice(&one.to_be_bytes());
    builder.attributes = vec![attribute(annotations, &info)];
    builder.build()
}

#[test]
fn test_deeply_nested_annotation_values() {
    let class_file = ClassFile::parse(&annotated_with_nested_arrays(50)).unwrap();

    match &class_file.attributes.0[0].info {
        AttributeInfo::RuntimeVisibleAnnotations(annotations) => {
            assert_eq!(annotations[0].element_value_pairs[0].value.depth(), 50)
        }
        info => panic!("unexpected {:?}", info),
    }
}

#[test]
fn test_nesting_past_the_limit() {
    let e = ClassFile::parse(&annotated_with_nested_arrays(10_000)).unwrap_err();

    assert!(matches!(e.root_cause(), ClassFileError::NestingTooDeep(64)));
    assert_eq!(
        e.sections(),
        vec![
            &Section::Attributes,
            &Section::Attribute {
                index: 0,
                name: Some("RuntimeVisibleAnnotations".into())
            }
        ]
    );
}

#[test]
fn test_requested_depth_is_capped() {
    let options = ParseOptions::default().max_nesting_depth(1_000_000);

    assert!(ClassFile::parse_with(&annotated_with_nested_arrays(200), options.clone()).is_ok());

    let e = ClassFile::parse_with(&annotated_with_nested_arrays(20_000), options).unwrap_err();
    assert!(matches!(
        e.root_cause(),
        ClassFileError::NestingTooDeep(MAX_NESTING_DEPTH)
    ));
}
