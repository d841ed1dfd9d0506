// Bits not defined for a given host are reserved and ignored, so every set
// is built with `from_bits_truncate`.

use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct InnerClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct MethodParameterFlags: u16 {
        const FINAL = 0x0010;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct ModuleFlags: u16 {
        const OPEN = 0x0020;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct RequiresFlags: u16 {
        const TRANSITIVE = 0x0020;
        const STATIC_PHASE = 0x0040;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    /// Flags of both `exports` and `opens` entries.
    #[derive(Default)]
    pub struct ExportsFlags: u16 {
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

/// Generates `is_*` predicates over an `access_flags` field.
macro_rules! flag_predicates {
    ($flags:ident { $($name:ident => $flag:ident),* $(,)? }) => {
        $(
            pub fn $name(&self) -> bool {
                self.access_flags.contains($flags::$flag)
            }
        )*
    };
}
pub(crate) use flag_predicates;

#[cfg(test)]
mod access_flags_tests {
    use super::*;

    #[test]
    fn it_should_drop_reserved_bits() {
        let flags = FieldAccessFlags::from_bits_truncate(0x0102 | 0x0008);

        assert_eq!(flags, FieldAccessFlags::PRIVATE | FieldAccessFlags::STATIC);
    }

    #[test]
    fn it_should_read_the_same_bit_differently_per_host() {
        assert_eq!(
            ClassAccessFlags::from_bits_truncate(0x0020),
            ClassAccessFlags::SUPER
        );
        assert_eq!(
            MethodAccessFlags::from_bits_truncate(0x0020),
            MethodAccessFlags::SYNCHRONIZED
        );
    }

    #[test]
    fn it_should_render_named_sets() {
        let flags = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER;

        assert_eq!(format!("{:?}", flags), "PUBLIC | SUPER");
    }
}
