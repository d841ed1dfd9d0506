// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.25

use crate::access_flags::{ExportsFlags, ModuleFlags, RequiresFlags};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAttribute {
    pub module_name_index: u16,
    pub module_flags: ModuleFlags,
    /// Zero when no version is recorded.
    pub module_version_index: u16,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Opens>,
    pub uses: Vec<u16>,
    pub provides: Vec<Provides>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requires {
    pub requires_index: u16,
    pub requires_flags: RequiresFlags,
    pub requires_version_index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exports {
    pub exports_index: u16,
    pub exports_flags: ExportsFlags,
    /// Empty for an unqualified export.
    pub exports_to_index: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opens {
    pub opens_index: u16,
    pub opens_flags: ExportsFlags,
    pub opens_to_index: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provides {
    pub provides_index: u16,
    pub provides_with_index: Vec<u16>,
}
