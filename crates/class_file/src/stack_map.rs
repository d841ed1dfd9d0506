// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.4

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object { cpool_index: u16 },
    /// Offset of the `new` instruction that created the object.
    Uninitialized { offset: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
    /// frame_type 0 to 63
    Same { offset_delta: u16 },
    /// frame_type 64 to 127
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationType,
    },
    /// frame_type 247
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationType,
    },
    /// frame_type 248 to 250; the last `chopped` locals are absent.
    Chop { chopped: u8, offset_delta: u16 },
    /// frame_type 251
    SameExtended { offset_delta: u16 },
    /// frame_type 252 to 254
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    /// frame_type 255
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}
impl StackMapFrame {
    pub fn offset_delta(&self) -> u16 {
        match *self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => offset_delta,
        }
    }
}
