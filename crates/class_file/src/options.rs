/// What to do with a known attribute found on a host the format does not
/// allow it on, e.g. a `Code` attribute on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributePolicy {
    /// Decode it anyway and log a warning.
    #[default]
    Permissive,
    /// Fail with [`ClassFileError::IllegalAttributeForHost`](crate::ClassFileError::IllegalAttributeForHost).
    Strict,
}

/// Hard ceiling on `max_nesting_depth`. Deeper recursion risks exhausting the
/// stack, and no real class file comes close to it.
pub const MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub attribute_policy: AttributePolicy,
    /// Bound on annotation and attribute recursion, capped at
    /// [`MAX_NESTING_DEPTH`].
    pub max_nesting_depth: usize,
    /// When false, the attributes nested in `Code` are kept as raw payloads.
    pub decode_code_attributes: bool,
}
impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            attribute_policy: AttributePolicy::Permissive,
            max_nesting_depth: 64,
            decode_code_attributes: true,
        }
    }
}
impl ParseOptions {
    pub fn strict() -> Self {
        Self::default().attribute_policy(AttributePolicy::Strict)
    }

    pub fn attribute_policy(mut self, attribute_policy: AttributePolicy) -> Self {
        self.attribute_policy = attribute_policy;
        self
    }

    /// Values above [`MAX_NESTING_DEPTH`] are clamped to it.
    pub fn max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth.min(MAX_NESTING_DEPTH);
        self
    }

    /// The depth the parsers enforce, also clamped when the field was set
    /// directly.
    pub fn nesting_limit(&self) -> usize {
        self.max_nesting_depth.min(MAX_NESTING_DEPTH)
    }

    pub fn decode_code_attributes(mut self, decode_code_attributes: bool) -> Self {
        self.decode_code_attributes = decode_code_attributes;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.attribute_policy == AttributePolicy::Strict
    }
}
