///
/// ValueTag
///
/// Stable value-variant tag used by diagnostics and scan errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTag {
    Null,
    Int,
    Float,
    Text,
}

impl ValueTag {
    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Text => "Text",
        }
    }
}

impl std::fmt::Display for ValueTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
