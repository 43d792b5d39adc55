use parse_display::Display;

/// The type shape of one method parameter, as seen by the parameter decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Shape {
    #[display("bool")]
    Bool,
    #[display("{0}")]
    Int(IntKind),
    #[display("{0}")]
    Float(FloatKind),
    #[display("string")]
    String,
    /// A structurally decoded value, labelled with its type name.
    #[display("object {0}")]
    Object(&'static str),
}

impl Shape {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(style = "lowercase")]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(style = "lowercase")]
pub enum FloatKind {
    F32,
    F64,
}
