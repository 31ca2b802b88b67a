use crate::syntax::Span;
use crate::vfs::FileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    Function,
    ScatteredFunction,
    FunctionClause,
    /// A `val` type specification.
    Value,
    /// A top-level `let` or `var`.
    Variable,
    Type,
    Enum,
    EnumMember,
    Union,
    UnionConstructor,
    Struct,
    Bitfield,
    Register,
    Mapping,
    MappingClause,
    Overload,
    Operator,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::ScatteredFunction => "scattered function",
            DefinitionKind::FunctionClause => "function clause",
            DefinitionKind::Value => "val",
            DefinitionKind::Variable => "variable",
            DefinitionKind::Type => "type",
            DefinitionKind::Enum => "enum",
            DefinitionKind::EnumMember => "enum member",
            DefinitionKind::Union => "union",
            DefinitionKind::UnionConstructor => "union constructor",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Bitfield => "bitfield",
            DefinitionKind::Register => "register",
            DefinitionKind::Mapping => "mapping",
            DefinitionKind::MappingClause => "mapping clause",
            DefinitionKind::Overload => "overload",
            DefinitionKind::Operator => "operator",
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate definition found in one file, before it is indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// Span of the name token.
    pub span: Span,
    pub kind: DefinitionKind,
}

/// Global discovery order: files in the order they were first indexed, then
/// sites in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence {
    pub file_ordinal: u32,
    pub position: u32,
}

/// An indexed candidate definition. Immutable; replaced wholesale when its
/// file is re-extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSite {
    pub name: String,
    pub file: FileId,
    pub span: Span,
    pub kind: DefinitionKind,
    pub sequence: Sequence,
}

impl DefinitionSite {
    pub fn offset(&self) -> usize {
        self.span.start
    }
}
