//! Type descriptions.
//!
//! [`TypeInfo`] can be partially filled: struct and enum types are created
//! incomplete in Pass 1 and completed in Pass 2; `Unknown` is the sentinel
//! for names that have not resolved yet. Built-in primitives exist exactly
//! once each, created complete when the analyzer starts.

use std::fmt::Write as _;

use voltc_util::{Idx, IndexVec};

use crate::symbol::SymbolId;
use crate::Analyzer;

/// Arena id of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl Idx for TypeId {
    fn from_usize(idx: usize) -> Self {
        TypeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a type. The numeric kinds are contiguous so the classifiers
/// below stay simple range checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F16,
    F32,
    F64,
    F128,
    Bool,
    Isize,
    Usize,
    Cstr,
    Str,
    Type,
    Pointer,
    Reference,
    Array,
    Slice,
    Tuple,
    Struct,
    Enum,
    Error,
    Function,
    Generic,
    /// Placeholder for forward references; resolution replaces it.
    Unknown,
}

impl TypeKind {
    /// Integer or floating kind, `isize`/`usize` included.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_integer(self) -> bool {
        (self as u32 >= TypeKind::I8 as u32 && self as u32 <= TypeKind::U128 as u32)
            || self == TypeKind::Isize
            || self == TypeKind::Usize
    }

    pub fn is_floating(self) -> bool {
        self as u32 >= TypeKind::F16 as u32 && self as u32 <= TypeKind::F128 as u32
    }
}

/// A type description, progressively filled across passes.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub name: Option<String>,

    /// Wrapped type, for pointers, references, arrays, slices and error
    /// wrappers.
    pub base: Option<TypeId>,

    /// Element types, for tuples and function parameters.
    pub element_types: Vec<TypeId>,

    /// Return type, for functions.
    pub return_type: Option<TypeId>,

    /// Field symbols, for structs.
    pub fields: Vec<SymbolId>,

    /// Variant symbols, for enums and error types.
    pub variants: Vec<SymbolId>,

    pub size: usize,
    pub alignment: usize,
    pub size_computed: bool,

    pub is_const: bool,
    pub is_nullable: bool,
    /// True once the definition is fully analyzed.
    pub is_complete: bool,
    /// Function type declared with a variadic parameter list; calls skip
    /// arity checking.
    pub is_variadic: bool,
}

impl TypeInfo {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            base: None,
            element_types: Vec::new(),
            return_type: None,
            fields: Vec::new(),
            variants: Vec::new(),
            size: 0,
            alignment: 0,
            size_computed: false,
            is_const: false,
            is_nullable: false,
            is_complete: false,
            is_variadic: false,
        }
    }
}

/// Cache of the built-in types, one instance per primitive kind.
#[derive(Clone, Copy, Debug)]
pub struct Builtins {
    pub void: TypeId,
    pub i8: TypeId,
    pub i16: TypeId,
    pub i32: TypeId,
    pub i64: TypeId,
    pub i128: TypeId,
    pub u8: TypeId,
    pub u16: TypeId,
    pub u32: TypeId,
    pub u64: TypeId,
    pub u128: TypeId,
    pub f16: TypeId,
    pub f32: TypeId,
    pub f64: TypeId,
    pub f128: TypeId,
    pub bool: TypeId,
    pub isize: TypeId,
    pub usize: TypeId,
    pub cstr: TypeId,
    pub str: TypeId,
    pub type_: TypeId,
    pub unknown: TypeId,
    /// Unknown-nullable, the type of `null`.
    pub null: TypeId,
}

impl Builtins {
    /// Push one complete instance of every built-in type.
    pub(crate) fn install(types: &mut IndexVec<TypeId, TypeInfo>) -> Builtins {
        let mut builtin = |kind: TypeKind, name: &str, size: usize, alignment: usize| {
            let mut info = TypeInfo::new(kind);
            info.name = Some(name.to_string());
            info.size = size;
            info.alignment = alignment;
            info.size_computed = true;
            info.is_complete = true;
            types.push(info)
        };

        let void = builtin(TypeKind::Void, "void", 0, 1);
        let i8 = builtin(TypeKind::I8, "i8", 1, 1);
        let i16 = builtin(TypeKind::I16, "i16", 2, 2);
        let i32 = builtin(TypeKind::I32, "i32", 4, 4);
        let i64 = builtin(TypeKind::I64, "i64", 8, 8);
        let i128 = builtin(TypeKind::I128, "i128", 16, 16);
        let u8 = builtin(TypeKind::U8, "u8", 1, 1);
        let u16 = builtin(TypeKind::U16, "u16", 2, 2);
        let u32 = builtin(TypeKind::U32, "u32", 4, 4);
        let u64 = builtin(TypeKind::U64, "u64", 8, 8);
        let u128 = builtin(TypeKind::U128, "u128", 16, 16);
        let f16 = builtin(TypeKind::F16, "f16", 2, 2);
        let f32 = builtin(TypeKind::F32, "f32", 4, 4);
        let f64 = builtin(TypeKind::F64, "f64", 8, 8);
        let f128 = builtin(TypeKind::F128, "f128", 16, 16);
        let bool_ = builtin(TypeKind::Bool, "bool", 1, 1);
        let isize_ = builtin(TypeKind::Isize, "isize", 8, 8);
        let usize_ = builtin(TypeKind::Usize, "usize", 8, 8);
        let cstr = builtin(TypeKind::Cstr, "cstr", 8, 8);
        let str_ = builtin(TypeKind::Str, "str", 16, 8);
        let type_ = builtin(TypeKind::Type, "type", 0, 1);
        let unknown = builtin(TypeKind::Unknown, "unknown", 0, 1);

        let mut null_info = TypeInfo::new(TypeKind::Unknown);
        null_info.name = Some("null".to_string());
        null_info.is_nullable = true;
        null_info.is_complete = true;
        let null = types.push(null_info);

        Builtins {
            void,
            i8,
            i16,
            i32,
            i64,
            i128,
            u8,
            u16,
            u32,
            u64,
            u128,
            f16,
            f32,
            f64,
            f128,
            bool: bool_,
            isize: isize_,
            usize: usize_,
            cstr,
            str: str_,
            type_,
            unknown,
            null,
        }
    }

    /// Built-in type cache lookup by source-level name.
    pub fn by_name(&self, name: &str) -> Option<TypeId> {
        let id = match name {
            "void" => self.void,
            "i8" => self.i8,
            "i16" => self.i16,
            "i32" => self.i32,
            "i64" => self.i64,
            "i128" => self.i128,
            "u8" => self.u8,
            "u16" => self.u16,
            "u32" => self.u32,
            "u64" => self.u64,
            "u128" => self.u128,
            "f16" => self.f16,
            "f32" => self.f32,
            "f64" => self.f64,
            "f128" => self.f128,
            "bool" => self.bool,
            "isize" => self.isize,
            "usize" => self.usize,
            "cstr" => self.cstr,
            "str" => self.str,
            "type" => self.type_,
            _ => return None,
        };
        Some(id)
    }
}

impl<'a> Analyzer<'a> {
    /// Allocate a fresh type of the given kind.
    pub(crate) fn new_type(&mut self, kind: TypeKind) -> TypeId {
        self.types.push(TypeInfo::new(kind))
    }

    /// Structural equality: same instance, or same kind and name, or same
    /// shape for wrapper and tuple types.
    pub fn type_equals(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let (ta, tb) = (&self.types[a], &self.types[b]);
        if ta.kind != tb.kind {
            return false;
        }
        match (&ta.name, &tb.name) {
            (Some(na), Some(nb)) => return na == nb,
            _ => {}
        }
        match ta.kind {
            TypeKind::Pointer | TypeKind::Reference | TypeKind::Array | TypeKind::Slice => {
                match (ta.base, tb.base) {
                    (Some(ba), Some(bb)) => self.type_equals(ba, bb),
                    _ => false,
                }
            }
            TypeKind::Tuple => {
                ta.element_types.len() == tb.element_types.len()
                    && ta
                        .element_types
                        .iter()
                        .zip(&tb.element_types)
                        .all(|(&ea, &eb)| self.type_equals(ea, eb))
            }
            _ => false,
        }
    }

    /// Compatibility is equality loosened by the unknown sentinel, so one
    /// unresolved name does not cascade into spurious mismatches.
    pub fn types_compatible(&self, a: TypeId, b: TypeId) -> bool {
        self.types[a].kind == TypeKind::Unknown
            || self.types[b].kind == TypeKind::Unknown
            || self.type_equals(a, b)
    }

    /// Human-readable rendering of a type.
    pub fn type_name(&self, id: TypeId) -> String {
        let info = &self.types[id];
        if let Some(name) = &info.name {
            return name.clone();
        }
        match info.kind {
            TypeKind::Pointer => format!("{}*?", self.base_name(info.base)),
            TypeKind::Reference => format!("{}*", self.base_name(info.base)),
            TypeKind::Array => format!("{}[]", self.base_name(info.base)),
            TypeKind::Slice => format!("{}[..]", self.base_name(info.base)),
            TypeKind::Error => format!("error!{}", self.base_name(info.base)),
            TypeKind::Tuple => {
                let mut out = String::from("(");
                for (i, &element) in info.element_types.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.type_name(element));
                }
                out.push(')');
                out
            }
            TypeKind::Function => {
                let mut out = String::from("|");
                for (i, &element) in info.element_types.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.type_name(element));
                }
                let _ = write!(
                    out,
                    "| -> {}",
                    info.return_type
                        .map(|r| self.type_name(r))
                        .unwrap_or_else(|| "void".to_string())
                );
                out
            }
            TypeKind::Unknown => "unknown".to_string(),
            other => format!("{:?}", other).to_lowercase(),
        }
    }

    fn base_name(&self, base: Option<TypeId>) -> String {
        base.map(|b| self.type_name(b))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_classifiers() {
        assert!(TypeKind::I8.is_numeric());
        assert!(TypeKind::U128.is_numeric());
        assert!(TypeKind::F64.is_numeric());
        assert!(TypeKind::Isize.is_numeric());
        assert!(!TypeKind::Bool.is_numeric());
        assert!(!TypeKind::Str.is_numeric());
        assert!(!TypeKind::Struct.is_numeric());
    }

    #[test]
    fn test_integer_vs_floating() {
        assert!(TypeKind::I32.is_integer());
        assert!(TypeKind::Usize.is_integer());
        assert!(!TypeKind::F32.is_integer());
        assert!(TypeKind::F16.is_floating());
        assert!(TypeKind::F128.is_floating());
        assert!(!TypeKind::U8.is_floating());
    }

    #[test]
    fn test_builtins_install() {
        let mut types = IndexVec::new();
        let builtins = Builtins::install(&mut types);
        assert_eq!(types[builtins.i32].kind, TypeKind::I32);
        assert!(types[builtins.i32].is_complete);
        assert!(types[builtins.i32].size_computed);
        assert_eq!(types[builtins.i32].size, 4);
        assert_eq!(types[builtins.str].size, 16);
        assert!(types[builtins.null].is_nullable);
    }

    #[test]
    fn test_builtin_by_name() {
        let mut types = IndexVec::new();
        let builtins = Builtins::install(&mut types);
        assert_eq!(builtins.by_name("u64"), Some(builtins.u64));
        assert_eq!(builtins.by_name("type"), Some(builtins.type_));
        assert_eq!(builtins.by_name("Point"), None);
    }
}
