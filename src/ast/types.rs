//! Type system definitions for the AST.
//!
//! This module defines the types assigned to expressions by the type checker:
//!
//! - Primitive types (booleans, integers, unit)
//! - Function types with positional parameters
//! - Reference types for mutable heap cells
//! - Structured types (tuples, records, variants)
//!
//! Types are compared structurally. Records and variants compare their field
//! sets by name, so field order never affects equality.

use std::fmt::Display;

/// A named field of a record or variant type.
#[derive(Debug, Clone)]
pub struct FieldType {
    pub name: String,
    pub ty: Type,
}

impl FieldType {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        FieldType {
            name: name.into(),
            ty,
        }
    }
}

impl<S: Into<String>> From<(S, Type)> for FieldType {
    fn from((name, ty): (S, Type)) -> Self {
        FieldType::new(name, ty)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// Represents the different types in the language.
#[derive(Debug, Clone)]
pub enum Type {
    Bool,
    Int,
    /// Type of expressions evaluated only for their effect (assignment).
    Unit,
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    Reference(Box<Type>),
    Tuple(Vec<Type>),
    Record(Vec<FieldType>),
    Variant(Vec<FieldType>),
}

impl Type {
    pub fn function(params: impl IntoIterator<Item = Type>, ret: Type) -> Self {
        Type::Function {
            params: params.into_iter().collect(),
            ret: Box::new(ret),
        }
    }

    pub fn reference(inner: Type) -> Self {
        Type::Reference(Box::new(inner))
    }

    pub fn tuple(elems: impl IntoIterator<Item = Type>) -> Self {
        Type::Tuple(elems.into_iter().collect())
    }

    pub fn record<F: Into<FieldType>>(fields: impl IntoIterator<Item = F>) -> Self {
        Type::Record(fields.into_iter().map(Into::into).collect())
    }

    pub fn variant<F: Into<FieldType>>(fields: impl IntoIterator<Item = F>) -> Self {
        Type::Variant(fields.into_iter().map(Into::into).collect())
    }

    /// Returns the position and type of a named record or variant field.
    pub fn get_field(&self, name: &str) -> Option<(usize, &Type)> {
        match self {
            Type::Record(fields) | Type::Variant(fields) => fields
                .iter()
                .enumerate()
                .find(|(_, field)| field.name == name)
                .map(|(index, field)| (index, &field.ty)),
            _ => None,
        }
    }

    /// Returns the referent type if this is a reference type.
    pub fn referent(&self) -> Option<&Type> {
        match self {
            Type::Reference(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns whether this is `Ref T` for the given `T`.
    pub fn is_reference_to(&self, other: &Type) -> bool {
        self.referent().is_some_and(|inner| inner == other)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int)
    }
}

fn same_field_set(lhs: &[FieldType], rhs: &[FieldType]) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().all(|field| {
            rhs.iter()
                .find(|other| other.name == field.name)
                .is_some_and(|other| other.ty == field.ty)
        })
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Bool, Type::Bool) | (Type::Int, Type::Int) | (Type::Unit, Type::Unit) => true,
            (
                Type::Function { params, ret },
                Type::Function {
                    params: other_params,
                    ret: other_ret,
                },
            ) => params == other_params && ret == other_ret,
            (Type::Reference(inner), Type::Reference(other_inner)) => inner == other_inner,
            (Type::Tuple(elems), Type::Tuple(other_elems)) => elems == other_elems,
            (Type::Record(fields), Type::Record(other_fields))
            | (Type::Variant(fields), Type::Variant(other_fields)) => {
                same_field_set(fields, other_fields)
            }
            _ => false,
        }
    }
}

impl Eq for Type {}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(",")
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Unit => write!(f, "Unit"),
            Type::Function { params, ret } => write!(f, "({})->{}", join(params), ret),
            Type::Reference(inner) => write!(f, "Ref {}", inner),
            Type::Tuple(elems) => write!(f, "{{{}}}", join(elems)),
            Type::Record(fields) => write!(f, "{{{}}}", join(fields)),
            Type::Variant(fields) => write!(f, "<{}>", join(fields)),
        }
    }
}
