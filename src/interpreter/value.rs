use std::{fmt::Display, rc::Rc};

use crate::ast::Lambda;

use super::environment::Environment;

/// A lambda paired with a snapshot of the environment it was created in.
#[derive(Debug, Clone)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Environment,
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.lambda, &other.lambda) && self.env == other.env
    }
}

/// Runtime value representation
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Unit,
    Closure(Closure),
    /// Index into the heap.
    Location(usize),
    Tuple(Vec<Value>),
    Record(Vec<(String, Value)>),
    Variant(String, Box<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            (Value::Closure(a), Value::Closure(b)) => a == b,
            (Value::Location(a), Value::Location(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            // Records compare by field name, like record types.
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(name, value)| other.get_field(name) == Some(value))
            }
            (Value::Variant(tag, value), Value::Variant(other_tag, other_value)) => {
                tag == other_tag && value == other_value
            }
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Unit => write!(f, "()"),
            Value::Closure(closure) => {
                let params = closure
                    .lambda
                    .params
                    .iter()
                    .map(|param| param.to_string())
                    .collect::<Vec<String>>()
                    .join(",");
                write!(f, "<\\({}).{}>", params, closure.lambda.body)
            }
            Value::Location(index) => write!(f, "@{}", index),
            Value::Tuple(values) => write!(
                f,
                "{{{}}}",
                values
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            ),
            Value::Record(fields) => write!(
                f,
                "{{{}}}",
                fields
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<String>>()
                    .join(",")
            ),
            Value::Variant(tag, value) => write!(f, "<{}={}>", tag, value),
        }
    }
}
