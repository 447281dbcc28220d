//! A list that only accepts elements of the kinds chosen when it was built.
//!
//! Elements are a closed tagged type implementing [`Variant`]; the list keeps
//! the set of accepted kinds and checks it on every insertion. A failed
//! insertion leaves the list untouched.

use std::fmt;
use std::ops::Deref;

use serde_json::Value;

/// A value whose runtime kind belongs to a closed set.
pub trait Variant: fmt::Debug {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Kinds of JSON value, with numbers split into integers and floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl Variant for Value {
    type Kind = JsonKind;

    fn kind(&self) -> JsonKind {
        match self {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(n) if n.is_f64() => JsonKind::Float,
            Value::Number(_) => JsonKind::Integer,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TypedListError {
    #[error("The object \"{value}\" is not of type \"{accepted}\"")]
    TypeMismatch { value: String, accepted: String },
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered, mutable sequence restricted to a set of element kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedList<T: Variant> {
    accepted: Vec<T::Kind>,
    items: Vec<T>,
}

impl<T: Variant> TypedList<T> {
    /// Builds a list accepting `accepted` kinds, seeded with `items`.
    /// Fails without producing a list if any item has another kind.
    pub fn new(
        accepted: impl IntoIterator<Item = T::Kind>,
        items: impl IntoIterator<Item = T>,
    ) -> Result<Self, TypedListError> {
        let mut list = Self {
            accepted: accepted.into_iter().collect(),
            items: Vec::new(),
        };
        list.extend(items)?;
        Ok(list)
    }

    pub fn accepted(&self) -> &[T::Kind] {
        &self.accepted
    }

    pub fn accepts(&self, value: &T) -> bool {
        self.accepted.contains(&value.kind())
    }

    fn validate(&self, value: &T) -> Result<(), TypedListError> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(TypedListError::TypeMismatch {
            value: format!("{:?}", value),
            accepted: format!("{:?}", self.accepted),
        })
    }

    /// Inserts at `index`, shifting later elements right. `index == len()`
    /// appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), TypedListError> {
        self.validate(&value)?;
        if index > self.items.len() {
            return Err(TypedListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Replaces the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, TypedListError> {
        self.validate(&value)?;
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(TypedListError::IndexOutOfRange { index, len }),
        }
    }

    pub fn push(&mut self, value: T) -> Result<(), TypedListError> {
        self.insert(self.items.len(), value)
    }

    /// Appends every value, or none of them if any is rejected.
    pub fn extend(&mut self, values: impl IntoIterator<Item = T>) -> Result<(), TypedListError> {
        let values: Vec<T> = values.into_iter().collect();
        for value in &values {
            self.validate(value)?;
        }
        self.items.extend(values);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T, TypedListError> {
        if index >= self.items.len() {
            return Err(TypedListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T: Variant> Deref for TypedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T: Variant> IntoIterator for &'a TypedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Variant + fmt::Display> fmt::Display for TypedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}
