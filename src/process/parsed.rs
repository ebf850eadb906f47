// src/process/parsed.rs

use serde::{Serialize, Serializer};

/// Outcome of reading one raw cell.
///
/// `Absent` is the "no value" marker: it is distinct from a legitimate zero
/// and is written out as an empty CSV cell or a null.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Parsed<T> {
    Present(T),
    #[default]
    Absent,
}

impl<T> Parsed<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Parsed::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Parsed::Absent)
    }

    pub fn as_ref(&self) -> Parsed<&T> {
        match self {
            Parsed::Present(v) => Parsed::Present(v),
            Parsed::Absent => Parsed::Absent,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Parsed<U> {
        match self {
            Parsed::Present(v) => Parsed::Present(f(v)),
            Parsed::Absent => Parsed::Absent,
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.into()
    }
}

impl<T> From<Option<T>> for Parsed<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Parsed::Present(v),
            None => Parsed::Absent,
        }
    }
}

impl<T> From<Parsed<T>> for Option<T> {
    fn from(p: Parsed<T>) -> Self {
        match p {
            Parsed::Present(v) => Some(v),
            Parsed::Absent => None,
        }
    }
}

impl<T: Serialize> Serialize for Parsed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Parsed::Present(v) => serializer.serialize_some(v),
            Parsed::Absent => serializer.serialize_none(),
        }
    }
}
