//! Required-attribute lookup
//!
//! A required fact must be present and truthy. `None`, zero, the empty
//! string, `false` and empty collections all count as missing.

use std::collections::BTreeSet;

use super::host::{CompilerId, HostOs};
use crate::error::ResolveError;
use crate::feature::FeatureSet;

/// Values that can be absent-in-spirit even when present
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for u32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for BTreeSet<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for FeatureSet {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for HostOs {
    fn is_truthy(&self) -> bool {
        !self.as_str().is_empty()
    }
}

impl Truthy for CompilerId {
    fn is_truthy(&self) -> bool {
        !self.as_str().is_empty()
    }
}

/// Look up a required attribute, failing with its name when missing.
pub fn required<'a, T: Truthy + ?Sized>(
    name: &str,
    value: Option<&'a T>,
) -> Result<&'a T, ResolveError> {
    match value {
        Some(v) if v.is_truthy() => Ok(v),
        _ => Err(ResolveError::missing(name)),
    }
}

/// Whether a required attribute is missing
pub fn is_missing<T: Truthy + ?Sized>(value: Option<&T>) -> bool {
    !value.map(Truthy::is_truthy).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_missing() {
        let err = required::<String>("host_os", None).unwrap_err();
        assert!(matches!(err, ResolveError::MissingAttribute { ref name } if name == "host_os"));
        assert!(err.to_string().contains("'host_os'"));
    }

    #[test]
    fn test_falsy_values_are_missing() {
        assert!(required("deflake_threshold", Some(&0u32)).is_err());
        assert!(required("clang", Some(&String::new())).is_err());
        assert!(required("clang", Some("")).is_err());
        assert!(required("cxx_mode_flags", Some(&Vec::<String>::new())).is_err());
        assert!(required("android", Some(&false)).is_err());
        assert!(required("features", Some(&BTreeSet::<String>::new())).is_err());
    }

    #[test]
    fn test_truthy_value_returned_unchanged() {
        let clang = "/usr/bin/clang".to_string();
        let value = required("clang", Some(&clang)).unwrap();
        assert!(std::ptr::eq(value, &clang));
        assert_eq!(required("deflake_threshold", Some(&10u32)).unwrap(), &10);
        assert_eq!(required("name", Some("0")).unwrap(), "0");
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing::<String>(None));
        assert!(is_missing(Some("")));
        assert!(!is_missing(Some("x86_64")));
    }
}
