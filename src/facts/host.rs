//! Host platform and compiler identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host operating system as reported by the build (`CMAKE_HOST_SYSTEM_NAME`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HostOs {
    Linux,
    Darwin,
    FreeBSD,
    NetBSD,
    Other(String),
}

impl HostOs {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::FreeBSD => "FreeBSD",
            Self::NetBSD => "NetBSD",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for HostOs {
    fn from(name: &str) -> Self {
        match name {
            "Linux" => Self::Linux,
            "Darwin" => Self::Darwin,
            "FreeBSD" => Self::FreeBSD,
            "NetBSD" => Self::NetBSD,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for HostOs {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<HostOs> for String {
    fn from(host: HostOs) -> Self {
        host.as_str().to_string()
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler driver family (`CMAKE_C_COMPILER_ID`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompilerId {
    Clang,
    /// GCC-compatible driver; does not add sanitizer link flags on its own
    Gnu,
    Other(String),
}

impl CompilerId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clang => "Clang",
            Self::Gnu => "GNU",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for CompilerId {
    fn from(name: &str) -> Self {
        match name {
            "Clang" => Self::Clang,
            "GNU" => Self::Gnu,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CompilerId {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<CompilerId> for String {
    fn from(id: CompilerId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_names() {
        assert_eq!(HostOs::from("Darwin"), HostOs::Darwin);
        assert_eq!(HostOs::from("NetBSD").as_str(), "NetBSD");
        assert_eq!(HostOs::from("Windows"), HostOs::Other("Windows".to_string()));
        assert_eq!(HostOs::from("windows").to_string(), "windows");
    }

    #[test]
    fn test_compiler_ids() {
        assert_eq!(CompilerId::from("GNU"), CompilerId::Gnu);
        assert_eq!(CompilerId::from("Clang"), CompilerId::Clang);
        assert_eq!(CompilerId::from("AppleClang").as_str(), "AppleClang");
    }

    #[test]
    fn test_serde_as_strings() {
        let host: HostOs = serde_json::from_str("\"FreeBSD\"").unwrap();
        assert_eq!(host, HostOs::FreeBSD);
        assert_eq!(serde_json::to_string(&CompilerId::Gnu).unwrap(), "\"GNU\"");
    }
}
