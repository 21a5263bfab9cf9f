use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ResolverError, Result};

/// Major versions this crate knows how to resolve facts for.
pub const SUPPORTED_MAJORS: &[u64] = &[3, 4];

/// A parsed Tailwind CSS version, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release identifier (`beta.3` in `4.0.0-beta.3`), if any.
    pub identifier: Option<String>,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            identifier: None,
        }
    }

    /// Parse a dotted-numeric version string with an optional pre-release
    /// suffix, e.g. `3.4.17` or `4.0.0-beta.3`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (numbers, identifier) = match input.split_once('-') {
            Some((head, tail)) if !tail.is_empty() => (head, Some(tail.to_string())),
            Some((head, _)) => (head, None),
            None => (input, None),
        };

        let mut parts = numbers.split('.');
        let mut next_number = |name: &str| -> Result<u64> {
            let part = parts.next().unwrap_or("");
            part.parse::<u64>()
                .map_err(|_| ResolverError::VersionDetection {
                    message: format!("invalid {name} component in version string `{input}`"),
                })
        };

        let major = next_number("major")?;
        let minor = next_number("minor")?;
        let patch = next_number("patch")?;

        if parts.next().is_some() {
            return Err(ResolverError::VersionDetection {
                message: format!("too many components in version string `{input}`"),
            });
        }

        Ok(Self {
            major,
            minor,
            patch,
            identifier,
        })
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_MAJORS.contains(&self.major)
    }

    /// Fail fast with a fatal configuration error when the detected major
    /// is outside the supported set.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(ResolverError::UnsupportedVersion {
                version: self.clone(),
                supported: SUPPORTED_MAJORS,
            })
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(identifier) = &self.identifier {
            write!(f, "-{identifier}")?;
        }
        Ok(())
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            // A pre-release orders before its release.
            .then_with(|| match (&self.identifier, &other.identifier) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shape of the `package.json` fields we care about.
#[derive(Debug, Deserialize)]
struct PackageMetadata {
    version: String,
}

/// Read the installed Tailwind package metadata under `cwd` and resolve its
/// version. Called once per resolver; the result is held for its lifetime.
pub fn resolve_installed_version(cwd: &Path) -> Result<SemanticVersion> {
    let manifest = cwd
        .join("node_modules")
        .join("tailwindcss")
        .join("package.json");

    let content =
        std::fs::read_to_string(&manifest).map_err(|e| ResolverError::VersionDetection {
            message: format!("failed to read {}: {e}", manifest.display()),
        })?;

    let metadata: PackageMetadata =
        serde_json::from_str(&content).map_err(|e| ResolverError::VersionDetection {
            message: format!("failed to parse {}: {e}", manifest.display()),
        })?;

    SemanticVersion::parse(&metadata.version)
}
