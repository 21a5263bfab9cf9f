//! Caller-side facade: a synchronous resolver that owns one worker bridge
//! per operation kind and exposes every fact operation as a blocking call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;

use crate::audits::DeprecatedClass;
use crate::bridge::{BridgeConfig, WorkerBridge, DEFAULT_TIMEOUT};
use crate::canonical::{CanonicalClasses, CanonicalOptions};
use crate::dissect::DissectedClass;
use crate::errors::{ResolverError, Result};
use crate::order::{ClassOrderEntry, ConflictingClasses};
use crate::protocol::{FactPayload, Operation, Request, Warning};
use crate::semver::{self, SemanticVersion};
use crate::shorthand::ShorthandGroup;

/// Construction parameters for a [`TailwindResolver`].
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Project root; version detection and relative config paths resolve
    /// against it.
    pub cwd: PathBuf,
    /// The CSS entry point (v4) or JSON config (v3), if the project has one.
    pub config_path: Option<PathBuf>,
    /// Skip filesystem version detection and use this version instead.
    pub version: Option<SemanticVersion>,
    /// Worker executable; defaults to `tailwind-resolver-worker` next to
    /// the current executable.
    pub worker_program: Option<PathBuf>,
    pub timeout: Duration,
    /// Disable worker-side context caching (test/debug mode).
    pub no_cache: bool,
}

impl ResolverSettings {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            config_path: None,
            version: None,
            worker_program: None,
            timeout: DEFAULT_TIMEOUT,
            no_cache: false,
        }
    }
}

/// A fact + the configuration warnings accumulated while resolving it.
pub type FactResult<T> = Result<(T, Vec<Warning>)>;

/// Resolves semantic facts about utility classes by delegating to
/// version-dispatched workers. Two-phase construction: [`Self::new`]
/// resolves and checks the framework version, so an unconfigured resolver
/// never exists.
#[derive(Debug)]
pub struct TailwindResolver {
    version: SemanticVersion,
    settings: ResolverSettings,
    bridges: HashMap<Operation, WorkerBridge>,
}

impl TailwindResolver {
    /// Resolve the installed framework version (or take the override) and
    /// fail fast on an unsupported major, before any worker is contacted.
    pub fn new(settings: ResolverSettings) -> Result<Self> {
        let version = match &settings.version {
            Some(version) => version.clone(),
            None => semver::resolve_installed_version(&settings.cwd)?,
        };
        version.ensure_supported()?;

        Ok(Self {
            version,
            settings,
            bridges: HashMap::new(),
        })
    }

    pub fn version(&self) -> &SemanticVersion {
        &self.version
    }

    pub fn class_order(&mut self, classes: &[String]) -> FactResult<Vec<ClassOrderEntry>> {
        match self.request(Operation::ClassOrder, classes, None)? {
            (FactPayload::ClassOrder { class_order }, warnings) => Ok((class_order, warnings)),
            (other, _) => Err(unexpected_payload(Operation::ClassOrder, &other)),
        }
    }

    pub fn prefix(&mut self) -> FactResult<(String, String)> {
        match self.request(Operation::Prefix, &[], None)? {
            (FactPayload::Prefix { prefix, suffix }, warnings) => Ok(((prefix, suffix), warnings)),
            (other, _) => Err(unexpected_payload(Operation::Prefix, &other)),
        }
    }

    pub fn dissected_classes(
        &mut self,
        classes: &[String],
    ) -> FactResult<IndexMap<String, DissectedClass>> {
        match self.request(Operation::DissectedClasses, classes, None)? {
            (FactPayload::DissectedClasses { dissected_classes }, warnings) => {
                Ok((dissected_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::DissectedClasses, &other)),
        }
    }

    pub fn conflicting_classes(&mut self, classes: &[String]) -> FactResult<ConflictingClasses> {
        match self.request(Operation::ConflictingClasses, classes, None)? {
            (FactPayload::ConflictingClasses { conflicting_classes }, warnings) => {
                Ok((conflicting_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::ConflictingClasses, &other)),
        }
    }

    pub fn canonical_classes(
        &mut self,
        classes: &[String],
        options: CanonicalOptions,
    ) -> FactResult<CanonicalClasses> {
        match self.request(Operation::CanonicalClasses, classes, Some(options))? {
            (FactPayload::CanonicalClasses { canonical_classes }, warnings) => {
                Ok((canonical_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::CanonicalClasses, &other)),
        }
    }

    pub fn unknown_classes(&mut self, classes: &[String]) -> FactResult<Vec<String>> {
        match self.request(Operation::UnknownClasses, classes, None)? {
            (FactPayload::UnknownClasses { unknown_classes }, warnings) => {
                Ok((unknown_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::UnknownClasses, &other)),
        }
    }

    pub fn unregistered_classes(&mut self, classes: &[String]) -> FactResult<Vec<String>> {
        match self.request(Operation::UnregisteredClasses, classes, None)? {
            (FactPayload::UnregisteredClasses { unregistered_classes }, warnings) => {
                Ok((unregistered_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::UnregisteredClasses, &other)),
        }
    }

    pub fn deprecated_classes(&mut self, classes: &[String]) -> FactResult<Vec<DeprecatedClass>> {
        match self.request(Operation::DeprecatedClasses, classes, None)? {
            (FactPayload::DeprecatedClasses { deprecated_classes }, warnings) => {
                Ok((deprecated_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::DeprecatedClasses, &other)),
        }
    }

    pub fn shorthand_classes(&mut self, classes: &[String]) -> FactResult<Vec<ShorthandGroup>> {
        match self.request(Operation::ShorthandClasses, classes, None)? {
            (FactPayload::ShorthandClasses { shorthand_classes }, warnings) => {
                Ok((shorthand_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::ShorthandClasses, &other)),
        }
    }

    pub fn custom_component_classes(&mut self) -> FactResult<Vec<String>> {
        match self.request(Operation::CustomComponentClasses, &[], None)? {
            (FactPayload::CustomComponentClasses { custom_component_classes }, warnings) => {
                Ok((custom_component_classes, warnings))
            }
            (other, _) => Err(unexpected_payload(Operation::CustomComponentClasses, &other)),
        }
    }

    fn request(
        &mut self,
        operation: Operation,
        classes: &[String],
        options: Option<CanonicalOptions>,
    ) -> Result<(FactPayload, Vec<Warning>)> {
        let request = Request {
            op: operation,
            classes: classes.to_vec(),
            options,
            config_path: self.settings.config_path.clone(),
            cwd: self.settings.cwd.clone(),
        };
        self.bridge_for(operation)?.request(&request)
    }

    /// Bridges are created lazily, one per operation kind, and reused for
    /// the resolver's lifetime.
    fn bridge_for(&mut self, operation: Operation) -> Result<&mut WorkerBridge> {
        if !self.bridges.contains_key(&operation) {
            let program = self.worker_program()?;
            let mut config = BridgeConfig::for_operation(
                program,
                operation,
                self.version.major,
                self.settings.no_cache,
            );
            config.timeout = self.settings.timeout;
            let bridge = WorkerBridge::spawn(operation, &config)?;
            self.bridges.insert(operation, bridge);
        }
        self.bridges
            .get_mut(&operation)
            .ok_or_else(|| ResolverError::Config {
                message: format!("no bridge available for `{operation}`"),
            })
    }

    fn worker_program(&self) -> Result<PathBuf> {
        if let Some(program) = &self.settings.worker_program {
            return Ok(program.clone());
        }
        let current = std::env::current_exe().map_err(|e| ResolverError::Config {
            message: format!("cannot locate the worker executable: {e}"),
        })?;
        let directory = current.parent().ok_or_else(|| ResolverError::Config {
            message: "cannot locate the worker executable: current executable has no parent directory"
                .to_string(),
        })?;
        Ok(directory.join("tailwind-resolver-worker"))
    }
}

fn unexpected_payload(operation: Operation, payload: &FactPayload) -> ResolverError {
    ResolverError::Protocol {
        message: format!("worker for `{operation}` answered with a foreign payload: {payload:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_fails_before_worker_contact() {
        let mut settings = ResolverSettings::new(".");
        settings.version = Some(SemanticVersion::new(2, 2, 19));
        // No worker program exists anywhere; construction must still fail
        // on the version alone.
        settings.worker_program = Some(PathBuf::from("/definitely/not/here"));

        let err = TailwindResolver::new(settings).unwrap_err();
        match err {
            ResolverError::UnsupportedVersion { version, .. } => {
                assert_eq!(version.to_string(), "2.2.19");
            }
            other => panic!("expected UnsupportedVersion, got {other}"),
        }
    }

    #[test]
    fn test_version_override_skips_detection() {
        let mut settings = ResolverSettings::new("/nonexistent/project");
        settings.version = Some(SemanticVersion::new(4, 1, 0));
        let resolver = TailwindResolver::new(settings).unwrap();
        assert_eq!(resolver.version().major, 4);
    }

    #[test]
    fn test_missing_package_metadata_is_detection_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ResolverSettings::new(dir.path());
        let err = TailwindResolver::new(settings).unwrap_err();
        assert!(matches!(err, ResolverError::VersionDetection { .. }));
    }
}
