//! Version dispatch: one fact engine per supported major version, selected
//! once at construction and held for the process lifetime. There is no
//! unconfigured state: the factory either returns a ready engine or fails
//! with the unsupported-version error.

use indexmap::IndexMap;

use crate::audits::{self, DeprecatedClass};
use crate::canonical::{self, CanonicalClasses, CanonicalOptions};
use crate::context::FrameworkContext;
use crate::dissect::{self, ClassSyntax, DissectedClass};
use crate::errors::Result;
use crate::order::{self, ClassOrderEntry, ConflictingClasses};
use crate::semver::SemanticVersion;
use crate::shorthand::{self, ShorthandGroup};

/// The fact-producing operations, implemented once per major version.
pub trait FactResolver {
    fn syntax(&self) -> ClassSyntax;

    fn class_order(&self, context: &FrameworkContext, classes: &[String]) -> Vec<ClassOrderEntry> {
        order::class_order(context, self.syntax(), classes)
    }

    fn dissected_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
    ) -> IndexMap<String, DissectedClass> {
        dissect::dissect_classes(context, self.syntax(), classes)
    }

    fn build_class(&self, parts: &DissectedClass) -> String {
        dissect::build_class(self.syntax(), parts)
    }

    fn conflicting_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
    ) -> ConflictingClasses {
        order::conflicting_classes(context, self.syntax(), classes)
    }

    fn canonical_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
        options: &CanonicalOptions,
    ) -> CanonicalClasses;

    fn prefix(&self, context: &FrameworkContext) -> (String, String);

    fn unknown_classes(&self, context: &FrameworkContext, classes: &[String]) -> Vec<String> {
        audits::unknown_classes(context, self.syntax(), classes)
    }

    fn unregistered_classes(&self, context: &FrameworkContext, classes: &[String]) -> Vec<String> {
        audits::unregistered_classes(context, self.syntax(), classes)
    }

    fn deprecated_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
    ) -> Vec<DeprecatedClass> {
        audits::deprecated_classes(context, self.syntax(), classes)
    }

    fn shorthand_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
    ) -> Vec<ShorthandGroup> {
        shorthand::shorthand_classes(context, self.syntax(), classes)
    }

    fn custom_component_classes(&self, context: &FrameworkContext) -> Vec<String> {
        context.component_classes.clone()
    }
}

/// v3 resolver: legacy syntax, no canonicalization support.
#[derive(Debug)]
pub struct LegacyEngine;

impl FactResolver for LegacyEngine {
    fn syntax(&self) -> ClassSyntax {
        ClassSyntax::Legacy
    }

    fn canonical_classes(
        &self,
        _context: &FrameworkContext,
        classes: &[String],
        _options: &CanonicalOptions,
    ) -> CanonicalClasses {
        // No framework support on this major: identity mapping.
        canonical::identity_canonical(classes)
    }

    fn prefix(&self, context: &FrameworkContext) -> (String, String) {
        // The legacy prefix already carries its joining dash (`tw-`).
        (context.prefix.clone(), String::new())
    }
}

/// v4 resolver: modern syntax, full canonicalization.
#[derive(Debug)]
pub struct ModernEngine;

impl FactResolver for ModernEngine {
    fn syntax(&self) -> ClassSyntax {
        ClassSyntax::Modern
    }

    fn canonical_classes(
        &self,
        context: &FrameworkContext,
        classes: &[String],
        options: &CanonicalOptions,
    ) -> CanonicalClasses {
        canonical::canonical_classes(context, self.syntax(), classes, options)
    }

    fn prefix(&self, context: &FrameworkContext) -> (String, String) {
        // The modern prefix is a bare segment joined by the separator.
        if context.prefix.is_empty() {
            (String::new(), String::new())
        } else {
            (context.prefix.clone(), context.separator.clone())
        }
    }
}

/// Closed tagged union over the supported majors.
#[derive(Debug)]
pub enum FactEngine {
    V3(LegacyEngine),
    V4(ModernEngine),
}

impl FactEngine {
    /// Select the implementation for a detected version. Fails fast on an
    /// unsupported major; nothing downstream ever re-dispatches.
    pub fn for_version(version: &SemanticVersion) -> Result<Self> {
        version.ensure_supported()?;
        Ok(match version.major {
            3 => FactEngine::V3(LegacyEngine),
            _ => FactEngine::V4(ModernEngine),
        })
    }

    pub fn for_major(major: u64) -> Result<Self> {
        Self::for_version(&SemanticVersion::new(major, 0, 0))
    }

    pub fn resolver(&self) -> &dyn FactResolver {
        match self {
            FactEngine::V3(engine) => engine,
            FactEngine::V4(engine) => engine,
        }
    }

    pub fn major(&self) -> u64 {
        match self {
            FactEngine::V3(_) => 3,
            FactEngine::V4(_) => 4,
        }
    }
}
