//! tailwind-resolver: resolves semantic facts about Tailwind CSS utility
//! classes (canonical decomposition, sort order, mutual conflicts,
//! legality) for consumption by lint rules.
//!
//! Lint visitors are synchronous and cannot suspend, so the asynchronous,
//! version-dependent resolution work runs in a dedicated worker process
//! per operation and is exposed back through a blocking bridge. Expensive
//! framework-context construction is memoized per config file and
//! invalidated by modification time.

pub mod audits;
pub mod bridge;
pub mod cache;
pub mod canonical;
pub mod components;
pub mod context;
pub mod dissect;
pub mod engine;
pub mod errors;
pub mod order;
pub mod protocol;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod shorthand;
#[cfg(feature = "worker")]
pub mod worker;

pub use audits::DeprecatedClass;
pub use bridge::{BridgeConfig, WorkerBridge, DEFAULT_TIMEOUT};
pub use cache::FileCache;
pub use canonical::{CanonicalClasses, CanonicalGroup, CanonicalOptions};
pub use context::FrameworkContext;
pub use dissect::{build_class, dissect_class, ClassSyntax, DissectedClass, VariantPrinting};
pub use engine::{FactEngine, FactResolver, LegacyEngine, ModernEngine};
pub use errors::{ResolverError, Result};
pub use order::{ClassOrderEntry, Conflict, ConflictingClasses};
pub use protocol::{FactPayload, Operation, Request, Response, Warning};
pub use resolver::{ResolverSettings, TailwindResolver};
pub use semver::{SemanticVersion, SUPPORTED_MAJORS};
pub use shorthand::ShorthandGroup;
#[cfg(feature = "worker")]
pub use worker::{serve, WorkerOptions};
