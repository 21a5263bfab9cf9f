//! End-to-end tests: the synchronous bridge talking to the real worker
//! binary over its frame protocol.

use std::path::PathBuf;
use std::time::Duration;

use tailwind_resolver::{
    BridgeConfig, CanonicalOptions, Operation, Request, ResolverError, ResolverSettings,
    SemanticVersion, TailwindResolver, WorkerBridge,
};

fn worker_program() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tailwind-resolver-worker"))
}

fn spawn_worker(operation: Operation, major: u64) -> WorkerBridge {
    let config = BridgeConfig::for_operation(worker_program(), operation, major, true);
    WorkerBridge::spawn(operation, &config).expect("worker should spawn")
}

fn request(op: Operation, classes: &[&str]) -> Request {
    Request {
        op,
        classes: classes.iter().map(|c| c.to_string()).collect(),
        options: None,
        config_path: None,
        cwd: std::env::temp_dir(),
    }
}

#[test]
fn test_class_order_through_worker() {
    let mut bridge = spawn_worker(Operation::ClassOrder, 4);

    let (payload, warnings) = bridge
        .request(&request(Operation::ClassOrder, &["flex", "hidden", "unknown-class-xyz"]))
        .unwrap();

    // No config path: the default-theme warning must ride along.
    assert_eq!(warnings.len(), 1);

    match payload {
        tailwind_resolver::FactPayload::ClassOrder { class_order } => {
            assert_eq!(class_order.len(), 3);
            let flex = class_order[0].1.expect("flex is a known utility");
            let hidden = class_order[1].1.expect("hidden is a known utility");
            assert!(flex < hidden);
            assert_eq!(class_order[2].1, None);
        }
        other => panic!("wrong payload: {other:?}"),
    }
}

#[test]
fn test_requests_are_serialized_in_order() {
    let mut bridge = spawn_worker(Operation::ClassOrder, 4);

    for classes in [&["flex"][..], &["hidden"][..], &["mt-2", "mb-2"][..]] {
        let (payload, _) = bridge.request(&request(Operation::ClassOrder, classes)).unwrap();
        match payload {
            tailwind_resolver::FactPayload::ClassOrder { class_order } => {
                assert_eq!(class_order.len(), classes.len());
                assert_eq!(class_order[0].0, classes[0]);
            }
            other => panic!("wrong payload: {other:?}"),
        }
    }
}

#[test]
fn test_worker_error_is_reraised_with_message() {
    // A class-order worker refuses prefix requests.
    let mut bridge = spawn_worker(Operation::ClassOrder, 4);

    let err = bridge.request(&request(Operation::Prefix, &[])).unwrap_err();
    match err {
        ResolverError::Worker { message } => {
            assert!(message.contains("class-order"), "message: {message}");
        }
        other => panic!("expected Worker error, got {other}"),
    }
}

#[test]
fn test_bridge_timeout_is_distinct() {
    // `sleep` never answers on stdout, so the request must time out rather
    // than fail as a computation error.
    let config = BridgeConfig {
        program: PathBuf::from("sleep"),
        args: vec!["30".to_string()],
        timeout: Duration::from_millis(250),
    };
    let mut bridge = WorkerBridge::spawn(Operation::ClassOrder, &config).unwrap();

    let err = bridge.request(&request(Operation::ClassOrder, &["flex"])).unwrap_err();
    assert!(
        matches!(err, ResolverError::BridgeTimeout { .. }),
        "expected BridgeTimeout, got {err}"
    );
}

#[test]
fn test_spawn_failure_is_fatal() {
    let config = BridgeConfig {
        program: PathBuf::from("/definitely/not/a/real/worker"),
        args: vec![],
        timeout: Duration::from_secs(1),
    };
    let err = WorkerBridge::spawn(Operation::Prefix, &config).unwrap_err();
    assert!(matches!(err, ResolverError::WorkerSpawn { .. }));
}

#[test]
fn test_unsupported_major_kills_worker_startup() {
    // The worker itself refuses to serve major 2; the bridge sees the
    // channel close instead of a response.
    let mut bridge = spawn_worker(Operation::ClassOrder, 2);
    let err = bridge.request(&request(Operation::ClassOrder, &["flex"])).unwrap_err();
    // Depending on how quickly the worker dies, the failure surfaces as a
    // closed channel or a broken pipe, never as a successful response.
    assert!(
        matches!(
            err,
            ResolverError::WorkerClosed { .. } | ResolverError::Worker { .. } | ResolverError::Io(_)
        ),
        "got {err}"
    );
}

fn resolver_for(version: SemanticVersion, config_path: Option<PathBuf>) -> TailwindResolver {
    let mut settings = ResolverSettings::new(std::env::temp_dir());
    settings.version = Some(version);
    settings.worker_program = Some(worker_program());
    settings.config_path = config_path;
    settings.no_cache = true;
    TailwindResolver::new(settings).expect("resolver should construct")
}

#[test]
fn test_resolver_facade_end_to_end() {
    let mut resolver = resolver_for(SemanticVersion::new(4, 1, 0), None);

    let (order, _) = resolver
        .class_order(&["flex".to_string(), "mystery-thing".to_string()])
        .unwrap();
    assert!(order[0].1.is_some());
    assert_eq!(order[1].1, None);

    let (dissected, _) = resolver
        .dissected_classes(&["hover:-mt-2!".to_string()])
        .unwrap();
    let parts = &dissected["hover:-mt-2!"];
    assert_eq!(parts.variants, vec!["hover"]);
    assert_eq!(parts.base, "mt-2");
    assert!(parts.negative);
    assert_eq!(parts.important, (false, true));

    let (canonical, _) = resolver
        .canonical_classes(&["mt-[0.5rem]".to_string()], CanonicalOptions::default())
        .unwrap();
    assert_eq!(canonical["mt-[0.5rem]"].output, "mt-2");

    let (unknown, _) = resolver
        .unknown_classes(&["flex".to_string(), "mt-red-500".to_string()])
        .unwrap();
    assert_eq!(unknown, vec!["mt-red-500"]);
}

#[test]
fn test_resolver_with_entry_point_config() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("app.css");
    std::fs::write(
        &entry,
        r#"
        @import "tailwindcss" prefix(tw);
        @theme {
            --color-primary: #1a73e8;
        }
        @layer components {
            .card {}
            .btn {}
        }
        "#,
    )
    .unwrap();

    let mut resolver = resolver_for(SemanticVersion::new(4, 1, 0), Some(entry));

    let ((prefix, suffix), warnings) = resolver.prefix().unwrap();
    assert_eq!(prefix, "tw");
    assert_eq!(suffix, ":");
    assert!(warnings.is_empty());

    let (components, _) = resolver.custom_component_classes().unwrap();
    assert_eq!(components, vec!["card", "btn"]);

    // The spec example: a prefixed, varianted, negative, important class.
    let (dissected, _) = resolver
        .dissected_classes(&["tw:hover:-mt-2!".to_string()])
        .unwrap();
    let parts = &dissected["tw:hover:-mt-2!"];
    assert_eq!(parts.prefix, "tw");
    assert_eq!(parts.variants, vec!["hover"]);
    assert_eq!(parts.base, "mt-2");
    assert!(parts.negative);
    assert_eq!(parts.important, (false, true));

    // A theme-registered custom color is not unregistered.
    let (unregistered, _) = resolver
        .unregistered_classes(&["tw:bg-primary".to_string(), "tw:bg-mystery".to_string()])
        .unwrap();
    assert_eq!(unregistered, vec!["tw:bg-mystery"]);
}

#[test]
fn test_missing_config_degrades_with_warning() {
    let mut resolver = resolver_for(
        SemanticVersion::new(4, 1, 0),
        Some(PathBuf::from("missing/app.css")),
    );

    let ((prefix, _), warnings) = resolver.prefix().unwrap();
    assert!(prefix.is_empty());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].option, "entryPoint");
}

#[test]
fn test_legacy_resolver_identity_canonicalization() {
    let mut resolver = resolver_for(SemanticVersion::new(3, 4, 17), None);

    let (canonical, _) = resolver
        .canonical_classes(&["mt-[0.5rem]".to_string()], CanonicalOptions::default())
        .unwrap();
    assert_eq!(canonical["mt-[0.5rem]"].output, "mt-[0.5rem]");
}
