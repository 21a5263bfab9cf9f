//! Worker-side serve loop: read request frames from stdin, resolve the
//! framework context through the file cache, dispatch the fact engine,
//! and write one response frame per request, in arrival order.
//!
//! Stdout carries the protocol; all logging goes to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::cache::FileCache;
use crate::context::{self, FrameworkContext};
use crate::engine::FactEngine;
use crate::errors::{ResolverError, Result};
use crate::protocol::{FactPayload, Operation, Request, Response, MAX_FRAME_BYTES};

/// Launch parameters for one dedicated worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub operation: Operation,
    pub major: u64,
    /// Disable context caching unconditionally (test/debug mode).
    pub no_cache: bool,
}

/// Run the serve loop until stdin closes. Fails fast before reading any
/// request when the major version is unsupported.
pub async fn serve(options: WorkerOptions) -> Result<()> {
    let engine = FactEngine::for_major(options.major)?;
    let cache: FileCache<Arc<FrameworkContext>> = FileCache::new(options.no_cache);

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();

    info!(operation = %options.operation, major = options.major, "worker ready");

    while let Some(frame) = read_frame_async(&mut stdin).await? {
        let response = match serde_json::from_slice::<Request>(&frame) {
            Ok(request) => handle_request(&engine, &options, &cache, request),
            Err(e) => Response::failure(format!("malformed request frame: {e}")),
        };
        let bytes = serde_json::to_vec(&response)?;
        write_frame_async(&mut stdout, &bytes).await?;
    }

    debug!(operation = %options.operation, "stdin closed, worker exiting");
    Ok(())
}

fn handle_request(
    engine: &FactEngine,
    options: &WorkerOptions,
    cache: &FileCache<Arc<FrameworkContext>>,
    request: Request,
) -> Response {
    if request.op != options.operation {
        return Response::failure(format!(
            "this worker serves `{}`, not `{}`",
            options.operation, request.op
        ));
    }

    let context = resolve_cached_context(options.major, cache, &request);
    let warnings = context.warnings.clone();
    let resolver = engine.resolver();

    let result = match request.op {
        Operation::ClassOrder => FactPayload::ClassOrder {
            class_order: resolver.class_order(&context, &request.classes),
        },
        Operation::Prefix => {
            let (prefix, suffix) = resolver.prefix(&context);
            FactPayload::Prefix { prefix, suffix }
        }
        Operation::DissectedClasses => FactPayload::DissectedClasses {
            dissected_classes: resolver.dissected_classes(&context, &request.classes),
        },
        Operation::ConflictingClasses => FactPayload::ConflictingClasses {
            conflicting_classes: resolver.conflicting_classes(&context, &request.classes),
        },
        Operation::CanonicalClasses => FactPayload::CanonicalClasses {
            canonical_classes: resolver.canonical_classes(
                &context,
                &request.classes,
                &request.options.unwrap_or_default(),
            ),
        },
        Operation::UnknownClasses => FactPayload::UnknownClasses {
            unknown_classes: resolver.unknown_classes(&context, &request.classes),
        },
        Operation::UnregisteredClasses => FactPayload::UnregisteredClasses {
            unregistered_classes: resolver.unregistered_classes(&context, &request.classes),
        },
        Operation::DeprecatedClasses => FactPayload::DeprecatedClasses {
            deprecated_classes: resolver.deprecated_classes(&context, &request.classes),
        },
        Operation::ShorthandClasses => FactPayload::ShorthandClasses {
            shorthand_classes: resolver.shorthand_classes(&context, &request.classes),
        },
        Operation::CustomComponentClasses => FactPayload::CustomComponentClasses {
            custom_component_classes: resolver.custom_component_classes(&context),
        },
    };

    Response::success(result, warnings)
}

/// One live context per (config path, mtime) pair. Requests without a
/// config path build an uncached default-theme context.
fn resolve_cached_context(
    major: u64,
    cache: &FileCache<Arc<FrameworkContext>>,
    request: &Request,
) -> Arc<FrameworkContext> {
    match &request.config_path {
        Some(config_path) => {
            let key: PathBuf = if config_path.is_absolute() {
                config_path.clone()
            } else {
                request.cwd.join(config_path)
            };
            cache.get_or_build(&key, || {
                Arc::new(context::resolve_context(major, Some(config_path), &request.cwd))
            })
        }
        None => Arc::new(context::resolve_context(major, None, &request.cwd)),
    }
}

async fn read_frame_async<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncReadExt + Unpin,
{
    let mut header = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut header).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(e.into());
    }

    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_BYTES {
        return Err(ResolverError::Protocol {
            message: format!("incoming frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit"),
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

async fn write_frame_async<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let len = u32::try_from(payload.len()).map_err(|_| ResolverError::Protocol {
        message: format!("frame of {} bytes exceeds the length prefix", payload.len()),
    })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
