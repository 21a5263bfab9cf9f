//! Wire contract between the synchronous bridge and the worker process:
//! one request/response schema per operation, length-prefixed JSON frames
//! (u32 big-endian length, then the payload).

use std::io::{Read, Write};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::audits::DeprecatedClass;
use crate::canonical::{CanonicalClasses, CanonicalOptions};
use crate::dissect::DissectedClass;
use crate::errors::{ResolverError, Result};
use crate::order::{ClassOrderEntry, ConflictingClasses};
use crate::shorthand::ShorthandGroup;

/// Upper bound on a single frame; anything larger is a protocol error.
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// A non-fatal diagnostic describing a configuration problem. Accumulated
/// per operation, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    /// The option the problem relates to (`entryPoint`, `tailwindConfig`).
    pub option: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The fact-producing operations a worker can serve. Each operation kind
/// owns its own worker process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    ClassOrder,
    Prefix,
    DissectedClasses,
    ConflictingClasses,
    CanonicalClasses,
    UnknownClasses,
    UnregisteredClasses,
    DeprecatedClasses,
    ShorthandClasses,
    CustomComponentClasses,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ClassOrder => "class-order",
            Operation::Prefix => "prefix",
            Operation::DissectedClasses => "dissected-classes",
            Operation::ConflictingClasses => "conflicting-classes",
            Operation::CanonicalClasses => "canonical-classes",
            Operation::UnknownClasses => "unknown-classes",
            Operation::UnregisteredClasses => "unregistered-classes",
            Operation::DeprecatedClasses => "deprecated-classes",
            Operation::ShorthandClasses => "shorthand-classes",
            Operation::CustomComponentClasses => "custom-component-classes",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to a worker. `config_path` and `cwd` travel on every
/// request; a missing config degrades to the default theme worker-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub op: Operation,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CanonicalOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub cwd: PathBuf,
}

/// Per-operation result payloads; field names are the discriminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactPayload {
    #[serde(rename_all = "camelCase")]
    ClassOrder { class_order: Vec<ClassOrderEntry> },
    #[serde(rename_all = "camelCase")]
    Prefix { prefix: String, suffix: String },
    #[serde(rename_all = "camelCase")]
    DissectedClasses {
        dissected_classes: IndexMap<String, DissectedClass>,
    },
    #[serde(rename_all = "camelCase")]
    ConflictingClasses {
        conflicting_classes: ConflictingClasses,
    },
    #[serde(rename_all = "camelCase")]
    CanonicalClasses { canonical_classes: CanonicalClasses },
    #[serde(rename_all = "camelCase")]
    UnknownClasses { unknown_classes: Vec<String> },
    #[serde(rename_all = "camelCase")]
    UnregisteredClasses { unregistered_classes: Vec<String> },
    #[serde(rename_all = "camelCase")]
    DeprecatedClasses {
        deprecated_classes: Vec<DeprecatedClass>,
    },
    #[serde(rename_all = "camelCase")]
    ShorthandClasses { shorthand_classes: Vec<ShorthandGroup> },
    #[serde(rename_all = "camelCase")]
    CustomComponentClasses {
        custom_component_classes: Vec<String>,
    },
}

/// Worker reply: either a result plus accumulated warnings, or a
/// marshalled error to re-raise caller-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FactPayload>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(result: FactPayload, warnings: Vec<Warning>) -> Self {
        Self {
            ok: true,
            result: Some(result),
            warnings,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            warnings: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Write one length-prefixed frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| ResolverError::Protocol {
        message: format!("frame of {} bytes exceeds the length prefix", payload.len()),
    })?;
    if len > MAX_FRAME_BYTES {
        return Err(ResolverError::Protocol {
            message: format!("frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit"),
        });
    }
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed frame. `Ok(None)` on a clean EOF at a frame
/// boundary: the peer closed the channel.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut header) {
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
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trip() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"hello").unwrap();
        write_frame(&mut buffer, b"").unwrap();

        let mut reader = buffer.as_slice();
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), b"hello");
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), b"");
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&u32::MAX.to_be_bytes());
        let err = read_frame(&mut buffer.as_slice()).unwrap_err();
        assert!(matches!(err, ResolverError::Protocol { .. }));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = Request {
            op: Operation::ClassOrder,
            classes: vec!["flex".to_string()],
            options: None,
            config_path: Some(PathBuf::from("app.css")),
            cwd: PathBuf::from("/project"),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["op"], "class-order");
        assert_eq!(json["configPath"], "app.css");
        assert_eq!(json["classes"][0], "flex");

        let parsed: Request = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.op, Operation::ClassOrder);
    }

    #[test]
    fn test_class_order_wire_shape() {
        let response = Response::success(
            FactPayload::ClassOrder {
                class_order: vec![
                    ClassOrderEntry("flex".to_string(), Some(100)),
                    ClassOrderEntry("mystery".to_string(), None),
                ],
            },
            Vec::new(),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["result"]["classOrder"][0][0], "flex");
        assert_eq!(json["result"]["classOrder"][0][1], 100);
        assert_eq!(json["result"]["classOrder"][1][1], serde_json::Value::Null);
    }

    #[test]
    fn test_payload_discriminates_by_field_name() {
        let response = Response::success(
            FactPayload::UnknownClasses {
                unknown_classes: vec!["mystery".to_string()],
            },
            Vec::new(),
        );

        let bytes = serde_json::to_vec(&response).unwrap();
        let parsed: Response = serde_json::from_slice(&bytes).unwrap();
        match parsed.result {
            Some(FactPayload::UnknownClasses { unknown_classes }) => {
                assert_eq!(unknown_classes, vec!["mystery"]);
            }
            other => panic!("wrong payload variant: {other:?}"),
        }
    }

    #[test]
    fn test_error_response_shape() {
        let response = Response::failure("context build exploded");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "context build exploded");
        assert!(json.get("result").is_none());
    }
}
