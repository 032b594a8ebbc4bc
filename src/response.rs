//! The one place raw gateway replies become typed values.
//!
//! Nothing here touches application state: callers mutate only after these
//! functions return `Ok`.

use serde_json::Value;
use tracing::{error, warn};

use crate::discriminator::{self, PayloadKind};
use crate::envelope::{Envelope, ResponseData};
use crate::schema;
use crate::CoreResult;

/// Validates a raw reply into an [`Envelope`] without interpreting it.
pub fn parse_response(raw: &Value) -> CoreResult<Envelope> {
    let envelope = schema::validate(raw).map_err(|e| {
        error!(
            issues = e.len(),
            first = %e.first().map(ToString::to_string).unwrap_or_default(),
            tree = %serde_json::to_string(&e.tree()).unwrap_or_default(),
            "Backend reply failed validation"
        );
        e
    })?;

    if let Some(anomaly) = envelope.anomaly() {
        warn!(%anomaly, "Backend reply violates the envelope protocol");
    }

    Ok(envelope)
}

/// Validates a raw reply and resolves it into its payload or fault.
pub fn parse_payload(raw: &Value) -> CoreResult<Option<ResponseData>> {
    parse_response(raw)?.into_result()
}

/// Like [`parse_payload`], but the payload must be present and of `kind`.
pub fn parse_expected(raw: &Value, kind: PayloadKind) -> CoreResult<ResponseData> {
    let data = parse_payload(raw)?;
    discriminator::expect(data, kind).map_err(|e| {
        error!(expected = %e.expected, found = ?e.found, "Backend reply carries the wrong payload");
        e.into()
    })
}
