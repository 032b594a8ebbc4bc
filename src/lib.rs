// lib.rs - launcher front-end core: reply contract, instance store, navigation

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

/// Declares a closed string enumeration as it appears on the wire, together with
/// its [`schema::WireEnum`] table so the validator can name the allowed values.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, schemars::JsonSchema,
        )]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::schema::WireEnum for $name {
            const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_wire(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::schema::WireEnum::as_wire(*self))
            }
        }
    };
}

pub mod app;
pub mod capabilities;
pub mod discriminator;
pub mod envelope;
pub mod event;
pub mod model;
pub mod navigation;
pub mod response;
pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{
    Capabilities, CommandGateway, Effect, GatewayCommand, GatewayError, Invoke, InvokeGateway,
};
pub use discriminator::{PayloadKind, WrongVariantError};
pub use envelope::{
    BackendErrorKind, ClientError, Envelope, ProtocolAnomaly, ResponseData, WindowActionResult,
};
pub use event::Event;
pub use model::{Instance, InstanceSummary, Loader, Model, View, ViewModel};
pub use navigation::Navigation;
pub use schema::{FieldPath, IssueCode, IssueTree, SchemaIssue, SchemaValidationError};
pub use store::{InstanceStore, LoadOrdering, LoadOutcome, StoreConfig};

// ============================================================================
// Error taxonomy
// ============================================================================

/// The three disjoint ways a backend round trip can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCategory {
    /// The gateway call itself did not complete.
    Transport,
    /// The reply does not honour the envelope/payload contract.
    Validation,
    /// The reply is well formed but the backend reports `success: false`.
    Application,
}

impl FaultCategory {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT",
            Self::Validation => "VALIDATION",
            Self::Application => "APPLICATION",
        }
    }
}

impl std::fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("gateway call failed: {0}")]
    Transport(#[from] GatewayError),

    #[error("backend reply failed validation: {0}")]
    Schema(#[from] SchemaValidationError),

    #[error("backend reply violates the envelope protocol: {0}")]
    Protocol(#[from] ProtocolAnomaly),

    #[error("unexpected payload: {0}")]
    WrongVariant(#[from] WrongVariantError),

    #[error("backend reported {0}")]
    Backend(ClientError),
}

impl CoreError {
    #[must_use]
    pub const fn category(&self) -> FaultCategory {
        match self {
            Self::Transport(_) => FaultCategory::Transport,
            Self::Schema(_) | Self::Protocol(_) | Self::WrongVariant(_) => {
                FaultCategory::Validation
            }
            Self::Backend(_) => FaultCategory::Application,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Schema(_) => "SCHEMA_VALIDATION_ERROR",
            Self::Protocol(_) => "PROTOCOL_ANOMALY",
            Self::WrongVariant(_) => "WRONG_VARIANT",
            Self::Backend(_) => "BACKEND_ERROR",
        }
    }

    /// Only an unreachable backend is worth another attempt; the core itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn backend_error(&self) -> Option<&ClientError> {
        match self {
            Self::Backend(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub const fn schema_error(&self) -> Option<&SchemaValidationError> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "The launcher backend is not responding. Please restart the launcher.".into()
            }
            Self::Schema(_) | Self::Protocol(_) | Self::WrongVariant(_) => {
                "The launcher backend sent an unexpected reply. Please contact support if this persists."
                    .into()
            }
            Self::Backend(e) => e.message().to_owned(),
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(e: ClientError) -> Self {
        Self::Backend(e)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
