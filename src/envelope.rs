use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::discriminator::PayloadKind;
use crate::model::Instance;
use crate::CoreError;

wire_enum! {
    /// Fault kinds the backend reports inside a failure envelope.
    pub enum BackendErrorKind {
        WindowMinimizeError,
        WindowIsNotMinimizable,
        WindowIsNotMaximizable,
        WindowMaximizeError,
        WindowIsNotClosable,
        WindowCloseError,
        LauncherError,
        ConfigError,
        MinecraftInstanceError,
        NetworkError,
        FileError,
        PermissionError,
        InstanceEncodeError,
        InvalidLoader,
    }
}

impl BackendErrorKind {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::WindowMinimizeError => "the window could not be minimized",
            Self::WindowIsNotMinimizable => "the window cannot be minimized",
            Self::WindowIsNotMaximizable => "the window cannot be maximized",
            Self::WindowMaximizeError => "the window could not be maximized",
            Self::WindowIsNotClosable => "the window cannot be closed",
            Self::WindowCloseError => "the window could not be closed",
            Self::LauncherError => "general launcher error",
            Self::ConfigError => "configuration error",
            Self::MinecraftInstanceError => "game instance error",
            Self::NetworkError => "network error",
            Self::FileError => "file system error",
            Self::PermissionError => "permission denied",
            Self::InstanceEncodeError => "the instance could not be encoded or decoded",
            Self::InvalidLoader => "invalid mod loader",
        }
    }

    #[must_use]
    pub const fn is_window_fault(self) -> bool {
        matches!(
            self,
            Self::WindowMinimizeError
                | Self::WindowIsNotMinimizable
                | Self::WindowIsNotMaximizable
                | Self::WindowMaximizeError
                | Self::WindowIsNotClosable
                | Self::WindowCloseError
        )
    }
}

wire_enum! {
    pub enum WindowActionResult {
        MinimizeSuccess,
        MaximizeSuccess,
        CloseSuccess,
    }
}

/// Error block of a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClientError {
    pub error_type: BackendErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClientError {
    #[must_use]
    pub const fn new(error_type: BackendErrorKind) -> Self {
        Self {
            error_type,
            error_message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Backend text when present, otherwise the kind's description.
    pub fn message(&self) -> &str {
        self.error_message
            .as_deref()
            .unwrap_or(self.error_type.description())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message())
    }
}

/// Payload of a success envelope. Externally tagged: exactly one key per value.
/// Its JSON schema is written by hand in [`crate::schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseData {
    MinecraftVersions(Vec<String>),
    Settings(Vec<String>),
    Instances(Vec<String>),
    WindowAction(WindowActionResult),
    InstanceData(Vec<u8>),
    InstancesVec(Vec<Instance>),
}

/// Outer wrapper of every backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    pub success: bool,
    pub error: Option<ClientError>,
    pub data: Option<ResponseData>,
}

impl Envelope {
    #[must_use]
    pub const fn success(data: ResponseData) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    #[must_use]
    pub const fn empty_success() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    #[must_use]
    pub const fn failure(error: ClientError) -> Self {
        Self {
            success: false,
            error: Some(error),
            data: None,
        }
    }

    /// First violation of the success/error/data protocol, if any.
    pub fn anomaly(&self) -> Option<ProtocolAnomaly> {
        match (self.success, &self.error, &self.data) {
            (true, Some(e), _) => Some(ProtocolAnomaly::ErrorOnSuccess(e.error_type)),
            (false, None, _) => Some(ProtocolAnomaly::FailureWithoutError),
            (false, Some(_), Some(d)) => Some(ProtocolAnomaly::DataOnFailure(d.kind())),
            _ => None,
        }
    }

    /// Resolves the envelope into its payload or the fault it carries.
    ///
    /// A failure envelope that also carries data still counts as a backend error;
    /// the stray payload is dropped.
    pub fn into_result(self) -> Result<Option<ResponseData>, CoreError> {
        match (self.success, self.error) {
            (true, None) => Ok(self.data),
            (true, Some(e)) => Err(ProtocolAnomaly::ErrorOnSuccess(e.error_type).into()),
            (false, Some(e)) => Err(CoreError::Backend(e)),
            (false, None) => Err(ProtocolAnomaly::FailureWithoutError.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ProtocolAnomaly {
    #[error("success envelope carries an error ({0})")]
    ErrorOnSuccess(BackendErrorKind),

    #[error("failure envelope carries no error")]
    FailureWithoutError,

    #[error("failure envelope carries a {0} payload")]
    DataOnFailure(PayloadKind),
}
