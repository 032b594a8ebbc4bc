use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::model::Instance;

/// Commands the backend bridge understands, by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayCommand {
    SaveInstance,
    GetInstances,
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
}

impl GatewayCommand {
    pub const ALL: [Self; 5] = [
        Self::SaveInstance,
        Self::GetInstances,
        Self::CloseWindow,
        Self::MinimizeWindow,
        Self::MaximizeWindow,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SaveInstance => "save_instance",
            Self::GetInstances => "get_instances",
            Self::CloseWindow => "close_window",
            Self::MinimizeWindow => "minimize_window",
            Self::MaximizeWindow => "maximize_window",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    #[must_use]
    pub const fn is_window_action(self) -> bool {
        matches!(
            self,
            Self::CloseWindow | Self::MinimizeWindow | Self::MaximizeWindow
        )
    }
}

impl fmt::Display for GatewayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The call never produced a reply to validate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("backend unreachable during {command}: {message}")]
    Unreachable {
        command: GatewayCommand,
        message: String,
    },

    /// The bridge refused the call. The payload is whatever it rejected with.
    #[error("bridge rejected {command}: {payload}")]
    Rejected {
        command: GatewayCommand,
        payload: Value,
    },

    #[error("could not encode arguments for {command}: {message}")]
    Encode {
        command: GatewayCommand,
        message: String,
    },
}

impl GatewayError {
    pub fn unreachable(command: GatewayCommand, message: impl Into<String>) -> Self {
        Self::Unreachable {
            command,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn command(&self) -> GatewayCommand {
        match self {
            Self::Unreachable { command, .. }
            | Self::Rejected { command, .. }
            | Self::Encode { command, .. } => *command,
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Typed access to the backend. Every method returns the raw, unvalidated reply.
#[async_trait::async_trait]
pub trait CommandGateway: Send + Sync {
    async fn save_instance(&self, instance: &Instance) -> Result<Value, GatewayError>;
    async fn get_instances(&self) -> Result<Value, GatewayError>;
    async fn close_window(&self) -> Result<Value, GatewayError>;
    async fn minimize_window(&self) -> Result<Value, GatewayError>;
    async fn maximize_window(&self) -> Result<Value, GatewayError>;
}

/// A generic `invoke(command, args)` bridge, the shape most IPC shells expose.
#[async_trait::async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, command: GatewayCommand, args: Value) -> Result<Value, GatewayError>;
}

#[async_trait::async_trait]
impl<I: Invoke + ?Sized> Invoke for Arc<I> {
    async fn invoke(&self, command: GatewayCommand, args: Value) -> Result<Value, GatewayError> {
        (**self).invoke(command, args).await
    }
}

/// Adapts an [`Invoke`] bridge into a [`CommandGateway`].
pub struct InvokeGateway<I> {
    invoker: I,
}

impl<I: Invoke> InvokeGateway<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    async fn call(&self, command: GatewayCommand) -> Result<Value, GatewayError> {
        self.invoker.invoke(command, json!({})).await
    }
}

#[async_trait::async_trait]
impl<I: Invoke> CommandGateway for InvokeGateway<I> {
    async fn save_instance(&self, instance: &Instance) -> Result<Value, GatewayError> {
        let command = GatewayCommand::SaveInstance;
        let instance = serde_json::to_value(instance).map_err(|e| GatewayError::Encode {
            command,
            message: e.to_string(),
        })?;
        self.invoker
            .invoke(command, json!({ "instance": instance }))
            .await
    }

    async fn get_instances(&self) -> Result<Value, GatewayError> {
        self.call(GatewayCommand::GetInstances).await
    }

    async fn close_window(&self) -> Result<Value, GatewayError> {
        self.call(GatewayCommand::CloseWindow).await
    }

    async fn minimize_window(&self) -> Result<Value, GatewayError> {
        self.call(GatewayCommand::MinimizeWindow).await
    }

    async fn maximize_window(&self) -> Result<Value, GatewayError> {
        self.call(GatewayCommand::MaximizeWindow).await
    }
}
