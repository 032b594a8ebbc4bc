//! Recovers which payload variant a validated reply carries.
//!
//! Every consumer goes through an exhaustive `match` on [`ResponseData`] (here, and
//! nowhere else), so a new variant fails to compile at each site instead of falling
//! through. Accessors called on the wrong variant return [`WrongVariantError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::envelope::{ResponseData, WindowActionResult};
use crate::model::Instance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    MinecraftVersions,
    Settings,
    InstanceNames,
    WindowAction,
    InstanceData,
    InstancesVec,
}

impl PayloadKind {
    pub const ALL: [Self; 6] = [
        Self::MinecraftVersions,
        Self::Settings,
        Self::InstanceNames,
        Self::WindowAction,
        Self::InstanceData,
        Self::InstancesVec,
    ];

    /// Wire tags, in the same order as [`PayloadKind::ALL`].
    pub const TAGS: &'static [&'static str] = &[
        "MinecraftVersions",
        "Settings",
        "Instances",
        "WindowAction",
        "InstanceData",
        "InstancesVec",
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::MinecraftVersions => "MinecraftVersions",
            Self::Settings => "Settings",
            Self::InstanceNames => "Instances",
            Self::WindowAction => "WindowAction",
            Self::InstanceData => "InstanceData",
            Self::InstancesVec => "InstancesVec",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    #[must_use]
    pub fn of(data: Option<&ResponseData>) -> Option<Self> {
        data.map(ResponseData::kind)
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected a {expected} payload, found {}", found_label(.found))]
pub struct WrongVariantError {
    pub expected: PayloadKind,
    /// `None` when the success envelope carried no payload at all.
    pub found: Option<PayloadKind>,
}

fn found_label(found: &Option<PayloadKind>) -> String {
    found.map_or_else(|| "no payload".to_owned(), |kind| format!("{kind}"))
}

/// Unwraps an optional payload that must be of `expected` kind.
pub fn expect(
    data: Option<ResponseData>,
    expected: PayloadKind,
) -> Result<ResponseData, WrongVariantError> {
    match data {
        Some(data) if data.kind() == expected => Ok(data),
        other => Err(WrongVariantError {
            expected,
            found: PayloadKind::of(other.as_ref()),
        }),
    }
}

impl ResponseData {
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::MinecraftVersions(_) => PayloadKind::MinecraftVersions,
            Self::Settings(_) => PayloadKind::Settings,
            Self::Instances(_) => PayloadKind::InstanceNames,
            Self::WindowAction(_) => PayloadKind::WindowAction,
            Self::InstanceData(_) => PayloadKind::InstanceData,
            Self::InstancesVec(_) => PayloadKind::InstancesVec,
        }
    }

    fn mismatch(&self, expected: PayloadKind) -> WrongVariantError {
        WrongVariantError {
            expected,
            found: Some(self.kind()),
        }
    }

    // Predicates

    #[must_use]
    pub const fn is_minecraft_versions(&self) -> bool {
        matches!(self, Self::MinecraftVersions(_))
    }

    #[must_use]
    pub const fn is_settings(&self) -> bool {
        matches!(self, Self::Settings(_))
    }

    #[must_use]
    pub const fn is_instance_names(&self) -> bool {
        matches!(self, Self::Instances(_))
    }

    #[must_use]
    pub const fn is_window_action(&self) -> bool {
        matches!(self, Self::WindowAction(_))
    }

    #[must_use]
    pub const fn is_instance_data(&self) -> bool {
        matches!(self, Self::InstanceData(_))
    }

    #[must_use]
    pub const fn is_instances_vec(&self) -> bool {
        matches!(self, Self::InstancesVec(_))
    }

    // Borrowing accessors

    pub fn as_minecraft_versions(&self) -> Result<&[String], WrongVariantError> {
        match self {
            Self::MinecraftVersions(versions) => Ok(versions),
            other => Err(other.mismatch(PayloadKind::MinecraftVersions)),
        }
    }

    pub fn as_settings(&self) -> Result<&[String], WrongVariantError> {
        match self {
            Self::Settings(settings) => Ok(settings),
            other => Err(other.mismatch(PayloadKind::Settings)),
        }
    }

    pub fn as_instance_names(&self) -> Result<&[String], WrongVariantError> {
        match self {
            Self::Instances(names) => Ok(names),
            other => Err(other.mismatch(PayloadKind::InstanceNames)),
        }
    }

    pub fn as_window_action(&self) -> Result<WindowActionResult, WrongVariantError> {
        match self {
            Self::WindowAction(action) => Ok(*action),
            other => Err(other.mismatch(PayloadKind::WindowAction)),
        }
    }

    pub fn as_instance_data(&self) -> Result<&[u8], WrongVariantError> {
        match self {
            Self::InstanceData(bytes) => Ok(bytes),
            other => Err(other.mismatch(PayloadKind::InstanceData)),
        }
    }

    pub fn as_instances_vec(&self) -> Result<&[Instance], WrongVariantError> {
        match self {
            Self::InstancesVec(instances) => Ok(instances),
            other => Err(other.mismatch(PayloadKind::InstancesVec)),
        }
    }

    // Owning accessors

    pub fn into_minecraft_versions(self) -> Result<Vec<String>, WrongVariantError> {
        match self {
            Self::MinecraftVersions(versions) => Ok(versions),
            other => Err(other.mismatch(PayloadKind::MinecraftVersions)),
        }
    }

    pub fn into_settings(self) -> Result<Vec<String>, WrongVariantError> {
        match self {
            Self::Settings(settings) => Ok(settings),
            other => Err(other.mismatch(PayloadKind::Settings)),
        }
    }

    pub fn into_instance_names(self) -> Result<Vec<String>, WrongVariantError> {
        match self {
            Self::Instances(names) => Ok(names),
            other => Err(other.mismatch(PayloadKind::InstanceNames)),
        }
    }

    pub fn into_instance_data(self) -> Result<Vec<u8>, WrongVariantError> {
        match self {
            Self::InstanceData(bytes) => Ok(bytes),
            other => Err(other.mismatch(PayloadKind::InstanceData)),
        }
    }

    pub fn into_instances_vec(self) -> Result<Vec<Instance>, WrongVariantError> {
        match self {
            Self::InstancesVec(instances) => Ok(instances),
            other => Err(other.mismatch(PayloadKind::InstancesVec)),
        }
    }
}
