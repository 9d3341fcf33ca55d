//! Device descriptors — read-only registry input for the automation core.
//!
//! Descriptors are owned by the external device registry and refreshed on
//! demand; the core never mutates them. The on/off state lives separately
//! in the application layer's state store.

use serde::{Deserialize, Serialize};

/// Opaque, remote-assigned device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a remote identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Closed set of actuator kinds the automation core understands.
///
/// Wire values outside the known set resolve to [`Custom`](Self::Custom)
/// at construction time; such devices carry no threshold rule and are
/// only ever toggled manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Fan,
    Humidifier,
    Purifier,
    Alarm,
    Custom,
}

impl DeviceKind {
    /// Resolve a wire string into a kind, falling back to `Custom`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "fan" => Self::Fan,
            "humidifier" => Self::Humidifier,
            "purifier" => Self::Purifier,
            "alarm" => Self::Alarm,
            _ => Self::Custom,
        }
    }

    /// Icon tag for this kind, resolved once at construction.
    #[must_use]
    pub fn icon(self) -> IconTag {
        match self {
            Self::Fan => IconTag::Fan,
            Self::Humidifier => IconTag::Droplets,
            Self::Purifier => IconTag::Wind,
            Self::Alarm => IconTag::Flame,
            Self::Custom => IconTag::Fallback,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fan => f.write_str("fan"),
            Self::Humidifier => f.write_str("humidifier"),
            Self::Purifier => f.write_str("purifier"),
            Self::Alarm => f.write_str("alarm"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// Closed set of supported icon tags, with an explicit fallback variant.
///
/// Consumers render these however they like; the core only guarantees the
/// tag is resolved up front instead of looked up by string at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconTag {
    Fan,
    Droplets,
    Wind,
    Flame,
    Fallback,
}

/// Read-only description of a registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    /// Resolved at construction from `kind` (or an explicit override).
    pub icon: IconTag,
    /// Whether the threshold engine may drive this device.
    pub automation_eligible: bool,
}

impl DeviceDescriptor {
    /// Build a descriptor, resolving the icon tag from the kind.
    #[must_use]
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
        automation_eligible: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            icon: kind.icon(),
            automation_eligible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_known_kinds() {
        assert_eq!(DeviceKind::parse("fan"), DeviceKind::Fan);
        assert_eq!(DeviceKind::parse("humidifier"), DeviceKind::Humidifier);
        assert_eq!(DeviceKind::parse("purifier"), DeviceKind::Purifier);
        assert_eq!(DeviceKind::parse("alarm"), DeviceKind::Alarm);
    }

    #[test]
    fn should_fall_back_to_custom_for_unknown_kind() {
        assert_eq!(DeviceKind::parse("disco_ball"), DeviceKind::Custom);
        assert_eq!(DeviceKind::parse(""), DeviceKind::Custom);
    }

    #[test]
    fn should_resolve_icon_at_construction() {
        let descriptor =
            DeviceDescriptor::new(DeviceId::new("fan_01"), "Living Fan", DeviceKind::Fan, true);
        assert_eq!(descriptor.icon, IconTag::Fan);
    }

    #[test]
    fn should_use_fallback_icon_for_custom_kind() {
        let descriptor = DeviceDescriptor::new(
            DeviceId::new("x_01"),
            "Mystery Box",
            DeviceKind::Custom,
            false,
        );
        assert_eq!(descriptor.icon, IconTag::Fallback);
    }

    #[test]
    fn should_roundtrip_device_id_through_display() {
        let id = DeviceId::new("purifier_02");
        assert_eq!(id.to_string(), "purifier_02");
        assert_eq!(id.as_str(), "purifier_02");
    }

    #[test]
    fn should_serialize_kind_lowercase() {
        let json = serde_json::to_string(&DeviceKind::Humidifier).unwrap();
        assert_eq!(json, "\"humidifier\"");
    }
}
