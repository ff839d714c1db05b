//! Channel capability table.
//!
//! Every messaging transport is a variant of the closed [`ChannelCode`] enum
//! and carries a static [`ChannelCapability`] record. The compose UI reads
//! this table to decide which channels to offer for a patient, and the
//! request boundary and messaging service both call [`check_content`] so the
//! length cap is enforced server-side with the same rule the UI uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::patient::Patient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ChannelCode {
    Sms,
    Email,
    Voice,
    Fax,
    InApp,
    Chat,
}

/// The patient contact field that makes a channel reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Phone,
    Email,
    Fax,
    Portal,
}

/// Static display and constraint data for one channel.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCapability {
    pub code: ChannelCode,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub max_length: Option<usize>,
    pub supports_subject: bool,
    pub requires: ContactField,
}

const SMS: ChannelCapability = ChannelCapability {
    code: ChannelCode::Sms,
    display_name: "SMS",
    icon: "message-square",
    color: "green",
    max_length: Some(160),
    supports_subject: false,
    requires: ContactField::Phone,
};

const EMAIL: ChannelCapability = ChannelCapability {
    code: ChannelCode::Email,
    display_name: "Email",
    icon: "mail",
    color: "blue",
    max_length: None,
    supports_subject: true,
    requires: ContactField::Email,
};

const VOICE: ChannelCapability = ChannelCapability {
    code: ChannelCode::Voice,
    display_name: "Voice",
    icon: "phone",
    color: "purple",
    max_length: None,
    supports_subject: false,
    requires: ContactField::Phone,
};

const FAX: ChannelCapability = ChannelCapability {
    code: ChannelCode::Fax,
    display_name: "Fax",
    icon: "printer",
    color: "gray",
    max_length: None,
    supports_subject: true,
    requires: ContactField::Fax,
};

const IN_APP: ChannelCapability = ChannelCapability {
    code: ChannelCode::InApp,
    display_name: "In-App",
    icon: "bell",
    color: "indigo",
    max_length: None,
    supports_subject: false,
    requires: ContactField::Portal,
};

const CHAT: ChannelCapability = ChannelCapability {
    code: ChannelCode::Chat,
    display_name: "Chat",
    icon: "message-circle",
    color: "teal",
    max_length: None,
    supports_subject: false,
    requires: ContactField::Portal,
};

impl ChannelCode {
    pub const ALL: [ChannelCode; 6] = [
        ChannelCode::Sms,
        ChannelCode::Email,
        ChannelCode::Voice,
        ChannelCode::Fax,
        ChannelCode::InApp,
        ChannelCode::Chat,
    ];

    /// Wire identifier, as used in query strings and JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelCode::Sms => "sms",
            ChannelCode::Email => "email",
            ChannelCode::Voice => "voice",
            ChannelCode::Fax => "fax",
            ChannelCode::InApp => "in_app",
            ChannelCode::Chat => "chat",
        }
    }

    pub fn capability(self) -> &'static ChannelCapability {
        match self {
            ChannelCode::Sms => &SMS,
            ChannelCode::Email => &EMAIL,
            ChannelCode::Voice => &VOICE,
            ChannelCode::Fax => &FAX,
            ChannelCode::InApp => &IN_APP,
            ChannelCode::Chat => &CHAT,
        }
    }
}

impl fmt::Display for ChannelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelCode::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownChannel(s.to_string()))
    }
}

/// The full capability table in display order.
pub fn capabilities() -> Vec<&'static ChannelCapability> {
    ChannelCode::ALL.iter().map(|c| c.capability()).collect()
}

/// Channels the patient can be reached on, given the contact fields present.
pub fn available_channels(patient: &Patient) -> Vec<ChannelCode> {
    ChannelCode::ALL
        .into_iter()
        .filter(|c| patient.has_contact(c.capability().requires))
        .collect()
}

/// Enforce the channel's maximum content length, counted in characters.
pub fn check_content(channel: ChannelCode, content: &str) -> Result<(), CoreError> {
    let capability = channel.capability();
    if let Some(limit) = capability.max_length {
        let actual = content.chars().count();
        if actual > limit {
            return Err(CoreError::ContentTooLong {
                channel: capability.display_name,
                limit,
                actual,
            });
        }
    }
    Ok(())
}
