//! Flags handed to the UI application at start-up.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::auth::now_millis;
use crate::bridge::Role;

/// Seed material for the guest app's random generator.
///
/// Serialized as `[first, [rest...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedInfo(pub u32, pub Vec<u32>);

impl SeedInfo {
    /// Five fresh integers from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut ints = [0u32; 5];
        for value in ints.iter_mut() {
            *value = OsRng.next_u32();
        }
        Self(ints[0], ints[1..].to_vec())
    }
}

/// Start-up flags for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootFlags {
    /// Milliseconds since the Unix epoch
    pub current_time: u64,

    /// Viewport width in CSS pixels
    pub width: u32,

    /// Viewport height in CSS pixels
    pub height: u32,

    /// Only the guest app receives a seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_info: Option<SeedInfo>,
}

impl BootFlags {
    /// Flags for `role` with the given viewport.
    pub fn new(role: Role, width: u32, height: u32) -> Self {
        let seed_info = match role {
            Role::Guest => Some(SeedInfo::generate()),
            Role::Admin => None,
        };
        Self {
            current_time: now_millis(),
            width,
            height,
            seed_info,
        }
    }
}
