//! Typed handles for environments and agents.
//!
//! Both are UUID v7 under the hood, so registry maps keyed by them iterate
//! in roughly creation order. Separate types keep an agent handle from ever
//! being passed where an environment handle is expected. The transport
//! shell sees them as plain UUID strings and hands them back through
//! [`FromStr`](core::str::FromStr).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh handle.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl core::str::FromStr for $name {
            type Err = ParseHandleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|_err| ParseHandleError {
                    kind: $label,
                    input: s.to_owned(),
                })
            }
        }
    };
}

/// A string that is not a valid handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHandleError {
    /// Which handle was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
}

impl core::fmt::Display for ParseHandleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid {} handle: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseHandleError {}

handle! {
    /// Handle for an environment instance (one grid plus its agents).
    EnvironmentId, "environment"
}

handle! {
    /// Handle for an agent registered to an environment.
    AgentId, "agent"
}
