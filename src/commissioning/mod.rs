//! Network commissioning and parent recovery.
//!
//! ```text
//!  IDLE ──initialize()──▶ INITIALIZING ──[steering failed]──▶ STEERING
//!                              │                                 │
//!                  [restored / steering ok]            [steering ok]
//!                              ▼                                 │
//!    ┌──────────────────────▶ JOINED ◀───────────────────────────┘
//!    │                          │
//!    │                   [orphan reported]
//!    │                          ▼
//!    │  [parent-lost:       PARENT_LOST
//!    │   restored]              │
//!    │                  [parent-lost: failure]
//!    │                          ▼
//!    └───────────────────── RECOVERING ──[failure]──▶ (rejoin timer, stay)
//! ```
//!
//! The machine has no terminal state: `Joined` and `Recovering` alternate
//! for the whole operational life of the device.  Retry pacing lives in
//! [`backoff`], the manual override in [`key_trigger`].

pub mod backoff;
pub mod key_trigger;
pub mod machine;

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Coarse commissioning phase.  Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommissioningPhase {
    Idle = 0,
    Initializing = 1,
    SteeringInProgress = 2,
    Joined = 3,
    ParentLost = 4,
    Recovering = 5,
}

impl CommissioningPhase {
    /// True when the device believes it has no parent to talk to.
    pub fn is_detached(self) -> bool {
        matches!(self, Self::ParentLost | Self::Recovering)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Initializing => "Initializing",
            Self::SteeringInProgress => "SteeringInProgress",
            Self::Joined => "Joined",
            Self::ParentLost => "ParentLost",
            Self::Recovering => "Recovering",
        }
    }
}

impl fmt::Display for CommissioningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Commissioning modes
// ---------------------------------------------------------------------------

/// Bitmask of commissioning modes, as understood by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModeFlags(u8);

impl ModeFlags {
    pub const NONE: Self = Self(0);
    pub const TOUCHLINK: Self = Self(0x01);
    pub const NETWORK_STEERING: Self = Self(0x02);
    pub const NETWORK_FORMATION: Self = Self(0x04);
    pub const FINDING_BINDING: Self = Self(0x08);
    pub const INITIALIZATION: Self = Self(0x10);
    pub const PARENT_LOST: Self = Self(0x20);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for ModeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// The commissioning mode a status notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissioningMode {
    Initialization,
    NetworkSteering,
    ParentLost,
    FindingBinding,
}

impl CommissioningMode {
    /// Map a single stack mode bit to a mode.  Unknown bits yield `None`.
    pub fn from_flag(flag: ModeFlags) -> Option<Self> {
        match flag {
            ModeFlags::INITIALIZATION => Some(Self::Initialization),
            ModeFlags::NETWORK_STEERING => Some(Self::NetworkSteering),
            ModeFlags::PARENT_LOST => Some(Self::ParentLost),
            ModeFlags::FINDING_BINDING => Some(Self::FindingBinding),
            _ => None,
        }
    }
}

/// Result carried by a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissioningOutcome {
    NoNetwork,
    NetworkRestored,
    Success,
    Failure,
    InProgress,
}

/// Status notification emitted by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissioningStatusEvent {
    pub mode: CommissioningMode,
    pub outcome: CommissioningOutcome,
    pub remaining_modes: ModeFlags,
}

impl CommissioningStatusEvent {
    pub const fn new(mode: CommissioningMode, outcome: CommissioningOutcome) -> Self {
        Self {
            mode,
            outcome,
            remaining_modes: ModeFlags::NONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Other stack notifications
// ---------------------------------------------------------------------------

/// A peer asked to bind one of our clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRequest {
    pub cluster_id: u16,
    pub dst_addr: u16,
    pub endpoint: u8,
}

/// Network role the stack reports for this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Hold,
    Initializing,
    Discovering,
    Joining,
    Rejoining,
    EndDevice,
    Orphan,
    Other(u8),
}
