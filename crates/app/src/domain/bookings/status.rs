//! Booking status machine
//!
//! ```text
//! pending -> confirmed -> active -> completed
//!    |           |          |
//!    +-----------+----------+-> cancelled
//! ```
//!
//! Every status change, whichever operation requests it, goes through
//! [`transition`], which also decides what happens to the reserved inventory.

use thiserror::Error;

use crate::domain::bookings::records::BookingStatus;

/// What a transition does to the inventory reserved by a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryEffect {
    /// Reserved units stay reserved.
    Keep,

    /// Reserved units go back to available.
    Release,
}

/// Who may request a transition besides an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    /// The booking's customer or an administrator.
    OwnerOrAdmin,

    /// Administrators only.
    AdminOnly,
}

/// An accepted status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub effect: InventoryEffect,
    pub actor: TransitionActor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("booking cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// Validate a status change.
///
/// # Errors
///
/// Returns [`InvalidTransition`] for any edge not in the status graph,
/// including every edge out of a terminal status and self-loops.
pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<Transition, InvalidTransition> {
    use BookingStatus::{Active, Cancelled, Completed, Confirmed, Pending};

    let (effect, actor) = match (from, to) {
        (Pending, Confirmed) => (InventoryEffect::Keep, TransitionActor::OwnerOrAdmin),
        (Confirmed, Active) => (InventoryEffect::Keep, TransitionActor::AdminOnly),
        (Active, Completed) => (InventoryEffect::Release, TransitionActor::AdminOnly),
        (Pending | Confirmed | Active, Cancelled) => {
            (InventoryEffect::Release, TransitionActor::OwnerOrAdmin)
        }
        _ => return Err(InvalidTransition { from, to }),
    };

    Ok(Transition {
        from,
        to,
        effect,
        actor,
    })
}
