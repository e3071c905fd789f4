//! Payment Handlers

pub(crate) mod confirm;
pub(crate) mod create_intent;
pub(crate) mod refund;
pub(crate) mod status;
