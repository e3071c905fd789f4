//! Reports

pub(crate) mod dashboard;
