//! Authentication
//!
//! Bearer credentials are issued by the operator CLI and verified on every
//! protected request. Signing and verification are delegated to an OpenBao
//! Transit key so no secret material lives in this process.

mod credential;
mod errors;
mod models;
pub mod openbao;
mod service;
mod signer;

pub use credential::*;
pub use errors::*;
pub use models::*;
pub use openbao::{OpenBaoClient, OpenBaoConfig, OpenBaoError};
pub use service::*;
pub use signer::*;
