//! `equiptrack-auth` — shared-login authentication boundary.
//!
//! The tracker has a single login/password pair. A successful check yields an
//! [`Operator`] that callers pass explicitly into every service call.

pub mod credentials;
pub mod operator;

pub use credentials::{AuthError, SharedCredentials};
pub use operator::{Operator, SessionId};
