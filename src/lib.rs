//! Parsing and local validation of RPKI resource certificates.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. Resource certificates bind IP address
//! prefixes and AS numbers to the keys of their holders.
//!
//! This crate turns a DER-encoded resource certificate into a [`Cert`]
//! record after checking it against the profile of [RFC 6487] and the
//! resource extensions of [RFC 3779]. It does not walk certificate chains
//! or check signatures. Instead, it provides what a validator needs for
//! that: the [`TrustIndex`] for finding the issuer of a certificate, the
//! [`RouterKeyIndex`] collecting the keys of BGPsec routers, and a
//! [transfer format][wire] for shipping records between processes.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

pub use self::auth::TrustIndex;
pub use self::brk::RouterKeyIndex;
pub use self::cert::{Cert, CertKind};
pub use self::config::Options;
pub use self::error::ValidationError;

pub mod auth;
pub mod brk;
pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ext;
pub mod oid;
pub mod resources;
pub mod uri;
pub mod wire;
pub mod x509;
