//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used when picking apart
//! a resource certificate in one central place. They are public so you can
//! refer to them should that ever become necessary.

use bcder::{ConstOid, Oid};


//------------ Algorithms ----------------------------------------------------

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `id-ecPublicKey`
///
/// Identifies an elliptic curve public key. The curve is given in the
/// algorithm parameters.
pub const EC_PUBLIC_KEY: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 2, 1]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `secp256r1`
///
/// The NIST P-256 curve, the only curve allowed for BGPsec router keys.
pub const SECP256R1: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 3, 1, 7]);

/// [RFC 5758](https://tools.ietf.org/html/rfc5758) `ecdsa-with-SHA256`
pub const ECDSA_WITH_SHA256: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 4, 3, 2]);


//------------ Access Descriptions -------------------------------------------

pub const AD_CA_ISSUERS: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 2]);
pub const AD_CA_REPOSITORY: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 5]);
pub const AD_RPKI_MANIFEST: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 10]);
pub const AD_RPKI_NOTIFY: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 13]);


//------------ Attributes and Extensions -------------------------------------

pub const AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]); // 2 5 4 3

pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_BASIC_CONSTRAINTS: ConstOid = Oid(&[85, 29, 19]);
pub const CE_CERTIFICATE_POLICIES: ConstOid = Oid(&[85, 29, 32]);
pub const CE_CRL_DISTRIBUTION_POINTS: ConstOid = Oid(&[85, 29, 31]);
pub const CE_EXTENDED_KEY_USAGE: ConstOid = Oid(&[85, 29, 37]);
pub const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);

pub const PE_AUTHORITY_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 1]);
pub const PE_IP_ADDR_BLOCK: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 1, 7]);
pub const PE_AUTONOMOUS_SYS_IDS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 8]);
pub const PE_SUBJECT_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 11]);


//------------ Policies and Purposes -----------------------------------------

/// [RFC 6484](https://tools.ietf.org/html/rfc6484) `id-cp-ipAddr-asNumber`
///
/// The one certificate policy a resource certificate may carry.
pub const CP_IPADDR_ASNUMBER: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 14, 2]);

/// [RFC 5280](https://tools.ietf.org/html/rfc5280) `id-qt-cps`
pub const QT_CPS: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 2, 1]);

/// [RFC 8209](https://tools.ietf.org/html/rfc8209) `id-kp-bgpsec-router`
pub const KP_BGPSEC_ROUTER: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 30]);

