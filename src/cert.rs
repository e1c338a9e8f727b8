//! Resource certificates.
//!
//! This module contains [`Cert`], the record that remains of a resource
//! certificate after it has been parsed and checked against the resource
//! certificate profile defined in [RFC 6487] and, for BGPsec router
//! certificates, [RFC 8209].
//!
//! Checking happens in two steps. [`Cert::decode`] applies all the rules
//! that hold for every certificate. Once the caller knows where the
//! certificate sits in the tree, it finishes with either
//! [`Cert::validate_issued`] for certificates issued by a CA or
//! [`Cert::validate_ta`] for trust anchor certificates.
//!
//! Signatures are not checked here. The record keeps the decoded
//! certificate around so that whoever does can get at it via
//! [`Cert::x509`].
//!
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487
//! [RFC 8209]: https://tools.ietf.org/html/rfc8209

use bytes::Bytes;
use log::{debug, trace};
use crate::{oid, uri};
use crate::config::Options;
use crate::crypto::{KeyIdentifier, PublicKeyInfo};
use crate::error::{InspectionError, ValidationError, VerificationError};
use crate::ext::{CertPolicy, Repository};
use crate::resources::{AsResources, IpResources};
use crate::x509::{Certificate, Purpose, Time};


//------------ Cert ----------------------------------------------------------

/// A parsed and checked resource certificate.
///
/// Values are immutable. The only thing that can be changed after parsing
/// is the identifier of the trust anchor the certificate was found under,
/// see [`Cert::with_tal_id`], and whether the decoded certificate is still
/// kept, see [`Cert::strip_x509`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cert {
    /// What kind of certificate this is.
    kind: CertKind,

    /// The IP resources in certificate order.
    ip_resources: IpResources,

    /// The AS resources in certificate order.
    as_resources: AsResources,

    subject_key_identifier: KeyIdentifier,
    authority_key_identifier: Option<KeyIdentifier>,

    /// The location of the issuer’s certificate.
    ca_issuer: Option<uri::Rsync>,

    /// The location of the issuer’s CRL.
    crl_uri: Option<uri::Rsync>,

    /// The notAfter time of the certificate.
    expires: Time,

    /// The identifier of the trust anchor this certificate belongs to.
    tal_id: u32,

    /// The decoded certificate.
    ///
    /// This is only present on values created from an encoded certificate.
    #[cfg_attr(feature = "serde", serde(skip))]
    x509: Option<Certificate>,
}

impl Cert {
    /// Decodes and checks an encoded certificate.
    ///
    /// This applies all checks that do not depend on the role of the
    /// certificate in the tree.
    pub fn decode(
        data: Bytes, options: &Options
    ) -> Result<Self, ValidationError> {
        Self::from_x509(Certificate::decode(data)?, options)
    }

    /// Checks an already decoded certificate.
    pub fn from_x509(
        x509: Certificate, options: &Options
    ) -> Result<Self, ValidationError> {
        let mut ip_resources = IpResources::empty();
        let mut as_resources = AsResources::empty();
        let mut repository = None;
        let mut sia_present = false;

        for ext in x509.extensions() {
            let id = ext.id();
            if *id == oid::PE_IP_ADDR_BLOCK {
                ip_resources = IpResources::from_extension(ext, options)?;
            }
            else if *id == oid::PE_AUTONOMOUS_SYS_IDS {
                as_resources = AsResources::from_extension(ext, options)?;
            }
            else if *id == oid::PE_SUBJECT_INFO_ACCESS {
                sia_present = true;
                repository = Some(Repository::from_extension(ext)?);
            }
            else if *id == oid::CE_CERTIFICATE_POLICIES {
                let policy = CertPolicy::from_extension(ext)?;
                if let Some(cps) = policy.cps() {
                    debug!(
                        "certificate policy CPS pointer {}",
                        String::from_utf8_lossy(cps)
                    );
                }
            }
            else if !is_standard_extension(id.0.as_ref()) {
                trace!("ignoring certificate extension {}", id);
            }
        }

        let authority_key_identifier = x509.authority_key_identifier()?;
        let subject_key_identifier = x509.subject_key_identifier()?;
        let ca_issuer = x509.ca_issuer()?;
        let crl_uri = x509.crl_uri()?;
        let expires = x509.validity().not_after();

        let kind = match x509.purpose()? {
            Purpose::Ca => {
                let repository = match repository {
                    Some(repository) => repository,
                    None => {
                        return Err(InspectionError::new(
                            "RFC 6487 section 4.8.8: missing SIA"
                        ).into())
                    }
                };
                if ip_resources.is_empty() && as_resources.is_empty() {
                    return Err(InspectionError::new(
                        "missing IP or AS resources"
                    ).into())
                }
                CertKind::Ca(repository)
            }
            Purpose::BgpsecRouter => {
                let key = x509.router_public_key()?;
                if !ip_resources.is_empty() {
                    return Err(InspectionError::new(
                        "unexpected IP resources in BGPsec cert"
                    ).into())
                }
                if sia_present {
                    return Err(InspectionError::new(
                        "unexpected SIA extension in BGPsec cert"
                    ).into())
                }
                CertKind::BgpsecRouter(key)
            }
        };

        let subject_key_identifier = match subject_key_identifier {
            Some(ski) => ski,
            None => {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: missing SKI"
                ).into())
            }
        };

        // RFC 8209, section 3.1.1: the SKI of a router certificate is the
        // SHA-1 hash of the key.
        if options.is_strict() {
            if let CertKind::BgpsecRouter(ref key) = kind {
                if key.key_identifier() != subject_key_identifier {
                    return Err(InspectionError::new(
                        "RFC 8209 section 3.1.1: \
                         SKI does not match router key"
                    ).into())
                }
            }
        }

        Ok(Cert {
            kind,
            ip_resources,
            as_resources,
            subject_key_identifier,
            authority_key_identifier,
            ca_issuer,
            crl_uri,
            expires,
            tal_id: 0,
            x509: Some(x509),
        })
    }

    /// Creates a record from its parts.
    ///
    /// This is used when restoring a record. It does not re-apply the
    /// checks of [`Cert::decode`].
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        kind: CertKind,
        ip_resources: IpResources,
        as_resources: AsResources,
        subject_key_identifier: KeyIdentifier,
        authority_key_identifier: Option<KeyIdentifier>,
        ca_issuer: Option<uri::Rsync>,
        crl_uri: Option<uri::Rsync>,
        expires: Time,
        tal_id: u32,
    ) -> Self {
        Cert {
            kind, ip_resources, as_resources,
            subject_key_identifier, authority_key_identifier,
            ca_issuer, crl_uri, expires, tal_id,
            x509: None,
        }
    }

    /// Finishes checking a certificate issued by a CA.
    ///
    /// RFC 6487 requires such a certificate to name its issuer’s key,
    /// certificate, and CRL.
    pub fn validate_issued(self) -> Result<Self, ValidationError> {
        match self.authority_key_identifier {
            None => {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: non-trust anchor missing AKI"
                ).into())
            }
            Some(aki) if aki == self.subject_key_identifier => {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: \
                     non-trust anchor AKI may not match SKI"
                ).into())
            }
            _ => { }
        }
        if self.ca_issuer.is_none() {
            return Err(InspectionError::new(
                "RFC 6487 section 8.4.7: AIA: extension missing"
            ).into())
        }
        if self.crl_uri.is_none() {
            return Err(InspectionError::new(
                "RFC 6487 section 4.8.6: CRL: \
                 no CRL distribution point extension"
            ).into())
        }
        Ok(self)
    }

    /// Finishes checking a trust anchor certificate.
    ///
    /// The `tal_key` is the DER-encoded subject public key info given by
    /// the trust anchor locator.
    pub fn validate_ta(self, tal_key: &[u8]) -> Result<Self, ValidationError> {
        self.validate_ta_at(tal_key, Time::now())
    }

    /// Finishes checking a trust anchor certificate at the given time.
    pub fn validate_ta_at(
        self, tal_key: &[u8], now: Time,
    ) -> Result<Self, ValidationError> {
        let tal_key = PublicKeyInfo::decode(
            Bytes::copy_from_slice(tal_key)
        ).map_err(|_| {
            VerificationError::new("RFC 6487 (trust anchor): bad TAL pubkey")
        })?;
        let x509 = match self.x509.as_ref() {
            Some(x509) => x509,
            None => {
                return Err(VerificationError::new(
                    "RFC 6487 (trust anchor): missing pubkey"
                ).into())
            }
        };
        if !x509.public_key().same_key(&tal_key) {
            return Err(VerificationError::new(
                "RFC 6487 (trust anchor): pubkey does not match TAL pubkey"
            ).into())
        }
        x509.validity().verify_at(now).map_err(VerificationError::from)?;

        if let Some(aki) = self.authority_key_identifier {
            if aki != self.subject_key_identifier {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: \
                     trust anchor AKI, if specified, must match SKI"
                ).into())
            }
        }
        if self.ca_issuer.is_some() {
            return Err(InspectionError::new(
                "RFC 6487 section 8.4.7: trust anchor must not have AIA"
            ).into())
        }
        if self.crl_uri.is_some() {
            return Err(InspectionError::new(
                "RFC 6487 section 8.4.2: \
                 trust anchor may not specify CRL resource"
            ).into())
        }
        if self.purpose() == Purpose::BgpsecRouter {
            return Err(InspectionError::new(
                "BGPsec cert cannot be a trust anchor"
            ).into())
        }
        if self.ip_resources.has_inherit() || self.as_resources.is_inherited()
        {
            return Err(InspectionError::new(
                "RFC 6487 section 7.1: trust anchor must not use inherit"
            ).into())
        }
        Ok(self)
    }

    /// Returns the record with the given trust anchor identifier.
    pub fn with_tal_id(self, tal_id: u32) -> Self {
        Cert { tal_id, ..self }
    }

    /// Drops the decoded certificate.
    pub fn strip_x509(&mut self) {
        self.x509 = None
    }
}

/// # Data Access
///
impl Cert {
    pub fn kind(&self) -> &CertKind {
        &self.kind
    }

    pub fn purpose(&self) -> Purpose {
        self.kind.purpose()
    }

    /// Returns the publication point of a CA certificate.
    pub fn repository(&self) -> Option<&Repository> {
        match self.kind {
            CertKind::Ca(ref repository) => Some(repository),
            CertKind::BgpsecRouter(_) => None,
        }
    }

    /// Returns the key of a BGPsec router certificate.
    pub fn router_key(&self) -> Option<&PublicKeyInfo> {
        match self.kind {
            CertKind::Ca(_) => None,
            CertKind::BgpsecRouter(ref key) => Some(key),
        }
    }

    pub fn ip_resources(&self) -> &IpResources {
        &self.ip_resources
    }

    pub fn as_resources(&self) -> &AsResources {
        &self.as_resources
    }

    pub fn subject_key_identifier(&self) -> KeyIdentifier {
        self.subject_key_identifier
    }

    pub fn authority_key_identifier(&self) -> Option<KeyIdentifier> {
        self.authority_key_identifier
    }

    pub fn ca_issuer(&self) -> Option<&uri::Rsync> {
        self.ca_issuer.as_ref()
    }

    pub fn crl_uri(&self) -> Option<&uri::Rsync> {
        self.crl_uri.as_ref()
    }

    pub fn expires(&self) -> Time {
        self.expires
    }

    pub fn tal_id(&self) -> u32 {
        self.tal_id
    }

    /// Returns the decoded certificate if it is still around.
    pub fn x509(&self) -> Option<&Certificate> {
        self.x509.as_ref()
    }
}


//--- PartialEq and Eq

impl PartialEq for Cert {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.ip_resources == other.ip_resources
            && self.as_resources == other.as_resources
            && self.subject_key_identifier == other.subject_key_identifier
            && self.authority_key_identifier == other.authority_key_identifier
            && self.ca_issuer == other.ca_issuer
            && self.crl_uri == other.crl_uri
            && self.expires == other.expires
            && self.tal_id == other.tal_id
    }
}

impl Eq for Cert { }


//------------ CertKind ------------------------------------------------------

/// The purpose specific part of a certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CertKind {
    /// A CA certificate and where it publishes.
    Ca(Repository),

    /// A BGPsec router certificate and the router’s key.
    BgpsecRouter(PublicKeyInfo),
}

impl CertKind {
    pub fn purpose(&self) -> Purpose {
        match *self {
            CertKind::Ca(_) => Purpose::Ca,
            CertKind::BgpsecRouter(_) => Purpose::BgpsecRouter,
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns whether the extension is handled by the X.509 layer.
fn is_standard_extension(id: &[u8]) -> bool {
    [
        oid::CE_AUTHORITY_KEY_IDENTIFIER,
        oid::CE_BASIC_CONSTRAINTS,
        oid::CE_CRL_DISTRIBUTION_POINTS,
        oid::CE_EXTENDED_KEY_USAGE,
        oid::CE_KEY_USAGE,
        oid::CE_SUBJECT_KEY_IDENTIFIER,
        oid::PE_AUTHORITY_INFO_ACCESS,
    ].iter().any(|known| known.0 == id)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::resources::{AsResource, Asn};
    use crate::test::{ec_key, key_id, rsa_key, CertBuilder, Res};

    fn decode(builder: &CertBuilder) -> Result<Cert, ValidationError> {
        Cert::decode(builder.finalize(), &Options::default())
    }

    fn assert_err(builder: &CertBuilder, msg: &str) {
        match decode(builder) {
            Ok(_) => panic!("certificate accepted, expected '{}'", msg),
            Err(err) => {
                // Decoding errors append the position.
                let err = err.to_string();
                assert!(err.starts_with(msg), "unexpected error '{}'", err)
            }
        }
    }

    fn now() -> Time {
        Time::utc(2024, 6, 1, 12, 0, 0)
    }

    #[test]
    fn decode_ca() {
        let cert = decode(&CertBuilder::ca()).unwrap();
        assert_eq!(cert.purpose(), Purpose::Ca);
        assert_eq!(cert.tal_id(), 0);
        assert_eq!(cert.subject_key_identifier(), key_id(&rsa_key(1)));
        assert_eq!(cert.authority_key_identifier(), Some(key_id(&rsa_key(2))));
        assert_eq!(
            cert.ca_issuer().unwrap().as_str(),
            "rsync://example.net/repo/parent.cer"
        );
        assert_eq!(
            cert.crl_uri().unwrap().as_str(),
            "rsync://example.net/repo/parent/parent.crl"
        );
        assert_eq!(cert.expires(), Time::utc(2040, 1, 1, 0, 0, 0));
        let repository = cert.repository().unwrap();
        assert_eq!(
            repository.ca_repository().as_str(),
            "rsync://example.net/repo/ca/"
        );
        assert_eq!(
            repository.rpki_manifest().as_str(),
            "rsync://example.net/repo/ca/ca.mft"
        );
        assert!(repository.rpki_notify().is_none());
        assert!(cert.router_key().is_none());
        assert_eq!(
            cert.ip_resources().to_string(),
            "10.0.0.0/8, 192.0.2.0-192.0.2.130, 2001:db8::/32"
        );
        assert_eq!(
            cert.as_resources().to_string(), "AS64496, AS65000-AS65010"
        );
        assert!(cert.x509().is_some());

        let cert = cert.validate_issued().unwrap().with_tal_id(4);
        assert_eq!(cert.tal_id(), 4);
    }

    #[test]
    fn decode_ca_sia() {
        let mut builder = CertBuilder::ca();
        builder.sia(None);
        assert_err(&builder, "RFC 6487 section 4.8.8: missing SIA");

        builder.sia(Some(&[
            (oid::AD_CA_REPOSITORY, "rsync://example.net/repo/ca/")
        ]));
        assert_err(
            &builder,
            "RFC 6487 section 4.8.8: SIA: \
             missing caRepository or rpkiManifest"
        );

        builder.rpki_sia(
            "rsync://example.net/repo/ca/",
            "rsync://example.net/repo/other/ca.mft"
        );
        assert_err(
            &builder,
            "RFC 6487 section 4.8.8: SIA: \
             conflicting URIs for caRepository and rpkiManifest"
        );

        builder.rpki_sia(
            "rsync://example.net/repo/ca/",
            "rsync://example.net/repo/ca/ca.roa"
        );
        assert_err(&builder, "RFC 6487 section 4.8.8: SIA: not an MFT file");

        builder.sia(Some(&[
            (oid::AD_CA_REPOSITORY, "rsync://example.net/repo/ca/"),
            (oid::AD_RPKI_MANIFEST, "rsync://example.net/repo/ca/ca.mft"),
            (oid::AD_RPKI_NOTIFY, "https://example.net/rrdp/notify.xml"),
        ]));
        let cert = decode(&builder).unwrap();
        assert_eq!(
            cert.repository().unwrap().rpki_notify().unwrap().as_str(),
            "https://example.net/rrdp/notify.xml"
        );
    }

    #[test]
    fn decode_ca_resources() {
        let mut builder = CertBuilder::ca();
        builder.ipv4(None);
        builder.ipv6(None);
        let cert = decode(&builder).unwrap();
        assert!(cert.ip_resources().is_empty());
        assert_eq!(cert.as_resources().len(), 2);

        builder.asn(None);
        assert_err(&builder, "missing IP or AS resources");

        builder.ipv4(Some(Res::Blocks(&["10.0.0.0/8", "10.1.0.0/16"])));
        assert_err(
            &builder,
            "RFC 3779 section 2.2.3.6: IPAddressOrRange: \
             overlapping IP address range"
        );

        builder.ipv4(Some(Res::Inherit));
        let cert = decode(&builder).unwrap();
        assert!(cert.ip_resources().has_inherit());
    }

    #[test]
    fn decode_resources_not_critical() {
        let mut builder = CertBuilder::ca();
        builder.asn(None);
        builder.resources_critical(false);
        assert_err(
            &builder,
            "RFC 6487 section 4.8.10: sbgp-ipAddrBlock: \
             extension not critical"
        );

        let mut builder = CertBuilder::ca();
        builder.ipv4(None);
        builder.ipv6(None);
        builder.resources_critical(false);
        assert_err(
            &builder,
            "RFC 6487 section 4.8.11: autonomousSysNum: \
             extension not critical"
        );
    }

    #[test]
    fn decode_resource_limits() {
        let data = CertBuilder::ca().finalize();

        // The default builder has three IP and two AS entries.
        assert!(
            Cert::decode(
                data.clone(),
                &Options::new().max_ip_resources(3).max_as_resources(2)
            ).is_ok()
        );
        assert!(
            Cert::decode(
                data.clone(), &Options::new().max_ip_resources(2)
            ).is_err()
        );
        assert!(
            Cert::decode(
                data.clone(), &Options::new().max_as_resources(1)
            ).is_err()
        );

        let mut builder = CertBuilder::ca();
        builder.ipv4(None);
        builder.ipv6(None);
        builder.asn(Some(Res::Blocks(&["1", "3", "5", "7-9"])));
        let data = builder.finalize();
        assert!(
            Cert::decode(
                data.clone(), &Options::new().max_as_resources(4)
            ).is_ok()
        );
        assert!(
            Cert::decode(data, &Options::new().max_as_resources(3)).is_err()
        );
    }

    #[test]
    fn decode_policies() {
        let mut builder = CertBuilder::ca();
        builder.policies(false);
        assert!(decode(&builder).is_ok());

        // Two policies.
        builder.raw_extension(
            &oid::CE_CERTIFICATE_POLICIES, true,
            &[
                0x30, 0x18,
                0x30, 0x0a, 0x06, 0x08, 43, 6, 1, 5, 5, 7, 14, 2,
                0x30, 0x0a, 0x06, 0x08, 43, 6, 1, 5, 5, 7, 14, 2,
            ]
        );
        assert_err(
            &builder,
            "RFC 6487 section 4.8.9: certificatePolicies: want 1 policy"
        );

        let mut builder = CertBuilder::ca();
        builder.policies(false);
        builder.raw_extension(
            &oid::CE_CERTIFICATE_POLICIES, false,
            &[
                0x30, 0x0c,
                0x30, 0x0a, 0x06, 0x08, 43, 6, 1, 5, 5, 7, 14, 2,
            ]
        );
        assert_err(
            &builder,
            "RFC 6487 section 4.8.9: certificatePolicies: \
             extension not critical"
        );
    }

    #[test]
    fn decode_router() {
        let cert = decode(&CertBuilder::router()).unwrap();
        assert_eq!(cert.purpose(), Purpose::BgpsecRouter);
        assert!(cert.repository().is_none());
        assert!(cert.ip_resources().is_empty());
        let key = cert.router_key().unwrap();
        assert_eq!(key.as_slice(), ec_key(1).as_ref());
        assert_eq!(
            cert.as_resources().as_slice(),
            &[AsResource::Id(Asn::from_u32(64496))]
        );
    }

    #[test]
    fn decode_router_rejected() {
        let mut builder = CertBuilder::router();
        builder.ipv4(Some(Res::Blocks(&["192.0.2.0/24"])));
        assert_err(&builder, "unexpected IP resources in BGPsec cert");

        let mut builder = CertBuilder::router();
        builder.rpki_sia(
            "rsync://example.net/repo/ca/",
            "rsync://example.net/repo/ca/ca.mft"
        );
        assert_err(&builder, "unexpected SIA extension in BGPsec cert");

        let mut builder = CertBuilder::router();
        builder.public_key(rsa_key(3));
        assert_err(
            &builder,
            "RFC 8208 section 3.1: BGPsec router key must be \
             a P-256 ECDSA key"
        );
    }

    #[test]
    fn decode_router_strict_ski() {
        let mut builder = CertBuilder::router();
        builder.ski(Some(key_id(&rsa_key(9))));
        assert!(decode(&builder).is_ok());
        let err = Cert::decode(
            builder.finalize(), &Options::default().strict(true)
        ).unwrap_err();
        assert_eq!(
            err.to_string(),
            "RFC 8209 section 3.1.1: SKI does not match router key"
        );
        assert!(err.is_inspection());

        assert!(Cert::decode(
            CertBuilder::router().finalize(), &Options::default().strict(true)
        ).is_ok());
    }

    #[test]
    fn decode_missing_ski() {
        let mut builder = CertBuilder::ca();
        builder.ski(None);
        assert_err(&builder, "RFC 6487 section 8.4.2: missing SKI");
    }

    #[test]
    fn decode_unknown_purpose() {
        let mut builder = CertBuilder::ca();
        builder.basic_ca(false);
        assert!(decode(&builder).unwrap_err().is_inspection());
    }

    #[test]
    fn decode_unknown_extension() {
        let mut builder = CertBuilder::ca();
        builder.raw_extension(
            &bcder::Oid(&[43, 6, 1, 4, 1, 99, 1][..]), false, b"\x05\x00"
        );
        assert!(decode(&builder).is_ok());
    }

    #[test]
    fn decode_garbage() {
        let err = Cert::decode(
            Bytes::from_static(b"\x30\x03\x02\x01"), &Options::default()
        ).unwrap_err();
        assert!(err.is_decoding());
    }

    #[test]
    fn validate_issued() {
        let mut builder = CertBuilder::ca();
        builder.aki(None);
        assert_eq!(
            decode(&builder).unwrap().validate_issued().unwrap_err()
                .to_string(),
            "RFC 6487 section 8.4.2: non-trust anchor missing AKI"
        );

        let mut builder = CertBuilder::ca();
        builder.aki(Some(key_id(&rsa_key(1))));
        assert_eq!(
            decode(&builder).unwrap().validate_issued().unwrap_err()
                .to_string(),
            "RFC 6487 section 8.4.2: non-trust anchor AKI may not match SKI"
        );

        let mut builder = CertBuilder::ca();
        builder.aia(None);
        assert_eq!(
            decode(&builder).unwrap().validate_issued().unwrap_err()
                .to_string(),
            "RFC 6487 section 8.4.7: AIA: extension missing"
        );

        let mut builder = CertBuilder::ca();
        builder.crl_uris(&[]);
        assert_eq!(
            decode(&builder).unwrap().validate_issued().unwrap_err()
                .to_string(),
            "RFC 6487 section 4.8.6: CRL: no CRL distribution point extension"
        );

        assert!(decode(&CertBuilder::router()).unwrap()
            .validate_issued().is_ok()
        );
    }

    #[test]
    fn validate_ta() {
        let tal_key = rsa_key(1);
        let cert = decode(&CertBuilder::ta()).unwrap();
        assert!(cert.clone().validate_ta_at(&tal_key, now()).is_ok());

        let err = cert.clone().validate_ta_at(&rsa_key(5), now()).unwrap_err();
        assert!(err.is_verification());
        assert_eq!(
            err.to_string(),
            "RFC 6487 (trust anchor): pubkey does not match TAL pubkey"
        );

        assert_eq!(
            cert.clone().validate_ta_at(b"bogus", now()).unwrap_err()
                .to_string(),
            "RFC 6487 (trust anchor): bad TAL pubkey"
        );

        let mut stripped = cert.clone();
        stripped.strip_x509();
        assert_eq!(
            stripped.validate_ta_at(&tal_key, now()).unwrap_err().to_string(),
            "RFC 6487 (trust anchor): missing pubkey"
        );

        let err = cert.clone().validate_ta_at(
            &tal_key, Time::utc(2019, 12, 31, 23, 59, 59)
        ).unwrap_err();
        assert!(err.is_verification());
        assert_eq!(err.to_string(), "certificate is not yet valid");

        let err = cert.validate_ta_at(
            &tal_key, Time::utc(2040, 1, 1, 0, 0, 1)
        ).unwrap_err();
        assert_eq!(err.to_string(), "certificate has expired");
    }

    #[test]
    fn validate_ta_fields() {
        let tal_key = rsa_key(1);

        let mut builder = CertBuilder::ta();
        builder.aki(None);
        assert!(decode(&builder).unwrap().validate_ta_at(&tal_key, now())
            .is_ok()
        );

        builder.aki(Some(key_id(&rsa_key(2))));
        assert_eq!(
            decode(&builder).unwrap().validate_ta_at(&tal_key, now())
                .unwrap_err().to_string(),
            "RFC 6487 section 8.4.2: \
             trust anchor AKI, if specified, must match SKI"
        );

        let mut builder = CertBuilder::ta();
        builder.aia(Some("rsync://example.net/repo/parent.cer"));
        assert_eq!(
            decode(&builder).unwrap().validate_ta_at(&tal_key, now())
                .unwrap_err().to_string(),
            "RFC 6487 section 8.4.7: trust anchor must not have AIA"
        );

        let mut builder = CertBuilder::ta();
        builder.crl_uris(&["rsync://example.net/repo/ta.crl"]);
        assert_eq!(
            decode(&builder).unwrap().validate_ta_at(&tal_key, now())
                .unwrap_err().to_string(),
            "RFC 6487 section 8.4.2: trust anchor may not specify CRL resource"
        );

        let mut builder = CertBuilder::ta();
        builder.asn(Some(Res::Inherit));
        assert_eq!(
            decode(&builder).unwrap().validate_ta_at(&tal_key, now())
                .unwrap_err().to_string(),
            "RFC 6487 section 7.1: trust anchor must not use inherit"
        );

        let router_key = ec_key(1);
        let mut builder = CertBuilder::router();
        builder.aia(None);
        builder.crl_uris(&[]);
        builder.aki(None);
        assert_eq!(
            decode(&builder).unwrap().validate_ta_at(&router_key, now())
                .unwrap_err().to_string(),
            "BGPsec cert cannot be a trust anchor"
        );
    }

    #[test]
    fn eq_ignores_x509() {
        let cert = decode(&CertBuilder::ca()).unwrap();
        let mut stripped = cert.clone();
        stripped.strip_x509();
        assert!(stripped.x509().is_none());
        assert_eq!(cert, stripped);
        assert_ne!(cert, stripped.with_tal_id(1));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_cert() {
        let cert = decode(&CertBuilder::ca()).unwrap().with_tal_id(2);
        let json = serde_json::to_string(&cert).unwrap();
        let restored: Cert = serde_json::from_str(&json).unwrap();
        assert!(restored.x509().is_none());
        assert_eq!(cert, restored);
    }
}
