//! Resource certificate specific extensions.
//!
//! This module contains the subject information access extension, which
//! tells where a CA publishes its products, and the certificate policies
//! extension, which for resource certificates must name the RPKI policy.

use bcder::decode;
use bcder::{Captured, Ia5String, Mode, Oid, Tag};
use bcder::decode::DecodeError;
use bytes::Bytes;
use crate::{oid, uri};
use crate::error::{InspectionError, ValidationError};
use crate::uri::FileType;
use crate::x509::Extension;


//------------ Sia -----------------------------------------------------------

/// The content of a subject information access extension.
///
/// ```text
/// SubjectInfoAccessSyntax  ::=
///         SEQUENCE SIZE (1..MAX) OF AccessDescription
///
/// AccessDescription  ::=  SEQUENCE {
///         accessMethod          OBJECT IDENTIFIER,
///         accessLocation        GeneralName  }
/// ```
///
/// Only the access methods used by CA certificates are kept. Other methods
/// are skipped. If a method appears more than once, the first location is
/// used but all of them must be URIs of the right scheme.
#[derive(Clone, Debug, Default)]
pub struct Sia {
    ca_repository: Option<uri::Rsync>,
    rpki_manifest: Option<uri::Rsync>,
    rpki_notify: Option<uri::Https>,
}

impl Sia {
    pub fn ca_repository(&self) -> Option<&uri::Rsync> {
        self.ca_repository.as_ref()
    }

    pub fn rpki_manifest(&self) -> Option<&uri::Rsync> {
        self.rpki_manifest.as_ref()
    }

    pub fn rpki_notify(&self) -> Option<&uri::Https> {
        self.rpki_notify.as_ref()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut sia = Sia::default();
        cons.take_sequence(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let method = Oid::take_from(cons)?;
                if method == oid::AD_CA_REPOSITORY {
                    let uri = take_location(
                        cons, uri::Rsync::from_bytes,
                        "RFC 6487 section 4.8.8: SIA: caRepository: \
                         not an rsync URI"
                    )?;
                    sia.ca_repository.get_or_insert(uri);
                }
                else if method == oid::AD_RPKI_MANIFEST {
                    let uri = take_location(
                        cons, uri::Rsync::from_bytes,
                        "RFC 6487 section 4.8.8: SIA: rpkiManifest: \
                         not an rsync URI"
                    )?;
                    sia.rpki_manifest.get_or_insert(uri);
                }
                else if method == oid::AD_RPKI_NOTIFY {
                    let uri = take_location(
                        cons, uri::Https::from_bytes,
                        "RFC 8182 section 3.2: SIA: rpkiNotify: \
                         not an https URI"
                    )?;
                    sia.rpki_notify.get_or_insert(uri);
                }
                else {
                    cons.skip_all()?;
                }
                Ok(())
            })? { }
            Ok(())
        })?;
        Ok(sia)
    }
}


//------------ Repository ----------------------------------------------------

/// The publication locations of a CA certificate.
///
/// This is what remains of the subject information access extension after
/// it has been checked: a CA must name both its repository and its
/// manifest, and the manifest must live inside the repository.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Repository {
    ca_repository: uri::Rsync,
    rpki_manifest: uri::Rsync,
    rpki_notify: Option<uri::Https>,
}

impl Repository {
    /// Creates a value from its parts.
    ///
    /// This applies the same checks as decoding from an extension.
    pub fn new(
        ca_repository: uri::Rsync,
        rpki_manifest: uri::Rsync,
        rpki_notify: Option<uri::Https>,
    ) -> Result<Self, InspectionError> {
        if !rpki_manifest.starts_with(&ca_repository) {
            return Err(InspectionError::new(
                "RFC 6487 section 4.8.8: SIA: \
                 conflicting URIs for caRepository and rpkiManifest"
            ))
        }
        if rpki_manifest.file_type() != Some(FileType::Mft) {
            return Err(InspectionError::new(
                "RFC 6487 section 4.8.8: SIA: not an MFT file"
            ))
        }
        Ok(Repository { ca_repository, rpki_manifest, rpki_notify })
    }

    /// Decodes and checks the subject information access extension.
    pub fn from_extension(ext: &Extension) -> Result<Self, ValidationError> {
        ext.require_non_critical(
            "RFC 6487 section 4.8.8: SIA: extension not non-critical"
        )?;
        let sia = ext.decode_value(Sia::take_from)?;
        Ok(Self::from_sia(sia)?)
    }

    pub fn from_sia(sia: Sia) -> Result<Self, InspectionError> {
        match (sia.ca_repository, sia.rpki_manifest) {
            (Some(repo), Some(mft)) => Self::new(repo, mft, sia.rpki_notify),
            _ => {
                Err(InspectionError::new(
                    "RFC 6487 section 4.8.8: SIA: \
                     missing caRepository or rpkiManifest"
                ))
            }
        }
    }

    pub fn ca_repository(&self) -> &uri::Rsync {
        &self.ca_repository
    }

    pub fn rpki_manifest(&self) -> &uri::Rsync {
        &self.rpki_manifest
    }

    pub fn rpki_notify(&self) -> Option<&uri::Https> {
        self.rpki_notify.as_ref()
    }
}


//------------ CertPolicy ----------------------------------------------------

/// The certificate policy of a resource certificate.
///
/// ```text
/// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
///
/// PolicyInformation ::= SEQUENCE {
///      policyIdentifier   CertPolicyId,
///      policyQualifiers   SEQUENCE SIZE (1..MAX) OF
///                              PolicyQualifierInfo OPTIONAL }
///
/// PolicyQualifierInfo ::= SEQUENCE {
///      policyQualifierId  PolicyQualifierId,
///      qualifier          ANY DEFINED BY policyQualifierId }
///
/// CPSuri ::= IA5String
/// ```
///
/// RFC 6487 requires the extension to be critical and to contain exactly
/// one policy which, according to RFC 7318, must be the RPKI policy and
/// may have a single CPS qualifier.
#[derive(Clone, Debug)]
pub struct CertPolicy {
    cps: Option<Bytes>,
}

impl CertPolicy {
    pub fn from_extension(ext: &Extension) -> Result<Self, ValidationError> {
        ext.require_critical(
            "RFC 6487 section 4.8.9: certificatePolicies: \
             extension not critical"
        )?;
        let policies = ext.decode_value(|cons| {
            cons.take_sequence(|cons| {
                let mut res = Vec::new();
                while let Some(policy) = PolicyInfo::take_opt_from(cons)? {
                    res.push(policy)
                }
                Ok(res)
            })
        })?;
        Ok(Self::from_policies(policies)?)
    }

    fn from_policies(
        mut policies: Vec<PolicyInfo>
    ) -> Result<Self, InspectionError> {
        if policies.len() != 1 {
            return Err(InspectionError::new(
                "RFC 6487 section 4.8.9: certificatePolicies: want 1 policy"
            ))
        }
        let policy = policies.remove(0);
        if policy.id != oid::CP_IPADDR_ASNUMBER {
            return Err(InspectionError::new(
                "RFC 7318 section 2: certificatePolicies: unexpected OID"
            ))
        }
        let mut qualifiers = match policy.qualifiers {
            Some(qualifiers) => qualifiers,
            None => return Ok(CertPolicy { cps: None })
        };
        if qualifiers.len() != 1 {
            return Err(InspectionError::new(
                "RFC 7318 section 2: certificatePolicies: \
                 want 1 policy qualifier"
            ))
        }
        let (id, qualifier) = qualifiers.remove(0);
        if id != oid::QT_CPS {
            return Err(InspectionError::new(
                "RFC 7318 section 2: certificatePolicies: want CPS"
            ))
        }
        let cps = Mode::Der.decode(
            qualifier.into_bytes(), Ia5String::take_from
        ).map_err(|_| {
            InspectionError::new(
                "RFC 5280 section 4.2.1.4: certificatePolicies: \
                 CPS qualifier must be an IA5String"
            )
        })?;
        Ok(CertPolicy { cps: Some(cps.into_bytes()) })
    }

    /// Returns the URI of the certification practice statement if given.
    pub fn cps(&self) -> Option<&[u8]> {
        self.cps.as_ref().map(AsRef::as_ref)
    }
}


//------------ PolicyInfo ----------------------------------------------------

/// A single, not yet checked policy information.
#[derive(Clone, Debug)]
struct PolicyInfo {
    id: Oid<Bytes>,
    qualifiers: Option<Vec<(Oid<Bytes>, Captured)>>,
}

impl PolicyInfo {
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let id = Oid::take_from(cons)?;
            let qualifiers = cons.take_opt_sequence(|cons| {
                let mut res = Vec::new();
                while let Some(item) = cons.take_opt_sequence(|cons| {
                    Ok((Oid::take_from(cons)?, cons.capture_all()?))
                })? {
                    res.push(item)
                }
                Ok(res)
            })?;
            Ok(PolicyInfo { id, qualifiers })
        })
    }
}


//------------ Helper Functions ----------------------------------------------

/// Takes an access location that must be a URI understood by `op`.
fn take_location<S: decode::Source, F, T, E>(
    cons: &mut decode::Constructed<S>,
    op: F,
    error_msg: &'static str,
) -> Result<T, DecodeError<S::Error>>
where F: FnOnce(Bytes) -> Result<T, E> {
    cons.take_value(|tag, content| {
        if tag != Tag::CTX_6 {
            return Err(content.content_err(error_msg))
        }
        let uri = Ia5String::from_content(content)?;
        op(uri.into_bytes()).map_err(|_| content.content_err(error_msg))
    })
}


//============ Tests =========================================================
