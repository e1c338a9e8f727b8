//! The generic X.509 layer.
//!
//! This module contains the types for the parts of a certificate that are
//! not specific to resource certificates: the signed data wrapper, times and
//! validity, the extension list, and the decoded [`Certificate`] itself.
//!
//! `Certificate` also provides access to the standard fields a resource
//! certificate needs: the key identifiers, the issuer and CRL locations,
//! the purpose of the certificate, and its public key. Each of these
//! applies the checks of RFC 6487 for the respective extension.

use std::{error, fmt, io, ops};
use std::convert::Infallible;
use bcder::{decode, encode};
use bcder::{BitString, Captured, ConstOid, Mode, OctetString, Oid, Tag};
use bcder::{Ia5String, Unsigned};
use bcder::decode::{BytesSource, DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use chrono::{Datelike, DateTime, TimeZone, Timelike, Utc};
use log::debug;
use crate::crypto::{KeyIdentifier, PublicKeyInfo};
use crate::error::{InspectionError, ValidationError, VerificationError};
use crate::{oid, uri};


//------------ Certificate ---------------------------------------------------

/// A decoded X.509 certificate.
///
/// ```text
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
///
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///      extensions      [3]  EXPLICIT Extensions OPTIONAL }
/// ```
///
/// Only version 3 certificates with extensions are accepted. The unique
/// identifiers must not be present. The names are kept in their encoded
/// form for whoever verifies the certificate chain. Extensions are kept in
/// their original order; a certificate with two extensions of the same
/// type is rejected.
#[derive(Clone, Debug)]
pub struct Certificate {
    signed_data: SignedData,
    serial_number: Unsigned,
    signature: Captured,
    issuer: Captured,
    validity: Validity,
    subject: Captured,
    public_key: PublicKeyInfo,
    extensions: Vec<Extension>,
}

impl Certificate {
    /// Decodes a source as a certificate.
    pub fn decode<S: IntoSource>(
        source: S,
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    /// Takes an encoded certificate from the beginning of a value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let signed_data = SignedData::from_constructed(cons)?;
            Mode::Der.decode(
                signed_data.data().clone().into_bytes(),
                move |cons| Self::take_tbs(cons, signed_data)
            ).map_err(DecodeError::convert)
        })
    }

    fn take_tbs(
        cons: &mut decode::Constructed<BytesSource>,
        signed_data: SignedData,
    ) -> Result<Self, DecodeError<Infallible>> {
        cons.take_sequence(|cons| {
            // version [0] EXPLICIT Version DEFAULT v1. We need extensions
            // so it must be v3 which is encoded as 2.
            cons.take_constructed_if(Tag::CTX_0, |c| c.skip_u8_if(2))?;
            let serial_number = Unsigned::take_from(cons)?;
            let signature = cons.capture_one()?;
            let issuer = cons.capture_one()?;
            let validity = Validity::take_from(cons)?;
            let subject = cons.capture_one()?;
            let public_key = PublicKeyInfo::take_from(cons)?;
            let extensions = cons.take_constructed_if(
                Tag::CTX_3, Extension::take_list_from
            )?;
            Ok(Certificate {
                signed_data, serial_number, signature, issuer, validity,
                subject, public_key, extensions
            })
        })
    }

    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    pub fn serial_number(&self) -> &Unsigned {
        &self.serial_number
    }

    /// Returns the encoded signature algorithm of the to-be-signed part.
    pub fn signature(&self) -> &Captured {
        &self.signature
    }

    pub fn issuer(&self) -> &Captured {
        &self.issuer
    }

    pub fn subject(&self) -> &Captured {
        &self.subject
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn public_key(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    /// Returns all extensions in the order they appear in the certificate.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Returns the extension with the given identifier if present.
    pub fn extension(&self, id: &ConstOid) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.id() == id)
    }
}


/// # Standard Fields
///
impl Certificate {
    /// Returns the subject key identifier.
    ///
    /// ```text
    /// SubjectKeyIdentifier ::= KeyIdentifier
    /// ```
    ///
    /// RFC 6487, section 4.8.2, requires the extension to be non-critical.
    pub fn subject_key_identifier(
        &self
    ) -> Result<Option<KeyIdentifier>, ValidationError> {
        let ext = match self.extension(&oid::CE_SUBJECT_KEY_IDENTIFIER) {
            Some(ext) => ext,
            None => return Ok(None)
        };
        ext.require_non_critical(
            "RFC 6487 section 4.8.2: SKI: extension must not be critical"
        )?;
        Ok(Some(ext.decode_value(KeyIdentifier::take_from)?))
    }

    /// Returns the authority key identifier.
    ///
    /// ```text
    /// AuthorityKeyIdentifier ::= SEQUENCE {
    ///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    ///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    ///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
    /// ```
    ///
    /// The extension must be non-critical. If present, the keyIdentifier
    /// field must be present and the other two must not be.
    pub fn authority_key_identifier(
        &self
    ) -> Result<Option<KeyIdentifier>, ValidationError> {
        let ext = match self.extension(&oid::CE_AUTHORITY_KEY_IDENTIFIER) {
            Some(ext) => ext,
            None => return Ok(None)
        };
        ext.require_non_critical(
            "RFC 6487 section 4.8.3: AKI: extension must not be critical"
        )?;
        Ok(Some(ext.decode_value(|cons| {
            cons.take_sequence(|cons| {
                cons.take_value_if(Tag::CTX_0, KeyIdentifier::from_content)
            })
        })?))
    }

    /// Returns the location of the issuer’s certificate.
    ///
    /// ```text
    /// AuthorityInfoAccessSyntax  ::=
    ///         SEQUENCE SIZE (1..MAX) OF AccessDescription
    ///
    /// AccessDescription  ::=  SEQUENCE {
    ///         accessMethod          OBJECT IDENTIFIER,
    ///         accessLocation        GeneralName  }
    /// ```
    ///
    /// The extension must be non-critical and contain exactly one access
    /// description of type id-ad-caIssuers with an rsync URI.
    pub fn ca_issuer(&self) -> Result<Option<uri::Rsync>, ValidationError> {
        let ext = match self.extension(&oid::PE_AUTHORITY_INFO_ACCESS) {
            Some(ext) => ext,
            None => return Ok(None)
        };
        ext.require_non_critical(
            "RFC 6487 section 4.8.7: AIA: extension must not be critical"
        )?;
        Ok(Some(ext.decode_value(|cons| {
            cons.take_sequence(|cons| {
                cons.take_sequence(|cons| {
                    oid::AD_CA_ISSUERS.skip_if(cons)?;
                    take_rsync_general_name(cons)
                })
            })
        })?))
    }

    /// Returns the location of the CRL.
    ///
    /// ```text
    /// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
    ///
    /// DistributionPoint ::= SEQUENCE {
    ///    distributionPoint       [0]     DistributionPointName OPTIONAL,
    ///    reasons                 [1]     ReasonFlags OPTIONAL,
    ///    cRLIssuer               [2]     GeneralNames OPTIONAL }
    ///
    /// DistributionPointName ::= CHOICE {
    ///    fullName                [0]     GeneralNames,
    ///    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
    /// ```
    ///
    /// There must be exactly one distribution point with only the fullName
    /// present. The first rsync URI among the names is used, other URIs
    /// are skipped.
    pub fn crl_uri(&self) -> Result<Option<uri::Rsync>, ValidationError> {
        let ext = match self.extension(&oid::CE_CRL_DISTRIBUTION_POINTS) {
            Some(ext) => ext,
            None => return Ok(None)
        };
        ext.require_non_critical(
            "RFC 6487 section 4.8.6: CRL: extension must not be critical"
        )?;
        Ok(Some(ext.decode_value(|cons| {
            cons.take_sequence(|cons| {
                cons.take_sequence(|cons| {
                    cons.take_constructed_if(Tag::CTX_0, |cons| {
                        cons.take_constructed_if(Tag::CTX_0, |cons| {
                            let mut res = None;
                            while let Some(uri) = cons.take_opt_value_if(
                                Tag::CTX_6, |content| {
                                    Ia5String::from_content(content)
                                }
                            )? {
                                if res.is_some() {
                                    continue
                                }
                                let uri = uri.into_bytes();
                                match uri::Rsync::from_bytes(uri.clone()) {
                                    Ok(uri) => res = Some(uri),
                                    Err(_) => {
                                        debug!(
                                            "skipping CRL distribution \
                                             point {}",
                                            String::from_utf8_lossy(&uri)
                                        );
                                    }
                                }
                            }
                            res.ok_or_else(|| cons.content_err(
                                "RFC 6487 section 4.8.6: CRL: \
                                 no rsync URI in distribution point"
                            ))
                        })
                    })
                })
            })
        })?))
    }

    /// Classifies the purpose of the certificate.
    ///
    /// A certificate with the cA flag set in its basic constraints is a CA
    /// certificate unless its key usage forbids signing certificates.
    /// Otherwise, the certificate must have a non-critical extended key
    /// usage extension with the BGPsec router purpose as its only purpose.
    pub fn purpose(&self) -> Result<Purpose, ValidationError> {
        if self.is_ca()? {
            return Ok(Purpose::Ca)
        }
        let ext = match self.extension(&oid::CE_EXTENDED_KEY_USAGE) {
            Some(ext) => ext,
            None => {
                return Err(InspectionError::new(
                    "EKU: extension missing in non-CA certificate"
                ).into())
            }
        };
        ext.require_non_critical(
            "RFC 8209 section 3.1.3.2: EKU: extension must not be critical"
        )?;
        let purposes = ext.decode_value(|cons| {
            cons.take_sequence(|cons| {
                let mut res = Vec::new();
                while let Some(id) = Oid::take_opt_from(cons)? {
                    res.push(id);
                }
                Ok(res)
            })
        })?;
        match purposes.as_slice() {
            [id] if *id == oid::KP_BGPSEC_ROUTER => Ok(Purpose::BgpsecRouter),
            [_] => {
                Err(InspectionError::new(
                    "EKU: unknown certificate purpose"
                ).into())
            }
            _ => {
                Err(InspectionError::new(
                    "EKU: expected exactly one purpose"
                ).into())
            }
        }
    }

    /// Returns whether the certificate is marked as a CA certificate.
    ///
    /// ```text
    /// BasicConstraints ::= SEQUENCE {
    ///     cA                      BOOLEAN DEFAULT FALSE,
    ///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
    /// ```
    fn is_ca(&self) -> Result<bool, ValidationError> {
        let ca = match self.extension(&oid::CE_BASIC_CONSTRAINTS) {
            Some(ext) => {
                ext.decode_value(|cons| {
                    cons.take_sequence(|cons| {
                        let ca = cons.take_opt_bool()?.unwrap_or(false);
                        cons.skip_all()?;
                        Ok(ca)
                    })
                })?
            }
            None => false
        };
        if !ca {
            return Ok(false)
        }
        match self.extension(&oid::CE_KEY_USAGE) {
            // keyCertSign is bit 5.
            Some(ext) => Ok(ext.decode_value(BitString::take_from)?.bit(5)),
            None => Ok(true)
        }
    }

    /// Returns the public key of a BGPsec router certificate.
    ///
    /// RFC 8208 requires router keys to be ECDSA keys on the P-256 curve.
    pub fn router_public_key(&self) -> Result<PublicKeyInfo, ValidationError> {
        if self.public_key.is_router_key() {
            Ok(self.public_key.clone())
        }
        else {
            Err(InspectionError::new(
                "RFC 8208 section 3.1: BGPsec router key must be \
                 a P-256 ECDSA key"
            ).into())
        }
    }
}


//------------ Purpose -------------------------------------------------------

/// The purpose of a resource certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Purpose {
    /// A CA certificate that issues further objects.
    Ca,

    /// A BGPsec router certificate.
    BgpsecRouter,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Purpose::Ca => "CA",
            Purpose::BgpsecRouter => "BGPsec router",
        })
    }
}


//------------ Extension -----------------------------------------------------

/// A single certificate extension.
///
/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING  }
/// ```
#[derive(Clone, Debug)]
pub struct Extension {
    id: Oid<Bytes>,
    critical: bool,
    value: Bytes,
}

impl Extension {
    pub fn new(id: Oid<Bytes>, critical: bool, value: Bytes) -> Self {
        Extension { id, critical, value }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(Extension {
                id: Oid::take_from(cons)?,
                critical: cons.take_opt_bool()?.unwrap_or(false),
                value: OctetString::take_from(cons)?.into_bytes(),
            })
        })
    }

    /// Takes the content of the extensions field of a certificate.
    ///
    /// ```text
    /// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
    /// ```
    pub fn take_list_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<Self>, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res: Vec<Extension> = Vec::new();
            while let Some(ext) = Self::take_opt_from(cons)? {
                if res.iter().any(|item| item.id == ext.id) {
                    return Err(cons.content_err(
                        "RFC 5280 section 4.2: duplicate extension"
                    ))
                }
                res.push(ext);
            }
            Ok(res)
        })
    }

    pub fn id(&self) -> &Oid<Bytes> {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the content of the extension value octet string.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Decodes the content of the extension value.
    ///
    /// The value must consist of exactly what `op` takes.
    pub fn decode_value<F, T>(
        &self, op: F
    ) -> Result<T, DecodeError<Infallible>>
    where
        F: FnOnce(
            &mut decode::Constructed<BytesSource>
        ) -> Result<T, DecodeError<Infallible>>
    {
        Mode::Der.decode(self.value.clone(), op)
    }

    pub fn require_critical(
        &self, msg: &'static str
    ) -> Result<(), InspectionError> {
        if self.critical { Ok(()) }
        else { Err(InspectionError::new(msg)) }
    }

    pub fn require_non_critical(
        &self, msg: &'static str
    ) -> Result<(), InspectionError> {
        if self.critical { Err(InspectionError::new(msg)) }
        else { Ok(()) }
    }

    /// Returns an encoder for the extension.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.id.encode_ref(),
            if self.critical { Some(true.encode()) } else { None },
            OctetString::encode_slice(self.value.as_ref()),
        ))
    }
}


//------------ SignedData ----------------------------------------------------

/// The outer layer of a certificate.
///
/// This keeps the to-be-signed data in its encoded form together with the
/// signature algorithm and signature value for later verification.
#[derive(Clone, Debug)]
pub struct SignedData {
    data: Captured,
    algorithm: Captured,
    signature: BitString,
}

impl SignedData {
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(SignedData {
            data: cons.capture_one()?,
            algorithm: cons.capture_one()?,
            signature: BitString::take_from(cons)?,
        })
    }

    /// Returns the encoded to-be-signed data.
    pub fn data(&self) -> &Captured {
        &self.data
    }

    /// Returns the encoded signature algorithm identifier.
    pub fn algorithm(&self) -> &Captured {
        &self.algorithm
    }

    pub fn signature(&self) -> Bytes {
        self.signature.octet_bytes()
    }
}


//------------ Time ----------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Creates a time value from a UTC date and time.
    ///
    /// # Panics
    ///
    /// The function panics if the values do not form a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Self {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec).single() {
            Some(dt) => Time(dt),
            None => panic!("invalid date and time")
        }
    }

    /// Creates a time value from seconds since the Unix epoch.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Time)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            // RFC 5280 requires the format YYMMDDHHMMSSZ for UTCTime and
            // YYYYMMDDHHMMSSZ for GeneralizedTime.
            let year = if tag == Tag::UTC_TIME {
                let year = read_digits(prim, 2)?;
                if year >= 50 { year + 1900 } else { year + 2000 }
            }
            else if tag == Tag::GENERALIZED_TIME {
                read_digits(prim, 4)?
            }
            else {
                return Err(prim.content_err("malformed time value"))
            };
            let month = read_digits(prim, 2)?;
            let day = read_digits(prim, 2)?;
            let hour = read_digits(prim, 2)?;
            let min = read_digits(prim, 2)?;
            let sec = read_digits(prim, 2)?;
            if prim.take_u8()? != b'Z' {
                return Err(prim.content_err("malformed time value"))
            }
            Utc.with_ymd_and_hms(year as i32, month, day, hour, min, sec)
                .single()
                .map(Time)
                .ok_or_else(|| prim.content_err("malformed time value"))
        })
    }

    pub fn verify_not_before(
        &self,
        now: Time
    ) -> Result<(), ValidityPeriodError> {
        if now.0 < self.0 {
            Err(ValidityPeriodError::too_new())
        }
        else {
            Ok(())
        }
    }

    pub fn verify_not_after(
        &self,
        now: Time
    ) -> Result<(), ValidityPeriodError> {
        if now.0 > self.0 {
            Err(ValidityPeriodError::too_old())
        }
        else {
            Ok(())
        }
    }

    /// Returns an encoder for the time.
    ///
    /// Uses UTCTime for years 1950 through 2049 and GeneralizedTime
    /// otherwise as required by RFC 5280.
    pub fn encode_varied(self) -> impl encode::Values {
        if self.year() < 1950 || self.year() > 2049 {
            (None, Some(GeneralizedTime(self).encode()))
        }
        else {
            (Some(UtcTime(self).encode()), None)
        }
    }
}

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

fn read_digits<S: decode::Source>(
    source: &mut S, len: usize
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..len {
        let ch = source.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(source.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//------------ UtcTime and GeneralizedTime -----------------------------------

struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}

struct GeneralizedTime(Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ Validity ------------------------------------------------------

#[derive(Clone, Debug, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }

    pub fn verify_at(self, now: Time) -> Result<(), ValidityPeriodError> {
        self.not_before.verify_not_before(now)?;
        self.not_after.verify_not_after(now)?;
        Ok(())
    }

    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.not_before.encode_varied(),
            self.not_after.encode_varied(),
        ))
    }
}


//------------ Helper Functions ----------------------------------------------

/// Takes a general name that must be an rsync URI.
///
/// ```text
/// GeneralName ::= CHOICE {
///     ...
///     uniformResourceIdentifier       [6]     IA5String,
///     ... }
/// ```
pub fn take_rsync_general_name<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<uri::Rsync, DecodeError<S::Error>> {
    cons.take_value_if(Tag::CTX_6, |content| {
        let uri = Ia5String::from_content(content)?;
        uri::Rsync::from_bytes(uri.into_bytes()).map_err(|_| {
            content.content_err("invalid rsync URI")
        })
    })
}


//------------ ValidityPeriodError -------------------------------------------

/// A certificate is outside of its period of validity.
#[derive(Clone, Copy, Debug)]
pub struct ValidityPeriodError {
    /// Is the certificate too new?
    ///
    /// It is too old otherwise.
    too_new: bool,
}

impl ValidityPeriodError {
    fn too_new() -> Self {
        ValidityPeriodError { too_new: true }
    }

    fn too_old() -> Self {
        ValidityPeriodError { too_new: false }
    }
}

impl From<ValidityPeriodError> for VerificationError {
    fn from(err: ValidityPeriodError) -> Self {
        VerificationError::new(
            if err.too_new {
                "certificate is not yet valid"
            }
            else {
                "certificate has expired"
            }
        )
    }
}

impl fmt::Display for ValidityPeriodError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(
            if self.too_new {
                "certificate is not yet valid"
            }
            else {
                "certificate has expired"
            }
        )
    }
}

impl error::Error for ValidityPeriodError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{CertBuilder, ec_key};

    #[test]
    fn time_take_from() {
        assert_eq!(
            Mode::Der.decode(
                Bytes::from_static(b"\x17\x0d491231235959Z"), Time::take_from
            ).unwrap(),
            Time::utc(2049, 12, 31, 23, 59, 59)
        );
        assert_eq!(
            Mode::Der.decode(
                Bytes::from_static(b"\x17\x0d500101000000Z"), Time::take_from
            ).unwrap(),
            Time::utc(1950, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            Mode::Der.decode(
                Bytes::from_static(b"\x18\x0f20500101000000Z"),
                Time::take_from
            ).unwrap(),
            Time::utc(2050, 1, 1, 0, 0, 0)
        );
        assert!(Mode::Der.decode(
            Bytes::from_static(b"\x17\x0d491331235959Z"), Time::take_from
        ).is_err());
        assert!(Mode::Der.decode(
            Bytes::from_static(b"\x17\x0d4912312359591"), Time::take_from
        ).is_err());
    }

    #[test]
    fn time_encode_then_take() {
        for time in &[
            Time::utc(2021, 3, 4, 5, 6, 7), Time::utc(2077, 1, 2, 3, 4, 5)
        ] {
            let encoded = encode::Values::to_captured(
                &time.encode_varied(), Mode::Der
            );
            assert_eq!(
                Mode::Der.decode(
                    encoded.into_bytes(), Time::take_from
                ).unwrap(),
                *time
            );
        }
    }

    #[test]
    fn validity_verify_at() {
        let validity = Validity::new(
            Time::utc(2020, 1, 1, 0, 0, 0), Time::utc(2021, 1, 1, 0, 0, 0)
        );
        assert!(validity.verify_at(Time::utc(2020, 6, 1, 0, 0, 0)).is_ok());
        assert!(validity.verify_at(Time::utc(2019, 6, 1, 0, 0, 0)).is_err());
        assert!(validity.verify_at(Time::utc(2021, 6, 1, 0, 0, 0)).is_err());
    }

    #[test]
    fn decode_certificate() {
        let cert = Certificate::decode(CertBuilder::ca().finalize()).unwrap();
        assert!(cert.subject_key_identifier().unwrap().is_some());
        assert!(cert.authority_key_identifier().unwrap().is_some());
        assert!(cert.ca_issuer().unwrap().is_some());
        assert!(cert.crl_uri().unwrap().is_some());
        assert_eq!(cert.purpose().unwrap(), Purpose::Ca);
    }

    #[test]
    fn duplicate_extension() {
        let mut builder = CertBuilder::ca();
        builder.raw_extension(
            &oid::CE_SUBJECT_KEY_IDENTIFIER, false, [4u8; 22].as_ref()
        );
        assert!(Certificate::decode(builder.finalize()).is_err());
    }

    #[test]
    fn critical_key_identifiers() {
        let mut builder = CertBuilder::ca();
        builder.ski_critical(true);
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.subject_key_identifier().is_err());

        let mut builder = CertBuilder::ca();
        builder.aki_critical(true);
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.authority_key_identifier().is_err());
    }

    #[test]
    fn purpose() {
        let cert = Certificate::decode(
            CertBuilder::router().finalize()
        ).unwrap();
        assert_eq!(cert.purpose().unwrap(), Purpose::BgpsecRouter);
        assert!(cert.router_public_key().unwrap().is_router_key());

        let mut builder = CertBuilder::router();
        builder.eku(None);
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.purpose().is_err());

        let mut builder = CertBuilder::router();
        builder.eku(Some(&[oid::KP_BGPSEC_ROUTER, oid::AD_CA_ISSUERS][..]));
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.purpose().is_err());

        let mut builder = CertBuilder::router();
        builder.public_key(crate::test::rsa_key(7));
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.router_public_key().is_err());

        let mut builder = CertBuilder::ca();
        builder.public_key(ec_key(3));
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.router_public_key().is_ok());
    }

    #[test]
    fn crl_uri_skips_other_schemes() {
        let mut builder = CertBuilder::ca();
        builder.crl_uris(&["https://host/ca.crl", "rsync://host/mod/ca.crl"]);
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert_eq!(
            cert.crl_uri().unwrap().unwrap().as_str(),
            "rsync://host/mod/ca.crl"
        );

        let mut builder = CertBuilder::ca();
        builder.crl_uris(&["https://host/ca.crl"]);
        let cert = Certificate::decode(builder.finalize()).unwrap();
        assert!(cert.crl_uri().is_err());
    }
}
