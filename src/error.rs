//! Error handling.
//!
//! Parsing and checking a certificate can fail for three reasons. The DER
//! encoding may be broken, represented by bcder’s [`DecodeError`]. The
//! certificate may be well-formed but violate the RPKI profile, which is an
//! [`InspectionError`]. Or a trust anchor may not match what the trust
//! anchor locator promised, which is a [`VerificationError`]. All
//! certificate-level operations return a [`ValidationError`] that wraps
//! one of these three.
//!
//! All these errors only ever concern a single certificate. Errors that
//! indicate a corrupted pipeline live with the types they concern, see
//! [`wire::ReadError`][crate::wire::ReadError] and
//! [`auth::DuplicateKey`][crate::auth::DuplicateKey].

use std::{error, fmt};
use std::convert::Infallible;
use bcder::decode::{ContentError, DecodeError};


//------------ InspectionError -----------------------------------------------

/// A certificate violates a rule of the resource certificate profile.
#[derive(Debug)]
pub struct InspectionError {
    inner: ContentError,
}

impl InspectionError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        InspectionError { inner: err.into() }
    }
}

impl From<ContentError> for InspectionError {
    fn from(err: ContentError) -> InspectionError {
        InspectionError { inner: err }
    }
}

impl From<InspectionError> for ContentError {
    fn from(err: InspectionError) -> Self {
        err.inner
    }
}

impl fmt::Display for InspectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl error::Error for InspectionError { }


//------------ VerificationError ---------------------------------------------

/// A trust anchor certificate does not match its out-of-band information.
#[derive(Debug)]
pub struct VerificationError {
    inner: ContentError,
}

impl VerificationError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        VerificationError { inner: err.into() }
    }
}

impl From<ContentError> for VerificationError {
    fn from(err: ContentError) -> VerificationError {
        VerificationError { inner: err }
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl error::Error for VerificationError { }


//------------ ValidationError -----------------------------------------------

/// A certificate was rejected.
///
/// The `Display` implementation produces the diagnostic for the rejection
/// which, where applicable, names the violated RFC section.
#[derive(Debug)]
pub struct ValidationError {
    inner: ValidationErrorKind,
}

#[derive(Debug)]
enum ValidationErrorKind {
    Decoding(DecodeError<Infallible>),
    Inspection(InspectionError),
    Verification(VerificationError),
}

impl ValidationError {
    /// Returns whether the certificate failed to decode.
    pub fn is_decoding(&self) -> bool {
        matches!(self.inner, ValidationErrorKind::Decoding(_))
    }

    /// Returns whether the certificate violated the profile.
    pub fn is_inspection(&self) -> bool {
        matches!(self.inner, ValidationErrorKind::Inspection(_))
    }

    /// Returns whether a trust anchor failed verification.
    pub fn is_verification(&self) -> bool {
        matches!(self.inner, ValidationErrorKind::Verification(_))
    }
}

impl From<DecodeError<Infallible>> for ValidationError {
    fn from(err: DecodeError<Infallible>) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Decoding(err)
        }
    }
}

impl From<InspectionError> for ValidationError {
    fn from(err: InspectionError) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Inspection(err)
        }
    }
}

impl From<VerificationError> for ValidationError {
    fn from(err: VerificationError) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Verification(err)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ValidationErrorKind::Decoding(ref inner) => inner.fmt(f),
            ValidationErrorKind::Inspection(ref inner) => inner.fmt(f),
            ValidationErrorKind::Verification(ref inner) => inner.fmt(f),
        }
    }
}

impl error::Error for ValidationError { }

