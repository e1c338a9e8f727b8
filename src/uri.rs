//! URIs.
//!
//! Resource certificates point to other places in the RPKI through URIs.
//! Only two kinds appear: `rsync://` URIs for repositories, manifests,
//! issuer certificates and CRLs, and `https://` URIs for the RRDP
//! notification file. This module provides a type for each of them.
//!
//! Parsing is simplified in that it only checks for the correct structure
//! and that no forbidden characters are present.

use std::{error, fmt, str};
use bytes::Bytes;


//------------ Constants -----------------------------------------------------

/// The maximum length of a URI we are willing to accept.
pub const MAX_URI_LENGTH: usize = 2048;


//------------ Rsync ---------------------------------------------------------

/// An rsync URI.
///
/// This implements a simplified form of the the rsync URI defined in
/// RFC 5781. The URI must contain an authority and a module. The scheme is
/// matched case-insensitively but kept as given.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rsync {
    bytes: Bytes,
}

impl Rsync {
    pub fn from_string(s: String) -> Result<Self, Error> {
        Self::from_bytes(Bytes::from(s))
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        let rest = check_uri(&bytes, Scheme::Rsync)?;
        let mut parts = rest.splitn(3, |ch| *ch == b'/');
        let authority = parts.next().unwrap_or_default();
        if authority.is_empty() {
            return Err(Error::BadUri)
        }
        match parts.next() {
            Some(module) if !module.is_empty() => { }
            _ => return Err(Error::BadUri)
        }
        Ok(Rsync { bytes })
    }

    pub fn as_str(&self) -> &str {
        // Validated to be ASCII in from_bytes.
        str::from_utf8(self.bytes.as_ref()).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Returns the authority, i.e., the host part of the URI.
    pub fn authority(&self) -> &str {
        self.after_scheme().split('/').next().unwrap_or_default()
    }

    /// Returns the rsync module name.
    pub fn module(&self) -> &str {
        self.after_scheme().split('/').nth(1).unwrap_or_default()
    }

    /// Returns the path within the module.
    pub fn path(&self) -> &str {
        self.after_scheme().splitn(3, '/').nth(2).unwrap_or_default()
    }

    fn after_scheme(&self) -> &str {
        &self.as_str()[Scheme::Rsync.as_str().len()..]
    }

    /// Returns whether this URI starts with all of `base`.
    ///
    /// This is a plain string comparison. A manifest published at a
    /// repository will have the repository URI as its prefix.
    pub fn starts_with(&self, base: &Rsync) -> bool {
        self.bytes.starts_with(base.bytes.as_ref())
    }

    pub fn ends_with(&self, extension: &str) -> bool {
        self.bytes.ends_with(extension.as_bytes())
    }

    /// Returns the type of RPKI object the URI refers to, if known.
    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_path(self.as_str())
    }
}

impl str::FromStr for Rsync {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl fmt::Display for Rsync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Rsync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rsync({})", self)
    }
}


//------------ Https ---------------------------------------------------------

/// An HTTPS URI.
///
/// This supports only what is needed for the RRDP notification reference
/// in a CA certificate. Plain `http://` is not accepted.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Https {
    bytes: Bytes,
}

impl Https {
    pub fn from_string(s: String) -> Result<Self, Error> {
        Self::from_bytes(Bytes::from(s))
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        let rest = check_uri(&bytes, Scheme::Https)?;
        let host = rest.split(|ch| *ch == b'/').next().unwrap_or_default();
        if host.is_empty() || host.len() == rest.len() {
            return Err(Error::BadUri)
        }
        Ok(Https { bytes })
    }

    pub fn as_str(&self) -> &str {
        str::from_utf8(self.bytes.as_ref()).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn host(&self) -> &str {
        self.as_str()[Scheme::Https.as_str().len()..]
            .split('/').next().unwrap_or_default()
    }
}

impl str::FromStr for Https {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl fmt::Display for Https {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Https {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Https({})", self)
    }
}


//------------ Scheme --------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scheme {
    Https,
    Rsync,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https://",
            Scheme::Rsync => "rsync://",
        }
    }

    fn is_prefix_of(self, bytes: &[u8]) -> bool {
        let scheme = self.as_str().as_bytes();
        bytes.len() > scheme.len()
            && bytes[..scheme.len()].eq_ignore_ascii_case(scheme)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ FileType ------------------------------------------------------

/// The type of an RPKI object as derived from its file name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FileType {
    Cer,
    Crl,
    Mft,
    Roa,
    Gbr,
    Asa,
    Tal,
}

impl FileType {
    /// Determines the file type from the extension of the given path.
    ///
    /// The extension is compared ignoring ASCII case.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.as_bytes().rsplit(|ch| *ch == b'.').next()?;
        if ext.len() == path.len() {
            return None
        }
        [
            (FileType::Cer, b"cer"), (FileType::Crl, b"crl"),
            (FileType::Mft, b"mft"), (FileType::Roa, b"roa"),
            (FileType::Gbr, b"gbr"), (FileType::Asa, b"asa"),
            (FileType::Tal, b"tal"),
        ].iter().find_map(|(kind, name)| {
            if ext.eq_ignore_ascii_case(&name[..]) { Some(*kind) }
            else { None }
        })
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns whether all characters are allowed in a URI.
///
/// Only printable ASCII characters other than space are accepted.
pub fn is_uri_ascii<S: AsRef<[u8]>>(slice: S) -> bool {
    slice.as_ref().iter().all(|&ch| ch.is_ascii_graphic())
}

/// Performs the checks common to all URIs and returns what follows the
/// scheme.
fn check_uri(bytes: &[u8], scheme: Scheme) -> Result<&[u8], Error> {
    if bytes.len() > MAX_URI_LENGTH {
        return Err(Error::TooLong)
    }
    if !is_uri_ascii(bytes) {
        return Err(Error::NotAscii)
    }
    if !scheme.is_prefix_of(bytes) {
        return Err(Error::BadScheme)
    }
    // Files and directories may not start with a dot. This also takes care
    // of "." and ".." path segments.
    if bytes.windows(2).any(|window| window == b"/.") {
        return Err(Error::DotSegment)
    }
    Ok(&bytes[scheme.as_str().len()..])
}


//------------ Serde Support -------------------------------------------------

#[cfg(feature = "serde")]
mod serde_support {
    use serde::de::Error as _;
    use super::*;

    macro_rules! serde_uri {
        ( $type:ident ) => {
            impl serde::Serialize for $type {
                fn serialize<S: serde::Serializer>(
                    &self, serializer: S
                ) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> serde::Deserialize<'de> for $type {
                fn deserialize<D: serde::Deserializer<'de>>(
                    deserializer: D
                ) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    $type::from_string(s).map_err(D::Error::custom)
                }
            }
        }
    }

    serde_uri!(Rsync);
    serde_uri!(Https);
}


//------------ Error ---------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    NotAscii,
    TooLong,
    BadUri,
    BadScheme,
    DotSegment,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Error::NotAscii => "invalid characters",
            Error::TooLong => "URI too long",
            Error::BadUri => "bad URI",
            Error::BadScheme => "bad URI scheme",
            Error::DotSegment => "path segment starting with a dot",
        })
    }
}

impl error::Error for Error { }


//============ Tests =========================================================
