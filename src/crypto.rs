//! Key identifiers and public keys.

use std::{error, fmt, io, str};
use std::cmp::Ordering;
use std::convert::{Infallible, TryFrom};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bcder::decode;
use bcder::{BitString, Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use ring::digest;
use crate::oid;


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key’s bits. Its text form is the
/// 40 upper-case hex digits of the hash, which is also the order used
/// for sorting identifiers.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    ///
    /// The content of the octet string needs to be a SHA-1 hash, so it must
    /// be exactly 20 octets long.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifer from encoded content.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = OctetString::from_content(content)?;
        let octets = octets.into_bytes();
        Self::try_from(octets.as_ref()).map_err(|_| {
            content.content_err("key identifier must be 20 octets")
        })
    }
}


//--- TryFrom and FromStr

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = RepresentationError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 20]>::try_from(value)
            .map(KeyIdentifier)
            .map_err(|_| RepresentationError)
    }
}

impl FromStr for KeyIdentifier {
    type Err = RepresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut res = [0u8; 20];
        hex::decode_to_slice(value, &mut res)
            .map_err(|_| RepresentationError)?;
        Ok(KeyIdentifier(res))
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for KeyIdentifier {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(&self, _mode: Mode) -> usize {
        20
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&self.0)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for KeyIdentifier {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        KeyIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//------------ PublicKeyInfo -------------------------------------------------

/// A public key as it appears in a certificate.
///
/// ```text
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
///
/// AlgorithmIdentifier  ::=  SEQUENCE  {
///      algorithm               OBJECT IDENTIFIER,
///      parameters              ANY DEFINED BY algorithm OPTIONAL  }
/// ```
///
/// The value keeps the complete encoding around. Equality, ordering, and
/// the text form are based on that encoding. The text form is the
/// Base 64 encoding of the DER-encoded structure.
#[derive(Clone)]
pub struct PublicKeyInfo {
    algorithm: Oid<Bytes>,
    parameters: Captured,
    bits: BitString,
    raw: Bytes,
}

impl PublicKeyInfo {
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let raw = cons.capture_one()?.into_bytes();
        Self::from_der(raw).map_err(DecodeError::convert)
    }

    fn from_der(raw: Bytes) -> Result<Self, DecodeError<Infallible>> {
        let (algorithm, parameters, bits) = Mode::Der.decode(
            raw.clone(), |cons| {
                cons.take_sequence(|cons| {
                    let (algorithm, parameters) = cons.take_sequence(|cons| {
                        Ok((Oid::take_from(cons)?, cons.capture_all()?))
                    })?;
                    Ok((algorithm, parameters, BitString::take_from(cons)?))
                })
            }
        )?;
        Ok(PublicKeyInfo { algorithm, parameters, bits, raw })
    }

    /// Decodes a key from its Base 64 text form.
    pub fn from_base64(s: &str) -> Result<Self, RepresentationError> {
        let der = STANDARD.decode(s).map_err(|_| RepresentationError)?;
        Self::decode(Bytes::from(der)).map_err(|_| RepresentationError)
    }

    /// Returns the text form of the key.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.raw)
    }

    pub fn algorithm(&self) -> &Oid<Bytes> {
        &self.algorithm
    }

    /// Returns the bits of the key.
    pub fn bits(&self) -> Bytes {
        self.bits.octet_bytes()
    }

    /// Returns the complete DER encoding of the key information.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Returns the identifier for this key.
    ///
    /// The identifier is the SHA-1 hash of the key’s bits.
    pub fn key_identifier(&self) -> KeyIdentifier {
        let digest = digest::digest(
            &digest::SHA1_FOR_LEGACY_USE_ONLY, self.bits().as_ref()
        );
        let mut res = [0u8; 20];
        res.copy_from_slice(digest.as_ref());
        KeyIdentifier(res)
    }

    /// Returns whether this key is usable as a BGPsec router key.
    ///
    /// Router keys are ECDSA keys on the P-256 curve encoded as
    /// uncompressed points, see RFC 8208, section 3.1.
    pub fn is_router_key(&self) -> bool {
        if self.algorithm != oid::EC_PUBLIC_KEY {
            return false
        }
        let curve = Mode::Der.decode(
            self.parameters.clone().into_bytes(), Oid::take_from
        );
        match curve {
            Ok(curve) if curve == oid::SECP256R1 => { }
            _ => return false
        }
        let bits = self.bits();
        self.bits.unused() == 0 && bits.len() == 65 && bits[0] == 4
    }

    /// Returns whether the other value contains the same key.
    ///
    /// This compares the algorithm, its parameters, and the key bits, and
    /// treats absent parameters the same as NULL parameters.
    pub fn same_key(&self, other: &Self) -> bool {
        fn params(key: &PublicKeyInfo) -> &[u8] {
            match key.parameters.as_slice() {
                [5, 0] => &[],
                params => params,
            }
        }

        self.algorithm == other.algorithm
            && params(self) == params(other)
            && self.bits.unused() == other.bits.unused()
            && self.bits() == other.bits()
    }
}


//--- PartialEq, Eq, PartialOrd, Ord, and Hash

impl PartialEq for PublicKeyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PublicKeyInfo { }

impl PartialOrd for PublicKeyInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKeyInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for PublicKeyInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state)
    }
}


//--- Display and Debug

impl fmt::Display for PublicKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKeyInfo({})", self)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for PublicKeyInfo {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PublicKeyInfo {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        PublicKeyInfo::from_base64(&s).map_err(serde::de::Error::custom)
    }
}


//------------ RepresentationError -------------------------------------------

/// A key identifier or key was given in an invalid form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepresentationError;

impl fmt::Display for RepresentationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key representation")
    }
}

impl error::Error for RepresentationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{ec_key, rsa_key};

    #[test]
    fn key_identifier_text() {
        let ki = KeyIdentifier::from_str(
            "0123456789abcdef0123456789ABCDEF01234567"
        ).unwrap();
        assert_eq!(
            ki.to_string(), "0123456789ABCDEF0123456789ABCDEF01234567"
        );
        assert!(KeyIdentifier::from_str("0123").is_err());
        assert!(KeyIdentifier::from_str(
            "0123456789abcdef0123456789ABCDEF0123456X"
        ).is_err());
    }

    #[test]
    fn key_identifier_order_matches_text() {
        let low = KeyIdentifier::try_from(&[0x0A; 20][..]).unwrap();
        let high = KeyIdentifier::try_from(&[0xA0; 20][..]).unwrap();
        assert!(low < high);
        assert!(low.to_string() < high.to_string());
    }

    #[test]
    fn key_identifier_take_from() {
        let ok = Mode::Der.decode(
            Bytes::from_static(&[4, 20, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,
                12, 13, 14, 15, 16, 17, 18, 19, 20]),
            KeyIdentifier::take_from
        ).unwrap();
        assert_eq!(ok.as_slice()[19], 20);
        assert!(Mode::Der.decode(
            Bytes::from_static(&[4, 3, 1, 2, 3]),
            KeyIdentifier::take_from
        ).is_err());
    }

    #[test]
    fn public_key_info() {
        let key = PublicKeyInfo::decode(ec_key(1)).unwrap();
        assert!(key.is_router_key());
        assert_eq!(key.as_slice(), ec_key(1).as_ref());
        assert_eq!(
            PublicKeyInfo::from_base64(&key.to_base64()).unwrap(), key
        );
        assert_eq!(
            key.key_identifier(),
            PublicKeyInfo::decode(ec_key(1)).unwrap().key_identifier()
        );
        assert_ne!(
            key.key_identifier(),
            PublicKeyInfo::decode(ec_key(2)).unwrap().key_identifier()
        );

        let rsa = PublicKeyInfo::decode(rsa_key(1)).unwrap();
        assert!(!rsa.is_router_key());
        assert!(rsa.same_key(&PublicKeyInfo::decode(rsa_key(1)).unwrap()));
        assert!(!rsa.same_key(&PublicKeyInfo::decode(rsa_key(2)).unwrap()));
        assert!(!rsa.same_key(&key));
    }
}
