//! Autonomous System identifier resources.
//!
//! The types herein are defined in [RFC 3779] for use with certificates in
//! general. RFC 6487 specifies how to use them with RPKI certificates.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779

use std::{fmt, str};
use bcder::{decode, encode};
use bcder::Tag;
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use log::debug;
use crate::config::Options;
use crate::error::ValidationError;
use crate::x509::Extension;
use super::{Conflict, RangeIndex};


//------------ AsResources ---------------------------------------------------

/// The AS resources of a resource certificate.
///
/// The resources are kept as a list of entries in the order they appeared
/// in the certificate. A list produced by decoding never contains two
/// entries that share an AS number and contains an inherit entry only as
/// its single entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsResources(Vec<AsResource>);

impl AsResources {
    /// Creates an empty set of resources.
    pub fn empty() -> Self {
        AsResources(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsResource> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[AsResource] {
        self.0.as_slice()
    }

    /// Returns whether the resources are inherited from the issuer.
    pub fn is_inherited(&self) -> bool {
        self.0.iter().any(|item| matches!(*item, AsResource::Inherit))
    }
}

impl AsResources {
    /// Decodes the resources from the AS identifier delegation extension.
    ///
    /// RFC 6487 requires the extension to be critical.
    pub fn from_extension(
        ext: &Extension,
        options: &Options,
    ) -> Result<Self, ValidationError> {
        ext.require_critical(
            "RFC 6487 section 4.8.11: autonomousSysNum: \
             extension not critical"
        )?;
        Ok(ext.decode_value(|cons| Self::take_from(cons, options))?)
    }

    /// Takes the AS resources from the beginning of an encoded value.
    ///
    /// The ASN.1 specification for the `ASIdentifiers` types parsed here is
    /// given in section 3.2.3 of [RFC 3779] as follows:
    ///
    /// ```text
    /// ASIdentifiers      ::= SEQUENCE {
    ///     asnum              [0] EXPLICIT AsIdentifierChoice OPTIONAL,
    ///     rdi                [1] EXPLICIT AsIdentifierChoice OPTIONAL }
    ///
    /// AsIdentifierChoice ::= CHOICE {
    ///     inherit            NULL,
    ///     asIdsOrRanges      SEQUENCE OF ASIdOrRange }
    ///
    /// ASIdOrRange        ::= CHOICE {
    ///     id                 ASId,
    ///     range              ASRange }
    ///
    /// ASRange            ::= SEQUENCE {
    ///     min                ASId,
    ///     max                ASId }
    ///
    /// ASId               ::= INTEGER
    /// ```
    ///
    /// Routing domain identifiers are not used in RPKI. If present, they
    /// are skipped.
    ///
    /// [RFC 3779]: https://tools.ietf.org/html/rfc3779
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        options: &Options,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let res = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                Self::take_choice(cons, options)
            })?;
            if cons.take_opt_constructed_if(
                Tag::CTX_1, |cons| cons.skip_all()
            )?.is_some() {
                debug!("skipping routing domain identifiers");
            }
            cons.take_opt_value(|_, content| {
                Err::<(), _>(content.content_err(
                    "RFC 3779 section 3.2.3.1: ASIdentifiers: \
                     unknown explicit tag"
                ))
            })?;
            Ok(res.unwrap_or_default())
        })
    }

    fn take_choice<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        options: &Options,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            let mut builder = AsResourcesBuilder::new(options.as_limit());
            if tag == Tag::NULL {
                content.to_null()?;
                builder.push(AsResource::Inherit).map_err(|err| {
                    content.content_err(err)
                })?;
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                while let Some(item) = AsResource::take_opt_from(cons)? {
                    builder.push(item).map_err(|err| cons.content_err(err))?;
                }
            }
            else {
                return Err(content.content_err(
                    "RFC 3779 section 3.2.3.2: ASIdentifierChoice: \
                     want ASN.1 sequence or null"
                ))
            }
            Ok(builder.finalize())
        })
    }

    /// Returns an encoder for the resources.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::sequence_as(Tag::CTX_0,
                if self.is_inherited() {
                    encode::Choice2::One(().encode())
                }
                else {
                    encode::Choice2::Two(encode::sequence(
                        encode::slice(&self.0, |item| item.encode())
                    ))
                }
            )
        )
    }
}


//--- FromIterator

impl std::iter::FromIterator<AsResource> for AsResources {
    fn from_iter<I: IntoIterator<Item = AsResource>>(iter: I) -> Self {
        AsResources(iter.into_iter().collect())
    }
}


//--- Display

impl fmt::Display for AsResources {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for item in &self.0 {
            if first {
                first = false;
            }
            else {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}


//------------ AsResourcesBuilder --------------------------------------------

/// A builder for AS resources.
///
/// The builder checks each new entry against those already added: an
/// inherit entry must be the only entry and no two entries may share an AS
/// number.
#[derive(Clone, Debug)]
pub struct AsResourcesBuilder {
    res: Vec<AsResource>,
    limit: usize,
    index: RangeIndex<Asn>,
}

impl AsResourcesBuilder {
    /// Creates a new builder that accepts at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        AsResourcesBuilder {
            res: Vec::new(),
            limit,
            index: RangeIndex::new(),
        }
    }

    pub fn push(&mut self, item: AsResource) -> Result<(), AsResourceError> {
        if self.res.len() >= self.limit {
            return Err(AsResourceError::TooMany)
        }
        let res = match item {
            AsResource::Inherit => self.index.insert_inherit(),
            AsResource::Id(id) => self.index.insert(id, id),
            AsResource::Range(range) => {
                self.index.insert(range.min(), range.max())
            }
        };
        res.map_err(|err| match err {
            Conflict::Inherit => AsResourceError::Inherit,
            Conflict::Overlap => AsResourceError::Overlap,
        })?;
        self.res.push(item);
        Ok(())
    }

    pub fn finalize(self) -> AsResources {
        AsResources(self.res)
    }
}


//------------ AsResource ----------------------------------------------------

/// A single entry of the AS resources of a certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsResource {
    /// The resources are inherited from the issuer.
    Inherit,

    /// A single AS number.
    Id(Asn),

    /// A range of AS numbers.
    Range(AsRange),
}

impl AsResource {
    /// Returns the smallest and largest AS number of the entry.
    ///
    /// Returns `None` for an inherited entry.
    pub fn bounds(&self) -> Option<(Asn, Asn)> {
        match *self {
            AsResource::Inherit => None,
            AsResource::Id(id) => Some((id, id)),
            AsResource::Range(range) => Some((range.min(), range.max())),
        }
    }

    /// Takes an optional AS resource from the beginning of encoded value.
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::INTEGER {
                let id = Asn::from_content(content)?;
                if id == Asn::RESERVED {
                    return Err(content.content_err(
                        "RFC 3779 section 3.2.3.10 (via RFC 1930): \
                         AS identifier zero is reserved"
                    ))
                }
                Ok(AsResource::Id(id))
            }
            else if tag == Tag::SEQUENCE {
                AsRange::from_content(content).map(AsResource::Range)
            }
            else {
                Err(content.content_err(
                    "RFC 3779 section 3.2.3.5: ASIdOrRange: \
                     want ASN.1 sequence or integer"
                ))
            }
        })
    }

    /// Returns an encoder for the entry.
    ///
    /// # Panics
    ///
    /// An inherited entry cannot be encoded as an `ASIdOrRange` and this
    /// method panics if asked to do so.
    fn encode(&self) -> impl encode::Values {
        match *self {
            AsResource::Id(id) => encode::Choice2::One(id.encode()),
            AsResource::Range(range) => encode::Choice2::Two(range.encode()),
            AsResource::Inherit => panic!("encoding inherited AS resource"),
        }
    }
}

impl fmt::Display for AsResource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AsResource::Inherit => f.write_str("inherit"),
            AsResource::Id(id) => write!(f, "{}", id),
            AsResource::Range(range) => write!(f, "{}", range),
        }
    }
}


//------------ AsRange -------------------------------------------------------

/// A range of AS numbers.
///
/// The range is inclusive and covers at least two numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsRange {
    min: Asn,
    max: Asn,
}

impl AsRange {
    /// Creates a new range.
    ///
    /// The range must cover at least two numbers. A single number is to be
    /// expressed as [`AsResource::Id`] instead.
    pub fn new(min: Asn, max: Asn) -> Result<Self, AsResourceError> {
        if min == max {
            Err(AsResourceError::Singular)
        }
        else if min > max {
            Err(AsResourceError::Reversed)
        }
        else {
            Ok(AsRange { min, max })
        }
    }

    pub fn min(self) -> Asn {
        self.min
    }

    pub fn max(self) -> Asn {
        self.max
    }

    fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let min = Asn::take_from(cons)?;
        let max = Asn::take_from(cons)?;
        Self::new(min, max).map_err(|err| cons.content_err(err))
    }

    fn encode(self) -> impl encode::Values {
        encode::sequence((self.min.encode(), self.max.encode()))
    }
}

impl fmt::Display for AsRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}


//------------ Asn -----------------------------------------------------------

/// An AS number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asn(u32);

impl Asn {
    /// The AS number reserved by RFC 1930 and never valid as an entry.
    pub const RESERVED: Asn = Asn(0);

    pub fn from_u32(value: u32) -> Self {
        Asn(value)
    }

    pub fn into_u32(self) -> u32 {
        self.0
    }

    /// Takes an AS number from the beginning of an encoded value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_u32().map(Asn)
    }

    fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        content.to_u32().map(Asn)
    }

    pub fn encode(self) -> impl encode::Values {
        self.0.encode()
    }
}

impl From<u32> for Asn {
    fn from(id: u32) -> Self {
        Asn(id)
    }
}

impl From<Asn> for u32 {
    fn from(id: Asn) -> u32 {
        id.0
    }
}

impl str::FromStr for Asn {
    type Err = std::num::ParseIntError;

    /// Parses an AS number with or without the “AS” prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = match s.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("as") => &s[2..],
            _ => s
        };
        u32::from_str(s).map(Asn)
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}


//------------ AsResourceError -----------------------------------------------

/// An AS resource entry violates RFC 3779 or the configured limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AsResourceError {
    /// A range with identical minimum and maximum.
    Singular,

    /// A range with the minimum larger than the maximum.
    Reversed,

    /// Inheritance was mixed with AS numbers or given twice.
    Inherit,

    /// Two entries share at least one AS number.
    Overlap,

    /// There are more entries than allowed.
    TooMany,
}

impl AsResourceError {
    pub fn as_str(self) -> &'static str {
        match self {
            AsResourceError::Singular => {
                "RFC 3779 section 3.2.3.8: ASRange: range is singular"
            }
            AsResourceError::Reversed => {
                "RFC 3779 section 3.2.3.8: ASRange: range is out of order"
            }
            AsResourceError::Inherit => {
                "RFC 3779 section 3.2.3.3: ASIdentifierChoice: \
                 cannot have inheritance and multiple ASnum or \
                 multiple inheritance"
            }
            AsResourceError::Overlap => {
                "RFC 3779 section 3.2.3.4: ASIdOrRange: \
                 overlapping AS identifiers"
            }
            AsResourceError::TooMany => "too many AS identifier entries",
        }
    }
}

impl From<AsResourceError> for decode::ContentError {
    fn from(err: AsResourceError) -> Self {
        decode::ContentError::from_static(err.as_str())
    }
}

impl fmt::Display for AsResourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for AsResourceError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use bcder::Mode;
    use bcder::encode::Values;
    use bytes::Bytes;
    use super::*;

    fn decode(
        data: &'static [u8]
    ) -> Result<AsResources, DecodeError<std::convert::Infallible>> {
        Mode::Der.decode(
            Bytes::from_static(data), |cons| {
                AsResources::take_from(cons, &Options::default())
            }
        )
    }

    #[test]
    fn take_ids_and_ranges() {
        // asnum [0] { 64496, 65000-65010 }
        let data = b"\x30\x15\xa0\x13\x30\x11\
            \x02\x03\x00\xfb\xf0\
            \x30\x0a\x02\x03\x00\xfd\xe8\x02\x03\x00\xfd\xf2";
        let res = decode(data).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.to_string(), "AS64496, AS65000-AS65010");
        assert_eq!(
            res.as_slice()[1].bounds(),
            Some((Asn::from(65000), Asn::from(65010)))
        );
        assert_eq!(
            res.encode_ref().to_captured(Mode::Der).as_slice(),
            data.as_ref()
        );
    }

    #[test]
    fn take_inherit() {
        let res = decode(b"\x30\x04\xa0\x02\x05\x00").unwrap();
        assert!(res.is_inherited());
        assert_eq!(
            res.encode_ref().to_captured(Mode::Der).as_slice(),
            b"\x30\x04\xa0\x02\x05\x00".as_ref()
        );
    }

    #[test]
    fn skip_rdi() {
        let res = decode(
            b"\x30\x0b\xa0\x05\x30\x03\x02\x01\x01\xa1\x02\x05\x00"
        ).unwrap();
        assert_eq!(res.as_slice(), &[AsResource::Id(Asn::from(1))]);
        assert!(decode(b"\x30\x04\xa1\x02\x05\x00").unwrap().is_empty());
        assert!(decode(b"\x30\x04\xa2\x02\x05\x00").is_err());
    }

    #[test]
    fn reject_zero() {
        assert!(decode(b"\x30\x07\xa0\x05\x30\x03\x02\x01\x00").is_err());
        // Zero is fine as the lower bound of a range.
        assert!(
            decode(b"\x30\x0c\xa0\x0a\x30\x08\x30\x06\x02\x01\x00\x02\x01\x05")
            .is_ok()
        );
    }

    #[test]
    fn reject_bad_ranges() {
        // 100-100
        assert!(
            decode(b"\x30\x0c\xa0\x0a\x30\x08\x30\x06\x02\x01\x64\x02\x01\x64")
            .is_err()
        );
        // 100-99
        assert!(
            decode(b"\x30\x0c\xa0\x0a\x30\x08\x30\x06\x02\x01\x64\x02\x01\x63")
            .is_err()
        );
        assert_eq!(
            AsRange::new(Asn::from(100), Asn::from(100)),
            Err(AsResourceError::Singular)
        );
        assert_eq!(
            AsRange::new(Asn::from(100), Asn::from(99)),
            Err(AsResourceError::Reversed)
        );
    }

    #[test]
    fn reject_overlap() {
        // 10, 5-15
        assert!(
            decode(b"\x30\x0f\xa0\x0d\x30\x0b\x02\x01\x0a\
                     \x30\x06\x02\x01\x05\x02\x01\x0f")
            .is_err()
        );
        // 10, 11-15 touch but do not overlap.
        assert!(
            decode(b"\x30\x0f\xa0\x0d\x30\x0b\x02\x01\x0a\
                     \x30\x06\x02\x01\x0b\x02\x01\x0f")
            .is_ok()
        );
    }

    #[test]
    fn builder() {
        let mut builder = AsResourcesBuilder::new(2);
        builder.push(AsResource::Id(Asn::from(1))).unwrap();
        assert_eq!(
            builder.push(AsResource::Inherit), Err(AsResourceError::Inherit)
        );
        assert_eq!(
            builder.push(AsResource::Id(Asn::from(1))),
            Err(AsResourceError::Overlap)
        );
        builder.push(AsResource::Id(Asn::from(2))).unwrap();
        assert_eq!(
            builder.push(AsResource::Id(Asn::from(3))),
            Err(AsResourceError::TooMany)
        );
    }

    #[test]
    fn asn_from_str() {
        assert_eq!(Asn::from_str("AS64496").unwrap(), Asn::from(64496));
        assert_eq!(Asn::from_str("as12").unwrap(), Asn::from(12));
        assert_eq!(Asn::from_str("12").unwrap(), Asn::from(12));
        assert!(Asn::from_str("AS").is_err());
        assert!(Asn::from_str("ÄS1").is_err());
        assert!(Asn::from_str("Ä").is_err());
    }
}
