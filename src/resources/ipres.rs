//! IP resources.
//!
//! The types herein are defined in [RFC 3779] for use with certificates in
//! general. RFC 6487 specifies how to use them with RPKI certificates.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779

use std::{fmt, io};
use std::net::{Ipv4Addr, Ipv6Addr};
use bcder::{decode, encode};
use bcder::{BitString, Mode, OctetString, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::config::Options;
use crate::error::ValidationError;
use crate::x509::Extension;
use super::{Conflict, RangeIndex};


//------------ IpResources ---------------------------------------------------

/// The IP address resources of a resource certificate.
///
/// The resources are kept as a list of entries for both address families in
/// the order they appeared in the certificate. A list produced by decoding
/// never contains two entries that share an address and never mixes an
/// inherit entry with addresses of the same family.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpResources(Vec<IpResource>);

impl IpResources {
    /// Creates an empty set of resources.
    pub fn empty() -> Self {
        IpResources(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpResource> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[IpResource] {
        self.0.as_slice()
    }

    /// Returns whether any address family uses inherited resources.
    pub fn has_inherit(&self) -> bool {
        self.0.iter().any(IpResource::is_inherited)
    }

    /// Returns whether the given family uses inherited resources.
    pub fn is_inherited(&self, family: AddressFamily) -> bool {
        self.0.iter().any(|item| {
            item.is_inherited() && item.family() == family
        })
    }
}

impl IpResources {
    /// Decodes the resources from the IP address delegation extension.
    ///
    /// RFC 6487 requires the extension to be critical.
    pub fn from_extension(
        ext: &Extension,
        options: &Options,
    ) -> Result<Self, ValidationError> {
        ext.require_critical(
            "RFC 6487 section 4.8.10: sbgp-ipAddrBlock: \
             extension not critical"
        )?;
        Ok(ext.decode_value(|cons| Self::take_from(cons, options))?)
    }

    /// Takes the resources from the beginning of an encoded value.
    ///
    /// ```text
    /// IPAddrBlocks        ::= SEQUENCE OF IPAddressFamily
    ///
    /// IPAddressFamily     ::= SEQUENCE {    -- AFI & optional SAFI --
    ///    addressFamily        OCTET STRING (SIZE (2..3)),
    ///    ipAddressChoice      IPAddressChoice }
    ///
    /// IPAddressChoice     ::= CHOICE {
    ///    inherit              NULL, -- inherit from issuer --
    ///    addressesOrRanges    SEQUENCE OF IPAddressOrRange }
    ///
    /// IPAddressOrRange    ::= CHOICE {
    ///    addressPrefix        IPAddress,
    ///    addressRange         IPAddressRange }
    ///
    /// IPAddressRange      ::= SEQUENCE {
    ///    min                  IPAddress,
    ///    max                  IPAddress }
    ///
    /// IPAddress           ::= BIT STRING
    /// ```
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        options: &Options,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut builder = IpResourcesBuilder::new(options.ip_limit());
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let family = AddressFamily::take_from(cons, options)?;
                cons.take_value(|tag, content| {
                    if tag == Tag::NULL {
                        content.to_null()?;
                        builder.push(IpResource::Inherit(family)).map_err(
                            |err| content.content_err(err)
                        )
                    }
                    else if tag == Tag::SEQUENCE {
                        let cons = content.as_constructed()?;
                        while let Some(block) = IpBlock::take_opt_from(
                            cons, family
                        )? {
                            builder.push(
                                IpResource::Block(family, block)
                            ).map_err(|err| cons.content_err(err))?;
                        }
                        Ok(())
                    }
                    else {
                        Err(content.content_err(
                            "RFC 3779 section 2.2.3.2: IPAddressChoice: \
                             want ASN.1 sequence or null"
                        ))
                    }
                })
            })? { }
            Ok(builder.finalize())
        })
    }

    /// Returns an encoder for the resources.
    ///
    /// IPv4 entries are encoded before IPv6 entries. Within a family, the
    /// entries keep their order.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.encode_family(AddressFamily::Ipv4),
            self.encode_family(AddressFamily::Ipv6),
        ))
    }

    fn encode_family(
        &self, family: AddressFamily
    ) -> Option<impl encode::Values + '_> {
        if !self.0.iter().any(|item| item.family() == family) {
            return None
        }
        Some(encode::sequence((
            family.encode(),
            if self.is_inherited(family) {
                encode::Choice2::One(().encode())
            }
            else {
                encode::Choice2::Two(encode::sequence(
                    encode::iter(self.0.iter().filter_map(move |item| {
                        match *item {
                            IpResource::Block(item_family, block)
                                if item_family == family
                            => Some(block.encode()),
                            _ => None
                        }
                    }))
                ))
            }
        )))
    }
}


//--- FromIterator

impl std::iter::FromIterator<IpResource> for IpResources {
    fn from_iter<I: IntoIterator<Item = IpResource>>(iter: I) -> Self {
        IpResources(iter.into_iter().collect())
    }
}


//--- Display

impl fmt::Display for IpResources {
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


//------------ IpResourcesBuilder --------------------------------------------

/// A builder for IP resources.
///
/// The builder checks each new entry against those already added. An
/// inherit entry may only appear once per family and never together with
/// addresses of that family. No two address entries may share an address.
#[derive(Clone, Debug)]
pub struct IpResourcesBuilder {
    res: Vec<IpResource>,
    limit: usize,
    v4: RangeIndex<Addr>,
    v6: RangeIndex<Addr>,
}

impl IpResourcesBuilder {
    /// Creates a new builder that accepts at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        IpResourcesBuilder {
            res: Vec::new(),
            limit,
            v4: RangeIndex::new(),
            v6: RangeIndex::new(),
        }
    }

    pub fn push(&mut self, item: IpResource) -> Result<(), IpResourceError> {
        if self.res.len() >= self.limit {
            return Err(IpResourceError::TooMany)
        }
        let index = match item.family() {
            AddressFamily::Ipv4 => &mut self.v4,
            AddressFamily::Ipv6 => &mut self.v6,
        };
        let res = match item {
            IpResource::Inherit(_) => index.insert_inherit(),
            IpResource::Block(_, block) => {
                index.insert(block.min(), block.max())
            }
        };
        res.map_err(|err| match err {
            Conflict::Inherit => IpResourceError::Inherit,
            Conflict::Overlap => IpResourceError::Overlap,
        })?;
        self.res.push(item);
        Ok(())
    }

    pub fn finalize(self) -> IpResources {
        IpResources(self.res)
    }
}


//------------ IpResource ----------------------------------------------------

/// A single entry of the IP resources of a certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IpResource {
    /// The family’s resources are inherited from the issuer.
    Inherit(AddressFamily),

    /// A block of addresses of the given family.
    Block(AddressFamily, IpBlock),
}

impl IpResource {
    pub fn family(&self) -> AddressFamily {
        match *self {
            IpResource::Inherit(family) => family,
            IpResource::Block(family, _) => family,
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(*self, IpResource::Inherit(_))
    }

    /// Returns the block of addresses unless the entry is inherited.
    pub fn block(&self) -> Option<IpBlock> {
        match *self {
            IpResource::Inherit(_) => None,
            IpResource::Block(_, block) => Some(block),
        }
    }
}

impl fmt::Display for IpResource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IpResource::Inherit(family) => {
                write!(f, "inherit ({})", family)
            }
            IpResource::Block(family, block) => block.fmt_family(family, f)
        }
    }
}


//------------ IpBlock -------------------------------------------------------

/// A consecutive sequence of IP addresses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IpBlock {
    /// A block expressed as a prefix.
    Prefix(Prefix),

    /// A block expressed as a minimum and maximum address.
    Range(AddressRange),
}

impl IpBlock {
    /// Returns the smallest address of the block.
    pub fn min(&self) -> Addr {
        match *self {
            IpBlock::Prefix(prefix) => prefix.min(),
            IpBlock::Range(range) => range.min(),
        }
    }

    /// Returns the largest address of the block.
    pub fn max(&self) -> Addr {
        match *self {
            IpBlock::Prefix(prefix) => prefix.max(),
            IpBlock::Range(range) => range.max(),
        }
    }

    /// Takes an optional address block from the beginning of encoded value.
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::BIT_STRING {
                Prefix::from_content(content, family).map(IpBlock::Prefix)
            }
            else if tag == Tag::SEQUENCE {
                AddressRange::from_content(content, family)
                    .map(IpBlock::Range)
            }
            else {
                Err(content.content_err(
                    "RFC 3779 section 2.2.3.7: IPAddressOrRange: \
                     want ASN.1 sequence or bit string"
                ))
            }
        })
    }

    /// Returns an encoder for the block.
    ///
    /// This encoder will produce a `IPAddressOrRange` value.
    pub fn encode(self) -> impl encode::Values {
        match self {
            IpBlock::Prefix(inner) => encode::Choice2::One(inner.encode()),
            IpBlock::Range(inner) => encode::Choice2::Two(inner.encode()),
        }
    }

    /// Formats the block as an address block of the given family.
    pub fn fmt_family(
        self, family: AddressFamily, f: &mut fmt::Formatter
    ) -> fmt::Result {
        match self {
            IpBlock::Prefix(prefix) => {
                write!(f, "{}/{}", prefix.addr.display(family), prefix.len)
            }
            IpBlock::Range(range) => {
                write!(
                    f, "{}-{}",
                    range.min.display(family), range.max.display(family)
                )
            }
        }
    }
}

impl From<Prefix> for IpBlock {
    fn from(prefix: Prefix) -> Self {
        IpBlock::Prefix(prefix)
    }
}

impl From<AddressRange> for IpBlock {
    fn from(range: AddressRange) -> Self {
        IpBlock::Range(range)
    }
}


//------------ AddressRange --------------------------------------------------

/// An IP address range.
///
/// The range is inclusive: both the minimum and the maximum are part of
/// it. The minimum is never larger than the maximum.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressRange {
    min: Addr,
    max: Addr,
}

impl AddressRange {
    /// Creates a new range from the smallest and largest address.
    pub fn new(min: Addr, max: Addr) -> Result<Self, IpResourceError> {
        if min > max {
            Err(IpResourceError::Reversed)
        }
        else {
            Ok(AddressRange { min, max })
        }
    }

    pub fn min(self) -> Addr {
        self.min
    }

    pub fn max(self) -> Addr {
        self.max
    }

    /// Parses the content of an address range.
    ///
    /// The minimum is the smallest address of the first prefix, the
    /// maximum the largest address of the second one.
    fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let min = Prefix::take_from(cons, family)?.min();
        let max = Prefix::take_from(cons, family)?.max();
        Self::new(min, max).map_err(|err| cons.content_err(err))
    }

    /// Calculates the prefix for the minimum address.
    ///
    /// This is a prefix with all trailing zeros dropped.
    fn min_to_prefix(self) -> Prefix {
        Prefix::new(self.min, 128 - self.min.0.trailing_zeros() as u8)
    }

    /// Calculates the prefix for the maximum address.
    ///
    /// This is a prefix with all trailing ones dropped.
    fn max_to_prefix(self) -> Prefix {
        Prefix::new(self.max, 128 - (!self.max.0).trailing_zeros() as u8)
    }

    /// Returns an encoder for the range.
    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.min_to_prefix().encode(),
            self.max_to_prefix().encode(),
        ))
    }
}


//------------ Prefix --------------------------------------------------------

/// An IP address prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// The address of the prefix.
    ///
    /// The bits beyond the prefix length are zero.
    addr: Addr,

    /// The length of the prefix.
    ///
    /// This will never be more than 128.
    len: u8,
}

impl Prefix {
    /// Creates a new prefix from an address and a length.
    ///
    /// # Panics
    ///
    /// This function panics if `len` is larger than 128.
    pub fn new(addr: Addr, len: u8) -> Self {
        assert!(len <= 128);
        Prefix { addr: addr.to_min(len), len }
    }

    /// Creates a new prefix from its encoding as a BIT STRING.
    ///
    /// The bit string may not be longer than the addresses of `family`.
    pub fn from_bit_string(
        src: &BitString, family: AddressFamily,
    ) -> Result<Self, IpResourceError> {
        if src.unused() > 7 || (src.octet_len() == 0 && src.unused() > 0) {
            return Err(IpResourceError::BadAddress)
        }
        if src.octet_len() > family.addr_len() {
            return Err(IpResourceError::BadAddress)
        }
        let mut addr = 0;
        for octet in src.octets() {
            addr = (addr << 8) | u128::from(octet)
        }
        for _ in src.octet_len()..16 {
            addr <<= 8;
        }
        Ok(Self::new(Addr(addr), src.bit_len() as u8))
    }

    pub fn addr(self) -> Addr {
        self.addr
    }

    pub fn addr_len(self) -> u8 {
        self.len
    }

    /// Returns the smallest address of the prefix.
    pub fn min(self) -> Addr {
        self.addr
    }

    /// Returns the largest address of the prefix.
    pub fn max(self) -> Addr {
        self.addr.to_max(self.len)
    }

    /// Takes an encoded prefix from a source.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::BIT_STRING, |content| {
            Self::from_content(content, family)
        })
    }

    /// Parses the content of a prefix.
    fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>,
        family: AddressFamily,
    ) -> Result<Self, DecodeError<S::Error>> {
        let bits = BitString::from_content(content)?;
        Self::from_bit_string(&bits, family).map_err(|err| {
            content.content_err(err)
        })
    }
}


//--- PrimitiveContent

impl PrimitiveContent for Prefix {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        if self.len % 8 == 0 {
            self.len as usize / 8 + 1
        }
        else {
            self.len as usize / 8 + 2
        }
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        // The bits beyond the prefix length are zero already.
        let addr = self.addr.to_bytes();
        if self.len % 8 == 0 {
            target.write_all(&[0])?;
            target.write_all(&addr[..(self.len / 8) as usize])
        }
        else {
            target.write_all(&[8 - self.len % 8])?;
            target.write_all(&addr[..(self.len / 8 + 1) as usize])
        }
    }
}


//------------ Addr ----------------------------------------------------------

/// An address.
///
/// This can be both an IPv4 and IPv6 address. It keeps the address
/// internally as a 128 bit unsigned integer. IPv6 addresses are kept in all
/// bits in host byte order while IPv4 addresses are kept in the upper four
/// bytes and are right-padded with zero bits. This makes it possible to
/// handle prefix lengths the same way for both families.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Addr(u128);

impl Addr {
    pub fn from_bits(bits: u128) -> Self {
        Addr(bits)
    }

    pub fn from_v4(addr: Ipv4Addr) -> Self {
        Addr(u128::from(u32::from(addr)) << 96)
    }

    pub fn from_v6(addr: Ipv6Addr) -> Self {
        Addr(u128::from(addr))
    }

    pub fn to_bits(self) -> u128 {
        self.0
    }

    pub fn to_v4(self) -> Ipv4Addr {
        ((self.0 >> 96) as u32).into()
    }

    pub fn to_v6(self) -> Ipv6Addr {
        self.0.into()
    }

    /// Returns the address as 16 octets in network byte order.
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Creates an address from 16 octets in network byte order.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Addr(u128::from_be_bytes(bytes))
    }

    /// Returns an address with all but the first `prefix_len` bits cleared.
    pub fn to_min(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else {
            Addr(self.0 & !(u128::MAX >> u32::from(prefix_len)))
        }
    }

    /// Returns an address with all but the first `prefix_len` bits set.
    pub fn to_max(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else {
            Addr(self.0 | (u128::MAX >> u32::from(prefix_len)))
        }
    }

    /// Returns an object displaying the address in the given family.
    pub fn display(self, family: AddressFamily) -> impl fmt::Display {
        struct Display(Addr, AddressFamily);

        impl fmt::Display for Display {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self.1 {
                    AddressFamily::Ipv4 => {
                        fmt::Display::fmt(&self.0.to_v4(), f)
                    }
                    AddressFamily::Ipv6 => {
                        fmt::Display::fmt(&self.0.to_v6(), f)
                    }
                }
            }
        }

        Display(self, family)
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_v4(addr)
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(addr: Ipv6Addr) -> Self {
        Self::from_v6(addr)
    }
}


//------------ AddressFamily -------------------------------------------------

/// The address family of an IP resources value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressFamily {
    /// IPv4.
    ///
    /// This is encoded by a two byte octet string with value `0x00 0x01`.
    Ipv4,

    /// IPv6.
    ///
    /// This is encoded by a two byte octet string with value `0x00 0x02`.
    Ipv6
}

impl AddressFamily {
    /// Takes a single address family from the beginning of a value.
    ///
    /// The value may contain a third octet with a SAFI which is ignored
    /// unless strict mode is enabled in `options` in which case it is
    /// rejected.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        options: &Options,
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = OctetString::take_from(cons)?.into_bytes();
        match octets.len() {
            2 => { }
            3 if options.is_strict() => {
                return Err(cons.content_err(
                    "RFC 6487 section 4.8.10: sbgp-ipAddrBlock: \
                     SAFI not allowed"
                ))
            }
            3 => { }
            _ => {
                return Err(cons.content_err(
                    "RFC 3779 section 2.2.3.2: addressFamily: \
                     invalid AFI length"
                ))
            }
        }
        match (octets[0], octets[1]) {
            (0, 1) => Ok(AddressFamily::Ipv4),
            (0, 2) => Ok(AddressFamily::Ipv6),
            _ => {
                Err(cons.content_err(
                    "RFC 3779 section 2.2.3.2: addressFamily: invalid AFI"
                ))
            }
        }
    }

    /// Returns the length of addresses of this family in octets.
    pub fn addr_len(self) -> usize {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 16,
        }
    }

    pub fn encode(self) -> impl encode::Values {
        OctetString::encode_slice(
            match self {
                AddressFamily::Ipv4 => b"\x00\x01",
                AddressFamily::Ipv6 => b"\x00\x02",
            }
        )
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::Ipv6 => "IPv6",
        })
    }
}


//------------ IpResourceError -----------------------------------------------

/// An IP resource entry violates RFC 3779 or the configured limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IpResourceError {
    /// An address is longer than its family allows or badly encoded.
    BadAddress,

    /// The minimum of a range is larger than its maximum.
    Reversed,

    /// Inheritance was mixed with addresses or given twice.
    Inherit,

    /// Two entries share at least one address.
    Overlap,

    /// There are more entries than allowed.
    TooMany,
}

impl IpResourceError {
    pub fn as_str(self) -> &'static str {
        match self {
            IpResourceError::BadAddress => {
                "RFC 3779 section 2.2.3.8: IPAddress: invalid IP address"
            }
            IpResourceError::Reversed => {
                "RFC 3779 section 2.2.3.9: IPAddressRange: \
                 IP address range reversed"
            }
            IpResourceError::Inherit => {
                "RFC 3779 section 2.2.3.5: IPAddressChoice: \
                 cannot have multiple inheritance or inheritance and \
                 addresses of the same class"
            }
            IpResourceError::Overlap => {
                "RFC 3779 section 2.2.3.6: IPAddressOrRange: \
                 overlapping IP address range"
            }
            IpResourceError::TooMany => "too many IP address entries",
        }
    }
}

impl From<IpResourceError> for decode::ContentError {
    fn from(err: IpResourceError) -> Self {
        decode::ContentError::from_static(err.as_str())
    }
}

impl fmt::Display for IpResourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for IpResourceError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::encode::Values;
    use bytes::Bytes;
    use super::*;

    fn decode(
        data: &'static [u8], options: &Options
    ) -> Result<IpResources, DecodeError<std::convert::Infallible>> {
        Mode::Der.decode(
            Bytes::from_static(data), |cons| {
                IpResources::take_from(cons, options)
            }
        )
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> Addr {
        Addr::from_v4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn addr_min_max() {
        let addr = v4(10, 1, 2, 3);
        assert_eq!(addr.to_min(8), v4(10, 0, 0, 0));
        assert_eq!(addr.to_max(8).to_v4(), Ipv4Addr::new(10, 255, 255, 255));
        assert_eq!(addr.to_min(0), Addr::from_bits(0));
        assert_eq!(addr.to_max(128), addr);
    }

    #[test]
    fn prefix_from_bit_string() {
        // 10.5.0.0/16 is 03 00 0a 05 with zero unused bits.
        let prefix = Mode::Der.decode(
            Bytes::from_static(b"\x03\x03\x00\x0a\x05"),
            |cons| Prefix::take_from(cons, AddressFamily::Ipv4)
        ).unwrap();
        assert_eq!(prefix.addr_len(), 16);
        assert_eq!(prefix.min(), v4(10, 5, 0, 0));
        assert_eq!(prefix.max().to_v4(), Ipv4Addr::new(10, 5, 255, 255));

        // 10.64.0.0/10 has 6 unused bits.
        let prefix = Mode::Der.decode(
            Bytes::from_static(b"\x03\x03\x06\x0a\x40"),
            |cons| Prefix::take_from(cons, AddressFamily::Ipv4)
        ).unwrap();
        assert_eq!(prefix.addr_len(), 10);
        assert_eq!(prefix.min(), v4(10, 64, 0, 0));

        // Five octets are too many for IPv4 but fine for IPv6.
        let data = b"\x03\x06\x00\x0a\x05\x00\x00\x01";
        assert!(Mode::Der.decode(
            Bytes::from_static(data),
            |cons| Prefix::take_from(cons, AddressFamily::Ipv4)
        ).is_err());
        assert!(Mode::Der.decode(
            Bytes::from_static(data),
            |cons| Prefix::take_from(cons, AddressFamily::Ipv6)
        ).is_ok());
    }

    #[test]
    fn prefix_encode() {
        for &(addr, len) in &[
            (v4(10, 0, 0, 0), 8), (v4(10, 64, 0, 0), 10),
            (v4(0, 0, 0, 0), 0), (v4(192, 0, 2, 1), 32),
        ] {
            let prefix = Prefix::new(addr, len);
            let encoded = prefix.encode().to_captured(Mode::Der);
            let decoded = Mode::Der.decode(
                encoded.into_bytes(),
                |cons| Prefix::take_from(cons, AddressFamily::Ipv4)
            ).unwrap();
            assert_eq!(decoded, prefix);
        }
    }

    #[test]
    fn range_encode() {
        // 10.0.0.0 to 10.0.2.255 is encoded as 10.0.0.0/7 and 10.0.2.0/24.
        let range = AddressRange::new(
            v4(10, 0, 0, 0), v4(10, 0, 2, 255).to_max(32)
        ).unwrap();
        let max = range.max();
        assert_eq!(max.to_v4(), Ipv4Addr::new(10, 0, 2, 255));
        let encoded = range.encode().to_captured(Mode::Der);
        let decoded = Mode::Der.decode(encoded.into_bytes(), |cons| {
            cons.take_value(|_, content| {
                AddressRange::from_content(content, AddressFamily::Ipv4)
            })
        }).unwrap();
        assert_eq!(decoded, range);

        assert_eq!(
            AddressRange::new(v4(10, 0, 0, 1), v4(10, 0, 0, 0)),
            Err(IpResourceError::Reversed)
        );
    }

    #[test]
    fn take_resources() {
        let options = Options::default();

        // 10.0.0.0/8 and 0.0.0.0/0 overlap.
        assert!(decode(
            b"\x30\x0f\
              \x30\x0d\x04\x02\x00\x01\
              \x30\x07\x03\x02\x00\x0a\x03\x01\x00\
              ",
            &options
        ).is_err());

        // IPv4 10.0.0.0/16 and IPv6 inherit.
        let res = decode(
            b"\x30\x15\
              \x30\x0b\x04\x02\x00\x01\x30\x05\x03\x03\x00\x0a\x00\
              \x30\x06\x04\x02\x00\x02\x05\x00\
              ",
            &options
        ).unwrap();
        assert_eq!(res.len(), 2);
        assert!(!res.is_inherited(AddressFamily::Ipv4));
        assert!(res.is_inherited(AddressFamily::Ipv6));
        assert_eq!(res.to_string(), "10.0.0.0/16, inherit (IPv6)");

        let encoded = res.encode_ref().to_captured(Mode::Der);
        assert_eq!(
            encoded.as_slice(),
            b"\x30\x15\
              \x30\x0b\x04\x02\x00\x01\x30\x05\x03\x03\x00\x0a\x00\
              \x30\x06\x04\x02\x00\x02\x05\x00".as_ref()
        );
    }

    #[test]
    fn inherit_and_prefix() {
        // The same family twice, once inherited, once with a prefix.
        assert!(decode(
            b"\x30\x17\
              \x30\x06\x04\x02\x00\x01\x05\x00\
              \x30\x0d\x04\x02\x00\x01\x30\x07\x03\x05\x00\x0a\x00\x00\x00\
              ",
            &Options::default()
        ).is_err());

        // Both families inherited twice.
        assert!(decode(
            b"\x30\x10\
              \x30\x06\x04\x02\x00\x01\x05\x00\
              \x30\x06\x04\x02\x00\x01\x05\x00\
              ",
            &Options::default()
        ).is_err());
    }

    #[test]
    fn safi() {
        let data = b"\x30\x0d\
              \x30\x0b\x04\x03\x00\x01\x01\x30\x04\x03\x02\x00\x0a\
              ";
        assert!(decode(data, &Options::default()).is_ok());
        assert!(decode(data, &Options::new().strict(true)).is_err());
    }

    #[test]
    fn unknown_afi() {
        assert!(decode(
            b"\x30\x08\x30\x06\x04\x02\x00\x03\x05\x00",
            &Options::default()
        ).is_err());
    }

    #[test]
    fn builder_overlap() {
        let mut builder = IpResourcesBuilder::new(10);
        let prefix = |a, len| {
            IpResource::Block(
                AddressFamily::Ipv4, IpBlock::Prefix(Prefix::new(a, len))
            )
        };
        builder.push(prefix(v4(10, 0, 0, 0), 16)).unwrap();
        builder.push(prefix(v4(10, 1, 0, 0), 16)).unwrap();
        assert_eq!(
            builder.push(prefix(v4(10, 1, 128, 0), 17)),
            Err(IpResourceError::Overlap)
        );
        assert_eq!(
            builder.push(prefix(v4(10, 0, 0, 0), 8)),
            Err(IpResourceError::Overlap)
        );
        // Same bits, other family.
        builder.push(IpResource::Block(
            AddressFamily::Ipv6,
            IpBlock::Prefix(Prefix::new(v4(10, 0, 0, 0), 8))
        )).unwrap();
        assert_eq!(
            builder.push(IpResource::Inherit(AddressFamily::Ipv4)),
            Err(IpResourceError::Inherit)
        );
        let res = builder.finalize();
        assert_eq!(res.len(), 3);
        for (i, left) in res.iter().enumerate() {
            for right in res.iter().skip(i + 1) {
                if left.family() != right.family() {
                    continue
                }
                let (left, right) = (
                    left.block().unwrap(), right.block().unwrap()
                );
                assert!(left.max() < right.min() || right.max() < left.min());
            }
        }
    }

    #[test]
    fn builder_limit() {
        let mut builder = IpResourcesBuilder::new(1);
        builder.push(IpResource::Inherit(AddressFamily::Ipv4)).unwrap();
        assert_eq!(
            builder.push(IpResource::Inherit(AddressFamily::Ipv6)),
            Err(IpResourceError::TooMany)
        );
    }
}
