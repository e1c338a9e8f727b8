//! Transferring certificate records between processes.
//!
//! A [`Cert`] can be flattened into a byte sequence with [`Cert::compose`]
//! and restored from it with [`Cert::parse`]. The format is private to
//! this crate and only meant for shipping records between the stages of a
//! validation pipeline running the same version of the crate.
//!
//! All integers are in network byte order. The record starts with the
//! fixed-width fields:
//!
//! ```text
//! expires        i64    seconds since the Unix epoch
//! purpose        u8     1 for CA, 2 for BGPsec router
//! tal_id         u32
//! ip_count       u32
//! as_count       u32
//! ```
//!
//! These are followed by `ip_count` IP entries of 35 octets each, the
//! family (1 for IPv4, 2 for IPv6), the kind (0 for a prefix, 1 for a
//! range, 2 for inherit), the prefix length, and the 16 octet minimum and
//! maximum addresses. Then come `as_count` AS entries of 9 octets, the
//! kind (0 for a single AS number, 1 for a range, 2 for inherit), and the
//! minimum and maximum as `u32`.
//!
//! Finally, there are eight strings, each as a `u32` length and that many
//! octets with a length of zero meaning the value is absent: the manifest,
//! notification, repository, CRL, and issuer URIs, the authority and
//! subject key identifiers in hex, and the router key in Base 64.
//!
//! Since a record must have passed all checks before it was composed, any
//! problem while parsing means the pipeline itself is broken. Callers
//! should treat a [`ReadError`] as fatal.

use std::{error, fmt, str};
use std::convert::TryFrom;
use bytes::{Buf, BufMut, Bytes};
use crate::uri;
use crate::cert::{Cert, CertKind};
use crate::crypto::{KeyIdentifier, PublicKeyInfo};
use crate::ext::Repository;
use crate::resources::{
    Addr, AddressFamily, AddressRange, AsRange, AsResource, AsResources, Asn,
    IpBlock, IpResource, IpResources, Prefix
};
use crate::x509::{Purpose, Time};


//------------ Constants -----------------------------------------------------

const PURPOSE_CA: u8 = 1;
const PURPOSE_ROUTER: u8 = 2;

const FAMILY_V4: u8 = 1;
const FAMILY_V6: u8 = 2;

const KIND_SINGLE: u8 = 0;
const KIND_RANGE: u8 = 1;
const KIND_INHERIT: u8 = 2;

const IP_ENTRY_LEN: usize = 3 + 16 + 16;
const AS_ENTRY_LEN: usize = 1 + 4 + 4;


//------------ Cert ----------------------------------------------------------

/// # Transfer Format
///
impl Cert {
    /// Appends the flattened record to `target`.
    ///
    /// The decoded certificate is not included.
    pub fn compose<B: BufMut>(&self, target: &mut B) {
        target.put_i64(self.expires().timestamp());
        target.put_u8(match self.purpose() {
            Purpose::Ca => PURPOSE_CA,
            Purpose::BgpsecRouter => PURPOSE_ROUTER,
        });
        target.put_u32(self.tal_id());
        target.put_u32(count(self.ip_resources().len()));
        target.put_u32(count(self.as_resources().len()));

        for item in self.ip_resources().iter() {
            compose_ip(item, target);
        }
        for item in self.as_resources().iter() {
            compose_as(item, target);
        }

        let repository = self.repository();
        compose_str(
            repository.map(|repo| repo.rpki_manifest().as_str()), target
        );
        compose_str(
            repository.and_then(|repo| repo.rpki_notify()).map(|uri| {
                uri.as_str()
            }),
            target
        );
        compose_str(
            repository.map(|repo| repo.ca_repository().as_str()), target
        );
        compose_str(self.crl_uri().map(uri::Rsync::as_str), target);
        compose_str(self.ca_issuer().map(uri::Rsync::as_str), target);
        compose_str(
            self.authority_key_identifier().map(|aki| aki.to_string())
                .as_deref(),
            target
        );
        compose_str(
            Some(self.subject_key_identifier().to_string().as_str()), target
        );
        compose_str(
            self.router_key().map(PublicKeyInfo::to_base64).as_deref(),
            target
        );
    }

    /// Restores a record from the beginning of `source`.
    ///
    /// Exactly the octets of the record are consumed.
    pub fn parse<B: Buf>(source: &mut B) -> Result<Self, ReadError> {
        need(source, 8 + 1 + 4 + 4 + 4)?;
        let expires = Time::from_timestamp(source.get_i64()).ok_or(
            ReadError::Malformed("invalid expiry time")
        )?;
        let purpose = match source.get_u8() {
            PURPOSE_CA => Purpose::Ca,
            PURPOSE_ROUTER => Purpose::BgpsecRouter,
            _ => return Err(ReadError::Malformed("invalid purpose"))
        };
        let tal_id = source.get_u32();
        let ip_count = source.get_u32() as usize;
        let as_count = source.get_u32() as usize;

        // Check the counts before allocating anything.
        need(source, ip_count.saturating_mul(IP_ENTRY_LEN))?;
        let ip_resources = (0..ip_count).map(|_| {
            parse_ip(source)
        }).collect::<Result<IpResources, _>>()?;
        need(source, as_count.saturating_mul(AS_ENTRY_LEN))?;
        let as_resources = (0..as_count).map(|_| {
            parse_as(source)
        }).collect::<Result<AsResources, _>>()?;

        let mft = parse_bytes(source)?;
        let notify = parse_bytes(source)?;
        let repo = parse_bytes(source)?;
        let crl = parse_bytes(source)?;
        let aia = parse_bytes(source)?;
        let aki = parse_bytes(source)?;
        let ski = parse_bytes(source)?;
        let pubkey = parse_bytes(source)?;

        let ski = match ski {
            Some(ski) => parse_key_id(ski)?,
            None => return Err(ReadError::Malformed("missing SKI"))
        };
        let kind = match purpose {
            Purpose::Ca => {
                let (mft, repo) = match (mft, repo) {
                    (Some(mft), Some(repo)) => (mft, repo),
                    _ => {
                        return Err(ReadError::Malformed(
                            "missing manifest in CA record"
                        ))
                    }
                };
                CertKind::Ca(Repository::new(
                    parse_rsync(repo)?,
                    parse_rsync(mft)?,
                    notify.map(|notify| {
                        uri::Https::from_bytes(notify).map_err(|_| {
                            ReadError::Malformed("invalid https URI")
                        })
                    }).transpose()?,
                ).map_err(|_| {
                    ReadError::Malformed("invalid repository")
                })?)
            }
            Purpose::BgpsecRouter => {
                let pubkey = match pubkey {
                    Some(pubkey) => pubkey,
                    None => {
                        return Err(ReadError::Malformed(
                            "missing key in router record"
                        ))
                    }
                };
                CertKind::BgpsecRouter(
                    str::from_utf8(pubkey.as_ref()).ok().and_then(|key| {
                        PublicKeyInfo::from_base64(key).ok()
                    }).ok_or(ReadError::Malformed("invalid router key"))?
                )
            }
        };

        Ok(Cert::from_parts(
            kind,
            ip_resources,
            as_resources,
            ski,
            aki.map(parse_key_id).transpose()?,
            aia.map(parse_rsync).transpose()?,
            crl.map(parse_rsync).transpose()?,
            expires,
            tal_id,
        ))
    }
}


//------------ Helper Functions ----------------------------------------------

/// Converts an entry count.
///
/// # Panics
///
/// Panics if there are more than `u32::MAX` entries. The resource limits
/// keep decoded records well below that.
fn count(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("too many resource entries for transfer")
    }
}

fn compose_ip<B: BufMut>(item: &IpResource, target: &mut B) {
    target.put_u8(match item.family() {
        AddressFamily::Ipv4 => FAMILY_V4,
        AddressFamily::Ipv6 => FAMILY_V6,
    });
    let (kind, len, min, max) = match item.block() {
        None => (KIND_INHERIT, 0, Addr::from_bits(0), Addr::from_bits(0)),
        Some(IpBlock::Prefix(prefix)) => {
            (KIND_SINGLE, prefix.addr_len(), prefix.min(), prefix.max())
        }
        Some(IpBlock::Range(range)) => {
            (KIND_RANGE, 0, range.min(), range.max())
        }
    };
    target.put_u8(kind);
    target.put_u8(len);
    target.put_slice(&min.to_bytes());
    target.put_slice(&max.to_bytes());
}

fn parse_ip<B: Buf>(source: &mut B) -> Result<IpResource, ReadError> {
    let family = match source.get_u8() {
        FAMILY_V4 => AddressFamily::Ipv4,
        FAMILY_V6 => AddressFamily::Ipv6,
        _ => return Err(ReadError::Malformed("invalid address family"))
    };
    let kind = source.get_u8();
    let len = source.get_u8();
    let mut min = [0u8; 16];
    source.copy_to_slice(&mut min);
    let mut max = [0u8; 16];
    source.copy_to_slice(&mut max);
    let (min, max) = (Addr::from_bytes(min), Addr::from_bytes(max));
    match kind {
        KIND_SINGLE => {
            if usize::from(len) > family.addr_len() * 8 {
                return Err(ReadError::Malformed("invalid prefix length"))
            }
            Ok(IpResource::Block(family, Prefix::new(min, len).into()))
        }
        KIND_RANGE => {
            AddressRange::new(min, max).map(|range| {
                IpResource::Block(family, range.into())
            }).map_err(|_| ReadError::Malformed("reversed address range"))
        }
        KIND_INHERIT => Ok(IpResource::Inherit(family)),
        _ => Err(ReadError::Malformed("invalid IP resource type"))
    }
}

fn compose_as<B: BufMut>(item: &AsResource, target: &mut B) {
    let (kind, min, max) = match *item {
        AsResource::Inherit => (KIND_INHERIT, 0, 0),
        AsResource::Id(id) => (KIND_SINGLE, id.into_u32(), id.into_u32()),
        AsResource::Range(range) => {
            (KIND_RANGE, range.min().into_u32(), range.max().into_u32())
        }
    };
    target.put_u8(kind);
    target.put_u32(min);
    target.put_u32(max);
}

fn parse_as<B: Buf>(source: &mut B) -> Result<AsResource, ReadError> {
    let kind = source.get_u8();
    let min = Asn::from_u32(source.get_u32());
    let max = Asn::from_u32(source.get_u32());
    match kind {
        KIND_SINGLE => Ok(AsResource::Id(min)),
        KIND_RANGE => {
            AsRange::new(min, max).map(AsResource::Range).map_err(|_| {
                ReadError::Malformed("invalid AS range")
            })
        }
        KIND_INHERIT => Ok(AsResource::Inherit),
        _ => Err(ReadError::Malformed("invalid AS resource type"))
    }
}

fn compose_str<B: BufMut>(value: Option<&str>, target: &mut B) {
    match value {
        Some(value) => {
            target.put_u32(count(value.len()));
            target.put_slice(value.as_bytes());
        }
        None => target.put_u32(0)
    }
}

fn parse_bytes<B: Buf>(source: &mut B) -> Result<Option<Bytes>, ReadError> {
    need(source, 4)?;
    let len = source.get_u32() as usize;
    if len == 0 {
        return Ok(None)
    }
    need(source, len)?;
    Ok(Some(source.copy_to_bytes(len)))
}

fn parse_rsync(bytes: Bytes) -> Result<uri::Rsync, ReadError> {
    uri::Rsync::from_bytes(bytes).map_err(|_| {
        ReadError::Malformed("invalid rsync URI")
    })
}

fn parse_key_id(bytes: Bytes) -> Result<KeyIdentifier, ReadError> {
    str::from_utf8(bytes.as_ref()).ok().and_then(|s| {
        s.parse().ok()
    }).ok_or(ReadError::Malformed("invalid key identifier"))
}

fn need<B: Buf>(source: &B, len: usize) -> Result<(), ReadError> {
    if source.remaining() < len {
        Err(ReadError::ShortInput)
    }
    else {
        Ok(())
    }
}


//------------ ReadError -----------------------------------------------------

/// Restoring a record failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadError {
    /// The data ended before the record did.
    ShortInput,

    /// The data does not describe a valid record.
    Malformed(&'static str),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReadError::ShortInput => f.write_str("unexpected end of data"),
            ReadError::Malformed(msg) => {
                write!(f, "malformed certificate record: {}", msg)
            }
        }
    }
}

impl error::Error for ReadError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Options;
    use crate::test::{CertBuilder, Res};

    fn round_trip(builder: &CertBuilder) {
        let cert = Cert::decode(
            builder.finalize(), &Options::default()
        ).unwrap().with_tal_id(7);
        let mut data = Vec::new();
        cert.compose(&mut data);
        data.extend_from_slice(b"trailer");

        let mut source = data.as_slice();
        let restored = Cert::parse(&mut source).unwrap();
        assert_eq!(source, b"trailer");
        assert!(restored.x509().is_none());
        assert_eq!(cert, restored);

        // A second trip produces the same octets.
        let mut again = Vec::new();
        restored.compose(&mut again);
        assert_eq!(&data[..data.len() - 7], again.as_slice());
    }

    #[test]
    fn round_trip_ca() {
        round_trip(&CertBuilder::ca());

        let mut builder = CertBuilder::ca();
        builder.sia(Some(&[
            (crate::oid::AD_CA_REPOSITORY, "rsync://example.net/repo/ca/"),
            (
                crate::oid::AD_RPKI_MANIFEST,
                "rsync://example.net/repo/ca/a.mft"
            ),
            (crate::oid::AD_RPKI_NOTIFY, "https://example.net/notify.xml"),
        ]));
        builder.ipv4(Some(Res::Inherit));
        builder.ipv6(Some(Res::Blocks(&["::/0"])));
        builder.asn(Some(Res::Inherit));
        round_trip(&builder);
    }

    #[test]
    fn round_trip_ta() {
        round_trip(&CertBuilder::ta());
    }

    #[test]
    fn round_trip_router() {
        round_trip(&CertBuilder::router());

        let mut builder = CertBuilder::router();
        builder.asn(Some(Res::Blocks(&["64496-64499", "65536"])));
        round_trip(&builder);
    }

    #[test]
    fn short_input() {
        let cert = Cert::decode(
            CertBuilder::ca().finalize(), &Options::default()
        ).unwrap();
        let mut data = Vec::new();
        cert.compose(&mut data);
        for len in [0, 10, 21, 60, data.len() - 1] {
            assert_eq!(
                Cert::parse(&mut &data[..len]),
                Err(ReadError::ShortInput)
            );
        }
    }

    #[test]
    fn huge_count() {
        let mut data = Vec::new();
        data.put_i64(0);
        data.put_u8(PURPOSE_CA);
        data.put_u32(0);
        data.put_u32(u32::MAX);
        data.put_u32(0);
        assert_eq!(
            Cert::parse(&mut data.as_slice()), Err(ReadError::ShortInput)
        );
    }

    #[test]
    fn missing_fields() {
        fn record(purpose: u8, ski: Option<&str>) -> Vec<u8> {
            let mut data = Vec::new();
            data.put_i64(1_700_000_000);
            data.put_u8(purpose);
            data.put_u32(0);
            data.put_u32(0);
            data.put_u32(0);
            for _ in 0..6 {
                compose_str(None, &mut data);
            }
            compose_str(ski, &mut data);
            compose_str(None, &mut data);
            data
        }

        let ski = "0123456789ABCDEF0123456789ABCDEF01234567";
        assert_eq!(
            Cert::parse(&mut record(PURPOSE_ROUTER, None).as_slice()),
            Err(ReadError::Malformed("missing SKI"))
        );
        assert_eq!(
            Cert::parse(&mut record(PURPOSE_CA, Some(ski)).as_slice()),
            Err(ReadError::Malformed("missing manifest in CA record"))
        );
        assert_eq!(
            Cert::parse(&mut record(PURPOSE_ROUTER, Some(ski)).as_slice()),
            Err(ReadError::Malformed("missing key in router record"))
        );
        assert_eq!(
            Cert::parse(&mut record(3, Some(ski)).as_slice()),
            Err(ReadError::Malformed("invalid purpose"))
        );
    }
}
