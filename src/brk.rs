//! The BGPsec router key index.
//!
//! A BGPsec router certificate authorizes its key to sign on behalf of
//! every AS number in its AS resources. The [`RouterKeyIndex`] collects
//! these authorizations, one [`RouterKey`] per AS number, for all router
//! certificates found during a validation run.
//!
//! The same key may be certified more than once, for instance while a
//! router certificate is being replaced. The index keeps a single entry
//! for such a key that expires with the last of its certificates.
//!
//! A single AS range can cover a huge number of AS numbers. The number of
//! keys a single certificate may add is therefore limited to the AS
//! resource limit of the [`Options`] the index was created with.

use std::collections::{btree_map, BTreeMap};
use log::{debug, warn};
use crate::cert::Cert;
use crate::config::{Options, MAX_AS_RESOURCES};
use crate::crypto::{KeyIdentifier, PublicKeyInfo};
use crate::resources::{AsResource, Asn};
use crate::x509::Time;


//------------ RouterKeyIndex ------------------------------------------------

/// The router keys of a validation run.
///
/// Entries are ordered by AS number, then key identifier, then the
/// encoded key.
#[derive(Clone, Debug)]
pub struct RouterKeyIndex {
    keys: BTreeMap<RouterKey, RouterKeyInfo>,

    /// The maximum number of keys added for a single certificate.
    cert_limit: usize,
}

impl RouterKeyIndex {
    /// Creates an empty index with the default AS resource limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index using the AS resource limit of `options`.
    pub fn with_options(options: &Options) -> Self {
        RouterKeyIndex {
            keys: BTreeMap::new(),
            cert_limit: options.as_limit(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Adds a router key.
    ///
    /// If the key is already present, the entry is kept and takes over
    /// the expiry and trust anchor of `info` if `info` expires later.
    pub fn insert(&mut self, key: RouterKey, info: RouterKeyInfo) {
        match self.keys.entry(key) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(info);
            }
            btree_map::Entry::Occupied(mut entry) => {
                if entry.get().expires < info.expires {
                    debug!(
                        "extending expiry of router key {} for {} to {}",
                        entry.key().key_identifier, entry.key().asn,
                        info.expires
                    );
                    entry.insert(info);
                }
            }
        }
    }

    /// Adds the router keys of a certificate.
    ///
    /// A key is added for each AS number in the certificate’s AS
    /// resources. Nothing is added for a certificate that isn’t a BGPsec
    /// router certificate or whose AS resources cover more AS numbers than
    /// the limit of the index.
    pub fn insert_cert(&mut self, cert: &Cert) {
        let key = match cert.router_key() {
            Some(key) => key,
            None => return
        };
        let count = cert.as_resources().iter().map(|item| {
            match item {
                AsResource::Id(_) => 1,
                AsResource::Range(range) => {
                    u64::from(range.max().into_u32())
                    - u64::from(range.min().into_u32()) + 1
                }
                AsResource::Inherit => 0,
            }
        }).sum::<u64>();
        if count > self.cert_limit as u64 {
            warn!(
                "router key {} covers {} AS numbers, more than the limit \
                 of {}",
                cert.subject_key_identifier(), count, self.cert_limit
            );
            return
        }
        let info = RouterKeyInfo::new(cert.expires(), cert.tal_id());
        let ski = cert.subject_key_identifier();
        for item in cert.as_resources().iter() {
            let (min, max) = match item {
                AsResource::Id(id) => (*id, *id),
                AsResource::Range(range) => (range.min(), range.max()),
                AsResource::Inherit => {
                    warn!("invalid AS identifier type");
                    continue
                }
            };
            for asn in min.into_u32()..=max.into_u32() {
                self.insert(
                    RouterKey::new(asn.into(), ski, key.clone()), info
                );
            }
        }
    }

    pub fn get(&self, key: &RouterKey) -> Option<RouterKeyInfo> {
        self.keys.get(key).copied()
    }

    pub fn iter(
        &self
    ) -> impl Iterator<Item = (&RouterKey, RouterKeyInfo)> + '_ {
        self.keys.iter().map(|(key, info)| (key, *info))
    }
}

impl Default for RouterKeyIndex {
    fn default() -> Self {
        RouterKeyIndex {
            keys: BTreeMap::new(),
            cert_limit: MAX_AS_RESOURCES,
        }
    }
}


//------------ RouterKey -----------------------------------------------------

/// The authorization of a router key for an AS number.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterKey {
    asn: Asn,
    key_identifier: KeyIdentifier,
    key: PublicKeyInfo,
}

impl RouterKey {
    pub fn new(
        asn: Asn, key_identifier: KeyIdentifier, key: PublicKeyInfo
    ) -> Self {
        RouterKey { asn, key_identifier, key }
    }

    pub fn asn(&self) -> Asn {
        self.asn
    }

    pub fn key_identifier(&self) -> KeyIdentifier {
        self.key_identifier
    }

    pub fn key(&self) -> &PublicKeyInfo {
        &self.key
    }
}


//------------ RouterKeyInfo -------------------------------------------------

/// What the index knows about a router key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterKeyInfo {
    expires: Time,
    tal_id: u32,
}

impl RouterKeyInfo {
    pub fn new(expires: Time, tal_id: u32) -> Self {
        RouterKeyInfo { expires, tal_id }
    }

    pub fn expires(self) -> Time {
        self.expires
    }

    pub fn tal_id(self) -> u32 {
        self.tal_id
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Options;
    use crate::test::{ec_key, CertBuilder, Res};

    fn router(asns: Res, until: i32, tal_id: u32) -> Cert {
        let mut builder = CertBuilder::router();
        builder.asn(Some(asns));
        builder.validity(
            Time::utc(2020, 1, 1, 0, 0, 0), Time::utc(until, 1, 1, 0, 0, 0)
        );
        Cert::decode(
            builder.finalize(), &Options::default()
        ).unwrap().with_tal_id(tal_id)
    }

    fn key(asn: u32) -> RouterKey {
        let key = PublicKeyInfo::decode(ec_key(1)).unwrap();
        RouterKey::new(Asn::from_u32(asn), key.key_identifier(), key)
    }

    #[test]
    fn insert_keeps_later_expiry() {
        let mut index = RouterKeyIndex::new();
        index.insert_cert(&router(Res::Blocks(&["64496"]), 2030, 1));
        index.insert_cert(&router(Res::Blocks(&["64496"]), 2035, 2));
        index.insert_cert(&router(Res::Blocks(&["64496"]), 2032, 3));
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&key(64496)),
            Some(RouterKeyInfo::new(Time::utc(2035, 1, 1, 0, 0, 0), 2))
        );
    }

    #[test]
    fn insert_cert_ranges() {
        let mut index = RouterKeyIndex::new();
        index.insert_cert(
            &router(Res::Blocks(&["65000-65003", "64496"]), 2030, 1)
        );
        assert_eq!(
            index.iter().map(|(key, _)| {
                key.asn().into_u32()
            }).collect::<Vec<_>>(),
            vec![64496, 65000, 65001, 65002, 65003]
        );

        // A different key for the same AS is a separate entry.
        let other = PublicKeyInfo::decode(ec_key(2)).unwrap();
        index.insert(
            RouterKey::new(
                Asn::from_u32(64496), other.key_identifier(), other
            ),
            RouterKeyInfo::new(Time::utc(2030, 1, 1, 0, 0, 0), 1)
        );
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn insert_cert_skips() {
        let mut index = RouterKeyIndex::new();
        index.insert_cert(&router(Res::Inherit, 2030, 1));
        assert!(index.is_empty());

        index.insert_cert(
            &Cert::decode(
                CertBuilder::ca().finalize(), &Options::default()
            ).unwrap()
        );
        assert!(index.is_empty());
    }

    #[test]
    fn insert_cert_limit() {
        let mut index = RouterKeyIndex::new();
        index.insert_cert(&router(Res::Blocks(&["1-2000000"]), 2030, 1));
        assert!(index.is_empty());
        index.insert_cert(
            &router(Res::Blocks(&["0-4294967295"]), 2030, 1)
        );
        assert!(index.is_empty());

        let mut index = RouterKeyIndex::with_options(
            &Options::new().max_as_resources(4)
        );
        index.insert_cert(
            &router(Res::Blocks(&["64496", "65000-65003"]), 2030, 1)
        );
        assert!(index.is_empty());
        index.insert_cert(
            &router(Res::Blocks(&["64496", "65000-65002"]), 2030, 1)
        );
        assert_eq!(index.len(), 4);
    }
}
