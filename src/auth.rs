//! The trust index.
//!
//! While walking the RPKI tree, every accepted CA certificate is added to a
//! [`TrustIndex`] together with a link to the entry of its issuer. The
//! issuer of a new certificate is then found by looking up the
//! certificate’s authority key identifier which, for a properly issued
//! certificate, is the subject key identifier of the issuer.
//!
//! Entries are never removed. The index is meant to be filled from a single
//! thread during a validation run and dropped once the run is complete.

use std::{error, fmt};
use std::collections::BTreeMap;
use crate::cert::Cert;
use crate::crypto::KeyIdentifier;


//------------ TrustIndex ----------------------------------------------------

/// An index of certificates by their subject key identifier.
///
/// The entries live in an arena and refer to each other via [`AuthId`]s.
/// An ID is only meaningful for the index that created it.
#[derive(Clone, Debug, Default)]
pub struct TrustIndex {
    auths: Vec<Auth>,
    by_ski: BTreeMap<KeyIdentifier, AuthId>,
}

impl TrustIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.auths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auths.is_empty()
    }

    /// Adds a certificate issued by `parent`.
    ///
    /// Trust anchor certificates are added with a `parent` of `None`.
    ///
    /// # Panics
    ///
    /// The method panics if the index already contains a certificate with
    /// the same subject key identifier. Since the issuer is found via this
    /// identifier, a duplicate means the index cannot be trusted anymore.
    /// It also panics if `parent` is not from this index.
    pub fn insert(&mut self, cert: Cert, parent: Option<AuthId>) -> AuthId {
        match self.try_insert(cert, parent) {
            Ok(id) => id,
            Err(err) => panic!("trust index corrupted: {}", err)
        }
    }

    /// Adds a certificate unless its subject key identifier is taken.
    ///
    /// # Panics
    ///
    /// The method panics if `parent` is not from this index.
    pub fn try_insert(
        &mut self, cert: Cert, parent: Option<AuthId>
    ) -> Result<AuthId, DuplicateKey> {
        if let Some(parent) = parent {
            assert!(parent.0 < self.auths.len(), "foreign parent ID");
        }
        let ski = cert.subject_key_identifier();
        if self.by_ski.contains_key(&ski) {
            return Err(DuplicateKey { ski })
        }
        let id = AuthId(self.auths.len());
        self.auths.push(Auth { cert, parent });
        self.by_ski.insert(ski, id);
        Ok(id)
    }

    /// Returns the issuer for the given authority key identifier.
    pub fn find(&self, aki: KeyIdentifier) -> Option<AuthId> {
        self.by_ski.get(&aki).copied()
    }

    /// Returns the issuer of a certificate.
    ///
    /// Returns `None` if the certificate doesn’t have an authority key
    /// identifier or its issuer hasn’t been added yet.
    pub fn find_issuer(&self, cert: &Cert) -> Option<&Auth> {
        cert.authority_key_identifier().and_then(|aki| {
            self.find(aki)
        }).map(|id| self.get(id))
    }

    /// Returns the entry for the given ID.
    ///
    /// # Panics
    ///
    /// The method panics if `id` is not from this index.
    pub fn get(&self, id: AuthId) -> &Auth {
        &self.auths[id.0]
    }

    pub fn parent(&self, id: AuthId) -> Option<AuthId> {
        self.get(id).parent
    }

    /// Returns an iterator from the given entry up to its trust anchor.
    ///
    /// The first item is the entry itself.
    pub fn chain(&self, id: AuthId) -> Chain<'_> {
        Chain { index: self, next: Some(id) }
    }

    /// Returns an iterator over all entries ordered by their subject key
    /// identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &Auth> + '_ {
        self.by_ski.values().map(move |id| self.get(*id))
    }
}


//------------ AuthId --------------------------------------------------------

/// The identifier of an entry in a trust index.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AuthId(usize);


//------------ Auth ----------------------------------------------------------

/// An entry in the trust index.
#[derive(Clone, Debug)]
pub struct Auth {
    cert: Cert,
    parent: Option<AuthId>,
}

impl Auth {
    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    /// Returns the entry of the issuer.
    ///
    /// This is `None` for trust anchors.
    pub fn parent(&self) -> Option<AuthId> {
        self.parent
    }
}


//------------ Chain ---------------------------------------------------------

/// An iterator over the entries of a trust index up to a trust anchor.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    index: &'a TrustIndex,
    next: Option<AuthId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Auth;

    fn next(&mut self) -> Option<Self::Item> {
        let res = self.index.get(self.next?);
        self.next = res.parent;
        Some(res)
    }
}


//------------ DuplicateKey --------------------------------------------------

/// A certificate with the same subject key identifier is already present.
#[derive(Clone, Copy, Debug)]
pub struct DuplicateKey {
    ski: KeyIdentifier,
}

impl DuplicateKey {
    pub fn ski(self) -> KeyIdentifier {
        self.ski
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "duplicate subject key identifier {}", self.ski)
    }
}

impl error::Error for DuplicateKey { }


//============ Tests =========================================================
