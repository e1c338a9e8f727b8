//! Options for parsing certificates.

#[cfg(feature = "serde")] use serde::Deserialize;


//------------ Constants -----------------------------------------------------

/// The default maximum number of IP resource entries in a certificate.
pub const MAX_IP_RESOURCES: usize = 200_000;

/// The default maximum number of AS resource entries in a certificate.
pub const MAX_AS_RESOURCES: usize = 200_000;


//------------ Options -------------------------------------------------------

/// The options for parsing a certificate.
///
/// The default options accept everything the resource certificate profile
/// requires accepting and bound the number of resource entries to
/// [`MAX_IP_RESOURCES`] and [`MAX_AS_RESOURCES`].
///
/// If strict mode is enabled, a few checks that are frequently violated in
/// the wild are enforced, too: an address family may not carry a SAFI and
/// the subject key identifier of a BGPsec router certificate must be the
/// SHA-1 hash of its public key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Options {
    strict: bool,
    max_ip_resources: usize,
    max_as_resources: usize,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(self, strict: bool) -> Self {
        Options { strict, ..self }
    }

    pub fn max_ip_resources(self, max: usize) -> Self {
        Options { max_ip_resources: max, ..self }
    }

    pub fn max_as_resources(self, max: usize) -> Self {
        Options { max_as_resources: max, ..self }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn ip_limit(&self) -> usize {
        self.max_ip_resources
    }

    pub fn as_limit(&self) -> usize {
        self.max_as_resources
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            strict: false,
            max_ip_resources: MAX_IP_RESOURCES,
            max_as_resources: MAX_AS_RESOURCES,
        }
    }
}


//============ Tests =========================================================
