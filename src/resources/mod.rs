//! Handling of IP and AS resources.
//!
//! The types in this module implement the certificate extensions defined in
//! [RFC 3779] for including IP address and autonomous system resources in
//! certificates in the restricted form specified by [RFC 6487] for use in
//! RPKI.
//!
//! There are two such resources: [`IpResources`] implements the IP Address
//! Delegation Extension and [`AsResources`] implements the Autonomous System
//! Identifier Delegation Extension.
//!
//! Both are kept as flat lists of entries in the order they appear in the
//! certificate. While collecting the entries, the builders reject overlaps
//! and a mix of inheritance with explicit resources.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

pub use self::asres::{
    AsRange, AsResource, AsResources, AsResourcesBuilder, Asn
};
pub use self::ipres::{
    Addr, AddressFamily, AddressRange, IpBlock, IpResource, IpResources,
    IpResourcesBuilder, Prefix
};

pub mod asres;
pub mod ipres;

use std::collections::BTreeMap;


//------------ RangeIndex ----------------------------------------------------

/// An index of the ranges seen so far for a class of resources.
///
/// This is used by the builders to detect overlapping entries. It keeps the
/// ranges in a map keyed by their minimum, so only the direct neighbours of
/// a new range need to be checked.
#[derive(Clone, Debug)]
struct RangeIndex<T> {
    inherit: bool,
    ranges: BTreeMap<T, T>,
}

impl<T: Copy + Ord> RangeIndex<T> {
    fn new() -> Self {
        RangeIndex {
            inherit: false,
            ranges: BTreeMap::new(),
        }
    }

    fn insert_inherit(&mut self) -> Result<(), Conflict> {
        if self.inherit || !self.ranges.is_empty() {
            return Err(Conflict::Inherit)
        }
        self.inherit = true;
        Ok(())
    }

    /// Inserts the inclusive range from `min` to `max`.
    ///
    /// Ranges that merely touch are fine, ranges that share at least one
    /// value are not.
    fn insert(&mut self, min: T, max: T) -> Result<(), Conflict> {
        if self.inherit {
            return Err(Conflict::Inherit)
        }
        if let Some((_, prev_max)) = self.ranges.range(..=min).next_back() {
            if *prev_max >= min {
                return Err(Conflict::Overlap)
            }
        }
        if let Some((next_min, _)) = self.ranges.range(min..).next() {
            if *next_min <= max {
                return Err(Conflict::Overlap)
            }
        }
        self.ranges.insert(min, max);
        Ok(())
    }
}


//------------ Conflict ------------------------------------------------------

/// The reason a range could not be added to a range index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Conflict {
    Inherit,
    Overlap,
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn range_index() {
        let mut index = RangeIndex::new();
        index.insert(10u32, 20).unwrap();
        index.insert(30, 40).unwrap();
        index.insert(21, 29).unwrap();
        assert_eq!(index.insert(5, 10), Err(Conflict::Overlap));
        assert_eq!(index.insert(40, 50), Err(Conflict::Overlap));
        assert_eq!(index.insert(12, 13), Err(Conflict::Overlap));
        assert_eq!(index.insert(0, 100), Err(Conflict::Overlap));
        index.insert(41, 41).unwrap();
        assert_eq!(index.insert_inherit(), Err(Conflict::Inherit));

        let mut index = RangeIndex::new();
        index.insert_inherit().unwrap();
        assert!(index.inherit);
        assert_eq!(index.insert_inherit(), Err(Conflict::Inherit));
        assert_eq!(index.insert(1u32, 2), Err(Conflict::Inherit));
    }
}
