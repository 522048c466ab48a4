//! Declarative filter model shared by every chain family.
//!
//! A filter is an immutable predicate over one record. An unset field (`None`)
//! matches any value; a set field requires equality, or range membership for
//! [`SpecVersionRange`]. A list of filters matches a record if **any** of the
//! filters matches it (OR across the list, AND across fields of one filter).

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::IndexerError;

// ─── SpecVersionRange ────────────────────────────────────────────────────────

/// Inclusive `[min, max]` range of runtime spec versions.
///
/// Serialized as a two-element array, e.g. `[12, 20]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct SpecVersionRange {
    min: u32,
    max: u32,
}

impl SpecVersionRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, IndexerError> {
        if min > max {
            return Err(IndexerError::InvalidSpecVersionRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range containing exactly one version.
    pub fn exactly(version: u32) -> Self {
        Self {
            min: version,
            max: version,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns `true` if `min <= version <= max`.
    pub fn contains(&self, version: u32) -> bool {
        self.min <= version && version <= self.max
    }
}

impl TryFrom<[u32; 2]> for SpecVersionRange {
    type Error = IndexerError;

    fn try_from([min, max]: [u32; 2]) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<SpecVersionRange> for [u32; 2] {
    fn from(range: SpecVersionRange) -> Self {
        [range.min, range.max]
    }
}

/// Checks an optional range constraint against an optional block version.
///
/// An unversioned block never satisfies a set range.
pub fn spec_version_matches(range: Option<&SpecVersionRange>, version: Option<u32>) -> bool {
    match (range, version) {
        (None, _) => true,
        (Some(range), Some(version)) => range.contains(version),
        (Some(_), None) => false,
    }
}

// ─── BlockContext ────────────────────────────────────────────────────────────

/// The block-level scalars a record filter may consult.
///
/// Records reference their block by hash/height only, so filters that depend
/// on block state (the runtime spec version) read it from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext<'a> {
    pub height: u64,
    pub hash: &'a str,
    pub spec_version: Option<u32>,
}

// ─── Record filters ──────────────────────────────────────────────────────────

/// A filter that can decide whether one record of type `R` matches.
pub trait RecordFilter<R: ?Sized> {
    fn matches(&self, record: &R, block: &BlockContext<'_>) -> bool;
}

/// Filter type for chain families that expose no filterable records.
///
/// Uninhabited: no value of this type can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NoFilter {}

impl<R: ?Sized> RecordFilter<R> for NoFilter {
    fn matches(&self, _record: &R, _block: &BlockContext<'_>) -> bool {
        match *self {}
    }
}

/// Filter applied to block handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFilter {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<SpecVersionRange>,
}

impl BlockFilter {
    /// Only blocks whose spec version lies in `range`.
    pub fn spec_version(range: SpecVersionRange) -> Self {
        Self {
            spec_version: Some(range),
        }
    }

    /// Returns `true` if the block satisfies this filter.
    pub fn matches_block(&self, block: &BlockContext<'_>) -> bool {
        spec_version_matches(self.spec_version.as_ref(), block.spec_version)
    }
}

// ─── FilterArg ───────────────────────────────────────────────────────────────

/// The filter argument accepted by wrapper accessors: nothing, one filter, or
/// a list of filters.
///
/// ```
/// use blockmap_core::filter::{BlockFilter, FilterArg};
///
/// let one = BlockFilter::default();
/// let arg: FilterArg<'_, BlockFilter> = (&one).into();
/// assert!(matches!(arg, FilterArg::One(_)));
/// ```
#[derive(Debug)]
pub enum FilterArg<'a, F> {
    /// No filter: every record matches.
    All,
    /// A single filter.
    One(&'a F),
    /// A list of filters; a record matches if any filter matches.
    /// An empty list matches nothing.
    Any(&'a [F]),
}

impl<'a, F> FilterArg<'a, F> {
    /// Returns `true` if this argument imposes no constraint.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns `true` if `record` satisfies at least one filter.
    pub fn admits<R: ?Sized>(&self, record: &R, block: &BlockContext<'_>) -> bool
    where
        F: RecordFilter<R>,
    {
        match self {
            Self::All => true,
            Self::One(filter) => filter.matches(record, block),
            Self::Any(filters) => filters.iter().any(|f| f.matches(record, block)),
        }
    }

    /// Select the matching records, preserving their original order.
    pub fn select<'r, R>(&self, records: &'r [R], block: &BlockContext<'_>) -> Vec<&'r R>
    where
        F: RecordFilter<R>,
    {
        records
            .iter()
            .filter(|record| self.admits(*record, block))
            .collect()
    }
}

impl<F> Clone for FilterArg<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for FilterArg<'_, F> {}

impl<F> Default for FilterArg<'_, F> {
    fn default() -> Self {
        Self::All
    }
}

impl<'a, F> From<&'a F> for FilterArg<'a, F> {
    fn from(filter: &'a F) -> Self {
        Self::One(filter)
    }
}

impl<'a, F> From<&'a [F]> for FilterArg<'a, F> {
    fn from(filters: &'a [F]) -> Self {
        Self::Any(filters)
    }
}

impl<'a, F> From<&'a Vec<F>> for FilterArg<'a, F> {
    fn from(filters: &'a Vec<F>) -> Self {
        Self::Any(filters.as_slice())
    }
}

impl<'a, F> From<Option<&'a F>> for FilterArg<'a, F> {
    fn from(filter: Option<&'a F>) -> Self {
        filter.map_or(Self::All, Self::One)
    }
}

// ─── Lenient field decoding ──────────────────────────────────────────────────

/// Deserialize an optional filter field, treating a malformed value as unset.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]`. A value of the
/// wrong shape (e.g. a non-numeric spec version bound, or `min > max`) is
/// logged and dropped so the field becomes a wildcard.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!(%value, error = %e, "Ignoring malformed filter field");
            Ok(None)
        }
    }
}

/// Decode a filter (or list of filters) from loosely-typed JSON.
///
/// Absent or `null` yields `None` (no filter, every record matches). An
/// object yields a one-element list and an array yields its elements; an
/// explicit empty array is kept as `Some(vec![])`, which matches nothing.
/// A malformed filter anywhere in the list leaves the handler unconstrained
/// (`None`).
pub fn decode_filters<F: DeserializeOwned>(
    value: Option<&serde_json::Value>,
) -> Option<Vec<F>> {
    let items = match value {
        None | Some(serde_json::Value::Null) => return None,
        Some(serde_json::Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    };

    let mut filters = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<F>(item.clone()) {
            Ok(filter) => filters.push(filter),
            Err(e) => {
                tracing::warn!(filter = %item, error = %e, "Malformed filter, matching everything");
                return None;
            }
        }
    }
    Some(filters)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(spec_version: Option<u32>) -> BlockContext<'static> {
        BlockContext {
            height: 1,
            hash: "0xb1",
            spec_version,
        }
    }

    /// Matches integers equal to the wrapped value.
    #[derive(Debug, Deserialize)]
    struct Equals(u32);

    impl RecordFilter<u32> for Equals {
        fn matches(&self, record: &u32, _block: &BlockContext<'_>) -> bool {
            *record == self.0
        }
    }

    #[test]
    fn range_membership_is_inclusive() {
        let range = SpecVersionRange::new(10, 20).unwrap();
        for v in 0..30 {
            assert_eq!(range.contains(v), (10..=20).contains(&v), "version {v}");
        }
        assert!(SpecVersionRange::exactly(7).contains(7));
    }

    #[test]
    fn range_rejects_min_above_max() {
        let err = SpecVersionRange::new(5, 4).unwrap_err();
        assert!(matches!(err, IndexerError::InvalidSpecVersionRange { min: 5, max: 4 }));
    }

    #[test]
    fn range_serde_as_pair() {
        let range: SpecVersionRange = serde_json::from_str("[1, 3]").unwrap();
        assert_eq!((range.min(), range.max()), (1, 3));
        assert_eq!(serde_json::to_string(&range).unwrap(), "[1,3]");
        assert!(serde_json::from_str::<SpecVersionRange>("[3, 1]").is_err());
    }

    #[test]
    fn block_filter_malformed_range_is_wildcard() {
        let f: BlockFilter = serde_json::from_str(r#"{"specVersion": ["a", 2]}"#).unwrap();
        assert_eq!(f, BlockFilter::default());

        let f: BlockFilter = serde_json::from_str(r#"{"specVersion": [9, 2]}"#).unwrap();
        assert!(f.spec_version.is_none());

        let f: BlockFilter =
            serde_json::from_str(r#"{"specVersion": [1, 2], "unknown": true}"#).unwrap();
        assert!(f.matches_block(&ctx(Some(2))));
        assert!(!f.matches_block(&ctx(Some(3))));
    }

    #[test]
    fn unversioned_block_fails_range_constraint() {
        let f = BlockFilter::spec_version(SpecVersionRange::new(0, 100).unwrap());
        assert!(!f.matches_block(&ctx(None)));
        assert!(BlockFilter::default().matches_block(&ctx(None)));
    }

    #[test]
    fn filter_arg_or_semantics() {
        let records = [1u32, 2, 3, 2, 5];
        let filters = vec![Equals(2), Equals(5)];
        let block = ctx(None);

        let picked = FilterArg::<Equals>::from(&filters).select(&records, &block);
        assert_eq!(picked, vec![&2, &2, &5]);

        let one = Equals(3);
        assert_eq!(FilterArg::<Equals>::from(&one).select(&records, &block), vec![&3]);

        let all = FilterArg::<Equals>::All.select(&records, &block);
        assert_eq!(all.len(), records.len());

        let none: &[Equals] = &[];
        assert!(FilterArg::<Equals>::from(none).select(&records, &block).is_empty());
        assert!(FilterArg::<Equals>::from(None).is_all());
    }

    #[test]
    fn decode_filters_shapes() {
        let one = serde_json::json!({ "specVersion": [1, 2] });
        assert_eq!(decode_filters::<BlockFilter>(Some(&one)).unwrap().len(), 1);

        let many = serde_json::json!([{ "specVersion": [1, 2] }, {}]);
        assert_eq!(decode_filters::<BlockFilter>(Some(&many)).unwrap().len(), 2);

        assert!(decode_filters::<BlockFilter>(None).is_none());
        assert!(decode_filters::<BlockFilter>(Some(&serde_json::Value::Null)).is_none());
        let junk = serde_json::json!(42);
        assert!(decode_filters::<BlockFilter>(Some(&junk)).is_none());
    }

    #[test]
    fn explicit_empty_filter_list_is_kept() {
        let empty = serde_json::json!([]);
        let decoded = decode_filters::<BlockFilter>(Some(&empty));
        assert_eq!(decoded, Some(vec![]));
    }
}
