//! Id selectors and their normalized form.
//!
//! A [`Selector`] is whatever the caller used to pick ids: one index, a
//! slice, an explicit id list, a boolean mask, or everything. Before any view
//! is built it is normalized once, against a fixed size, into an [`IdSet`]:
//!
//! | Selector | IdSet |
//! |----------|-------|
//! | one id, or anything selecting exactly one id | `Index(id)` |
//! | step-1 slice, or ascending ids without holes | `Range { start, stop }` |
//! | anything else (unordered, repeated, stepped, masked) | `Ids(ids)` |
//!
//! Downstream code matches on the three `IdSet` variants only.
//!
//! # Conventions
//!
//! - Negative indices and slice bounds count from the end, as in Python.
//! - Inverted step-1 slice bounds are swapped; a bound past the end is an
//!   error rather than being truncated.
//! - Stepped slices follow Python's `slice.indices` clamping.
//! - Explicit id lists must be non-negative; their order and repeats are
//!   preserved.
//! - Selectors built from `usize` ids and ranges keep them unsigned, so ids
//!   above `i64::MAX` are range-checked rather than read as negative.
//! - A mask of the wrong length is truncated or padded with `false`, with a
//!   warning.

use std::ops::{Range, RangeFull};

use crate::error::{Error, Result};

/// A caller-supplied choice of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every id.
    All,
    /// One id; negative values count from the end.
    Index(i64),
    /// One id, counted from the start.
    Id(usize),
    /// Ascending ids `[start, end)`; inverted bounds are swapped.
    Span(Range<usize>),
    /// A Python-style slice.
    Slice {
        /// First bound; `None` means the start (or the end for negative steps).
        start: Option<i64>,
        /// Second bound; `None` means the end (or the start for negative steps).
        stop: Option<i64>,
        /// Stride; `None` means 1. Zero is rejected.
        step: Option<i64>,
    },
    /// Explicit ids, in order, repeats allowed. Negative ids are rejected.
    Ids(Vec<i64>),
    /// Explicit unsigned ids, in order, repeats allowed.
    IdList(Vec<usize>),
    /// A boolean mask over the ids.
    Mask(Vec<bool>),
}

impl Selector {
    /// A step-1 slice `[start, stop)`.
    pub fn slice(start: i64, stop: i64) -> Self {
        Selector::Slice {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// A stepped slice; any bound may be omitted.
    pub fn stepped(start: Option<i64>, stop: Option<i64>, step: i64) -> Self {
        Selector::Slice {
            start,
            stop,
            step: Some(step),
        }
    }

    /// An explicit id list.
    pub fn ids<I: IntoIterator<Item = usize>>(ids: I) -> Self {
        Selector::IdList(ids.into_iter().collect())
    }

    /// A boolean mask.
    pub fn mask<I: IntoIterator<Item = bool>>(mask: I) -> Self {
        Selector::Mask(mask.into_iter().collect())
    }

    /// Normalize against a structure of `size` ids.
    pub fn normalize(&self, size: usize) -> Result<IdSet> {
        match self {
            Selector::All => Ok(IdSet::from_range(0, size)),
            Selector::Index(index) => Ok(IdSet::Index(check_id(resolve(*index, size)?, size)?)),
            Selector::Id(id) => Ok(IdSet::Index(check_id(*id, size)?)),
            Selector::Span(range) => span(range.start, range.end, size),
            Selector::Slice { start, stop, step } => match step.unwrap_or(1) {
                0 => Err(Error::UnsupportedSelector(
                    "slice step cannot be zero".to_string(),
                )),
                1 => {
                    let start = resolve(start.unwrap_or(0), size)?;
                    let stop = match stop {
                        Some(stop) => resolve(*stop, size)?,
                        None => size,
                    };
                    span(start, stop, size)
                }
                step => Ok(IdSet::from_ids(stepped_ids(*start, *stop, step, size))),
            },
            Selector::Ids(ids) => {
                let ids = ids
                    .iter()
                    .map(|&id| {
                        let id = usize::try_from(id).map_err(|_| {
                            Error::TypeMismatch(format!("id {id} is negative"))
                        })?;
                        check_id(id, size)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(IdSet::from_ids(ids))
            }
            Selector::IdList(ids) => {
                let ids = ids
                    .iter()
                    .map(|&id| check_id(id, size))
                    .collect::<Result<Vec<_>>>()?;
                Ok(IdSet::from_ids(ids))
            }
            Selector::Mask(mask) => {
                if mask.len() != size {
                    tracing::warn!(
                        expected = size,
                        found = mask.len(),
                        "boolean mask length does not match size; missing entries are false, extra entries are ignored"
                    );
                }
                let ids = mask
                    .iter()
                    .take(size)
                    .enumerate()
                    .filter_map(|(id, &selected)| selected.then_some(id))
                    .collect();
                Ok(IdSet::from_ids(ids))
            }
        }
    }
}

fn check_id(id: usize, size: usize) -> Result<usize> {
    if id >= size {
        return Err(Error::IndexOutOfRange { index: id, size });
    }
    Ok(id)
}

/// A step-1 span with inverted bounds swapped and the end checked.
fn span(start: usize, stop: usize, size: usize) -> Result<IdSet> {
    let (start, stop) = if start > stop {
        (stop, start)
    } else {
        (start, stop)
    };
    if stop > size {
        return Err(Error::IndexOutOfRange { index: stop, size });
    }
    Ok(IdSet::from_range(start, stop))
}

/// Resolve a possibly negative index against `size`.
fn resolve(index: i64, size: usize) -> Result<usize> {
    if index >= 0 {
        return Ok(usize::try_from(index).unwrap_or(usize::MAX));
    }
    let back = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
    size.checked_sub(back).ok_or_else(|| {
        Error::UnsupportedSelector(format!("index {index} reaches before the start of size {size}"))
    })
}

/// Ids of `range(size)[start:stop:step]` for a non-zero, non-unit step.
fn stepped_ids(start: Option<i64>, stop: Option<i64>, step: i64, size: usize) -> Vec<usize> {
    let len = i64::try_from(size).unwrap_or(i64::MAX);
    let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
    let clamp = |bound: i64| {
        if bound < 0 {
            (bound + len).max(lower)
        } else {
            bound.min(upper)
        }
    };
    let (default_start, default_stop) = if step < 0 { (upper, lower) } else { (lower, upper) };
    let mut id = start.map_or(default_start, clamp);
    let stop = stop.map_or(default_stop, clamp);

    let mut ids = Vec::new();
    while (step > 0 && id < stop) || (step < 0 && id > stop) {
        ids.push(id as usize);
        id += step;
    }
    ids
}

/// A selector normalized against a fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSet {
    /// Exactly one id.
    Index(usize),
    /// Ascending ids `[start, stop)`. May be empty.
    Range {
        /// First id.
        start: usize,
        /// One past the last id.
        stop: usize,
    },
    /// Ids in caller order, possibly unsorted or repeated.
    Ids(Vec<usize>),
}

impl IdSet {
    /// Tag a contiguous span, collapsing a single id to `Index`.
    pub fn from_range(start: usize, stop: usize) -> Self {
        if stop == start + 1 {
            return IdSet::Index(start);
        }
        if start == stop {
            tracing::warn!(start, stop, "selection is empty; the view will hold no ids");
        }
        IdSet::Range { start, stop }
    }

    /// Tag an id list, recognising single ids and gapless ascending runs.
    pub fn from_ids(ids: Vec<usize>) -> Self {
        match ids.as_slice() {
            [] => IdSet::from_range(0, 0),
            [id] => IdSet::Index(*id),
            [first, .., last]
                if ids.windows(2).all(|pair| pair[0] + 1 == pair[1]) =>
            {
                IdSet::Range {
                    start: *first,
                    stop: last + 1,
                }
            }
            _ => IdSet::Ids(ids),
        }
    }

    /// Every selected id, in selection order.
    pub fn to_ids(&self) -> Vec<usize> {
        match self {
            IdSet::Index(id) => vec![*id],
            IdSet::Range { start, stop } => (*start..*stop).collect(),
            IdSet::Ids(ids) => ids.clone(),
        }
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        match self {
            IdSet::Index(_) => 1,
            IdSet::Range { start, stop } => stop - start,
            IdSet::Ids(ids) => ids.len(),
        }
    }

    /// Return true if no id is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map positions in `0..len` of some outer selection onto its ids.
    ///
    /// Used to re-index a nested selection relative to a view.
    pub fn relative_to(&self, outer: &[usize]) -> IdSet {
        match self {
            IdSet::Index(pos) => IdSet::Index(outer[*pos]),
            IdSet::Range { start, stop } if start == stop => {
                let at = outer.get(*start).copied().unwrap_or(0);
                IdSet::Range { start: at, stop: at }
            }
            _ => IdSet::from_ids(self.to_ids().into_iter().map(|pos| outer[pos]).collect()),
        }
    }
}

impl From<usize> for Selector {
    fn from(id: usize) -> Self {
        Selector::Id(id)
    }
}

impl From<Range<usize>> for Selector {
    fn from(range: Range<usize>) -> Self {
        Selector::Span(range)
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}

impl From<Vec<usize>> for Selector {
    fn from(ids: Vec<usize>) -> Self {
        Selector::ids(ids)
    }
}

impl From<&[usize]> for Selector {
    fn from(ids: &[usize]) -> Self {
        Selector::ids(ids.iter().copied())
    }
}

impl From<Vec<bool>> for Selector {
    fn from(mask: Vec<bool>) -> Self {
        Selector::Mask(mask)
    }
}

/// The argument of subscript-style access: a key name or an id selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscript<'a> {
    /// A key of the dictionary.
    Name(&'a str),
    /// A selection of ids.
    Select(Selector),
}

impl<'a> From<&'a str> for Subscript<'a> {
    fn from(name: &'a str) -> Self {
        Subscript::Name(name)
    }
}

impl<'a> From<&'a String> for Subscript<'a> {
    fn from(name: &'a String) -> Self {
        Subscript::Name(name)
    }
}

impl From<Selector> for Subscript<'_> {
    fn from(selector: Selector) -> Self {
        Subscript::Select(selector)
    }
}

impl From<usize> for Subscript<'_> {
    fn from(id: usize) -> Self {
        Subscript::Select(id.into())
    }
}

impl From<Range<usize>> for Subscript<'_> {
    fn from(range: Range<usize>) -> Self {
        Subscript::Select(range.into())
    }
}

impl From<Vec<usize>> for Subscript<'_> {
    fn from(ids: Vec<usize>) -> Self {
        Subscript::Select(ids.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_negative_index() {
        assert_eq!(Selector::Index(3).normalize(10).unwrap(), IdSet::Index(3));
        assert_eq!(Selector::Index(-1).normalize(10).unwrap(), IdSet::Index(9));
        assert_eq!(
            Selector::Index(10).normalize(10),
            Err(Error::IndexOutOfRange { index: 10, size: 10 })
        );
        assert!(matches!(
            Selector::Index(-11).normalize(10),
            Err(Error::UnsupportedSelector(_))
        ));
    }

    #[test]
    fn test_slice_normalization() {
        assert_eq!(
            Selector::slice(2, 5).normalize(10).unwrap(),
            IdSet::Range { start: 2, stop: 5 }
        );
        assert_eq!(
            Selector::slice(5, 2).normalize(10).unwrap(),
            IdSet::Range { start: 2, stop: 5 }
        );
        assert_eq!(Selector::slice(4, 5).normalize(10).unwrap(), IdSet::Index(4));
        assert_eq!(
            Selector::slice(-3, 10).normalize(10).unwrap(),
            IdSet::Range { start: 7, stop: 10 }
        );
        assert_eq!(
            Selector::slice(3, 3).normalize(10).unwrap(),
            IdSet::Range { start: 3, stop: 3 }
        );
        assert_eq!(
            Selector::slice(2, 11).normalize(10),
            Err(Error::IndexOutOfRange { index: 11, size: 10 })
        );
        assert_eq!(
            Selector::All.normalize(4).unwrap(),
            IdSet::Range { start: 0, stop: 4 }
        );
    }

    #[test]
    fn test_stepped_slices() {
        assert_eq!(
            Selector::stepped(Some(1), Some(8), 3).normalize(10).unwrap(),
            IdSet::Ids(vec![1, 4, 7])
        );
        assert_eq!(
            Selector::stepped(None, None, -4).normalize(10).unwrap(),
            IdSet::Ids(vec![9, 5, 1])
        );
        assert_eq!(
            Selector::stepped(Some(2), None, 100).normalize(10).unwrap(),
            IdSet::Index(2)
        );
        assert!(matches!(
            Selector::stepped(None, None, 0).normalize(10),
            Err(Error::UnsupportedSelector(_))
        ));
    }

    #[test]
    fn test_ids_normalization() {
        assert_eq!(
            Selector::ids([2, 3, 8]).normalize(10).unwrap(),
            IdSet::Ids(vec![2, 3, 8])
        );
        assert_eq!(
            Selector::ids([4, 5, 6]).normalize(10).unwrap(),
            IdSet::Range { start: 4, stop: 7 }
        );
        assert_eq!(
            Selector::ids([6, 5, 4]).normalize(10).unwrap(),
            IdSet::Ids(vec![6, 5, 4])
        );
        assert_eq!(
            Selector::ids([3, 3]).normalize(10).unwrap(),
            IdSet::Ids(vec![3, 3])
        );
        assert_eq!(Selector::ids([7]).normalize(10).unwrap(), IdSet::Index(7));
        assert!(matches!(
            Selector::Ids(vec![1, -2]).normalize(10),
            Err(Error::TypeMismatch(_))
        ));
        assert_eq!(
            Selector::ids([1, 12]).normalize(10),
            Err(Error::IndexOutOfRange { index: 12, size: 10 })
        );
    }

    #[test]
    fn test_unsigned_ids_never_wrap() {
        let huge = usize::MAX - 1;
        assert_eq!(
            Selector::from(huge).normalize(10),
            Err(Error::IndexOutOfRange { index: huge, size: 10 })
        );
        assert_eq!(
            Selector::ids([1, huge]).normalize(10),
            Err(Error::IndexOutOfRange { index: huge, size: 10 })
        );
        assert_eq!(
            Selector::from(3..huge).normalize(10),
            Err(Error::IndexOutOfRange { index: huge, size: 10 })
        );
        assert_eq!(Selector::from(huge).normalize(usize::MAX).unwrap(), IdSet::Index(huge));
        assert_eq!(
            Selector::from(7usize..3).normalize(10).unwrap(),
            IdSet::Range { start: 3, stop: 7 }
        );
    }

    #[test]
    fn test_mask_normalization() {
        let mask = Selector::mask([true, false, true, true]);
        assert_eq!(mask.normalize(4).unwrap(), IdSet::Ids(vec![0, 2, 3]));
        // Short masks are padded with false, long masks truncated.
        assert_eq!(mask.normalize(3).unwrap(), IdSet::Ids(vec![0, 2]));
        assert_eq!(mask.normalize(6).unwrap(), IdSet::Ids(vec![0, 2, 3]));
    }

    #[test]
    fn test_relative_to() {
        let outer = [2, 4, 6, 8];
        assert_eq!(IdSet::Index(1).relative_to(&outer), IdSet::Index(4));
        assert_eq!(
            IdSet::Range { start: 1, stop: 3 }.relative_to(&outer),
            IdSet::Ids(vec![4, 6])
        );
        assert_eq!(
            IdSet::Range { start: 0, stop: 2 }.relative_to(&[5, 6, 9]),
            IdSet::Range { start: 5, stop: 7 }
        );
    }
}
