//! Range-compressed list: one value per id, stored as maximal runs.
//!
//! # Layout
//!
//! The table is a `Vec<Run<T>>` sorted by `start`. For a list of size $N$ it
//! always satisfies:
//! - the runs partition $[0, N)$: the first starts at 0, the last stops at
//!   $N$, and each run stops where the next one starts;
//! - no two neighbouring runs hold equal values;
//! - every run is non-empty.
//!
//! Lookups binary-search the run containing an id, so a point read costs
//! $O(\log r)$ for $r$ runs. A write splices at most three runs in place of
//! the ones it overlaps and then merges the edited span with its neighbours,
//! so the table never needs a separate normalisation pass.

use std::fmt;

use crate::error::{Error, Result};
use crate::run::Run;
use crate::traits::{RangeIterable, Readable, RunIter, Value, Writable};

/// A fixed-size list whose equal neighbouring values share one run.
#[derive(Clone, PartialEq)]
pub struct RangedList<T> {
    size: usize,
    runs: Vec<Run<T>>,
    key: Option<String>,
    default: Option<T>,
}

impl<T> fmt::Debug for RangedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangedList")
            .field("key", &self.key)
            .field("size", &self.size)
            .field("runs", &self.runs.len())
            .finish()
    }
}

impl<T: Value> RangedList<T> {
    /// Create a list of `size` ids all holding `value`.
    ///
    /// `value` is also registered as the default restored by `reset`.
    pub fn new(size: usize, value: T) -> Self {
        let runs = if size == 0 {
            Vec::new()
        } else {
            vec![Run::new(0, size, value.clone())]
        };
        Self {
            size,
            runs,
            key: None,
            default: Some(value),
        }
    }

    /// Build a list from one value per id. No default is registered.
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let runs = Self::runs_from_values(0, values);
        Self {
            size: runs.last().map_or(0, |run| run.stop),
            runs,
            key: None,
            default: None,
        }
    }

    /// Attach the dictionary key used in error messages.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The dictionary key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn set_key(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }

    /// Register (or clear) the default. Does not change any value.
    pub fn set_default(&mut self, default: Option<T>) {
        self.default = default;
    }

    /// The current range table.
    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Number of runs in the table.
    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Return true if the table partitions `[0, size)` into non-empty,
    /// maximally coalesced runs.
    pub fn check_invariants(&self) -> bool {
        if self.size == 0 {
            return self.runs.is_empty();
        }
        let (Some(first), Some(last)) = (self.runs.first(), self.runs.last()) else {
            return false;
        };
        first.start == 0
            && last.stop == self.size
            && self.runs.iter().all(|run| run.start < run.stop)
            && self
                .runs
                .windows(2)
                .all(|pair| pair[0].stop == pair[1].start && pair[0].value != pair[1].value)
    }

    /// Set `[start, stop)` from one value per id.
    ///
    /// The number of values must equal the slice length.
    pub fn set_values_by_slice<I: IntoIterator<Item = T>>(
        &mut self,
        start: usize,
        stop: usize,
        values: I,
    ) -> Result<()> {
        let (start, stop) = self.check_slice(start, stop)?;
        let runs = Self::runs_from_values(start, values);
        let found = runs.last().map_or(0, |run| run.stop - start);
        if found != stop - start {
            return Err(Error::SizeMismatch {
                expected: stop - start,
                found,
            });
        }
        if start < stop {
            self.replace_span(start, stop, runs);
        }
        Ok(())
    }

    /// Set each id in `ids` to the matching entry of `values`.
    pub fn set_values_by_ids<I: IntoIterator<Item = T>>(
        &mut self,
        ids: &[usize],
        values: I,
    ) -> Result<()> {
        self.check_ids(ids)?;
        let values: Vec<T> = values.into_iter().collect();
        if values.len() != ids.len() {
            return Err(Error::SizeMismatch {
                expected: ids.len(),
                found: values.len(),
            });
        }
        for (&id, value) in ids.iter().zip(values) {
            self.set_value_by_id(id, value)?;
        }
        Ok(())
    }

    /// Replace this table with a copy of `other`'s, keeping key and default.
    pub fn copy_from(&mut self, other: &RangedList<T>) -> Result<()> {
        if other.size != self.size {
            return Err(Error::SizeMismatch {
                expected: self.size,
                found: other.size,
            });
        }
        self.runs.clone_from(&other.runs);
        Ok(())
    }

    /// Index of the run containing `id` (which must be below `size`).
    fn find_run(&self, id: usize) -> usize {
        self.runs.partition_point(|run| run.stop <= id)
    }

    fn runs_from_values<I: IntoIterator<Item = T>>(offset: usize, values: I) -> Vec<Run<T>> {
        let mut runs: Vec<Run<T>> = Vec::new();
        let mut id = offset;
        for value in values {
            match runs.last_mut() {
                Some(last) if last.value == value => last.stop += 1,
                _ => runs.push(Run::new(id, id + 1, value)),
            }
            id += 1;
        }
        runs
    }

    /// Merge `runs[idx]` and `runs[idx + 1]` if they hold the same value.
    fn merge_with_next(&mut self, idx: usize) -> bool {
        if idx + 1 >= self.runs.len() || self.runs[idx].value != self.runs[idx + 1].value {
            return false;
        }
        let next = self.runs.remove(idx + 1);
        self.runs[idx].stop = next.stop;
        true
    }

    /// Replace everything in `[start, stop)` with `span`, a coalesced run
    /// sequence covering exactly that slice.
    ///
    /// The first overlapped run keeps its head, the last keeps its tail, the
    /// interior is dropped, and the new span is merged with its neighbours.
    fn replace_span(&mut self, start: usize, stop: usize, span: Vec<Run<T>>) {
        let first = self.find_run(start);
        let last = self.find_run(stop - 1);
        let head = &self.runs[first];
        let tail = &self.runs[last];

        let mut replacement = Vec::with_capacity(span.len() + 2);
        if head.start < start {
            replacement.push(Run::new(head.start, start, head.value.clone()));
        }
        let inner_start = first + replacement.len();
        replacement.extend(span);
        let inner_end = first + replacement.len();
        if stop < tail.stop {
            replacement.push(Run::new(stop, tail.stop, tail.value.clone()));
        }
        let removed = last + 1 - first;
        self.runs.splice(first..=last, replacement);

        // Right boundary first so the left index stays valid.
        let mut merges = usize::from(self.merge_with_next(inner_end - 1));
        if inner_start > 0 {
            merges += usize::from(self.merge_with_next(inner_start - 1));
        }
        tracing::trace!(
            key = self.key.as_deref(),
            start,
            stop,
            removed,
            merges,
            runs = self.runs.len(),
            "replaced span"
        );
    }
}

impl<T: Value> Readable<T> for RangedList<T> {
    fn size(&self) -> usize {
        self.size
    }

    fn label(&self) -> Option<String> {
        self.key.clone()
    }

    fn get_value_by_id(&self, id: usize) -> Result<T> {
        let id = self.check_id(id)?;
        Ok(self.runs[self.find_run(id)].value.clone())
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<T> {
        let (start, stop) = self.check_slice(start, stop)?;
        if start == stop {
            return Err(Error::EmptySelection);
        }
        let first = self.find_run(start);
        let value = &self.runs[first].value;
        // Neighbouring runs never share a value.
        match self.runs.get(first + 1) {
            Some(next) if next.start < stop => {
                Err(Error::multiple_values(self.label(), value, &next.value))
            }
            _ => Ok(value.clone()),
        }
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<T> {
        let (&first_id, rest) = ids.split_first().ok_or(Error::EmptySelection)?;
        self.check_ids(ids)?;
        let value = &self.runs[self.find_run(first_id)].value;
        for &id in rest {
            let other = &self.runs[self.find_run(id)].value;
            if other != value {
                return Err(Error::multiple_values(self.label(), value, other));
            }
        }
        Ok(value.clone())
    }

    fn default_value(&self) -> Option<T> {
        self.default.clone()
    }
}

impl<T: Value> RangeIterable<T> for RangedList<T> {
    fn iter_ranges(&self) -> RunIter<'_, T> {
        Box::new(self.runs.iter().cloned())
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, T>> {
        let (start, stop) = self.check_slice(start, stop)?;
        let first = if start == stop {
            self.runs.len()
        } else {
            self.find_run(start)
        };
        Ok(Box::new(
            self.runs[first..]
                .iter()
                .take_while(move |run| run.start < stop)
                .map(move |run| Run::new(run.start.max(start), run.stop.min(stop), run.value.clone())),
        ))
    }

    fn count(&self, value: &T) -> usize {
        self.runs
            .iter()
            .filter(|run| run.value == *value)
            .map(Run::len)
            .sum()
    }
}

impl<T: Value> Writable<T> for RangedList<T> {
    fn set_value_by_id(&mut self, id: usize, value: T) -> Result<()> {
        let id = self.check_id(id)?;
        let idx = self.find_run(id);
        let run = &self.runs[idx];
        if run.value == value {
            return Ok(());
        }

        let (start, stop) = (run.start, run.stop);
        let old = run.value.clone();
        let mut pieces = Vec::with_capacity(3);
        if id > start {
            pieces.push(Run::new(start, id, old.clone()));
        }
        let at = idx + pieces.len();
        pieces.push(Run::new(id, id + 1, value));
        if id + 1 < stop {
            pieces.push(Run::new(id + 1, stop, old));
        }
        self.runs.splice(idx..=idx, pieces);

        self.merge_with_next(at);
        if at > 0 {
            self.merge_with_next(at - 1);
        }
        Ok(())
    }

    fn set_value_by_slice(&mut self, start: usize, stop: usize, value: T) -> Result<()> {
        let (start, stop) = self.check_slice(start, stop)?;
        if start == stop {
            return Ok(());
        }
        let first = self.find_run(start);
        let run = &self.runs[first];
        if run.value == value && run.stop >= stop {
            return Ok(());
        }
        self.replace_span(start, stop, vec![Run::new(start, stop, value)]);
        Ok(())
    }

    fn set_value(&mut self, value: T) {
        self.runs.clear();
        if self.size > 0 {
            self.runs.push(Run::new(0, self.size, value));
        }
    }
}

impl<T: Value> fmt::Display for RangedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, run) in self.runs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{run}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(list: &RangedList<&'static str>) -> Vec<(usize, usize, &'static str)> {
        list.runs().iter().map(|run| (run.start, run.stop, run.value)).collect()
    }

    #[test]
    fn test_set_value_by_id_splits_and_merges() {
        let mut list = RangedList::new(10, "a");
        list.set_value_by_id(4, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 4, "a"), (4, 5, "b"), (5, 10, "a")]);

        list.set_value_by_id(5, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 4, "a"), (4, 6, "b"), (6, 10, "a")]);

        list.set_value_by_id(4, "a").unwrap();
        list.set_value_by_id(5, "a").unwrap();
        assert_eq!(table(&list), vec![(0, 10, "a")]);
        assert!(list.check_invariants());
    }

    #[test]
    fn test_set_value_by_id_edges() {
        let mut list = RangedList::new(3, "a");
        list.set_value_by_id(0, "b").unwrap();
        list.set_value_by_id(2, "c").unwrap();
        assert_eq!(table(&list), vec![(0, 1, "b"), (1, 2, "a"), (2, 3, "c")]);
        list.set_value_by_id(1, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 2, "b"), (2, 3, "c")]);
        list.set_value_by_id(2, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 3, "b")]);
    }

    #[test]
    fn test_set_value_by_id_idempotent() {
        let mut list = RangedList::new(10, "a");
        list.set_value_by_slice(2, 6, "b").unwrap();
        let before = list.clone();
        let value = list.get_value_by_id(3).unwrap();
        list.set_value_by_id(3, value).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_set_value_by_slice() {
        let mut list = RangedList::new(10, "a");
        list.set_value_by_slice(3, 7, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 3, "a"), (3, 7, "b"), (7, 10, "a")]);

        list.set_value_by_slice(1, 3, "c").unwrap();
        assert_eq!(
            table(&list),
            vec![(0, 1, "a"), (1, 3, "c"), (3, 7, "b"), (7, 10, "a")]
        );

        list.set_value_by_slice(2, 8, "a").unwrap();
        assert_eq!(table(&list), vec![(0, 1, "a"), (1, 2, "c"), (2, 10, "a")]);

        list.set_value_by_slice(0, 10, "z").unwrap();
        assert_eq!(table(&list), vec![(0, 10, "z")]);
    }

    #[test]
    fn test_set_value_by_slice_inverted_and_bounds() {
        let mut list = RangedList::new(10, "a");
        list.set_value_by_slice(7, 3, "b").unwrap();
        assert_eq!(table(&list), vec![(0, 3, "a"), (3, 7, "b"), (7, 10, "a")]);

        let before = list.clone();
        assert_eq!(
            list.set_value_by_slice(5, 11, "c"),
            Err(Error::IndexOutOfRange { index: 11, size: 10 })
        );
        assert_eq!(list, before);

        list.set_value_by_slice(4, 4, "c").unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_get_value_by_slice_and_ids() {
        let mut list = RangedList::new(10, "a").with_key("k");
        list.set_value_by_slice(3, 7, "b").unwrap();

        assert_eq!(list.get_value_by_slice(3, 7).unwrap(), "b");
        assert_eq!(list.get_value_by_slice(0, 3).unwrap(), "a");
        assert_eq!(list.get_value_by_ids(&[0, 8, 1]).unwrap(), "a");

        let err = list.get_value_by_slice(2, 4).unwrap_err();
        assert_eq!(
            err,
            Error::MultipleValues {
                key: Some("k".to_string()),
                first: "\"a\"".to_string(),
                second: "\"b\"".to_string(),
            }
        );
        assert!(matches!(
            list.get_value_by_ids(&[3, 8]),
            Err(Error::MultipleValues { .. })
        ));
        assert_eq!(list.get_value_by_slice(5, 5), Err(Error::EmptySelection));
        assert_eq!(list.get_value_by_ids(&[]), Err(Error::EmptySelection));
    }

    #[test]
    fn test_get_value_by_id_out_of_range() {
        let list = RangedList::new(4, 1);
        assert_eq!(
            list.get_value_by_id(4),
            Err(Error::IndexOutOfRange { index: 4, size: 4 })
        );
    }

    #[test]
    fn test_set_value_by_ids_is_atomic() {
        let mut list = RangedList::new(5, 0);
        let before = list.clone();
        assert!(list.set_value_by_ids(&[1, 2, 9], 7).is_err());
        assert_eq!(list, before);

        list.set_value_by_ids(&[3, 1, 2], 7).unwrap();
        assert_eq!(list.get_ranges(), vec![Run::new(0, 1, 0), Run::new(1, 4, 7), Run::new(4, 5, 0)]);
    }

    #[test]
    fn test_from_values_coalesces() {
        let list = RangedList::from_values(vec![1, 1, 2, 2, 2, 1]);
        assert_eq!(list.size(), 6);
        assert_eq!(
            list.get_ranges(),
            vec![Run::new(0, 2, 1), Run::new(2, 5, 2), Run::new(5, 6, 1)]
        );
        assert_eq!(list.default_value(), None);
        assert_eq!(list.clone().reset(), Err(Error::NoDefault(None)));
    }

    #[test]
    fn test_set_values_by_slice() {
        let mut list = RangedList::new(8, 0);
        list.set_values_by_slice(2, 6, vec![0, 1, 1, 0]).unwrap();
        assert_eq!(
            list.get_ranges(),
            vec![Run::new(0, 3, 0), Run::new(3, 5, 1), Run::new(5, 8, 0)]
        );
        assert_eq!(
            list.set_values_by_slice(0, 3, vec![1, 2]),
            Err(Error::SizeMismatch { expected: 3, found: 2 })
        );
        assert!(list.check_invariants());
    }

    #[test]
    fn test_iter_ranges_by_slice_clips() {
        let mut list = RangedList::new(10, 'a');
        list.set_value_by_slice(3, 7, 'b').unwrap();
        let got: Vec<_> = list.iter_ranges_by_slice(2, 5).unwrap().collect();
        assert_eq!(got, vec![Run::new(2, 3, 'a'), Run::new(3, 5, 'b')]);
        assert_eq!(list.iter_ranges_by_slice(4, 4).unwrap().count(), 0);
        let values: String = list.iter_by_slice(1, 9).unwrap().collect();
        assert_eq!(values, "aabbbbaa");
    }

    #[test]
    fn test_count_index_contains_reset() {
        let mut list = RangedList::new(10, 'a');
        list.set_value_by_slice(3, 7, 'b').unwrap();
        assert_eq!(list.count(&'b'), 4);
        assert_eq!(list.count(&'a'), 6);
        assert_eq!(list.index(&'b'), Some(3));
        assert_eq!(list.index(&'z'), None);
        assert!(list.contains(&'a'));

        list.reset().unwrap();
        assert_eq!(list.get_ranges(), vec![Run::new(0, 10, 'a')]);
    }

    #[test]
    fn test_empty_list() {
        let mut list = RangedList::new(0, 'a');
        assert!(list.check_invariants());
        assert_eq!(list.iter_ranges().count(), 0);
        assert!(list.get_value_by_id(0).is_err());
        list.set_value('b');
        assert!(list.check_invariants());
    }

    #[test]
    fn test_display() {
        let mut list = RangedList::new(4, 1);
        list.set_value_by_id(3, 2).unwrap();
        assert_eq!(list.to_string(), "[[0, 3) = 1, [3, 4) = 2]");
    }
}
