//! A fixed-size dictionary of range lists, one per key.
//!
//! Every key maps to a [`RangedList`] of the same size $N$. Ids are shared
//! across keys, so a [`RangeDictionary`] reads like $N$ records with one
//! field per key, stored column by column.
//!
//! Lists live in `RefCell`s: value writes take `&self`, so any number of
//! views over the same dictionary can exist at once and each sees the
//! others' writes immediately. Adding or replacing a whole key takes
//! `&mut self`, which the borrow checker rules out while views are alive.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::iter::{
    IdSource, RunsByIds, UpdateSafeIter, UpdateSafeMaps, ValueIter, ValueMapIter, Values,
};
use crate::ranged_list::RangedList;
use crate::run::Run;
use crate::selector::{Selector, Subscript};
use crate::traits::{RangeIterable, Readable, RunIter, Value, Writable};
use crate::view::{Lookup, View};

/// Values of several keys, in dictionary key order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> ValueMap<T> {
    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, value)| value)
    }

    /// Keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(key, value)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ValueMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for ValueMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }
}

impl<T> IntoIterator for ValueMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: fmt::Debug> fmt::Display for ValueMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value:?}")?;
        }
        f.write_str("}")
    }
}

/// Merge per-key run tables that cover the same sequence of ids.
///
/// Each table is read as a sequence of positions (run lengths laid end to
/// end); output runs break wherever any key's run breaks, so each one is
/// homogeneous across every key. Ids are recovered from the first key's
/// runs, which makes the merge work for slices and id lists alike.
fn merge_key_runs<T: Value>(names: &[String], tables: &[Vec<Run<T>>]) -> Vec<Run<ValueMap<T>>> {
    let Some(lead) = tables.first() else {
        return Vec::new();
    };
    let total: usize = lead.iter().map(Run::len).sum();
    // (run index, position where that run starts) per key
    let mut cursors = vec![(0usize, 0usize); tables.len()];
    let mut merged = Vec::new();
    let mut pos = 0;
    while pos < total {
        let end = tables
            .iter()
            .zip(&cursors)
            .map(|(table, &(idx, run_pos))| run_pos + table[idx].len())
            .min()
            .unwrap_or(total);
        let (idx, run_pos) = cursors[0];
        let start = lead[idx].start + (pos - run_pos);
        let values = names
            .iter()
            .zip(tables.iter().zip(&cursors))
            .map(|(name, (table, &(idx, _)))| (name.clone(), table[idx].value.clone()))
            .collect();
        merged.push(Run::new(start, start + (end - pos), values));

        for (table, cursor) in tables.iter().zip(cursors.iter_mut()) {
            if cursor.1 + table[cursor.0].len() == end {
                *cursor = (cursor.0 + 1, end);
            }
        }
        pos = end;
    }
    merged
}

/// A fixed-size mapping from key name to [`RangedList`].
#[derive(Debug, Clone)]
pub struct RangeDictionary<T> {
    size: usize,
    names: Vec<String>,
    lists: Vec<RefCell<RangedList<T>>>,
    index: FxHashMap<String, usize>,
}

impl<T: Value> RangeDictionary<T> {
    /// Create a dictionary of `size` ids with no keys.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            names: Vec::new(),
            lists: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create a dictionary with one list per `(key, default)` pair, each
    /// initialised to its default.
    pub fn with_defaults<K, I>(size: usize, defaults: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, T)>,
    {
        let mut dict = Self::new(size);
        for (key, value) in defaults {
            dict.insert(key, value);
        }
        dict
    }

    /// Fixed number of ids.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Return true if the dictionary has no keys.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every id, ascending.
    pub fn ids(&self) -> Range<usize> {
        0..self.size
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Return true if `key` is present.
    pub fn has_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Create `key` with every id set to `value` (also its default), or set
    /// every id of an existing key to `value`, keeping its default.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            self.lists[idx].get_mut().set_value(value);
            return;
        }
        let list = RangedList::new(self.size, value).with_key(key.clone());
        self.push_list(key, list);
    }

    /// Add `list` under `key`, replacing any list already there.
    pub fn insert_list(&mut self, key: impl Into<String>, mut list: RangedList<T>) -> Result<()> {
        if list.size() != self.size {
            return Err(Error::SizeMismatch {
                expected: self.size,
                found: list.size(),
            });
        }
        let key = key.into();
        list.set_key(key.clone());
        if let Some(&idx) = self.index.get(&key) {
            tracing::debug!(key = %key, runs = list.num_runs(), "replaced list");
            self.lists[idx] = RefCell::new(list);
            return Ok(());
        }
        self.push_list(key, list);
        Ok(())
    }

    fn push_list(&mut self, key: String, list: RangedList<T>) {
        tracing::debug!(key = %key, size = self.size, runs = list.num_runs(), "added key");
        self.index.insert(key.clone(), self.names.len());
        self.names.push(key);
        self.lists.push(RefCell::new(list));
    }

    /// Names picked by a key selection; `None` picks every key, in order.
    fn key_names(&self, keys: Option<&[&str]>) -> Result<Vec<String>> {
        let Some(keys) = keys else {
            return Ok(self.names.clone());
        };
        keys.iter()
            .map(|&key| {
                if self.has_key(key) {
                    Ok(key.to_string())
                } else {
                    Err(Error::KeyNotFound(key.to_string()))
                }
            })
            .collect()
    }

    fn check_slice(&self, start: usize, stop: usize) -> Result<(usize, usize)> {
        let (start, stop) = if start > stop {
            (stop, start)
        } else {
            (start, stop)
        };
        if stop > self.size {
            return Err(Error::IndexOutOfRange {
                index: stop,
                size: self.size,
            });
        }
        Ok((start, stop))
    }

    fn check_ids(&self, ids: &[usize]) -> Result<()> {
        match ids.iter().find(|&&id| id >= self.size) {
            Some(&id) => Err(Error::IndexOutOfRange {
                index: id,
                size: self.size,
            }),
            None => Ok(()),
        }
    }

    /// Make this dictionary's lists copies of `other`'s.
    ///
    /// Keys in both keep their own default and take `other`'s table. Keys
    /// only in `other` are added as copies. Keys only here are left alone.
    pub fn copy_into(&mut self, other: &RangeDictionary<T>) -> Result<()> {
        if other.size != self.size {
            return Err(Error::SizeMismatch {
                expected: self.size,
                found: other.size,
            });
        }
        for key in other.keys() {
            let source = other.list(key)?;
            let existing = self.index.get(key).copied();
            match existing {
                Some(idx) => self.lists[idx].get_mut().copy_from(&source)?,
                None => self.push_list(key.to_string(), source.clone()),
            }
        }
        Ok(())
    }

    /// The shared cell holding the list for `key`.
    pub fn cell(&self, key: &str) -> Result<&RefCell<RangedList<T>>> {
        self.index
            .get(key)
            .map(|&idx| &self.lists[idx])
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Borrow the list for `key`.
    pub fn list(&self, key: &str) -> Result<Ref<'_, RangedList<T>>> {
        self.cell(key)?
            .try_borrow()
            .map_err(|_| Error::Borrowed(Some(key.to_string())))
    }

    /// Mutably borrow the list for `key`.
    pub fn list_mut(&self, key: &str) -> Result<RefMut<'_, RangedList<T>>> {
        self.cell(key)?
            .try_borrow_mut()
            .map_err(|_| Error::Borrowed(Some(key.to_string())))
    }

    /// Single value of `key` across every id.
    pub fn get_value(&self, key: &str) -> Result<T> {
        self.list(key)?.get_value()
    }

    /// Single value of every key across every id.
    pub fn get_values(&self) -> Result<ValueMap<T>> {
        self.names
            .iter()
            .map(|key| self.get_value(key).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Single value of every key across every id, in key order.
    pub fn values(&self) -> Result<Vec<T>> {
        Ok(self.get_values()?.into_iter().map(|(_, value)| value).collect())
    }

    /// `(key, value)` pairs, where each value must be uniform across ids.
    pub fn items(&self) -> Result<Vec<(String, T)>> {
        Ok(self.get_values()?.into_iter().collect())
    }

    /// Value of `key` at `id`.
    pub fn get_value_by_id(&self, key: &str, id: usize) -> Result<T> {
        self.list(key)?.get_value_by_id(id)
    }

    /// Value of every key at `id`.
    pub fn get_values_by_id(&self, id: usize) -> Result<ValueMap<T>> {
        self.get_key_values_by_id(&self.names, id)
    }

    pub(crate) fn get_key_values_by_id(&self, keys: &[String], id: usize) -> Result<ValueMap<T>> {
        keys.iter()
            .map(|key| self.get_value_by_id(key, id).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Single value of `key` over `[start, stop)`.
    pub fn get_value_by_slice(&self, key: &str, start: usize, stop: usize) -> Result<T> {
        self.list(key)?.get_value_by_slice(start, stop)
    }

    /// Single value of `key` over `ids`.
    pub fn get_value_by_ids(&self, key: &str, ids: &[usize]) -> Result<T> {
        self.list(key)?.get_value_by_ids(ids)
    }

    /// Set every id of an existing key.
    pub fn set_value(&self, key: &str, value: T) -> Result<()> {
        self.list_mut(key)?.set_value(value);
        Ok(())
    }

    /// Set `key` at `id`.
    pub fn set_value_by_id(&self, key: &str, id: usize, value: T) -> Result<()> {
        self.list_mut(key)?.set_value_by_id(id, value)
    }

    /// Set `key` over `[start, stop)`.
    pub fn set_value_by_slice(&self, key: &str, start: usize, stop: usize, value: T) -> Result<()> {
        self.list_mut(key)?.set_value_by_slice(start, stop, value)
    }

    /// Set `key` at every id in `ids`.
    pub fn set_value_by_ids(&self, key: &str, ids: &[usize], value: T) -> Result<()> {
        self.list_mut(key)?.set_value_by_ids(ids, value)
    }

    /// Register (or clear) the default of `key`.
    pub fn set_default(&self, key: &str, default: Option<T>) -> Result<()> {
        self.list_mut(key)?.set_default(default);
        Ok(())
    }

    /// The default registered for `key`.
    pub fn get_default(&self, key: &str) -> Result<Option<T>> {
        Ok(self.list(key)?.default_value())
    }

    /// Restore every id of `key` to its default.
    pub fn reset(&self, key: &str) -> Result<()> {
        self.list_mut(key)?.reset()
    }

    /// Values of `key`, one per id.
    ///
    /// The fast form snapshots the range table now; the update-safe form
    /// looks each id up when it is reached.
    pub fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>> {
        self.iter_source(key, IdSource::Range(0..self.size), update_safe)
    }

    /// Values of `key` over `[start, stop)`.
    pub fn iter_values_by_slice(
        &self,
        key: &str,
        start: usize,
        stop: usize,
        update_safe: bool,
    ) -> Result<ValueIter<'_, T>> {
        let (start, stop) = self.list(key)?.check_slice(start, stop)?;
        self.iter_source(key, IdSource::Range(start..stop), update_safe)
    }

    /// Values of `key` at `ids`, in the order given.
    pub fn iter_values_by_ids(
        &self,
        key: &str,
        ids: &[usize],
        update_safe: bool,
    ) -> Result<ValueIter<'_, T>> {
        self.list(key)?.check_ids(ids)?;
        self.iter_source(key, IdSource::Ids(ids.to_vec().into_iter()), update_safe)
    }

    fn iter_source(&self, key: &str, ids: IdSource, update_safe: bool) -> Result<ValueIter<'_, T>> {
        if update_safe {
            return Ok(ValueIter::UpdateSafe(UpdateSafeIter::new(self.cell(key)?, ids)));
        }
        let list = self.list(key)?;
        let runs: Vec<Run<T>> = match ids {
            IdSource::Range(range) => list.iter_ranges_by_slice(range.start, range.end)?.collect(),
            IdSource::Ids(ids) => RunsByIds::new(list.runs().to_vec(), ids.collect()).collect(),
        };
        let runs: RunIter<'_, T> = Box::new(runs.into_iter());
        Ok(ValueIter::Fast(Values::new(runs)))
    }

    /// Values of `keys` (every key for `None`), one map per id.
    ///
    /// The fast form merges the key tables now; the update-safe form looks
    /// every key up when each id is reached.
    pub fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        self.iter_maps_source(keys, IdSource::Range(0..self.size), update_safe)
    }

    /// Values of `keys` over `[start, stop)`, one map per id.
    pub fn iter_value_maps_by_slice(
        &self,
        keys: Option<&[&str]>,
        start: usize,
        stop: usize,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        let (start, stop) = self.check_slice(start, stop)?;
        self.iter_maps_source(keys, IdSource::Range(start..stop), update_safe)
    }

    /// Values of `keys` at `ids`, one map per id in the order given.
    pub fn iter_value_maps_by_ids(
        &self,
        keys: Option<&[&str]>,
        ids: &[usize],
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        self.check_ids(ids)?;
        self.iter_maps_source(keys, IdSource::Ids(ids.to_vec().into_iter()), update_safe)
    }

    fn iter_maps_source(
        &self,
        keys: Option<&[&str]>,
        ids: IdSource,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        let names = self.key_names(keys)?;
        if update_safe {
            return Ok(ValueMapIter::UpdateSafe(UpdateSafeMaps::new(self, names, ids)));
        }
        let merged = if names.is_empty() {
            // No table to merge: one empty map per id.
            vec![Run::new(0, ids.len(), ValueMap::default())]
        } else {
            match ids {
                IdSource::Range(range) => self.merge_by_slice(&names, range.start, range.end)?,
                IdSource::Ids(ids) => self.merge_by_ids(&names, ids.as_slice())?,
            }
        };
        Ok(ValueMapIter::Fast(Values::new(merged.into_iter())))
    }

    /// Range table of one key.
    pub fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>> {
        Ok(self.list(key)?.get_ranges())
    }

    /// Range table of one key over `[start, stop)`.
    pub fn get_key_ranges_by_slice(&self, key: &str, start: usize, stop: usize) -> Result<Vec<Run<T>>> {
        Ok(self.list(key)?.iter_ranges_by_slice(start, stop)?.collect())
    }

    /// Range table of one key over `ids`.
    pub fn get_key_ranges_by_ids(&self, key: &str, ids: &[usize]) -> Result<Vec<Run<T>>> {
        Ok(self.list(key)?.iter_ranges_by_ids(ids)?.collect())
    }

    /// Runs homogeneous across every key, covering all ids.
    pub fn get_all_ranges(&self) -> Result<Vec<Run<ValueMap<T>>>> {
        self.get_merged_ranges(None)
    }

    /// Runs homogeneous across `keys` (every key for `None`), covering all
    /// ids.
    pub fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>> {
        self.get_ranges_by_slice(keys, 0, self.size)
    }

    /// Runs homogeneous across `keys`, covering `[start, stop)`.
    pub fn get_ranges_by_slice(
        &self,
        keys: Option<&[&str]>,
        start: usize,
        stop: usize,
    ) -> Result<Vec<Run<ValueMap<T>>>> {
        self.merge_by_slice(&self.key_names(keys)?, start, stop)
    }

    /// Runs homogeneous across `keys`, covering `ids` in order.
    pub fn get_ranges_by_ids(
        &self,
        keys: Option<&[&str]>,
        ids: &[usize],
    ) -> Result<Vec<Run<ValueMap<T>>>> {
        self.merge_by_ids(&self.key_names(keys)?, ids)
    }

    fn merge_by_slice(
        &self,
        names: &[String],
        start: usize,
        stop: usize,
    ) -> Result<Vec<Run<ValueMap<T>>>> {
        let tables = names
            .iter()
            .map(|key| self.get_key_ranges_by_slice(key, start, stop))
            .collect::<Result<Vec<_>>>()?;
        Ok(merge_key_runs(names, &tables))
    }

    fn merge_by_ids(&self, names: &[String], ids: &[usize]) -> Result<Vec<Run<ValueMap<T>>>> {
        let tables = names
            .iter()
            .map(|key| self.get_key_ranges_by_ids(key, ids))
            .collect::<Result<Vec<_>>>()?;
        Ok(merge_key_runs(names, &tables))
    }

    /// Build the narrowest view over the ids picked by `selector`.
    pub fn view_factory(&self, selector: impl Into<Selector>) -> Result<View<'_, T>> {
        let ids = selector.into().normalize(self.size)?;
        Ok(View::new(self, ids))
    }

    /// Subscript read: a key yields its list cell, a selector yields a view.
    pub fn lookup<'a>(&'a self, subscript: impl Into<Subscript<'a>>) -> Result<Lookup<'a, T>> {
        match subscript.into() {
            Subscript::Name(key) => Ok(Lookup::List(self.cell(key)?)),
            Subscript::Select(selector) => Ok(Lookup::View(self.view_factory(selector)?)),
        }
    }

    /// Subscript write: a key is created or overwritten with `value`.
    ///
    /// Selector subscripts are rejected; write through a view instead.
    pub fn assign<'a>(&mut self, subscript: impl Into<Subscript<'a>>, value: T) -> Result<()> {
        match subscript.into() {
            Subscript::Name(key) => {
                self.insert(key, value);
                Ok(())
            }
            Subscript::Select(selector) => Err(Error::UnsupportedSelector(format!(
                "cannot assign through {selector:?}; create a view first"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::DictView;

    fn runs(table: &[(usize, usize, &'static str)]) -> Vec<Run<&'static str>> {
        table.iter().map(|&run| Run::from(run)).collect()
    }

    fn sample() -> RangeDictionary<&'static str> {
        RangeDictionary::with_defaults(10, [("a", "alpha"), ("b", "bravo")])
    }

    #[test]
    fn test_with_defaults_and_keys() {
        let dict = sample();
        assert_eq!(dict.size(), 10);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(dict.has_key("a"));
        assert!(!dict.has_key("c"));
        assert_eq!(dict.get_value("a").unwrap(), "alpha");
        assert_eq!(dict.get_default("b").unwrap(), Some("bravo"));
        assert_eq!(dict.get_value("c"), Err(Error::KeyNotFound("c".to_string())));
    }

    #[test]
    fn test_insert_existing_key_keeps_default() {
        let mut dict = sample();
        dict.insert("a", "other");
        assert_eq!(dict.get_value("a").unwrap(), "other");
        assert_eq!(dict.get_default("a").unwrap(), Some("alpha"));
        dict.reset("a").unwrap();
        assert_eq!(dict.get_value("a").unwrap(), "alpha");
    }

    #[test]
    fn test_insert_list_checks_size() {
        let mut dict = sample();
        assert_eq!(
            dict.insert_list("c", RangedList::new(4, "x")),
            Err(Error::SizeMismatch { expected: 10, found: 4 })
        );
        let list = RangedList::from_values(["x", "x", "y", "y", "y", "x", "x", "x", "x", "x"]);
        dict.insert_list("c", list).unwrap();
        assert_eq!(dict.list("c").unwrap().key(), Some("c"));
        assert_eq!(
            dict.get_ranges("c").unwrap(),
            runs(&[(0, 2, "x"), (2, 5, "y"), (5, 10, "x")])
        );
        assert_eq!(dict.reset("c"), Err(Error::NoDefault(Some("c".to_string()))));
    }

    #[test]
    fn test_get_value_reports_key() {
        let dict = sample();
        dict.set_value_by_id("a", 3, "x").unwrap();
        assert_eq!(
            dict.get_value("a"),
            Err(Error::MultipleValues {
                key: Some("a".to_string()),
                first: "\"alpha\"".to_string(),
                second: "\"x\"".to_string(),
            })
        );
        assert_eq!(dict.get_values_by_id(3).unwrap().get("a"), Some(&"x"));
    }

    #[test]
    fn test_all_ranges_intersects_boundaries() {
        let dict = sample();
        dict.set_value_by_slice("a", 2, 6, "x").unwrap();
        dict.set_value_by_slice("b", 4, 8, "y").unwrap();
        let merged = dict.get_all_ranges().unwrap();
        let bounds: Vec<_> = merged.iter().map(|run| (run.start, run.stop)).collect();
        assert_eq!(bounds, vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 10)]);
        assert_eq!(merged[2].value.get("a"), Some(&"x"));
        assert_eq!(merged[2].value.get("b"), Some(&"y"));
        assert_eq!(merged[4].value.get("b"), Some(&"bravo"));
    }

    #[test]
    fn test_ranges_by_ids_follow_id_order() {
        let dict = sample();
        dict.set_value_by_slice("a", 4, 6, "x").unwrap();
        let merged = dict.get_ranges_by_ids(None, &[5, 6, 7, 2, 3]).unwrap();
        let table: Vec<_> = merged
            .iter()
            .map(|run| (run.start, run.stop, *run.value.get("a").unwrap()))
            .collect();
        assert_eq!(table, vec![(5, 6, "x"), (6, 8, "alpha"), (2, 4, "alpha")]);
    }

    #[test]
    fn test_empty_dictionary_ranges() {
        let dict: RangeDictionary<i32> = RangeDictionary::new(5);
        assert!(dict.get_all_ranges().unwrap().is_empty());
        assert!(dict.get_values().unwrap().is_empty());
    }

    #[test]
    fn test_iter_all_values_fast_and_update_safe() {
        let dict = RangeDictionary::with_defaults(4, [("n", 0)]);
        let fast = dict.iter_all_values("n", false).unwrap();
        let mut safe = dict.iter_all_values("n", true).unwrap();
        assert_eq!(safe.next(), Some(Ok(0)));
        dict.set_value_by_slice("n", 1, 4, 7).unwrap();
        assert_eq!(fast.collect::<Result<Vec<_>>>().unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(safe.collect::<Result<Vec<_>>>().unwrap(), vec![7, 7, 7]);

        let by_ids = dict.iter_values_by_ids("n", &[3, 0], false).unwrap();
        assert_eq!(by_ids.collect::<Result<Vec<_>>>().unwrap(), vec![7, 0]);
        let by_slice = dict.iter_values_by_slice("n", 0, 2, true).unwrap();
        assert_eq!(by_slice.collect::<Result<Vec<_>>>().unwrap(), vec![0, 7]);
    }

    #[test]
    fn test_update_safe_iteration_reports_borrow_conflict() {
        let dict = RangeDictionary::with_defaults(5, [("n", 3)]);
        let values = dict.iter_all_values("n", true).unwrap();
        let _held = dict.list_mut("n").unwrap();
        let got: Vec<_> = values.collect();
        assert_eq!(got.len(), 5);
        assert!(got.iter().all(|value| *value == Err(Error::Borrowed(None))));
    }

    #[test]
    fn test_value_maps_skip_empty_key_set() {
        let dict = sample();
        let maps: Vec<_> = dict
            .iter_value_maps_by_slice(Some(&[][..]), 1, 4, false)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(maps, vec![ValueMap::default(); 3]);
        assert_eq!(
            dict.iter_all_value_maps(Some(&["a", "zz"][..]), false).err(),
            Some(Error::KeyNotFound("zz".to_string()))
        );
    }

    #[test]
    fn test_copy_into_replaces_tables() {
        let mut target = sample();
        target.set_default("a", Some("keep")).unwrap();
        let source = RangeDictionary::with_defaults(10, [("a", "new"), ("c", "charlie")]);
        source.set_value_by_id("a", 2, "two").unwrap();
        target.copy_into(&source).unwrap();

        assert_eq!(target.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(target.get_ranges("a").unwrap(), source.get_ranges("a").unwrap());
        assert_eq!(target.get_default("a").unwrap(), Some("keep"));
        assert_eq!(target.get_value("b").unwrap(), "bravo");
        assert_eq!(target.get_value("c").unwrap(), "charlie");

        source.set_value("c", "changed").unwrap();
        assert_eq!(target.get_value("c").unwrap(), "charlie");
        assert_eq!(
            target.copy_into(&RangeDictionary::new(4)),
            Err(Error::SizeMismatch { expected: 10, found: 4 })
        );
    }

    #[test]
    fn test_borrow_conflict_is_an_error() {
        let dict = sample();
        let _held = dict.list_mut("a").unwrap();
        assert_eq!(dict.get_value("a"), Err(Error::Borrowed(Some("a".to_string()))));
        assert_eq!(dict.get_value("b").unwrap(), "bravo");
    }

    #[test]
    fn test_assign_and_lookup() {
        let mut dict = sample();
        dict.assign("c", "charlie").unwrap();
        assert!(dict.has_key("c"));
        assert!(matches!(
            dict.assign(3usize, "x"),
            Err(Error::UnsupportedSelector(_))
        ));
        match dict.lookup("c").unwrap() {
            Lookup::List(cell) => assert_eq!(cell.borrow().get_value().unwrap(), "charlie"),
            _ => panic!("expected a list"),
        }
        match dict.lookup(2..5).unwrap() {
            Lookup::View(view) => assert_eq!(view.ids(), vec![2, 3, 4]),
            _ => panic!("expected a view"),
        }
    }

    #[test]
    fn test_clone_is_deep() {
        let dict = sample();
        let copy = dict.clone();
        dict.set_value("a", "changed").unwrap();
        assert_eq!(copy.get_value("a").unwrap(), "alpha");
    }
}
