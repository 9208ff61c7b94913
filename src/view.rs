//! Views: non-owning restrictions of a dictionary to some of its ids.
//!
//! A view stores a shared reference to its [`RangeDictionary`] and a
//! description of the ids it covers. It owns no values: every read and write
//! goes straight to the dictionary's lists, so a write through one view is
//! visible through every other view and through the dictionary itself.
//!
//! Three shapes cover every selection:
//!
//! - [`SingleView`]: one id, answered with point lookups.
//! - [`SliceView`]: an ascending gapless span, answered with slice lookups.
//! - [`IdsView`]: any other id sequence, order and repeats preserved.
//!
//! [`View`] wraps the three behind one type; [`RangeDictionary::view_factory`]
//! picks the narrowest shape for a selector.

use std::cell::RefCell;
use std::fmt;

use crate::dictionary::{RangeDictionary, ValueMap};
use crate::error::{Error, Result};
use crate::iter::{ValueIter, ValueMapIter};
use crate::ranged_list::RangedList;
use crate::run::Run;
use crate::selector::{IdSet, Selector, Subscript};
use crate::traits::Value;

/// Result of a subscript read on a dictionary or a view.
pub enum Lookup<'a, T> {
    /// A dictionary key: the shared list itself.
    List(&'a RefCell<RangedList<T>>),
    /// A view key: the single value of that key over the view's ids.
    Value(T),
    /// A selector: a narrower view.
    View(View<'a, T>),
}

/// Dictionary-like access restricted to a subset of ids.
pub trait DictView<T: Value> {
    /// The dictionary this view reads and writes.
    fn dict(&self) -> &RangeDictionary<T>;

    /// Ids covered, in view order.
    fn ids(&self) -> Vec<usize>;

    /// Single value of `key` over the view's ids.
    fn get_value(&self, key: &str) -> Result<T>;

    /// Set `key` at every id of the view.
    fn set_value(&self, key: &str, value: T) -> Result<()>;

    /// Values of `key`, one per id of the view.
    fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>>;

    /// Range table of `key` restricted to the view.
    fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>>;

    /// Values of `keys` (every key for `None`), one map per id of the view.
    fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>>;

    /// Runs homogeneous across `keys` (every key for `None`), restricted to
    /// the view.
    fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>>;

    /// Runs homogeneous across every key, restricted to the view.
    fn get_all_ranges(&self) -> Result<Vec<Run<ValueMap<T>>>> {
        self.get_merged_ranges(None)
    }

    /// Keys of the underlying dictionary.
    fn keys(&self) -> Vec<String> {
        self.dict().keys().map(str::to_string).collect()
    }

    /// Return true if the dictionary has `key`.
    fn has_key(&self, key: &str) -> bool {
        self.dict().has_key(key)
    }

    /// Single value of every key over the view's ids.
    fn get_values(&self) -> Result<ValueMap<T>> {
        self.dict()
            .keys()
            .map(|key| self.get_value(key).map(|value| (key, value)))
            .collect()
    }

    /// Single value of every key over the view's ids, in key order.
    fn values(&self) -> Result<Vec<T>> {
        Ok(self.get_values()?.into_iter().map(|(_, value)| value).collect())
    }

    /// `(key, value)` pairs over the view's ids.
    fn items(&self) -> Result<Vec<(String, T)>> {
        Ok(self.get_values()?.into_iter().collect())
    }

    /// The default registered for `key`.
    fn get_default(&self, key: &str) -> Result<Option<T>> {
        self.dict().get_default(key)
    }

    /// Restore `key` to its default on the view's ids only.
    fn reset(&self, key: &str) -> Result<()> {
        let default = self
            .get_default(key)?
            .ok_or_else(|| Error::NoDefault(Some(key.to_string())))?;
        self.set_value(key, default)
    }
}

/// A view over exactly one id.
#[derive(Debug, Clone, Copy)]
pub struct SingleView<'a, T> {
    dict: &'a RangeDictionary<T>,
    id: usize,
}

impl<'a, T: Value> SingleView<'a, T> {
    /// The view over `id`. The id must be in range.
    pub fn new(dict: &'a RangeDictionary<T>, id: usize) -> Self {
        Self { dict, id }
    }

    /// The covered id.
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T: Value> DictView<T> for SingleView<'_, T> {
    fn dict(&self) -> &RangeDictionary<T> {
        self.dict
    }

    fn ids(&self) -> Vec<usize> {
        vec![self.id]
    }

    fn get_value(&self, key: &str) -> Result<T> {
        self.dict.get_value_by_id(key, self.id)
    }

    fn set_value(&self, key: &str, value: T) -> Result<()> {
        self.dict.set_value_by_id(key, self.id, value)
    }

    fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>> {
        self.dict
            .iter_values_by_slice(key, self.id, self.id + 1, update_safe)
    }

    fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>> {
        self.dict.get_key_ranges_by_slice(key, self.id, self.id + 1)
    }

    fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        self.dict
            .iter_value_maps_by_slice(keys, self.id, self.id + 1, update_safe)
    }

    fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>> {
        self.dict.get_ranges_by_slice(keys, self.id, self.id + 1)
    }
}

/// A view over the ascending ids `[start, stop)`.
#[derive(Debug, Clone, Copy)]
pub struct SliceView<'a, T> {
    dict: &'a RangeDictionary<T>,
    start: usize,
    stop: usize,
}

impl<'a, T: Value> SliceView<'a, T> {
    /// The view over `[start, stop)`. Bounds must be in range.
    pub fn new(dict: &'a RangeDictionary<T>, start: usize, stop: usize) -> Self {
        Self { dict, start, stop }
    }

    /// First covered id.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last covered id.
    pub fn stop(&self) -> usize {
        self.stop
    }
}

impl<T: Value> DictView<T> for SliceView<'_, T> {
    fn dict(&self) -> &RangeDictionary<T> {
        self.dict
    }

    fn ids(&self) -> Vec<usize> {
        (self.start..self.stop).collect()
    }

    fn get_value(&self, key: &str) -> Result<T> {
        self.dict.get_value_by_slice(key, self.start, self.stop)
    }

    fn set_value(&self, key: &str, value: T) -> Result<()> {
        self.dict.set_value_by_slice(key, self.start, self.stop, value)
    }

    fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>> {
        self.dict
            .iter_values_by_slice(key, self.start, self.stop, update_safe)
    }

    fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>> {
        self.dict.get_key_ranges_by_slice(key, self.start, self.stop)
    }

    fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        self.dict
            .iter_value_maps_by_slice(keys, self.start, self.stop, update_safe)
    }

    fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>> {
        self.dict.get_ranges_by_slice(keys, self.start, self.stop)
    }
}

/// A view over an arbitrary id sequence.
#[derive(Debug, Clone)]
pub struct IdsView<'a, T> {
    dict: &'a RangeDictionary<T>,
    ids: Vec<usize>,
}

impl<'a, T: Value> IdsView<'a, T> {
    /// The view over `ids`, kept in the order given. Ids must be in range.
    pub fn new(dict: &'a RangeDictionary<T>, ids: Vec<usize>) -> Self {
        Self { dict, ids }
    }
}

impl<T: Value> DictView<T> for IdsView<'_, T> {
    fn dict(&self) -> &RangeDictionary<T> {
        self.dict
    }

    fn ids(&self) -> Vec<usize> {
        self.ids.clone()
    }

    fn get_value(&self, key: &str) -> Result<T> {
        self.dict.get_value_by_ids(key, &self.ids)
    }

    fn set_value(&self, key: &str, value: T) -> Result<()> {
        self.dict.set_value_by_ids(key, &self.ids, value)
    }

    fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>> {
        self.dict.iter_values_by_ids(key, &self.ids, update_safe)
    }

    fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>> {
        self.dict.get_key_ranges_by_ids(key, &self.ids)
    }

    fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        self.dict.iter_value_maps_by_ids(keys, &self.ids, update_safe)
    }

    fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>> {
        self.dict.get_ranges_by_ids(keys, &self.ids)
    }
}

/// Any of the three view shapes.
#[derive(Debug, Clone)]
pub enum View<'a, T> {
    /// One id.
    Single(SingleView<'a, T>),
    /// A gapless ascending span.
    Slice(SliceView<'a, T>),
    /// Any other id sequence.
    Ids(IdsView<'a, T>),
}

macro_rules! delegate {
    ($self:ident, $view:ident => $body:expr) => {
        match $self {
            View::Single($view) => $body,
            View::Slice($view) => $body,
            View::Ids($view) => $body,
        }
    };
}

impl<'a, T: Value> View<'a, T> {
    /// The view shape matching an already normalized selection.
    pub fn new(dict: &'a RangeDictionary<T>, ids: IdSet) -> Self {
        match ids {
            IdSet::Index(id) => View::Single(SingleView::new(dict, id)),
            IdSet::Range { start, stop } => View::Slice(SliceView::new(dict, start, stop)),
            IdSet::Ids(ids) => View::Ids(IdsView::new(dict, ids)),
        }
    }

    /// A narrower view. The selector indexes this view's ids, not the
    /// dictionary's: on a view of ids `[2, 3, 4, 5]`, index 2 is id 4.
    pub fn subview(&self, selector: impl Into<Selector>) -> Result<View<'a, T>> {
        let outer = self.ids();
        let inner = selector.into().normalize(outer.len())?;
        Ok(View::new(self.dict_ref(), inner.relative_to(&outer)))
    }

    fn dict_ref(&self) -> &'a RangeDictionary<T> {
        delegate!(self, view => view.dict)
    }

    /// Subscript read: a key yields its single value over the view, a
    /// selector yields a nested view.
    pub fn lookup<'k>(&self, subscript: impl Into<Subscript<'k>>) -> Result<Lookup<'a, T>> {
        match subscript.into() {
            Subscript::Name(key) => Ok(Lookup::Value(self.get_value(key)?)),
            Subscript::Select(selector) => Ok(Lookup::View(self.subview(selector)?)),
        }
    }

    /// Subscript write: only key subscripts are accepted.
    pub fn assign<'k>(&self, subscript: impl Into<Subscript<'k>>, value: T) -> Result<()> {
        match subscript.into() {
            Subscript::Name(key) => self.set_value(key, value),
            Subscript::Select(selector) => Err(Error::UnsupportedSelector(format!(
                "views accept only key subscripts for assignment, got {selector:?}"
            ))),
        }
    }
}

impl<T: Value> DictView<T> for View<'_, T> {
    fn dict(&self) -> &RangeDictionary<T> {
        self.dict_ref()
    }

    fn ids(&self) -> Vec<usize> {
        delegate!(self, view => view.ids())
    }

    fn get_value(&self, key: &str) -> Result<T> {
        delegate!(self, view => view.get_value(key))
    }

    fn set_value(&self, key: &str, value: T) -> Result<()> {
        delegate!(self, view => view.set_value(key, value))
    }

    fn iter_all_values(&self, key: &str, update_safe: bool) -> Result<ValueIter<'_, T>> {
        delegate!(self, view => view.iter_all_values(key, update_safe))
    }

    fn get_ranges(&self, key: &str) -> Result<Vec<Run<T>>> {
        delegate!(self, view => view.get_ranges(key))
    }

    fn iter_all_value_maps(
        &self,
        keys: Option<&[&str]>,
        update_safe: bool,
    ) -> Result<ValueMapIter<'_, T>> {
        delegate!(self, view => view.iter_all_value_maps(keys, update_safe))
    }

    fn get_merged_ranges(&self, keys: Option<&[&str]>) -> Result<Vec<Run<ValueMap<T>>>> {
        delegate!(self, view => view.get_merged_ranges(keys))
    }
}

impl<T> fmt::Display for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Single(view) => write!(f, "View with id: {}", view.id),
            View::Slice(view) => write!(f, "View with range: {} to {}", view.start, view.stop),
            View::Ids(view) => write!(f, "View with ids: {:?}", view.ids),
        }
    }
}
