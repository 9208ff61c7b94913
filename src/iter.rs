//! Iteration helpers: fast (snapshot) and update-safe (re-resolving) forms.
//!
//! A *fast* iterator walks a range table captured when it was created. It
//! never observes later writes, but it is never invalidated by them either.
//!
//! An *update-safe* iterator keeps only the list and the ids still to visit,
//! and performs a fresh lookup at every step. Writes made through a shared
//! cell between two steps are visible to the next step.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::dictionary::{RangeDictionary, ValueMap};
use crate::error::Result;
use crate::ranged_list::RangedList;
use crate::run::Run;
use crate::traits::{Readable, RunIter, Value};

/// Flattens a stream of runs into one value per id.
pub struct Values<I: Iterator> {
    runs: I,
    current: Option<I::Item>,
}

impl<T, I: Iterator<Item = Run<T>>> Values<I> {
    /// Wrap a run stream.
    pub fn new(runs: I) -> Self {
        Self {
            runs,
            current: None,
        }
    }
}

impl<T: Clone, I: Iterator<Item = Run<T>>> Iterator for Values<I> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(run) = &mut self.current {
                if run.start < run.stop {
                    run.start += 1;
                    return Some(run.value.clone());
                }
            }
            self.current = Some(self.runs.next()?);
        }
    }
}

/// Runs restricted to a sequence of ids.
///
/// Consecutive ids (`id == previous + 1`) sharing a value are folded into
/// one run. Ids are resolved with a cursor over the captured table which is
/// rewound to the first run whenever an id goes backwards.
pub struct RunsByIds<T> {
    runs: Vec<Run<T>>,
    ids: std::vec::IntoIter<usize>,
    cursor: usize,
    pending: Option<Run<T>>,
}

impl<T> RunsByIds<T> {
    /// Walk `ids` over `runs`. Ids past the end of the table end the stream.
    pub fn new(runs: Vec<Run<T>>, ids: Vec<usize>) -> Self {
        Self {
            runs,
            ids: ids.into_iter(),
            cursor: 0,
            pending: None,
        }
    }
}

impl<T> RunsByIds<T> {
    /// Move the cursor onto the run holding `id`, if the table reaches it.
    fn locate(&mut self, id: usize) -> Option<usize> {
        if id < self.runs.get(self.cursor)?.start {
            self.cursor = 0;
        }
        while self.runs.get(self.cursor)?.stop <= id {
            self.cursor += 1;
        }
        Some(self.cursor)
    }
}

impl<T: Value> Iterator for RunsByIds<T> {
    type Item = Run<T>;

    fn next(&mut self) -> Option<Run<T>> {
        loop {
            let Some(id) = self.ids.next() else {
                return self.pending.take();
            };
            let Some(idx) = self.locate(id) else {
                self.ids = Vec::new().into_iter();
                return self.pending.take();
            };
            let value = &self.runs[idx].value;
            match &mut self.pending {
                Some(run) if run.stop == id && run.value == *value => run.stop = id + 1,
                _ => {
                    let done = self.pending.replace(Run::new(id, id + 1, value.clone()));
                    if done.is_some() {
                        return done;
                    }
                }
            }
        }
    }
}

/// Ids still to be visited by an [`UpdateSafeIter`].
#[derive(Debug, Clone)]
pub enum IdSource {
    /// A contiguous ascending span.
    Range(std::ops::Range<usize>),
    /// An explicit sequence, in caller order.
    Ids(std::vec::IntoIter<usize>),
}

impl Iterator for IdSource {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            IdSource::Range(range) => range.next(),
            IdSource::Ids(ids) => ids.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            IdSource::Range(range) => range.size_hint(),
            IdSource::Ids(ids) => ids.size_hint(),
        }
    }
}

impl ExactSizeIterator for IdSource {}

/// Iterator that looks every id up afresh.
pub struct UpdateSafeIter<'a, L: ?Sized, T> {
    list: &'a L,
    ids: IdSource,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, L: ?Sized, T> UpdateSafeIter<'a, L, T> {
    /// Visit `ids` of `list`.
    pub fn new(list: &'a L, ids: IdSource) -> Self {
        Self {
            list,
            ids,
            _marker: PhantomData,
        }
    }
}

impl<L: Readable<T> + ?Sized, T: Value> Iterator for UpdateSafeIter<'_, L, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        let id = self.ids.next()?;
        // Ids are checked when the iterator is built and sizes never change,
        // so a failed lookup only happens on a borrow conflict.
        Some(self.list.get_value_by_id(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.ids.size_hint().1)
    }
}

/// Value iterator returned by dictionaries and views.
///
/// Items are `Result`s. The fast form never fails once built; the
/// update-safe form yields [`Borrowed`](crate::Error::Borrowed) for a step
/// whose list is mutably borrowed at the time.
pub enum ValueIter<'a, T: Value> {
    /// Snapshot of the range table taken at creation.
    Fast(Values<RunIter<'a, T>>),
    /// Fresh lookup per id.
    UpdateSafe(UpdateSafeIter<'a, RefCell<RangedList<T>>, T>),
}

impl<T: Value> Iterator for ValueIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        match self {
            ValueIter::Fast(values) => values.next().map(Ok),
            ValueIter::UpdateSafe(values) => values.next(),
        }
    }
}

/// Per-id values of several keys, looked up afresh at every step.
pub struct UpdateSafeMaps<'a, T> {
    dict: &'a RangeDictionary<T>,
    keys: Vec<String>,
    ids: IdSource,
}

impl<'a, T> UpdateSafeMaps<'a, T> {
    pub(crate) fn new(dict: &'a RangeDictionary<T>, keys: Vec<String>, ids: IdSource) -> Self {
        Self { dict, keys, ids }
    }
}

impl<T: Value> Iterator for UpdateSafeMaps<'_, T> {
    type Item = Result<ValueMap<T>>;

    fn next(&mut self) -> Option<Result<ValueMap<T>>> {
        let id = self.ids.next()?;
        Some(self.dict.get_key_values_by_id(&self.keys, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

/// Iterator over one [`ValueMap`] per id, returned for multi-key reads.
pub enum ValueMapIter<'a, T: Value> {
    /// Snapshot of the merged range table taken at creation.
    Fast(Values<std::vec::IntoIter<Run<ValueMap<T>>>>),
    /// Fresh lookup of every key per id.
    UpdateSafe(UpdateSafeMaps<'a, T>),
}

impl<T: Value> Iterator for ValueMapIter<'_, T> {
    type Item = Result<ValueMap<T>>;

    fn next(&mut self) -> Option<Result<ValueMap<T>>> {
        match self {
            ValueMapIter::Fast(values) => values.next().map(Ok),
            ValueMapIter::UpdateSafe(values) => values.next(),
        }
    }
}

/// Merges adjacent touching runs that carry equal values.
pub struct Coalesced<I: Iterator> {
    inner: I,
    pending: Option<I::Item>,
}

impl<T, I: Iterator<Item = Run<T>>> Coalesced<I> {
    /// Wrap a run stream.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            pending: None,
        }
    }
}

impl<T: PartialEq, I: Iterator<Item = Run<T>>> Iterator for Coalesced<I> {
    type Item = Run<T>;

    fn next(&mut self) -> Option<Run<T>> {
        let mut current = match self.pending.take() {
            Some(run) => run,
            None => self.inner.next()?,
        };
        loop {
            match self.inner.next() {
                Some(next) if next.start == current.stop && next.value == current.value => {
                    current.stop = next.stop;
                }
                Some(next) => {
                    self.pending = Some(next);
                    return Some(current);
                }
                None => return Some(current),
            }
        }
    }
}
