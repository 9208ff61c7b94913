//! Plain lists: one stored value per id, no range table.
//!
//! [`PlainList`] is the baseline a [`RangedList`](crate::RangedList) is
//! measured against. Point reads and writes are $O(1)$, slice writes are
//! $O(k)$ in the slice length, and its range table is recomputed on demand by
//! coalescing the stored values.
//!
//! It implements the same capability traits, so it can be used directly as
//! an operand of a combinator or as the oracle in property tests.

use crate::error::{Error, Result};
use crate::iter::Coalesced;
use crate::run::Run;
use crate::traits::{RangeIterable, Readable, RunIter, Value, Writable};

/// A fixed-size list storing every value explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainList<T> {
    values: Vec<T>,
    key: Option<String>,
    default: Option<T>,
}

impl<T: Value> PlainList<T> {
    /// Create a list of `size` copies of `value`, which becomes the default.
    pub fn new(size: usize, value: T) -> Self {
        Self {
            values: vec![value.clone(); size],
            key: None,
            default: Some(value),
        }
    }

    /// Wrap explicit values. No default is registered.
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            key: None,
            default: None,
        }
    }

    /// Attach a label used in error messages.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The stored values.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    fn single<'a>(&self, mut values: impl Iterator<Item = &'a T>) -> Result<T>
    where
        T: 'a,
    {
        let first = values.next().ok_or(Error::EmptySelection)?;
        match values.find(|value| *value != first) {
            Some(other) => Err(Error::multiple_values(self.label(), first, other)),
            None => Ok(first.clone()),
        }
    }
}

impl<T: Value> Readable<T> for PlainList<T> {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn label(&self) -> Option<String> {
        self.key.clone()
    }

    fn get_value_by_id(&self, id: usize) -> Result<T> {
        let id = self.check_id(id)?;
        Ok(self.values[id].clone())
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<T> {
        let (start, stop) = self.check_slice(start, stop)?;
        self.single(self.values[start..stop].iter())
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<T> {
        self.check_ids(ids)?;
        self.single(ids.iter().map(|&id| &self.values[id]))
    }

    fn default_value(&self) -> Option<T> {
        self.default.clone()
    }
}

impl<T: Value> RangeIterable<T> for PlainList<T> {
    fn iter_ranges(&self) -> RunIter<'_, T> {
        Box::new(Coalesced::new(
            self.values
                .iter()
                .enumerate()
                .map(|(id, value)| Run::new(id, id + 1, value.clone())),
        ))
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, T>> {
        let (start, stop) = self.check_slice(start, stop)?;
        Ok(Box::new(Coalesced::new(
            self.values[start..stop]
                .iter()
                .enumerate()
                .map(move |(offset, value)| Run::new(start + offset, start + offset + 1, value.clone())),
        )))
    }
}

impl<T: Value> Writable<T> for PlainList<T> {
    fn set_value_by_id(&mut self, id: usize, value: T) -> Result<()> {
        let id = self.check_id(id)?;
        self.values[id] = value;
        Ok(())
    }

    fn set_value_by_slice(&mut self, start: usize, stop: usize, value: T) -> Result<()> {
        let (start, stop) = self.check_slice(start, stop)?;
        self.values[start..stop].fill(value);
        Ok(())
    }

    fn set_value(&mut self, value: T) {
        self.values.fill(value);
    }
}
