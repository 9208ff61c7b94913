//! Capability traits shared by range lists, baseline lists and combinators.
//!
//! The read surface is split in two:
//! - [`Readable`]: point, slice and id-set lookups.
//! - [`RangeIterable`]: enumeration of the `(start, stop, value)` table.
//!
//! [`Writable`] adds the mutating half. Combinators implement only the read
//! traits.
//!
//! Both read traits are implemented for `&L` and for `RefCell<L>`, so a
//! combinator can hold either a plain borrow of a list or a shared cell whose
//! contents keep changing underneath it.

use std::cell::{Ref, RefCell};
use std::fmt::Debug;

use crate::combinator::SingleList;
use crate::error::{Error, Result};
use crate::iter::{IdSource, RunsByIds, UpdateSafeIter, Values};
use crate::run::Run;

/// Values storable in a list: cloneable, comparable for equality, printable
/// for error messages.
///
/// Values are owned (`'static`) so boxed run streams can outlive the borrow
/// they were built from.
pub trait Value: Clone + PartialEq + Debug + 'static {}

impl<T: Clone + PartialEq + Debug + 'static> Value for T {}

/// A boxed, finite stream of runs.
pub type RunIter<'a, T> = Box<dyn Iterator<Item = Run<T>> + 'a>;

/// Point, slice and id-set lookups over a fixed-size list.
pub trait Readable<T: Value> {
    /// Fixed number of ids in the list.
    fn size(&self) -> usize;

    /// Diagnostic label (the dictionary key), used in error messages.
    fn label(&self) -> Option<String>;

    /// Value at `id`.
    fn get_value_by_id(&self, id: usize) -> Result<T>;

    /// Single value shared by every id in `[start, stop)`.
    ///
    /// Inverted bounds are swapped. Ids outside the slice are not checked.
    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<T>;

    /// Single value shared by every id in `ids`.
    fn get_value_by_ids(&self, ids: &[usize]) -> Result<T>;

    /// Value restored by `reset`, if one is registered.
    fn default_value(&self) -> Option<T>;

    /// Single value shared by the whole list.
    fn get_value(&self) -> Result<T> {
        self.get_value_by_slice(0, self.size())
    }

    /// Check that `id` lies in `[0, size)`.
    fn check_id(&self, id: usize) -> Result<usize> {
        let size = self.size();
        if id >= size {
            return Err(Error::IndexOutOfRange { index: id, size });
        }
        Ok(id)
    }

    /// Check every id in `ids`.
    fn check_ids(&self, ids: &[usize]) -> Result<()> {
        for &id in ids {
            self.check_id(id)?;
        }
        Ok(())
    }

    /// Normalize slice bounds: inverted bounds are swapped, bounds past the
    /// end are rejected.
    fn check_slice(&self, start: usize, stop: usize) -> Result<(usize, usize)> {
        let (start, stop) = if start > stop {
            (stop, start)
        } else {
            (start, stop)
        };
        let size = self.size();
        if stop > size {
            return Err(Error::IndexOutOfRange { index: stop, size });
        }
        Ok((start, stop))
    }

    /// Update-safe iterator over every id.
    ///
    /// Each step performs a fresh lookup, so writes made between steps
    /// (through a `RefCell`) are observed. A lookup that fails at some step
    /// (a borrow conflict) is yielded as that step's `Err`.
    fn iter_update_safe(&self) -> UpdateSafeIter<'_, Self, T>
    where
        Self: Sized,
    {
        UpdateSafeIter::new(self, IdSource::Range(0..self.size()))
    }

    /// Update-safe iterator over `ids`, in the order given.
    fn iter_by_ids_update_safe(&self, ids: &[usize]) -> Result<UpdateSafeIter<'_, Self, T>>
    where
        Self: Sized,
    {
        self.check_ids(ids)?;
        Ok(UpdateSafeIter::new(self, IdSource::Ids(ids.to_vec().into_iter())))
    }
}

/// Enumeration of a list's range table.
///
/// All iterators here are fast but not update-safe: they reflect the table
/// at the time of the call.
pub trait RangeIterable<T: Value>: Readable<T> {
    /// Every run of the list, ascending and gapless.
    fn iter_ranges(&self) -> RunIter<'_, T>;

    /// Runs intersecting `[start, stop)`, clipped to the slice.
    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, T>>;

    /// Runs covering `ids`, one per stretch of consecutive ids sharing a
    /// value.
    ///
    /// The cursor only moves forward while ids ascend; an id below the
    /// current run restarts the walk from the first run.
    fn iter_ranges_by_ids(&self, ids: &[usize]) -> Result<RunIter<'_, T>> {
        self.check_ids(ids)?;
        let runs: Vec<Run<T>> = self.iter_ranges().collect();
        Ok(Box::new(RunsByIds::new(runs, ids.to_vec())))
    }

    /// Fast iterator over every value, one per id.
    fn iter(&self) -> Values<RunIter<'_, T>> {
        Values::new(self.iter_ranges())
    }

    /// Fast iterator over the values in `[start, stop)`.
    fn iter_by_slice(&self, start: usize, stop: usize) -> Result<Values<RunIter<'_, T>>> {
        Ok(Values::new(self.iter_ranges_by_slice(start, stop)?))
    }

    /// Fast iterator over the values of `ids`, repeats included.
    fn iter_by_ids(&self, ids: &[usize]) -> Result<Values<RunIter<'_, T>>> {
        Ok(Values::new(self.iter_ranges_by_ids(ids)?))
    }

    /// Owned copy of the range table.
    fn get_ranges(&self) -> Vec<Run<T>> {
        self.iter_ranges().collect()
    }

    /// Number of ids holding `value`.
    fn count(&self, value: &T) -> usize {
        self.iter_ranges()
            .filter(|run| run.value == *value)
            .map(|run| run.len())
            .sum()
    }

    /// First id holding `value`.
    fn index(&self, value: &T) -> Option<usize> {
        self.iter_ranges()
            .find(|run| run.value == *value)
            .map(|run| run.start)
    }

    /// Return true if any id holds `value`.
    fn contains(&self, value: &T) -> bool {
        self.iter_ranges().any(|run| run.value == *value)
    }

    /// Lazy list of `op` applied to every value of this one.
    fn apply_operation<U, F>(&self, op: F) -> SingleList<T, U, &Self, F>
    where
        Self: Sized,
        U: Value,
        F: Fn(T) -> U,
    {
        SingleList::new(self, op)
    }
}

/// Mutation of a fixed-size list.
///
/// Every method either completes fully, leaving the table coalesced, or
/// returns an error before touching it.
pub trait Writable<T: Value>: Readable<T> {
    /// Set one id.
    fn set_value_by_id(&mut self, id: usize, value: T) -> Result<()>;

    /// Set every id in `[start, stop)`. Inverted bounds are swapped.
    fn set_value_by_slice(&mut self, start: usize, stop: usize, value: T) -> Result<()>;

    /// Set every id in `ids`. The final state does not depend on id order.
    fn set_value_by_ids(&mut self, ids: &[usize], value: T) -> Result<()> {
        self.check_ids(ids)?;
        for &id in ids {
            self.set_value_by_id(id, value.clone())?;
        }
        Ok(())
    }

    /// Set every id. The default is left unchanged.
    fn set_value(&mut self, value: T);

    /// Restore every id to the registered default.
    fn reset(&mut self) -> Result<()> {
        let default = self
            .default_value()
            .ok_or_else(|| Error::NoDefault(self.label()))?;
        self.set_value(default);
        Ok(())
    }
}

impl<T: Value, L: Readable<T> + ?Sized> Readable<T> for &L {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn label(&self) -> Option<String> {
        (**self).label()
    }

    fn get_value_by_id(&self, id: usize) -> Result<T> {
        (**self).get_value_by_id(id)
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<T> {
        (**self).get_value_by_slice(start, stop)
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<T> {
        (**self).get_value_by_ids(ids)
    }

    fn default_value(&self) -> Option<T> {
        (**self).default_value()
    }
}

impl<T: Value, L: RangeIterable<T> + ?Sized> RangeIterable<T> for &L {
    fn iter_ranges(&self) -> RunIter<'_, T> {
        (**self).iter_ranges()
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, T>> {
        (**self).iter_ranges_by_slice(start, stop)
    }

    fn iter_ranges_by_ids(&self, ids: &[usize]) -> Result<RunIter<'_, T>> {
        (**self).iter_ranges_by_ids(ids)
    }
}

fn read<L>(cell: &RefCell<L>) -> Result<Ref<'_, L>> {
    cell.try_borrow().map_err(|_| Error::Borrowed(None))
}

/// Shared-cell lists borrow for the duration of each call only.
///
/// # Panics
///
/// `size`, `label`, `default_value` and `iter_ranges` panic if the cell is
/// mutably borrowed at the time of the call; the fallible methods return
/// [`Error::Borrowed`] instead.
impl<T: Value, L: Readable<T>> Readable<T> for RefCell<L> {
    fn size(&self) -> usize {
        self.borrow().size()
    }

    fn label(&self) -> Option<String> {
        self.borrow().label()
    }

    fn get_value_by_id(&self, id: usize) -> Result<T> {
        read(self)?.get_value_by_id(id)
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<T> {
        read(self)?.get_value_by_slice(start, stop)
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<T> {
        read(self)?.get_value_by_ids(ids)
    }

    fn default_value(&self) -> Option<T> {
        self.borrow().default_value()
    }
}

/// Range iterators over a cell are snapshots taken at call time.
impl<T: Value, L: RangeIterable<T>> RangeIterable<T> for RefCell<L> {
    fn iter_ranges(&self) -> RunIter<'_, T> {
        let runs: Vec<Run<T>> = self.borrow().iter_ranges().collect();
        Box::new(runs.into_iter())
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, T>> {
        let runs: Vec<Run<T>> = read(self)?.iter_ranges_by_slice(start, stop)?.collect();
        Ok(Box::new(runs.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranged_list::RangedList;

    #[test]
    fn test_cell_range_iterators_are_snapshots() {
        let cell = RefCell::new(RangedList::new(6, 'a'));
        cell.borrow_mut().set_value_by_slice(2, 4, 'b').unwrap();

        let all = cell.iter_ranges();
        let sliced = cell.iter_ranges_by_slice(1, 3).unwrap();
        let by_ids = cell.iter_ranges_by_ids(&[5, 3, 2]).unwrap();
        cell.borrow_mut().set_value('z');

        assert_eq!(
            all.collect::<Vec<_>>(),
            vec![Run::new(0, 2, 'a'), Run::new(2, 4, 'b'), Run::new(4, 6, 'a')]
        );
        assert_eq!(
            sliced.collect::<Vec<_>>(),
            vec![Run::new(1, 2, 'a'), Run::new(2, 3, 'b')]
        );
        assert_eq!(
            by_ids.collect::<Vec<_>>(),
            vec![Run::new(5, 6, 'a'), Run::new(3, 4, 'b'), Run::new(2, 3, 'b')]
        );
        assert_eq!(cell.get_value(), Ok('z'));
    }
}
