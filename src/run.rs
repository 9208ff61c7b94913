//! A single run: a half-open span of ids sharing one value.

use std::fmt;

/// One `(start, stop, value)` entry of a range table.
///
/// `start` is inclusive and `stop` exclusive, so a run covers
/// `stop - start` ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Run<T> {
    /// First id covered by the run.
    pub start: usize,
    /// One past the last id covered by the run.
    pub stop: usize,
    /// The value shared by every id in the run.
    pub value: T,
}

impl<T> Run<T> {
    /// Create a run over `[start, stop)`.
    pub fn new(start: usize, stop: usize, value: T) -> Self {
        Self { start, stop, value }
    }

    /// Number of ids covered.
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Return true if the run covers no ids.
    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Return true if `id` falls inside `[start, stop)`.
    pub fn contains(&self, id: usize) -> bool {
        self.start <= id && id < self.stop
    }

    /// Apply `f` to the value, keeping the bounds.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Run<U> {
        Run {
            start: self.start,
            stop: self.stop,
            value: f(self.value),
        }
    }

    /// Borrowed form of this run as a `(start, stop, &value)` tuple.
    pub fn as_tuple(&self) -> (usize, usize, &T) {
        (self.start, self.stop, &self.value)
    }
}

impl<T> From<(usize, usize, T)> for Run<T> {
    fn from((start, stop, value): (usize, usize, T)) -> Self {
        Self::new(start, stop, value)
    }
}

impl<T> From<Run<T>> for (usize, usize, T) {
    fn from(run: Run<T>) -> Self {
        (run.start, run.stop, run.value)
    }
}

impl<T: fmt::Debug> fmt::Display for Run<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) = {:?}", self.start, self.stop, self.value)
    }
}
