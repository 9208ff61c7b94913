//! Lazy combinator lists: elementwise operations over one or two lists.
//!
//! A combinator stores its operands and an operation, never a result table.
//! Every read goes back to the operands, so a combinator over a
//! `RefCell<RangedList<T>>` keeps reflecting writes made to the cell after
//! it was built.
//!
//! # Theory
//!
//! For a unary operation the range table of the result is the operand's
//! table with the operation applied to each value, coalesced again since
//! $f(a) = f(b)$ is possible for $a \ne b$.
//!
//! For a binary operation the two tables are merge-joined. With operand
//! tables of $r_1$ and $r_2$ runs, every output run is
//! $[\max(s_1, s_2), \min(e_1, e_2))$ for the current run of each operand;
//! the operand whose run ends first advances (both on a tie). The walk
//! yields at most $r_1 + r_2 - 1$ runs and touches each input run once, so
//! a full scan is $O(r_1 + r_2)$ regardless of the list size.

use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Sub};

use crate::error::{Error, Result};
use crate::iter::Coalesced;
use crate::run::Run;
use crate::traits::{RangeIterable, Readable, RunIter, Value};

/// A binary operation stored as a plain function pointer.
pub type BinaryOp<T> = fn(T, T) -> T;

/// Boxed unary operation used by the scalar constructors.
pub type ScalarOp<T> = Box<dyn Fn(T) -> T>;

/// Floor division: the quotient rounded toward negative infinity.
pub trait FloorDiv<Rhs = Self> {
    /// Result type.
    type Output;

    /// `floor(self / rhs)`.
    fn floor_div(self, rhs: Rhs) -> Self::Output;
}

macro_rules! impl_floor_div_signed {
    ($($t:ty)*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                let quotient = self / rhs;
                if self % rhs != 0 && (self < 0) != (rhs < 0) {
                    quotient - 1
                } else {
                    quotient
                }
            }
        }
    )*};
}

macro_rules! impl_floor_div_unsigned {
    ($($t:ty)*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                self / rhs
            }
        }
    )*};
}

macro_rules! impl_floor_div_float {
    ($($t:ty)*) => {$(
        impl FloorDiv for $t {
            type Output = $t;

            fn floor_div(self, rhs: $t) -> $t {
                (self / rhs).floor()
            }
        }
    )*};
}

impl_floor_div_signed!(i8 i16 i32 i64 i128 isize);
impl_floor_div_unsigned!(u8 u16 u32 u64 u128 usize);
impl_floor_div_float!(f32 f64);

/// Merge-join of two run streams covering the same ids.
///
/// Finite and single-pass. Output runs are not coalesced; wrap in
/// [`Coalesced`] for a maximal table.
pub struct MergeRuns<A, B, IA, IB, F> {
    left: IA,
    right: IB,
    left_run: Option<Run<A>>,
    right_run: Option<Run<B>>,
    op: F,
}

impl<A, B, IA, IB, F> MergeRuns<A, B, IA, IB, F> {
    /// Join `left` and `right`, combining aligned values with `op`.
    pub fn new(left: IA, right: IB, op: F) -> Self {
        Self {
            left,
            right,
            left_run: None,
            right_run: None,
            op,
        }
    }
}

impl<A, B, R, IA, IB, F> Iterator for MergeRuns<A, B, IA, IB, F>
where
    A: Clone,
    B: Clone,
    IA: Iterator<Item = Run<A>>,
    IB: Iterator<Item = Run<B>>,
    F: Fn(A, B) -> R,
{
    type Item = Run<R>;

    fn next(&mut self) -> Option<Run<R>> {
        if self.left_run.is_none() {
            self.left_run = self.left.next();
        }
        if self.right_run.is_none() {
            self.right_run = self.right.next();
        }
        let (left, right) = (self.left_run.as_ref()?, self.right_run.as_ref()?);

        let start = left.start.max(right.start);
        let stop = left.stop.min(right.stop);
        let value = (self.op)(left.value.clone(), right.value.clone());
        let (left_done, right_done) = (left.stop == stop, right.stop == stop);
        if left_done {
            self.left_run = None;
        }
        if right_done {
            self.right_run = None;
        }
        Some(Run::new(start, stop, value))
    }
}

/// The single value of a run stream, or the first two that differ.
fn single_value<R: Value>(label: Option<String>, mut runs: impl Iterator<Item = Run<R>>) -> Result<R> {
    let first = runs.next().ok_or(Error::EmptySelection)?;
    match runs.find(|run| run.value != first.value) {
        Some(other) => Err(Error::multiple_values(label, &first.value, &other.value)),
        None => Ok(first.value),
    }
}

/// The single value over a set of ids, computed one id at a time.
fn single_value_by_ids<R: Value>(
    label: Option<String>,
    ids: &[usize],
    mut get: impl FnMut(usize) -> Result<R>,
) -> Result<R> {
    let (&first_id, rest) = ids.split_first().ok_or(Error::EmptySelection)?;
    let first = get(first_id)?;
    for &id in rest {
        let other = get(id)?;
        if other != first {
            return Err(Error::multiple_values(label, &first, &other));
        }
    }
    Ok(first)
}

/// A read-only list of `op` applied to every value of one operand.
pub struct SingleList<T, U, L, F> {
    inner: L,
    op: F,
    _marker: PhantomData<fn(T) -> U>,
}

impl<T, U, L, F> SingleList<T, U, L, F>
where
    T: Value,
    U: Value,
    L: RangeIterable<T>,
    F: Fn(T) -> U,
{
    /// Wrap `inner` with a unary operation.
    pub fn new(inner: L, op: F) -> Self {
        Self {
            inner,
            op,
            _marker: PhantomData,
        }
    }

    /// The operand.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<T, L> SingleList<T, T, L, ScalarOp<T>>
where
    T: Value,
    L: RangeIterable<T>,
{
    /// `value + scalar` for every value.
    pub fn add_scalar(inner: L, scalar: T) -> Self
    where
        T: Add<Output = T>,
    {
        Self::new(inner, Box::new(move |value: T| value + scalar.clone()))
    }

    /// `value - scalar` for every value.
    pub fn subtract_scalar(inner: L, scalar: T) -> Self
    where
        T: Sub<Output = T>,
    {
        Self::new(inner, Box::new(move |value: T| value - scalar.clone()))
    }

    /// `value * scalar` for every value.
    pub fn multiply_scalar(inner: L, scalar: T) -> Self
    where
        T: Mul<Output = T>,
    {
        Self::new(inner, Box::new(move |value: T| value * scalar.clone()))
    }

    /// `value / scalar` for every value. A zero scalar is rejected.
    pub fn divide_scalar(inner: L, scalar: T) -> Result<Self>
    where
        T: Div<Output = T> + Default,
    {
        if scalar == T::default() {
            return Err(Error::DivisionByZero);
        }
        Ok(Self::new(inner, Box::new(move |value: T| value / scalar.clone())))
    }

    /// `floor(value / scalar)` for every value. A zero scalar is rejected.
    pub fn floor_divide_scalar(inner: L, scalar: T) -> Result<Self>
    where
        T: FloorDiv<Output = T> + Default,
    {
        if scalar == T::default() {
            return Err(Error::DivisionByZero);
        }
        Ok(Self::new(inner, Box::new(move |value: T| value.floor_div(scalar.clone()))))
    }
}

impl<T, U, L, F> Readable<U> for SingleList<T, U, L, F>
where
    T: Value,
    U: Value,
    L: RangeIterable<T>,
    F: Fn(T) -> U,
{
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn label(&self) -> Option<String> {
        self.inner.label()
    }

    fn get_value_by_id(&self, id: usize) -> Result<U> {
        Ok((self.op)(self.inner.get_value_by_id(id)?))
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<U> {
        single_value(self.label(), self.iter_ranges_by_slice(start, stop)?)
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<U> {
        self.check_ids(ids)?;
        single_value_by_ids(self.label(), ids, |id| self.get_value_by_id(id))
    }

    fn default_value(&self) -> Option<U> {
        self.inner.default_value().map(&self.op)
    }
}

impl<T, U, L, F> RangeIterable<U> for SingleList<T, U, L, F>
where
    T: Value,
    U: Value,
    L: RangeIterable<T>,
    F: Fn(T) -> U,
{
    fn iter_ranges(&self) -> RunIter<'_, U> {
        let op = &self.op;
        Box::new(Coalesced::new(self.inner.iter_ranges().map(move |run| run.map(op))))
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, U>> {
        let op = &self.op;
        Ok(Box::new(Coalesced::new(
            self.inner
                .iter_ranges_by_slice(start, stop)?
                .map(move |run| run.map(op)),
        )))
    }
}

/// A read-only list of `op(left[id], right[id])`.
///
/// # Panics
///
/// Integer division by zero panics when the offending id is read, as `/`
/// does; scalar constructors reject a zero divisor up front instead.
pub struct DualList<A, B, R, LL, RL, F> {
    left: LL,
    right: RL,
    op: F,
    _marker: PhantomData<fn(A, B) -> R>,
}

/// Elementwise quotient of two lists.
pub type DivList<T, LL, RL> = DualList<T, T, T, LL, RL, BinaryOp<T>>;

impl<A, B, R, LL, RL, F> DualList<A, B, R, LL, RL, F>
where
    A: Value,
    B: Value,
    R: Value,
    LL: RangeIterable<A>,
    RL: RangeIterable<B>,
    F: Fn(A, B) -> R,
{
    /// Combine two equally sized operands with `op`.
    pub fn new(left: LL, right: RL, op: F) -> Result<Self> {
        if left.size() != right.size() {
            return Err(Error::SizeMismatch {
                expected: left.size(),
                found: right.size(),
            });
        }
        Ok(Self {
            left,
            right,
            op,
            _marker: PhantomData,
        })
    }

    /// The left operand.
    pub fn left(&self) -> &LL {
        &self.left
    }

    /// The right operand.
    pub fn right(&self) -> &RL {
        &self.right
    }
}

impl<T: Value + Add<Output = T>, LL: RangeIterable<T>, RL: RangeIterable<T>>
    DualList<T, T, T, LL, RL, BinaryOp<T>>
{
    /// Elementwise `left + right`.
    pub fn add(left: LL, right: RL) -> Result<Self> {
        Self::new(left, right, |a, b| a + b)
    }
}

impl<T: Value + Sub<Output = T>, LL: RangeIterable<T>, RL: RangeIterable<T>>
    DualList<T, T, T, LL, RL, BinaryOp<T>>
{
    /// Elementwise `left - right`.
    pub fn subtract(left: LL, right: RL) -> Result<Self> {
        Self::new(left, right, |a, b| a - b)
    }
}

impl<T: Value + Mul<Output = T>, LL: RangeIterable<T>, RL: RangeIterable<T>>
    DualList<T, T, T, LL, RL, BinaryOp<T>>
{
    /// Elementwise `left * right`.
    pub fn multiply(left: LL, right: RL) -> Result<Self> {
        Self::new(left, right, |a, b| a * b)
    }
}

impl<T: Value + Div<Output = T>, LL: RangeIterable<T>, RL: RangeIterable<T>>
    DualList<T, T, T, LL, RL, BinaryOp<T>>
{
    /// Elementwise `left / right`.
    pub fn divide(left: LL, right: RL) -> Result<Self> {
        Self::new(left, right, |a, b| a / b)
    }
}

impl<T: Value + FloorDiv<Output = T>, LL: RangeIterable<T>, RL: RangeIterable<T>>
    DualList<T, T, T, LL, RL, BinaryOp<T>>
{
    /// Elementwise `floor(left / right)`.
    pub fn floor_divide(left: LL, right: RL) -> Result<Self> {
        Self::new(left, right, |a: T, b: T| a.floor_div(b))
    }
}

impl<A, B, R, LL, RL, F> Readable<R> for DualList<A, B, R, LL, RL, F>
where
    A: Value,
    B: Value,
    R: Value,
    LL: RangeIterable<A>,
    RL: RangeIterable<B>,
    F: Fn(A, B) -> R,
{
    fn size(&self) -> usize {
        self.left.size()
    }

    fn label(&self) -> Option<String> {
        self.left.label()
    }

    fn get_value_by_id(&self, id: usize) -> Result<R> {
        let left = self.left.get_value_by_id(id)?;
        let right = self.right.get_value_by_id(id)?;
        Ok((self.op)(left, right))
    }

    fn get_value_by_slice(&self, start: usize, stop: usize) -> Result<R> {
        single_value(self.label(), self.iter_ranges_by_slice(start, stop)?)
    }

    fn get_value_by_ids(&self, ids: &[usize]) -> Result<R> {
        self.check_ids(ids)?;
        single_value_by_ids(self.label(), ids, |id| self.get_value_by_id(id))
    }

    fn default_value(&self) -> Option<R> {
        let left = self.left.default_value()?;
        let right = self.right.default_value()?;
        Some((self.op)(left, right))
    }
}

impl<A, B, R, LL, RL, F> RangeIterable<R> for DualList<A, B, R, LL, RL, F>
where
    A: Value,
    B: Value,
    R: Value,
    LL: RangeIterable<A>,
    RL: RangeIterable<B>,
    F: Fn(A, B) -> R,
{
    fn iter_ranges(&self) -> RunIter<'_, R> {
        Box::new(Coalesced::new(MergeRuns::new(
            self.left.iter_ranges(),
            self.right.iter_ranges(),
            &self.op,
        )))
    }

    fn iter_ranges_by_slice(&self, start: usize, stop: usize) -> Result<RunIter<'_, R>> {
        Ok(Box::new(Coalesced::new(MergeRuns::new(
            self.left.iter_ranges_by_slice(start, stop)?,
            self.right.iter_ranges_by_slice(start, stop)?,
            &self.op,
        ))))
    }
}
