//! # Range-Compressed Lists and Dictionaries
//!
//! *One value per id, stored once per run.*
//!
//! ## Intuition First
//!
//! Picture a row of ten thousand light switches where almost every switch is
//! off. Writing down "switch 0 is off, switch 1 is off, ..." is wasteful;
//! "switches 0 to 4811 are off, 4812 is on, 4813 to 9999 are off" says the
//! same thing in three entries.
//!
//! A [`RangedList`] keeps exactly that kind of table. Reads ask which entry
//! covers an id; writes cut entries apart and glue equal neighbours back
//! together, so the table is always as short as it can be.
//!
//! ## The Problem
//!
//! Per-entity parameters (a weight, a threshold, a label) are usually set in
//! bulk and overridden in a few places. Storing them:
//! - **Explicitly**: $O(N)$ space and $O(k)$ to write a slice of $k$ ids, even
//!   when every value is the same.
//! - **As runs**: $O(r)$ space for $r$ runs, $O(\log r)$ point reads, and
//!   range-wise operations that cost $O(r)$ instead of $O(N)$.
//!
//! ## Historical Context
//!
//! ```text
//! 1966  Golomb      Run-length encodings: coding lengths of repeated symbols
//! 1980  CCITT T.4   Group 3 fax: run lengths of scan lines, Huffman coded
//! 1980  McCreight   Enumerating intersecting intervals
//! 2005  Stonebraker C-Store: run-length encoded sorted columns
//! 2006  Abadi       Operating directly on compressed columns
//! ```
//!
//! The column-store insight is the one used here: an operation over two
//! run-length columns can be computed run by run, without expanding either.
//!
//! ## Mathematical Formulation
//!
//! A list of size $N$ is a function $v : [0, N) \to V$. Its range table is
//! the unique sequence $(s_i, e_i, x_i)$ with $s_0 = 0$, $e_{r-1} = N$,
//! $e_i = s_{i+1}$, $s_i < e_i$, $x_i \ne x_{i+1}$, and $v(j) = x_i$ for
//! $s_i \le j < e_i$. Uniqueness is what lets two lists be compared, and
//! combined, table to table.
//!
//! ## Complexity Analysis
//!
//! - **Point read**: $O(\log r)$ (binary search over run ends).
//! - **Point or slice write**: $O(\log r)$ to locate, plus $O(r)$ to splice
//!   the table vector.
//! - **Combinator scan**: $O(r_1 + r_2)$ for a binary operation.
//!
//! ## What Could Go Wrong
//!
//! 1. **Alternating values**: a list where neighbours always differ has
//!    $r = N$ and pays the run overhead for nothing. [`PlainList`] is the
//!    baseline for that case.
//! 2. **Update-safe vs fast iteration**: a fast iterator is a snapshot and
//!    will not see writes made after it was created. Ask for an update-safe
//!    iterator when writing while iterating.
//! 3. **Shared borrows**: dictionary lists live in `RefCell`s; holding a
//!    mutable borrow across a read of the same key returns
//!    [`Error::Borrowed`]. Update-safe iterators yield `Result` items for
//!    the same reason: a step that meets a held borrow yields that error.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **[`RangedList`]**: the range table, with point, slice and id-set reads
//!   and writes.
//! - **[`RangeDictionary`]**: named lists of one shared size.
//! - **Views** ([`SingleView`], [`SliceView`], [`IdsView`]): dictionary
//!   access restricted to some ids, built by
//!   [`RangeDictionary::view_factory`].
//! - **Combinators** ([`SingleList`], [`DualList`]): lazy elementwise
//!   operations over one or two lists.
//!
//! ```
//! use rangedict::{RangeIterable, RangedList, Readable, Run, Writable};
//!
//! let mut list = RangedList::new(10, "a");
//! list.set_value_by_slice(3, 7, "b")?;
//! assert_eq!(
//!     list.get_ranges(),
//!     vec![Run::new(0, 3, "a"), Run::new(3, 7, "b"), Run::new(7, 10, "a")]
//! );
//! assert_eq!(list.get_value_by_id(5)?, "b");
//! # Ok::<(), rangedict::Error>(())
//! ```
//!
//! ## References
//!
//! - Golomb, S. (1966). "Run-length encodings."
//! - Stonebraker, M., et al. (2005). "C-Store: A Column-oriented DBMS."
//! - Abadi, D., Madden, S., & Ferreira, M. (2006). "Integrating compression
//!   and execution in column-oriented database systems."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combinator;
pub mod dictionary;
pub mod error;
pub mod implicit;
pub mod iter;
pub mod ranged_list;
pub mod run;
pub mod selector;
pub mod traits;
pub mod view;

pub use combinator::{DivList, DualList, FloorDiv, SingleList};
pub use dictionary::{RangeDictionary, ValueMap};
pub use error::{Error, Result};
pub use implicit::PlainList;
pub use iter::{ValueIter, ValueMapIter};
pub use ranged_list::RangedList;
pub use run::Run;
pub use selector::{IdSet, Selector, Subscript};
pub use traits::{RangeIterable, Readable, Value, Writable};
pub use view::{DictView, IdsView, Lookup, SingleView, SliceView, View};
