use smallvec::SmallVec;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::kernel::{array_array, array_scalar, scalar_array},
            core::EvalResult,
        },
        value::core::Dims,
    },
};

/// How a block of axes pairs up the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Both operands have the same sizes along these axes.
    Ordinary,
    /// The left operand has size 1 along these axes and is repeated.
    ScalarLeft,
    /// The right operand has size 1 along these axes and is repeated.
    ScalarRight,
}

/// A run of adjacent axes of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// How the operands pair up along the block.
    pub kind:       BlockKind,
    /// Number of result elements spanned by the block's axes.
    pub count:      usize,
    /// Distance in the left buffer between consecutive block positions.
    pub lhs_stride: usize,
    /// Distance in the right buffer between consecutive block positions.
    pub rhs_stride: usize,
    /// Distance in the result buffer between consecutive block positions.
    pub out_stride: usize,
}

impl Block {
    const fn lhs_step(&self) -> usize {
        match self.kind {
            BlockKind::ScalarLeft => 0,
            _ => self.lhs_stride,
        }
    }

    const fn rhs_step(&self) -> usize {
        match self.kind {
            BlockKind::ScalarRight => 0,
            _ => self.rhs_stride,
        }
    }
}

/// An iteration plan for combining two arrays whose dimensions differ only
/// in axes of size 1.
///
/// Axes are scanned from the fastest-varying one. Adjacent axes of the same
/// kind are merged into one block; axes where both sides have size 1 are
/// skipped. The first block is handled by one call of an array kernel; the
/// remaining blocks are iterated over like an odometer.
///
/// # Example
/// ```
/// use luxcore::interpreter::evaluator::broadcast::{BlockKind, BroadcastPlan};
///
/// let plan = BroadcastPlan::new(&[3, 1, 5], &[3, 4, 1]).unwrap();
/// assert_eq!(plan.dims(), &[3, 4, 5]);
///
/// let kinds: Vec<_> = plan.blocks().iter().map(|b| b.kind).collect();
/// assert_eq!(kinds, [BlockKind::Ordinary, BlockKind::ScalarLeft, BlockKind::ScalarRight]);
///
/// assert!(BroadcastPlan::new(&[3, 2], &[4, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlan {
    dims:   Dims,
    blocks: SmallVec<[Block; 4]>,
}

impl BroadcastPlan {
    /// Plans the combination of arrays with dimensions `lhs` and `rhs`.
    ///
    /// # Errors
    /// Returns `IncompatibleDimensions` if a shared axis has sizes that are
    /// neither equal nor 1, or if the higher-rank operand has an extra axis
    /// whose size is not 1.
    pub fn new(lhs: &[usize], rhs: &[usize]) -> EvalResult<Self> {
        let incompatible = || RuntimeError::IncompatibleDimensions { lhs: lhs.to_vec(),
                                                                     rhs: rhs.to_vec(), };
        let shared = lhs.len().min(rhs.len());
        let longer = if lhs.len() > rhs.len() { lhs } else { rhs };
        if longer[shared..].iter().any(|&d| d != 1) {
            return Err(incompatible());
        }

        let mut dims = Dims::new();
        let mut blocks: SmallVec<[Block; 4]> = SmallVec::new();
        let (mut lhs_size, mut rhs_size, mut out_size) = (1, 1, 1);

        for axis in 0..longer.len() {
            let a = lhs.get(axis).copied().unwrap_or(1);
            let b = rhs.get(axis).copied().unwrap_or(1);
            let kind = if a == b {
                BlockKind::Ordinary
            } else if a == 1 {
                BlockKind::ScalarLeft
            } else if b == 1 {
                BlockKind::ScalarRight
            } else {
                return Err(incompatible());
            };
            let size = if a == 1 { b } else { a };
            dims.push(size);
            if size == 1 {
                continue;
            }

            match blocks.last_mut() {
                Some(block) if block.kind == kind => block.count *= size,
                _ => blocks.push(Block { kind,
                                         count: size,
                                         lhs_stride: lhs_size,
                                         rhs_stride: rhs_size,
                                         out_stride: out_size }),
            }
            lhs_size *= a;
            rhs_size *= b;
            out_size *= size;
        }

        if blocks.is_empty() {
            blocks.push(Block { kind:       BlockKind::Ordinary,
                                count:      1,
                                lhs_stride: 1,
                                rhs_stride: 1,
                                out_stride: 1, });
        }

        Ok(Self { dims, blocks })
    }

    /// The dimensions of the result: along every axis, the size that is not
    /// the implicit 1.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The blocks, fastest-varying first.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The number of result elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether the result has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `out` with `f(l[i], r[j])` for every pair of positions the plan
    /// matches up.
    ///
    /// `l`, `r` and `out` must hold as many elements as the left, right and
    /// result dimensions describe.
    pub fn execute<T: Copy, U>(&self, l: &[T], r: &[T], out: &mut [U], f: impl Fn(T, T) -> U) {
        if out.is_empty() {
            return;
        }
        let Some((inner, outer)) = self.blocks.split_first() else {
            return;
        };
        let n = inner.count;
        let mut index: SmallVec<[usize; 4]> = SmallVec::from_elem(0, outer.len());
        let (mut lo, mut ro, mut oo) = (0, 0, 0);

        loop {
            let dest = &mut out[oo..oo + n];
            match inner.kind {
                BlockKind::Ordinary => array_array(&l[lo..lo + n], &r[ro..ro + n], dest, &f),
                BlockKind::ScalarLeft => scalar_array(l[lo], &r[ro..ro + n], dest, &f),
                BlockKind::ScalarRight => array_scalar(&l[lo..lo + n], r[ro], dest, &f),
            }

            let mut k = 0;
            loop {
                let Some(block) = outer.get(k) else {
                    return;
                };
                index[k] += 1;
                lo += block.lhs_step();
                ro += block.rhs_step();
                oo += block.out_stride;
                if index[k] < block.count {
                    break;
                }
                lo -= block.lhs_step() * block.count;
                ro -= block.rhs_step() * block.count;
                oo -= block.out_stride * block.count;
                index[k] = 0;
                k += 1;
            }
        }
    }
}
