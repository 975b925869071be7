use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::kernel::Arithmetic,
            core::{EvalResult, Runtime},
        },
        store::core::{Payload, Range, RangeBound, SymbolId},
        value::{
            core::{Array, ArrayData, Dims},
            element::Element,
        },
    },
    util::num::{checked_index, usize_to_i64},
};

/// The positions one subscript selects along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    positions: Vec<usize>,
    /// A scalar subscript: the axis disappears from the result.
    single:    bool,
    sum:       bool,
    redirect:  Option<usize>,
    /// Dimensions of an index array subscript.
    shape:     Option<Dims>,
}

impl Runtime {
    /// Selects elements of an array or characters of a string.
    ///
    /// Subscripts are evaluated values, 0-based:
    /// - an integer Scalar selects one position and drops the axis;
    /// - a numeric Array selects the listed positions;
    /// - a Range selects `start..=end`, where a from-end endpoint `*-n`
    ///   means `size - 1 - n`. Its `sum` flag sums the selection along the
    ///   axis and its `redirect` moves the axis to the given result position.
    ///
    /// There is either one subscript per dimension or a single subscript
    /// that treats the array as one-dimensional. A single index array
    /// subscript gives the result its own shape. When every axis is dropped
    /// the result is a Scalar (a String for string arrays).
    ///
    /// # Errors
    /// - `SubscriptOutOfRange` for positions outside the array.
    /// - `InvalidSubscript` for a wrong number or kind of subscripts.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{
    ///     evaluator::core::Runtime,
    ///     store::core::RangeBound,
    ///     value::core::{ArrayData, Scalar},
    /// };
    ///
    /// let mut rt = Runtime::new();
    /// let a = rt.array(&[5], ArrayData::Int32(vec![10, 11, 12, 13, 14])).unwrap();
    /// let one = rt.scalar(Scalar::Int32(1)).unwrap();
    /// let zero = rt.scalar(Scalar::Int32(0)).unwrap();
    /// let range = rt.range(RangeBound::at(one), RangeBound::from_end(zero)).unwrap();
    ///
    /// let part = rt.subscript(a, &[range]).unwrap();
    /// assert_eq!(rt.array_value(part).unwrap().data(), &ArrayData::Int32(vec![11, 12, 13, 14]));
    /// ```
    pub fn subscript(&mut self, target: SymbolId, args: &[SymbolId]) -> EvalResult<SymbolId> {
        let target = self.eval(target)?;
        let args = args.iter().map(|&a| self.eval(a)).collect::<EvalResult<Vec<_>>>()?;

        let payload = match self.store.payload(target)? {
            Payload::String(text) => {
                let chars: Vec<char> = text.chars().collect();
                let [arg] = args.as_slice() else {
                    return Err(invalid(format!("a string takes one subscript, found {}", args.len())));
                };
                let selection = self.selection(*arg, chars.len())?;
                if selection.sum {
                    return Err(invalid("cannot sum characters".to_string()));
                }
                Payload::String(selection.positions.iter().map(|&i| chars[i]).collect())
            },
            Payload::Array(array) => self.subscript_array(array, &args)?,
            other => {
                return Err(RuntimeError::IllegalClass { class:     other.class(),
                                                        operation: "subscript" });
            },
        };
        self.store.allocate_temp(payload)
    }

    fn subscript_array(&self, array: &Array, args: &[SymbolId]) -> EvalResult<Payload> {
        let linear = [array.len()];
        let source_dims: &[usize] = match args.len() {
            1 => &linear,
            n if n == array.dims().len() => array.dims(),
            n => {
                return Err(invalid(format!("{n} subscripts for an array with {} dimensions",
                                           array.dims().len())));
            },
        };
        let selections = args.iter()
                             .zip(source_dims)
                             .map(|(&arg, &size)| self.selection(arg, size))
                             .collect::<EvalResult<Vec<_>>>()?;

        let counts: Dims = selections.iter().map(|s| s.positions.len()).collect();
        let source_strides = strides(source_dims);
        let mut indices = Vec::with_capacity(counts.iter().product());
        for_each_index(&counts, |index| {
            indices.push(index.iter()
                              .zip(&selections)
                              .zip(&source_strides)
                              .map(|((&i, s), &stride)| s.positions[i] * stride)
                              .sum());
        });
        let mut data = array.data().gather(&indices);

        let mut dims = counts;
        for (axis, selection) in selections.iter().enumerate() {
            if selection.sum {
                data = sum_along(&data, &dims, axis)?;
                dims[axis] = 1;
            }
        }

        let kept: Vec<usize> = (0..selections.len()).filter(|&a| !selections[a].single && !selections[a].sum)
                                                    .collect();
        if kept.is_empty() {
            return scalar_payload(data);
        }
        if let [selection] = selections.as_slice()
           && let Some(shape) = &selection.shape
           && selection.redirect.is_none()
        {
            return Ok(Payload::Array(Array::new(shape, data)?));
        }

        let order = axis_order(&kept, &selections)?;
        let result_dims: Dims = order.iter().map(|&a| dims[a]).collect();
        let data_strides = strides(&dims);
        let mut indices = Vec::with_capacity(data.len());
        for_each_index(&result_dims, |index| {
            indices.push(index.iter()
                              .zip(&order)
                              .map(|(&i, &axis)| i * data_strides[axis])
                              .sum());
        });
        Ok(Payload::Array(Array::new(&result_dims, data.gather(&indices))?))
    }

    /// Resolves one subscript against an axis of `size` elements.
    fn selection(&self, arg: SymbolId, size: usize) -> EvalResult<Selection> {
        let selection = |positions, single, shape| Selection { positions,
                                                               single,
                                                               sum: false,
                                                               redirect: None,
                                                               shape };
        match self.store.payload(arg)? {
            Payload::Scalar(s) => {
                let index = s.as_index()
                             .ok_or_else(|| invalid("complex subscript".to_string()))?;
                Ok(selection(vec![checked_index(index, size)?], true, None))
            },
            Payload::Array(a) => {
                let positions = (0..a.len()).map(|i| {
                                                a.data()
                                                 .get(i)
                                                 .and_then(|s| s.as_index())
                                                 .ok_or_else(|| invalid(format!("{} index array", a.element_type())))
                                                 .and_then(|index| checked_index(index, size))
                                            })
                                            .collect::<EvalResult<Vec<_>>>()?;
                Ok(selection(positions, false, Some(Dims::from_slice(a.dims()))))
            },
            Payload::Range(range) => self.range_selection(range, size),
            other => Err(invalid(format!("{} subscript", other.class()))),
        }
    }

    fn range_selection(&self, range: &Range, size: usize) -> EvalResult<Selection> {
        let start = self.range_position(range.start, size)?;
        let end = self.range_position(range.end, size)?;
        if start > end {
            return Err(invalid(format!("range {start}:{end} runs backwards")));
        }
        Ok(Selection { positions: (start..=end).collect(),
                       single:    false,
                       sum:       range.sum,
                       redirect:  range.redirect,
                       shape:     None, })
    }

    /// The position an endpoint stands for along an axis of `size`
    /// elements.
    fn range_position(&self, bound: RangeBound, size: usize) -> EvalResult<usize> {
        let value = self.scalar_value(bound.symbol)?
                        .as_index()
                        .ok_or_else(|| invalid("complex range endpoint".to_string()))?;
        let position = if bound.from_end {
            usize_to_i64(size) - 1 - value
        } else {
            value
        };
        checked_index(position, size)
    }
}

fn invalid(details: String) -> RuntimeError {
    RuntimeError::InvalidSubscript { details }
}

/// Element distance between consecutive positions along each axis.
fn strides(dims: &[usize]) -> Dims {
    dims.iter()
        .scan(1, |acc, &d| {
            let stride = *acc;
            *acc *= d;
            Some(stride)
        })
        .collect()
}

/// Calls `f` with every index tuple inside `dims`, first axis fastest.
fn for_each_index(dims: &[usize], mut f: impl FnMut(&[usize])) {
    if dims.contains(&0) {
        return;
    }
    let mut index: Dims = smallvec::smallvec![0; dims.len()];
    loop {
        f(&index);
        let mut axis = 0;
        loop {
            let Some(&size) = dims.get(axis) else {
                return;
            };
            index[axis] += 1;
            if index[axis] < size {
                break;
            }
            index[axis] = 0;
            axis += 1;
        }
    }
}

/// The source axes in result order: redirected axes at their requested
/// positions, the others filling the remaining positions in order.
fn axis_order(kept: &[usize], selections: &[Selection]) -> EvalResult<Vec<usize>> {
    let mut order = vec![None; kept.len()];
    for &axis in kept {
        if let Some(target) = selections[axis].redirect {
            match order.get_mut(target) {
                Some(slot) if slot.is_none() => *slot = Some(axis),
                _ => return Err(invalid(format!("cannot redirect an axis to position {target}"))),
            }
        }
    }
    let mut free = kept.iter().filter(|&&a| selections[a].redirect.is_none());
    Ok(order.into_iter()
            .map(|slot| slot.or_else(|| free.next().copied()))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default())
}

/// Sums a buffer with dimensions `dims` along `axis`.
fn sum_along(data: &ArrayData, dims: &[usize], axis: usize) -> EvalResult<ArrayData> {
    fn sum<T: Arithmetic>(values: &[T], dims: &[usize], axis: usize) -> EvalResult<ArrayData> {
        let add = T::arithmetic(BinaryOperator::Add).ok_or_else(|| invalid("cannot sum".to_string()))?;
        let inner: usize = dims[..axis].iter().product();
        let count = dims[axis];
        let outer: usize = dims[axis + 1..].iter().product();

        let mut out = vec![T::default(); inner * outer];
        for o in 0..outer {
            for i in 0..inner {
                out[o * inner + i] = (0..count).map(|k| values[(o * count + k) * inner + i])
                                               .fold(T::default(), add);
            }
        }
        Ok(T::wrap(out))
    }

    crate::dispatch_numeric!(data.element_type(),
                             T => sum(T::slice(data).unwrap_or_default(), dims, axis),
                             string => Err(invalid("cannot sum strings".to_string())))
}

/// The single element of a buffer as a Scalar or String payload.
fn scalar_payload(data: ArrayData) -> EvalResult<Payload> {
    match data {
        ArrayData::String(mut items) if items.len() == 1 => Ok(Payload::String(items.remove(0))),
        data => data.get(0)
                    .map(Payload::Scalar)
                    .ok_or_else(|| invalid("empty selection".to_string())),
    }
}
