/// Complex number support.
///
/// Defines the `ComplexNumber` type used for the `CFloat` and `CDouble`
/// element types, with the arithmetic the operator engine needs.
pub mod complex;
/// Scalars, typed element buffers and arrays.
///
/// Defines `Scalar`, `ArrayData` and `Array`, and the conversions between
/// element types.
pub mod core;
/// The `Element` trait that ties Rust number types to element types, and the
/// `dispatch_numeric!` macro that instantiates generic code per type.
pub mod element;
