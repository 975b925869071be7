/// Symbols, their owners and payloads, and the slab that holds them.
///
/// Defines `SymbolId`, `Owner`, `Class`, `Payload` and `SymbolStore`, with
/// allocation, lookup and the accessors every other component reads symbols
/// through.
pub mod core;

/// The temporary-symbol arena.
///
/// Marking, unmarking and sweeping of temporaries, embedding into
/// containers, in-place redefinition, deletion and scoped evaluation.
pub mod arena;
