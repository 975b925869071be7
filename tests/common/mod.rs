#![allow(dead_code)]

use std::sync::Once;

use luxcore::interpreter::{evaluator::core::Runtime, store::core::SymbolId, value::core::Scalar};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test subscriber once per test binary. The filter is read from
/// `LUXCORE_LOG` (for example `LUXCORE_LOG=luxcore=trace`); logging is off
/// when it is unset.
pub fn init_tracing() {
    TRACING.call_once(|| {
               let filter =
                   EnvFilter::try_from_env("LUXCORE_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
               let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                                .with_test_writer()
                                                .try_init();
           });
}

/// A runtime with tracing installed.
pub fn runtime() -> Runtime {
    init_tracing();
    Runtime::new()
}

/// Adds an Int32 literal.
pub fn int(rt: &mut Runtime, value: i32) -> SymbolId {
    rt.scalar(Scalar::Int32(value))
      .unwrap_or_else(|e| panic!("cannot add literal {value}: {e}"))
}
