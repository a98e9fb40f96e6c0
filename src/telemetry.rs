//! Telemetry helpers for services embedding `drill-rs`.
//!
//! The engine only emits `tracing` events under the `drill_rs` target; wiring a
//! subscriber stays the host's decision.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_TRACING_DIRECTIVE: &str = "drill_rs=info";

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`, or by
/// [`DEFAULT_TRACING_DIRECTIVE`] when the variable is absent.
///
/// Returns `false` when the `telemetry` feature is disabled or the host already
/// installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_directive(DEFAULT_TRACING_DIRECTIVE)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"drill_rs=trace"` when debugging a single request.
#[must_use]
pub fn init_tracing_with_directive(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
