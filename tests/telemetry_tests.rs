use drill_rs::telemetry::{init_default_tracing, init_tracing_with_directive};

#[test]
fn default_tracing_is_opt_in_and_installs_once() {
    assert_eq!(init_default_tracing(), cfg!(feature = "telemetry"));
    assert!(!init_tracing_with_directive("drill_rs=trace"));
}
