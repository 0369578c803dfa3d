//! Tests for core_kernel error types

use core_kernel::error::CoreError;

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("unknown zero balance policy");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "unknown zero balance policy"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::configuration("unknown zero balance policy 'lenient'");
    assert_eq!(
        error.to_string(),
        "Configuration error: unknown zero balance policy 'lenient'"
    );
}
