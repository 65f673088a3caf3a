/// Tests for the error types and macros

use super::*;

// ============================================================================
// Tests: Display
// ============================================================================

#[test]
fn test_structural_display() {
    let err = Error::Structural("the root node cannot be destroyed".to_string());
    assert_eq!(
        err.to_string(),
        "Structural violation: the root node cannot be destroyed"
    );
}

#[test]
fn test_not_found_display() {
    let err = Error::NotFound("no camera named 'main'".to_string());
    assert_eq!(err.to_string(), "Not found: no camera named 'main'");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("mesh 'empty' has no sub-meshes".to_string());
    assert_eq!(err.to_string(), "Invalid resource: mesh 'empty' has no sub-meshes");
}

// ============================================================================
// Tests: Equality
// ============================================================================

#[test]
fn test_error_equality() {
    let a = Error::NotFound("x".to_string());
    let b = Error::NotFound("x".to_string());
    let c = Error::NotFound("y".to_string());
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, Error::Structural("x".to_string()));
}

// ============================================================================
// Tests: Macros
// ============================================================================

#[test]
fn test_engine_err_builds_variant() {
    let err = crate::engine_err!("nova3d::test", NotFound, "item {} is missing", 42);
    assert_eq!(err, Error::NotFound("item 42 is missing".to_string()));
}

#[test]
fn test_engine_bail_returns_early() {
    fn failing() -> Result<u32> {
        crate::engine_bail!("nova3d::test", Structural, "always fails");
    }
    let err = failing().unwrap_err();
    assert_eq!(err, Error::Structural("always fails".to_string()));
}

#[test]
fn test_error_implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(Error::NotFound("x".to_string()));
    assert!(err.to_string().contains("x"));
}
