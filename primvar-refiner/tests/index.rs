//! Tests for the Index newtype wrapper.

use primvar_refiner::far::StencilTable;
use primvar_refiner::Index;

#[test]
fn test_index_conversions() {
    assert_eq!(Index::from(42u32), Index(42));
    assert_eq!(Index::from(100usize), Index(100));

    let value: u32 = Index(7).into();
    assert_eq!(value, 7);

    let value: usize = Index(7).into();
    assert_eq!(value, 7);
}

#[test]
fn test_index_formatting() {
    assert_eq!(format!("{:?}", Index(42)), "Index(42)");
    assert_eq!(Index(42).to_string(), "42");
}

#[test]
fn test_index_ordering() {
    let mut indices = vec![Index(3), Index(1), Index(2)];
    indices.sort();
    assert_eq!(indices, [Index(1), Index(2), Index(3)]);
    assert_eq!(Index::default(), Index(0));
}

#[test]
fn test_index_in_stencils() {
    let mut table = StencilTable::default();
    table.push(&[4, 2], &[0.5, 0.5]);

    assert_eq!(table.control_indices(), &[Index(4), Index(2)]);
    assert_eq!(table.offsets(), &[Index(0)]);
    assert_eq!(table.control_vertex_count(), 5);
}
