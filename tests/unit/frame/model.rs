use super::*;

#[test]
fn new_checks_pixel_count() {
    assert!(Frame::new(FrameIndex(0), Extent::new(2, 2), vec![0.0; 3]).is_err());
    let f = Frame::new(FrameIndex(0), Extent::new(2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    assert_eq!(f.at(1, 1), 3.0);
    assert_eq!(f.row(1), &[2.0, 3.0]);
}

#[test]
fn ensure_extent_allocates_once_then_guards_size() {
    let mut f = Frame::default();
    assert!(!f.is_allocated());
    f.ensure_extent(Extent::new(3, 2)).unwrap();
    assert!(f.is_allocated());
    assert_eq!(f.pixels().len(), 6);
    f.ensure_extent(Extent::new(3, 2)).unwrap();
    assert!(matches!(
        f.ensure_extent(Extent::new(2, 3)),
        Err(WeaselError::Execution(_))
    ));
}

#[test]
fn store_reuses_buffer_and_rejects_size_change() {
    let mut f = Frame::default();
    f.store(FrameIndex(4), Extent::new(1, 2), &[0.25, 0.5]).unwrap();
    assert_eq!(f.index, FrameIndex(4));
    f.store(FrameIndex(5), Extent::new(1, 2), &[0.75, 1.0]).unwrap();
    assert_eq!(f.pixels(), &[0.75, 1.0]);
    assert!(matches!(
        f.store(FrameIndex(6), Extent::new(2, 1), &[0.0, 0.0]),
        Err(WeaselError::Decode(_))
    ));
}
