use super::*;
use crate::foundation::core::FrameIndex;

fn frame(w: u32, h: u32, data: Vec<f32>) -> Frame {
    Frame::new(FrameIndex(0), Extent::new(w, h), data).unwrap()
}

#[test]
fn copy_duplicates_pixels() {
    let src = frame(2, 1, vec![0.1, 0.2]);
    let mut dst = Frame::default();
    copy(&src, &mut dst).unwrap();
    assert_eq!(dst.pixels(), src.pixels());
}

#[test]
fn copy_of_unallocated_frame_fails() {
    let mut dst = Frame::default();
    let err = copy(&Frame::default(), &mut dst).unwrap_err();
    assert!(matches!(err, WeaselError::Execution(_)));
}

#[test]
fn subtract_uses_overlapping_region() {
    let a = frame(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = frame(2, 3, vec![0.5, 0.5, 1.0, 1.0, 9.0, 9.0]);
    let mut out = Frame::default();
    subtract(&a, &b, &mut out).unwrap();
    assert_eq!(out.extent(), Extent::new(2, 2));
    assert_eq!(out.pixels(), &[0.5, 1.5, 3.0, 4.0]);
}

#[test]
fn concatenate_places_frames_left_to_right() {
    let left = frame(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    let right = frame(1, 3, vec![7.0, 8.0, 9.0]);
    let mut out = Frame::default();
    concatenate(&[&left, &right], &mut out).unwrap();
    assert_eq!(out.extent(), Extent::new(3, 2));
    assert_eq!(out.pixels(), &[1.0, 2.0, 7.0, 3.0, 4.0, 8.0]);
}

#[test]
fn concatenate_needs_frames() {
    let mut out = Frame::default();
    assert!(concatenate(&[], &mut out).is_err());
}
