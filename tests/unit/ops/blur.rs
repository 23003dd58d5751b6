use super::*;
use crate::foundation::core::{Extent, FrameIndex};

fn impulse(w: u32, h: u32) -> Frame {
    let mut f = Frame::filled(FrameIndex(0), Extent::new(w, h), 0.0);
    let (cx, cy) = (w as usize / 2, h as usize / 2);
    f.pixels_mut()[cy * w as usize + cx] = 1.0;
    f
}

#[test]
fn kernel_width_follows_six_sigma_rule() {
    assert_eq!(gauss_kernel(1.0, 100).len(), 7);
    assert_eq!(gauss_kernel(0.1, 100).len(), 3);
    assert_eq!(gauss_kernel(0.9, 100).len(), 7);
    let k = gauss_kernel(2.0, 100);
    assert_eq!(k.len(), 13);
    assert_eq!(k[6], 1.0);
    assert!((k[0] - k[12]).abs() < 1e-7);
}

#[test]
fn kernel_radius_is_capped() {
    assert_eq!(gauss_kernel(2.0, 4).len(), 9);
    let k = gauss_kernel(1e9, 5);
    assert_eq!(k.len(), 11);
    assert!(k.iter().all(|w| w.is_finite() && *w > 0.0));
    assert_eq!(gauss_kernel(f32::MAX, 2).len(), 5);
}

#[test]
fn huge_sigma_averages_small_frames() {
    for sigma in [20_000.0, 1e9, f32::MAX] {
        let src = impulse(2, 2);
        let mut dst = Frame::default();
        gauss_blur(&src, &mut dst, sigma).unwrap();
        for &v in dst.pixels() {
            assert!((v - 0.25).abs() < 1e-5, "sigma {sigma}: {v}");
        }
    }
}

#[test]
fn blur_preserves_constant_frames() {
    let src = Frame::filled(FrameIndex(0), Extent::new(6, 4), 0.75);
    let mut dst = Frame::default();
    gauss_blur(&src, &mut dst, 1.5).unwrap();
    for &v in dst.pixels() {
        assert!((v - 0.75).abs() < 1e-5, "{v}");
    }
}

#[test]
fn blur_spreads_an_impulse_symmetrically() {
    let src = impulse(15, 15);
    let mut dst = Frame::default();
    gauss_blur(&src, &mut dst, 1.0).unwrap();
    let c = dst.at(7, 7);
    assert!(c < 1.0 && c > 0.0);
    assert!((dst.at(6, 7) - dst.at(8, 7)).abs() < 1e-6);
    assert!((dst.at(7, 6) - dst.at(6, 7)).abs() < 1e-6);
    assert!(dst.at(6, 7) < c);
    let total: f32 = dst.pixels().iter().sum();
    assert!((total - 1.0).abs() < 1e-4, "{total}");
}

#[test]
fn non_positive_sigma_copies() {
    let src = impulse(3, 3);
    let mut dst = Frame::default();
    gauss_blur(&src, &mut dst, 0.0).unwrap();
    assert_eq!(dst.pixels(), src.pixels());
}

#[test]
fn sharpen_keeps_border_and_boosts_peaks() {
    let src = impulse(5, 5);
    let mut dst = Frame::default();
    sharpen(&src, &mut dst, 0.5).unwrap();
    assert_eq!(dst.at(4, 4), src.at(4, 4));
    assert_eq!(dst.at(0, 2), 0.0);
    assert_eq!(dst.at(2, 2), 2.0);
    assert_eq!(dst.at(1, 2), -0.25);
}

#[test]
fn sharpen_factor_of_one_is_rejected() {
    let mut dst = Frame::default();
    assert!(sharpen(&impulse(3, 3), &mut dst, 1.0).is_err());
}

#[test]
fn unsharp_mask_leaves_flat_frames_alone() {
    let src = Frame::filled(FrameIndex(0), Extent::new(5, 5), 0.4);
    let mut dst = Frame::default();
    unsharp_mask(&src, &mut dst, 1.0, 0.8).unwrap();
    for &v in dst.pixels() {
        assert!((v - 0.4).abs() < 1e-5);
    }
}

#[test]
fn unsharp_mask_raises_the_peak() {
    let src = impulse(7, 7);
    let mut dst = Frame::default();
    unsharp_mask(&src, &mut dst, 1.0, 1.0).unwrap();
    assert!(dst.at(3, 3) > 1.0);
}
