//! Copies between the domain image types and OpenCV `Mat`. The Mat keeps
//! the frame's channel order; callers convert to BGR where OpenCV expects it.

use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

use crate::shared::frame::Frame;
use crate::shared::gray_image::GrayImage;

pub fn frame_to_mat(frame: &Frame) -> Result<Mat, Box<dyn std::error::Error>> {
    let typ = match frame.channels() {
        1 => CV_8UC1,
        3 => CV_8UC3,
        n => return Err(format!("Unsupported channel count for display: {n}").into()),
    };
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        typ,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(frame.data());
    Ok(mat)
}

/// Builds a frame from a continuous 8-bit Mat.
pub fn mat_to_frame(mat: &Mat, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let size = mat.size()?;
    let channels = mat.channels();
    if mat.depth() != opencv::core::CV_8U || !(channels == 1 || channels == 3) {
        return Err(format!("Unsupported Mat type {}", mat.typ()).into());
    }
    let data = mat.data_bytes()?.to_vec();
    Ok(Frame::try_new(
        data,
        size.width as u32,
        size.height as u32,
        channels as u8,
        index,
    )?)
}

/// Single-channel `CV_8UC1` copy of a grayscale image, as the cascade and
/// LBPH models expect.
pub fn gray_to_mat(image: &GrayImage) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        CV_8UC1,
        Scalar::all(0.0),
    )?;
    // Logical iteration order is row-major whatever the array's strides.
    for (dst, src) in mat.data_bytes_mut()?.iter_mut().zip(image.view().iter()) {
        *dst = *src;
    }
    Ok(mat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_to_mat_keeps_row_major_layout() {
        let gray = GrayImage::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mat = gray_to_mat(&gray).unwrap();
        assert_eq!(mat.typ(), CV_8UC1);
        assert_eq!((mat.cols(), mat.rows()), (3, 2));
        assert_eq!(mat.data_bytes().unwrap(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_frame_round_trips_through_mat() {
        let frame = Frame::new((0..12).collect(), 2, 2, 3, 9);
        let mat = frame_to_mat(&frame).unwrap();
        let back = mat_to_frame(&mat, 9).unwrap();
        assert_eq!(back.data(), frame.data());
        assert_eq!((back.width(), back.height(), back.channels()), (2, 2, 3));
    }

    #[test]
    fn test_unsupported_channel_count() {
        let frame = Frame::new(vec![0; 8], 2, 2, 2, 0);
        assert!(frame_to_mat(&frame).is_err());
    }
}
