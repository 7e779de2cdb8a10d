use opencv::core::{Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use crate::display::domain::overlay::{Annotation, BoxStyle, Color, LabelStyle, Overlay};
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::frame_to_mat;

/// Draws with `imgproc` onto one Mat copy of the frame per call, then
/// writes the pixels back.
#[derive(Default)]
pub struct OpenCvOverlay;

impl OpenCvOverlay {
    pub fn new() -> Self {
        Self
    }
}

/// The Mat shares the frame's RGB order, so the scalar does too.
fn scalar(color: Color) -> Scalar {
    Scalar::new(color[0] as f64, color[1] as f64, color[2] as f64, 0.0)
}

impl Overlay for OpenCvOverlay {
    fn draw(
        &mut self,
        frame: &mut Frame,
        annotations: &[Annotation],
        box_style: &BoxStyle,
        label_style: &LabelStyle,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if annotations.is_empty() {
            return Ok(());
        }
        let mut mat = frame_to_mat(frame)?;
        for a in annotations {
            let r = &a.region;
            imgproc::rectangle(
                &mut mat,
                Rect::new(r.x, r.y, r.width, r.height),
                scalar(box_style.color),
                box_style.thickness,
                imgproc::LINE_8,
                0,
            )?;
            imgproc::put_text(
                &mut mat,
                &a.caption,
                Point::new(a.origin.0, a.origin.1),
                imgproc::FONT_HERSHEY_SIMPLEX,
                label_style.scale,
                scalar(label_style.color),
                label_style.thickness,
                imgproc::LINE_8,
                false,
            )?;
        }
        frame.data_mut().copy_from_slice(mat.data_bytes()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::Region;

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let i = (y * frame.width() as usize + x) * 3;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    #[test]
    fn test_draws_every_box_and_caption_in_one_call() {
        let mut frame = Frame::new(vec![0; 120 * 120 * 3], 120, 120, 3, 0);
        let annotations = vec![
            Annotation {
                region: Region::new(10, 40, 30, 30),
                caption: "ID: 1".into(),
                origin: (10, 30),
            },
            Annotation {
                region: Region::new(70, 40, 30, 30),
                caption: "ID: 2".into(),
                origin: (70, 30),
            },
        ];

        OpenCvOverlay::new()
            .draw(
                &mut frame,
                &annotations,
                &BoxStyle::default(),
                &LabelStyle::default(),
            )
            .unwrap();

        // Left edges of both boxes are green; the box interiors are untouched.
        assert_eq!(pixel(&frame, 10, 55), [0, 255, 0]);
        assert_eq!(pixel(&frame, 70, 55), [0, 255, 0]);
        assert_eq!(pixel(&frame, 25, 55), [0, 0, 0]);
        // Some white caption pixels land above each box.
        let white_above = |x0: usize| {
            (15..35).any(|y| (x0..x0 + 40).any(|x| pixel(&frame, x, y) == [255, 255, 255]))
        };
        assert!(white_above(10));
        assert!(white_above(70));
    }

    #[test]
    fn test_no_annotations_leaves_frame_untouched() {
        let mut frame = Frame::new(vec![9; 4 * 4 * 3], 4, 4, 3, 0);
        OpenCvOverlay::new()
            .draw(&mut frame, &[], &BoxStyle::default(), &LabelStyle::default())
            .unwrap();
        assert!(frame.data().iter().all(|&v| v == 9));
    }
}
