use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// RGB triple, in the same channel order as [`Frame`].
pub type Color = [u8; 3];

pub const GREEN: Color = [0, 255, 0];
pub const WHITE: Color = [255, 255, 255];

#[derive(Clone, Debug, PartialEq)]
pub struct BoxStyle {
    pub color: Color,
    pub thickness: i32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: GREEN,
            thickness: 2,
        }
    }
}

/// Text drawn in the Hershey simplex face.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    pub color: Color,
    pub scale: f64,
    pub thickness: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            color: WHITE,
            scale: 1.0,
            thickness: 2,
        }
    }
}

/// One recognised face: its box and the caption drawn above it.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub region: Region,
    pub caption: String,
    /// Bottom-left corner of the caption baseline.
    pub origin: (i32, i32),
}

/// Draws detection results onto a frame in place.
pub trait Overlay: Send {
    /// Draws every annotation for one frame in a single pass, boxes in
    /// `box_style` and captions in `label_style`.
    fn draw(
        &mut self,
        frame: &mut Frame,
        annotations: &[Annotation],
        box_style: &BoxStyle,
        label_style: &LabelStyle,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles() {
        assert_eq!(
            BoxStyle::default(),
            BoxStyle {
                color: [0, 255, 0],
                thickness: 2
            }
        );
        let label = LabelStyle::default();
        assert_eq!(label.color, [255, 255, 255]);
        assert_eq!(label.scale, 1.0);
        assert_eq!(label.thickness, 2);
    }
}
