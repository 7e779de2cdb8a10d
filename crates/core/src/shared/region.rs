/// An axis-aligned face rectangle in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Overlapping rectangle, or `None` when the regions do not overlap.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Clips the region to a `width` x `height` frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        self.intersection(&Region::new(0, 0, width as i32, height as i32))
    }
}
