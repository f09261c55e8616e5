use iced::{Point, Rectangle, Size};

/// An in-progress rubber-band selection in widget coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    pub origin: Point,
    pub current: Point,
}

impl RubberBand {
    /// Start a band anchored at `origin` with zero size
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            current: origin,
        }
    }

    pub fn update(&mut self, position: Point) {
        self.current = position;
    }

    /// The band's rectangle with non-negative width and height
    pub fn rect(&self) -> Rectangle {
        let x = self.origin.x.min(self.current.x);
        let y = self.origin.y.min(self.current.y);
        Rectangle::new(
            Point::new(x, y),
            Size::new(
                (self.origin.x - self.current.x).abs(),
                (self.origin.y - self.current.y).abs(),
            ),
        )
    }
}
