//! Engine-independent 2D geometry value types.
//!
//! Everything here is plain value math over points and axis-aligned rectangles; there is no
//! rendering dependency. The clipping routine follows the classic CoSE border-intersection
//! algorithm: the segment between two rectangle centers is clipped against both borders, with
//! corner hits resolved through cardinal directions.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Axis-aligned rectangle with `(x, y)` as the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn x_max(&self) -> f64 {
        self.x + self.width
    }

    pub fn y_max(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangles share interior area (touching borders do not count).
    pub fn overlaps(&self, other: &Rect) -> bool {
        other.x_max() > self.x
            && other.x < self.x_max()
            && other.y_max() > self.y
            && other.y < self.y_max()
    }
}

/// Result of clipping the center-to-center segment of two rectangles.
///
/// When the rectangles overlap the clip points are the centers themselves and `overlapping` is
/// set; callers use that to skip spring-force application for coincident nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipping {
    pub overlapping: bool,
    pub clip_a: Point,
    pub clip_b: Point,
}

fn cardinal_direction(slope: f64, slope_prime: f64, line: i32) -> i32 {
    if slope > slope_prime {
        line
    } else {
        1 + line % 4
    }
}

/// Clips the segment between the centers of `rect_a` and `rect_b` against both borders.
pub fn clip_segment(rect_a: Rect, rect_b: Rect) -> Clipping {
    let p1 = rect_a.center();
    let p2 = rect_b.center();

    let mut clip_a = p1;
    let mut clip_b = p2;

    if rect_a.overlaps(&rect_b) {
        return Clipping {
            overlapping: true,
            clip_a,
            clip_b,
        };
    }

    let half_width_a = rect_a.width / 2.0;
    let half_height_a = rect_a.height / 2.0;
    let half_width_b = rect_b.width / 2.0;
    let half_height_b = rect_b.height / 2.0;

    if p1.x == p2.x {
        // Vertical segment: clip against the facing horizontal borders.
        if p1.y > p2.y {
            clip_a.y = rect_a.y;
            clip_b.y = rect_b.y_max();
        } else if p1.y < p2.y {
            clip_a.y = rect_a.y_max();
            clip_b.y = rect_b.y;
        }
        return Clipping {
            overlapping: false,
            clip_a,
            clip_b,
        };
    }

    if p1.y == p2.y {
        // Horizontal segment: clip against the facing vertical borders.
        if p1.x > p2.x {
            clip_a.x = rect_a.x;
            clip_b.x = rect_b.x_max();
        } else {
            clip_a.x = rect_a.x_max();
            clip_b.x = rect_b.x;
        }
        return Clipping {
            overlapping: false,
            clip_a,
            clip_b,
        };
    }

    // Slopes of the rectangle diagonals and of the center-to-center line.
    let slope_a = rect_a.height / rect_a.width;
    let slope_b = rect_b.height / rect_b.width;
    let slope_prime = (p2.y - p1.y) / (p2.x - p1.x);

    let mut clip_a_found = false;
    let mut clip_b_found = false;

    // The segment may pass exactly through a corner of either rectangle.
    if -slope_a == slope_prime {
        clip_a = if p1.x > p2.x {
            Point::new(rect_a.x, rect_a.y_max())
        } else {
            Point::new(rect_a.x_max(), rect_a.y)
        };
        clip_a_found = true;
    } else if slope_a == slope_prime {
        clip_a = if p1.x > p2.x {
            Point::new(rect_a.x, rect_a.y)
        } else {
            Point::new(rect_a.x_max(), rect_a.y_max())
        };
        clip_a_found = true;
    }

    if -slope_b == slope_prime {
        clip_b = if p2.x > p1.x {
            Point::new(rect_b.x, rect_b.y_max())
        } else {
            Point::new(rect_b.x_max(), rect_b.y)
        };
        clip_b_found = true;
    } else if slope_b == slope_prime {
        clip_b = if p2.x > p1.x {
            Point::new(rect_b.x, rect_b.y)
        } else {
            Point::new(rect_b.x_max(), rect_b.y_max())
        };
        clip_b_found = true;
    }

    if clip_a_found && clip_b_found {
        return Clipping {
            overlapping: false,
            clip_a,
            clip_b,
        };
    }

    let (cardinal_a, cardinal_b) = if p1.x > p2.x {
        if p1.y > p2.y {
            (
                cardinal_direction(slope_a, slope_prime, 4),
                cardinal_direction(slope_b, slope_prime, 2),
            )
        } else {
            (
                cardinal_direction(-slope_a, slope_prime, 3),
                cardinal_direction(-slope_b, slope_prime, 1),
            )
        }
    } else if p1.y > p2.y {
        (
            cardinal_direction(-slope_a, slope_prime, 1),
            cardinal_direction(-slope_b, slope_prime, 3),
        )
    } else {
        (
            cardinal_direction(slope_a, slope_prime, 2),
            cardinal_direction(slope_b, slope_prime, 4),
        )
    };

    if !clip_a_found {
        clip_a = match cardinal_a {
            1 => Point::new(p1.x - half_height_a / slope_prime, rect_a.y),
            2 => Point::new(rect_a.x_max(), p1.y + half_width_a * slope_prime),
            3 => Point::new(p1.x + half_height_a / slope_prime, rect_a.y_max()),
            _ => Point::new(rect_a.x, p1.y - half_width_a * slope_prime),
        };
    }

    if !clip_b_found {
        clip_b = match cardinal_b {
            1 => Point::new(p2.x - half_height_b / slope_prime, rect_b.y),
            2 => Point::new(rect_b.x_max(), p2.y + half_width_b * slope_prime),
            3 => Point::new(p2.x + half_height_b / slope_prime, rect_b.y_max()),
            _ => Point::new(rect_b.x, p2.y - half_width_b * slope_prime),
        };
    }

    Clipping {
        overlapping: false,
        clip_a,
        clip_b,
    }
}

/// Displacement that resolves the overlap of two rectangles when each is moved by the returned
/// amount in opposite directions. `separation_buffer` is added on both axes so the rectangles end
/// up strictly apart.
///
/// Panics if the rectangles do not overlap.
pub fn separation_amount(rect_a: Rect, rect_b: Rect, separation_buffer: f64) -> (f64, f64) {
    assert!(
        rect_a.overlaps(&rect_b),
        "separation_amount requires overlapping rectangles"
    );

    let direction_x = if rect_a.center().x < rect_b.center().x {
        -1.0
    } else {
        1.0
    };
    let direction_y = if rect_a.center().y < rect_b.center().y {
        -1.0
    } else {
        1.0
    };

    let mut overlap_x = rect_a.x_max().min(rect_b.x_max()) - rect_a.x.max(rect_b.x);
    let mut overlap_y = rect_a.y_max().min(rect_b.y_max()) - rect_a.y.max(rect_b.y);

    // When one rectangle spans the other on an axis, moving apart by the raw overlap is not
    // enough; account for the containment slack.
    if rect_a.x <= rect_b.x && rect_a.x_max() >= rect_b.x_max() {
        overlap_x += (rect_b.x - rect_a.x).min(rect_a.x_max() - rect_b.x_max());
    } else if rect_b.x <= rect_a.x && rect_b.x_max() >= rect_a.x_max() {
        overlap_x += (rect_a.x - rect_b.x).min(rect_b.x_max() - rect_a.x_max());
    }

    if rect_a.y <= rect_b.y && rect_a.y_max() >= rect_b.y_max() {
        overlap_y += (rect_b.y - rect_a.y).min(rect_a.y_max() - rect_b.y_max());
    } else if rect_b.y <= rect_a.y && rect_b.y_max() >= rect_a.y_max() {
        overlap_y += (rect_a.y - rect_b.y).min(rect_b.y_max() - rect_a.y_max());
    }

    let mut slope =
        ((rect_b.center().y - rect_a.center().y) / (rect_b.center().x - rect_a.center().x)).abs();
    if rect_a.center() == rect_b.center() {
        // Coincident centers: separate along the 45 degree diagonal.
        slope = 1.0;
    }

    let mut move_by_y = slope * overlap_x;
    let mut move_by_x = overlap_y / slope;

    if overlap_x < move_by_x {
        move_by_x = overlap_x;
    } else {
        move_by_y = overlap_y;
    }

    (
        -direction_x * (move_by_x / 2.0 + separation_buffer),
        -direction_y * (move_by_y / 2.0 + separation_buffer),
    )
}
