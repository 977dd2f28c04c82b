use iced::{Point, Rectangle, Size, Vector};

/// Rectangle spanned by two arbitrary corner points.
pub fn rect_between(a: Point, b: Point) -> Rectangle {
    Rectangle {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (a.x - b.x).abs(),
        height: (a.y - b.y).abs(),
    }
}

pub fn center(rect: &Rectangle) -> Point {
    Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

pub fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn offset_rect(rect: &Rectangle, offset: Vector) -> Rectangle {
    Rectangle {
        x: rect.x + offset.x,
        y: rect.y + offset.y,
        ..*rect
    }
}

pub fn expand_rect(rect: &Rectangle, amount: f32) -> Rectangle {
    Rectangle {
        x: rect.x - amount,
        y: rect.y - amount,
        width: rect.width + 2.0 * amount,
        height: rect.height + 2.0 * amount,
    }
}

pub fn intersects(a: &Rectangle, b: &Rectangle) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

pub fn contains(rect: &Rectangle, point: Point) -> bool {
    point.x >= rect.x
        && point.x <= rect.x + rect.width
        && point.y >= rect.y
        && point.y <= rect.y + rect.height
}

/// Evaluate a cubic bezier at `t`.
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    Point::new(
        mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x,
        mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y,
    )
}

/// Control points for a wire cubic: horizontally offset from each endpoint in
/// proportion to the horizontal span.
pub fn wire_controls(from: Point, to: Point) -> (Point, Point) {
    let d = 0.4 * (to.x - from.x).abs();
    (
        Point::new(from.x + d, from.y),
        Point::new(to.x - d, to.y),
    )
}

pub fn rect_size(rect: &Rectangle) -> Size {
    Size::new(rect.width, rect.height)
}
