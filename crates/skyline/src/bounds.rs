//! Width lower and upper bounds.
//!
//! The tall-rectangle bound sums only the widths of rectangles taller than
//! half the strip. Summing every width gives a width that always packs, not
//! one that can never be beaten, so it serves as the upper bound instead.

use u_strip_core::{Coord, Parameters, Rectangle};

/// Lower bounds on the strip width of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerBounds {
    /// Area bound: `ceil(total area / height)`.
    pub lb1: Coord,
    /// Summed width of rectangles taller than half the strip; no two of
    /// them can share a column.
    pub lb2: Coord,
    /// Summed width of rectangles exactly half the strip high; they pair
    /// up at best.
    pub lb3: Coord,
    /// The bound used by the search.
    pub value: Coord,
}

impl LowerBounds {
    /// Computes the bounds. With rotation only the area bound holds.
    pub fn compute(params: &Parameters) -> Self {
        let height = params.height.max(1);
        let lb1 = ceil_div(params.total_area(), height);

        let mut lb2 = 0;
        let mut lb3 = 0;
        for r in &params.rectangles {
            match (2 * r.height).cmp(&height) {
                std::cmp::Ordering::Greater => lb2 += r.width,
                std::cmp::Ordering::Equal => lb3 += r.width,
                std::cmp::Ordering::Less => {}
            }
        }

        let value = if params.rotation_allowed {
            lb1
        } else {
            lb1.max(lb2 + ceil_div(lb3, 2))
        };

        Self {
            lb1,
            lb2,
            lb3,
            value: value.max(1),
        }
    }
}

/// Orientation of `rect` in the side-by-side layout: the narrowest one
/// that fits the height.
fn upright(rect: &Rectangle, height: Coord, rotation_allowed: bool) -> bool {
    if !rotation_allowed || rect.is_square() {
        return false;
    }
    let long = rect.max_side();
    // Too long to stand up: the long side lies along the width.
    let stand = long <= height;
    (rect.height == long) != stand
}

/// Width of every rectangle standing side by side, in its narrowest
/// orientation that fits the height.
pub fn trivial_upper_bound(params: &Parameters) -> Coord {
    params
        .rectangles
        .iter()
        .map(|r| r.oriented(upright(r, params.height, params.rotation_allowed)).width)
        .sum::<Coord>()
        .max(1)
}

/// Places every rectangle in one row along the top of the strip, in input
/// order, each in the orientation [`trivial_upper_bound`] assumes.
///
/// Valid for any instance that passes [`Parameters::validate`]; the layout
/// is exactly [`trivial_upper_bound`] wide.
pub fn side_by_side(params: &Parameters) -> Vec<Rectangle> {
    let mut x = 0;
    params
        .rectangles
        .iter()
        .map(|r| {
            let mut rect = r.clone();
            rect.reset();
            let mut rect = rect.oriented(upright(r, params.height, params.rotation_allowed));
            rect.place_at(x, 0);
            x += rect.width;
            rect
        })
        .collect()
}

fn ceil_div(a: Coord, b: Coord) -> Coord {
    (a + b - 1) / b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_bound_dominates() {
        // Nothing taller than half the strip.
        let params =
            Parameters::new(10).with_rectangles([(5, 4), (5, 4), (10, 4), (10, 4), (5, 4)]);
        assert_eq!(params.total_area(), 160);
        let lb = LowerBounds::compute(&params);
        assert_eq!(lb.lb1, 16);
        assert_eq!(lb.lb2, 0);
        assert_eq!(lb.value, 16);
    }

    #[test]
    fn test_tall_rectangles() {
        // Area 100, height 10, every rectangle taller than 5, none exactly 5.
        let params =
            Parameters::new(10).with_rectangles([(2, 10), (4, 8), (4, 7), (2, 6), (1, 8)]);
        assert_eq!(params.total_area(), 100);
        let lb = LowerBounds::compute(&params);
        assert_eq!(lb.lb1, 10);
        assert_eq!(lb.lb2, 13);
        assert_eq!(lb.lb3, 0);
        assert_eq!(lb.value, 13);

        let rotated = LowerBounds::compute(&params.clone().with_rotation(true));
        assert_eq!(rotated.value, 10);
    }

    #[test]
    fn test_half_height_pairs() {
        let params = Parameters::new(10).with_rectangles([(3, 5), (3, 5), (3, 5), (4, 6)]);
        let lb = LowerBounds::compute(&params);
        assert_eq!(lb.lb2, 4);
        assert_eq!(lb.lb3, 9);
        assert_eq!(lb.value, 4 + 5);
    }

    #[test]
    fn test_area_rounds_up() {
        let params = Parameters::new(10).with_rectangle(3, 3);
        assert_eq!(LowerBounds::compute(&params).lb1, 1);
    }

    #[test]
    fn test_side_by_side_layout() {
        let params = Parameters::new(5)
            .with_rotation(true)
            .with_rectangles([(2, 5), (8, 4), (2, 4), (6, 5), (8, 2), (5, 4)]);
        let row = side_by_side(&params);
        assert_eq!(row.len(), 6);
        let right = row.iter().map(Rectangle::right).max().unwrap();
        assert_eq!(right, trivial_upper_bound(&params));
        assert_eq!(right, 30);
        for (i, a) in row.iter().enumerate() {
            assert!(a.placed && a.bottom() <= 5);
            assert!(row[i + 1..].iter().all(|b| !a.overlaps(b)));
        }
        // (5, 4) stands on its short side; (8, 4) is too long to stand.
        assert_eq!((row[5].width, row[5].height), (4, 5));
        assert_eq!((row[1].width, row[1].height), (8, 4));
    }

    #[test]
    fn test_trivial_upper_bound() {
        let params = Parameters::new(10).with_rectangles([(4, 6), (2, 8), (12, 3)]);
        assert_eq!(trivial_upper_bound(&params), 18);
        let rotated = params.with_rotation(true);
        assert_eq!(trivial_upper_bound(&rotated), 4 + 2 + 12);
    }
}
