//! Line of sight between cell centres.
//!
//! The segment joining the two centres is swept column by column. In each
//! column the rows the segment passes through are those between the rows
//! hit at the column's left and right boundaries. A boundary crossing that
//! lands exactly on a row border touches no row by itself, so lines grazing
//! a corner are not blocked by it. All intersections are computed with
//! integer arithmetic in half-cell units, which makes the swept set
//! identical in both directions.

use delve_core::{Grid, Point, TerrainTile};

/// Whether an unobstructed straight line joins the centres of `origin` and
/// `target`. The endpoints themselves are never checked.
///
/// # Panics
///
/// Panics if either endpoint lies outside the grid.
pub fn has_sight(grid: &Grid<TerrainTile>, origin: Point, target: Point) -> bool {
    assert!(
        grid.contains(origin) && grid.contains(target),
        "sight query {origin} -> {target} outside grid {}",
        grid.bounds()
    );
    let mut clear = true;
    for_each_crossed(origin, target, |p| {
        if p != origin && p != target && !grid[p].traversable() {
            clear = false;
        }
    });
    clear
}

/// Visit every cell the segment from `origin` to `target` crosses, endpoints
/// included. Cells may be visited in any order.
pub(crate) fn for_each_crossed(origin: Point, target: Point, mut visit: impl FnMut(Point)) {
    if origin == target {
        visit(origin);
        return;
    }
    if origin.x == target.x {
        let (lo, hi) = (origin.y.min(target.y), origin.y.max(target.y));
        for y in lo..=hi {
            visit(Point::new(origin.x, y));
        }
        return;
    }

    let step = (target.x - origin.x).signum();
    let dx = i64::from(target.x - origin.x);
    let dy = i64::from(target.y - origin.y);

    // Rows touched at the boundary already crossed, as an inclusive span
    // that may be empty (lo > hi).
    let (mut prev_lo, mut prev_hi) = (origin.y, origin.y);
    let mut x = origin.x;
    while x != target.x {
        let (lo, hi) = boundary_rows(origin, dx, dy, x, step);
        for y in prev_lo.min(lo)..=prev_hi.max(hi) {
            visit(Point::new(x, y));
        }
        prev_lo = lo;
        prev_hi = hi;
        x += step;
    }
    for y in prev_lo.min(target.y)..=prev_hi.max(target.y) {
        visit(Point::new(target.x, y));
    }
}

/// Rows hit where the segment crosses the border between column `x` and
/// column `x + step`.
///
/// The crossing height is `n / d` with `d > 0`. A height strictly inside a
/// row yields that row; a height exactly on the border between rows `r` and
/// `r + 1` yields the empty span `(r + 1, r)`.
fn boundary_rows(origin: Point, dx: i64, dy: i64, x: i32, step: i32) -> (i32, i32) {
    let offset = 2 * i64::from(x - origin.x) + i64::from(step);
    let mut n = 2 * dx * i64::from(origin.y) + dy * offset;
    let mut d = 2 * dx;
    if d < 0 {
        n = -n;
        d = -d;
    }
    // round half up / round half down of n / d
    let lo = (2 * n + d).div_euclid(2 * d);
    let hi = -(d - 2 * n).div_euclid(2 * d);
    (lo as i32, hi as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(w: i32, h: i32) -> Grid<TerrainTile> {
        Grid::new(w, h, TerrainTile::Floor)
    }

    fn crossed(a: Point, b: Point) -> Vec<Point> {
        let mut v = Vec::new();
        for_each_crossed(a, b, |p| v.push(p));
        v.sort();
        v.dedup();
        v
    }

    #[test]
    fn same_point_always_visible() {
        let mut g = open(3, 3);
        g.set(Point::new(1, 1), TerrainTile::Wall);
        assert!(has_sight(&g, Point::new(1, 1), Point::new(1, 1)));
    }

    #[test]
    fn wall_between_blocks_both_ways() {
        let mut g = open(5, 5);
        g.set(Point::new(2, 2), TerrainTile::Wall);
        let (a, b) = (Point::new(1, 2), Point::new(3, 2));
        assert!(!has_sight(&g, a, b));
        assert!(!has_sight(&g, b, a));
        let (c, d) = (Point::new(2, 1), Point::new(2, 3));
        assert!(!has_sight(&g, c, d));
        assert!(!has_sight(&g, d, c));
        assert!(has_sight(&g, Point::new(1, 1), Point::new(3, 1)));
    }

    #[test]
    fn endpoints_are_not_obstacles() {
        let mut g = open(4, 1);
        g.set(Point::new(0, 0), TerrainTile::Wall);
        g.set(Point::new(3, 0), TerrainTile::Wall);
        assert!(has_sight(&g, Point::new(0, 0), Point::new(3, 0)));
    }

    #[test]
    fn exact_diagonal_grazes_corners_only() {
        // A perfect diagonal passes through cell corners; the off-diagonal
        // cells are merely touched.
        let cells = crossed(Point::new(0, 0), Point::new(3, 3));
        assert_eq!(
            cells,
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2), Point::new(3, 3)]
        );
        let mut g = open(4, 4);
        g.set(Point::new(1, 0), TerrainTile::Wall);
        g.set(Point::new(0, 1), TerrainTile::Wall);
        assert!(has_sight(&g, Point::new(0, 0), Point::new(3, 3)));
        g.set(Point::new(2, 2), TerrainTile::Wall);
        assert!(!has_sight(&g, Point::new(0, 0), Point::new(3, 3)));
    }

    #[test]
    fn shallow_slope_crosses_expected_cells() {
        // y = x / 4 from (0,0) to (4,1): enters row 1 inside column 2.
        let cells = crossed(Point::new(0, 0), Point::new(4, 1));
        assert_eq!(
            cells,
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(4, 1),
            ]
        );
    }

    #[test]
    fn crossed_cells_are_direction_independent() {
        let pts = [
            Point::new(0, 0),
            Point::new(7, 2),
            Point::new(3, 9),
            Point::new(8, 8),
            Point::new(1, 5),
            Point::new(6, 0),
            Point::new(2, 3),
        ];
        for &a in &pts {
            for &b in &pts {
                assert_eq!(crossed(a, b), crossed(b, a), "{a} <-> {b}");
            }
        }
    }

    #[test]
    fn sight_is_symmetric_on_cluttered_grid() {
        let g = Grid::from_fn(12, 12, |p| {
            if (p.x * 7 + p.y * 3) % 5 == 0 {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            }
        });
        for a in g.bounds() {
            for b in g.bounds() {
                assert_eq!(has_sight(&g, a, b), has_sight(&g, b, a), "{a} <-> {b}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "outside grid")]
    fn out_of_range_endpoint_panics() {
        let g = open(3, 3);
        has_sight(&g, Point::new(0, 0), Point::new(3, 0));
    }
}
