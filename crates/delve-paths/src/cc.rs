//! Flood fill over a pather's neighbor graph.

use delve_core::Point;

use crate::PathRange;
use crate::traits::Pather;

impl PathRange {
    /// Flood-fill from a single point and return the set of connected cells,
    /// `p` included.
    pub fn cc_map<P: Pather>(&mut self, pather: &P, p: Point) -> Vec<Point> {
        self.cc_labels.fill(-1);

        let mut result = Vec::new();
        let Some(si) = self.idx(p) else {
            return result;
        };

        let mut nbuf = std::mem::take(&mut self.nbuf);

        self.cc_stack.clear();
        self.cc_stack.push(si);
        self.cc_labels[si] = 0;
        result.push(p);

        while let Some(ci) = self.cc_stack.pop() {
            let cp = self.point(ci);
            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                if self.cc_labels[ni] < 0 {
                    self.cc_labels[ni] = 0;
                    self.cc_stack.push(ni);
                    result.push(np);
                }
            }
        }

        self.nbuf = nbuf;
        result
    }
}
