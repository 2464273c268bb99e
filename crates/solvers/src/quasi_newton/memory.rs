use std::collections::VecDeque;

use stackelberg_core::Vector;

/// One curvature pair: `s = x_{k+1} - x_k`, `y = g_{k+1} - g_k`.
struct Pair {
    s: Vector,
    y: Vector,
    rho: f64,
}

/// Limited-memory inverse Hessian approximation.
pub(super) struct History {
    pairs: VecDeque<Pair>,
    capacity: usize,
}

impl History {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(super) fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Stores a pair if it satisfies the curvature condition.
    ///
    /// Returns false if the pair was skipped.
    pub(super) fn push(&mut self, s: Vector, y: Vector) -> bool {
        let sy = s.dot(&y);
        let yy = y.dot(&y);
        if !(sy > f64::EPSILON * yy) {
            return false;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back(Pair { s, y, rho: 1.0 / sy });
        true
    }

    /// Two-loop recursion: returns `-H·g` restricted to the free components.
    ///
    /// Components where `free[i]` is false are zeroed before and after the
    /// recursion, so pinned variables never move.
    pub(super) fn direction(&self, gradient: &Vector, free: &[bool]) -> Vector {
        let mask = |v: &mut Vector| {
            v.iter_mut()
                .zip(free)
                .filter(|(_, f)| !**f)
                .for_each(|(vi, _)| *vi = 0.0);
        };

        let mut q = gradient.clone();
        mask(&mut q);

        let mut alpha = Vec::with_capacity(self.pairs.len());
        for pair in self.pairs.iter().rev() {
            let a = pair.rho * pair.s.dot(&q);
            q.scaled_add(-a, &pair.y);
            alpha.push(a);
        }

        // Initial approximation H0 = γI.
        if let Some(last) = self.pairs.back() {
            let yy = last.y.dot(&last.y);
            if yy > 0.0 {
                q *= last.s.dot(&last.y) / yy;
            }
        }

        for (pair, a) in self.pairs.iter().zip(alpha.into_iter().rev()) {
            let b = pair.rho * pair.y.dot(&q);
            q.scaled_add(a - b, &pair.s);
        }

        mask(&mut q);
        q.mapv_inplace(|v| -v);
        q
    }
}
