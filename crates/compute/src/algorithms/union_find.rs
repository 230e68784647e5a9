/// Disjoint-set forest over indices `0..n` with path halving and union by rank.
///
/// When two roots have equal rank the smaller index becomes the root, so the
/// resulting forest depends only on the order of `union` calls.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets holding `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (root, child) = match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Equal => {
                let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
                self.rank[root] += 1;
                (root, child)
            }
        };
        self.parent[child] = root;
        true
    }

    /// All sets, each sorted ascending, ordered by their smallest member.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
        let mut components: Vec<Vec<usize>> = Vec::new();

        for x in 0..n {
            let root = self.find(x);
            let slot = *slot_of_root[root].get_or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(x);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_by_default() {
        let mut uf = UnionFind::new(3);
        assert_eq!(uf.components(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn union_merges_transitively() {
        let mut uf = UnionFind::new(6);
        assert!(uf.union(4, 2));
        assert!(uf.union(2, 0));
        assert!(uf.union(5, 3));
        assert!(!uf.union(0, 4));

        assert_eq!(uf.find(0), uf.find(4));
        assert_ne!(uf.find(0), uf.find(3));
        assert_eq!(uf.components(), vec![vec![0, 2, 4], vec![1], vec![3, 5]]);
    }

    #[test]
    fn empty_forest() {
        let mut uf = UnionFind::new(0);
        assert!(uf.components().is_empty());
    }
}
