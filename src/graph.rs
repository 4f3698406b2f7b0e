use std::cmp;
use std::collections::HashMap;
use std::hash::Hash;

/// A directed graph over arbitrary hashable objects, backed by a dense [`Graph`].
#[derive(Clone)]
pub struct ObjectGraph<T>
where
    T: Eq + Hash + Clone,
{
    g: Graph,
    obj_to_node: HashMap<T, usize>,
    node_to_obj: Vec<T>,
}

impl<T: Eq + Hash + Clone> ObjectGraph<T> {
    pub fn new() -> Self {
        Self {
            g: Graph::new(),
            obj_to_node: HashMap::new(),
            node_to_obj: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, from: &T, to: &T) {
        let n_from = self.add_or_get_node(from);
        let n_to = self.add_or_get_node(to);
        self.g.add_edge(n_from, n_to);
    }

    pub fn get_node_index(&self, node: &T) -> Option<usize> {
        self.obj_to_node.get(node).copied()
    }

    pub fn get_object(&self, index: usize) -> Option<&T> {
        self.node_to_obj.get(index)
    }

    pub fn get_edges_from_index(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.g.edges[index].iter().copied()
    }

    /// Find strongly connected components.
    ///
    /// Returns a graph of components where each node is the list of its members.
    pub fn find_strongly_connected(&self) -> ObjectGraph<Vec<T>> {
        let (scc, m) = self.g.find_strongly_connected();
        let mut groups: Vec<Vec<T>> = vec![Vec::new(); scc.get_node_count()];
        for (my_node, scc_node) in m.into_iter().enumerate() {
            groups[scc_node].push(self.node_to_obj[my_node].clone());
        }
        let group_to_node = groups
            .iter()
            .enumerate()
            .map(|(scc_node, group)| (group.clone(), scc_node))
            .collect();
        ObjectGraph {
            g: scc,
            obj_to_node: group_to_node,
            node_to_obj: groups,
        }
    }

    /// Find an ordering of the objects,
    /// such that if there's an edge from V to W,
    /// then W comes before V in the ordering.
    /// Returns an object on a cycle if there is one.
    pub fn inverse_topsort(&self) -> Result<Vec<T>, T> {
        self.g
            .inverse_topsort()
            .map(|v| v.iter().map(|k| self.node_to_obj[*k].clone()).collect())
            .map_err(|v| self.node_to_obj[v].clone())
    }

    fn add_or_get_node(&mut self, obj: &T) -> usize {
        if let Some(n) = self.obj_to_node.get(obj) {
            return *n;
        }
        let new_id = self.node_to_obj.len();
        self.node_to_obj.push(obj.clone());
        self.obj_to_node.insert(obj.clone(), new_id);
        self.g.add_nodes_up_to(new_id);
        new_id
    }
}

/// Dense adjacency-list graph over `0..n`.
#[derive(Clone, Debug)]
pub struct Graph {
    edges: Vec<Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn with_nodes(n: usize) -> Self {
        Self {
            edges: vec![Vec::new(); n],
        }
    }

    pub fn add_nodes_up_to(&mut self, n: usize) {
        if n >= self.edges.len() {
            self.edges.resize(n + 1, Vec::new());
        }
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.add_nodes_up_to(from);
        self.add_nodes_up_to(to);
        self.edges[from].push(to);
    }

    pub fn add_edge_unique(&mut self, from: usize, to: usize) {
        self.add_nodes_up_to(from);
        self.add_nodes_up_to(to);
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    pub fn get_node_count(&self) -> usize {
        self.edges.len()
    }

    /// Find strongly connected components.
    ///
    /// Returns the graph of components and a mapping from the nodes of the original graph
    /// to the nodes of the SCC graph.
    pub fn find_strongly_connected(&self) -> (Graph, Vec<usize>) {
        // https://en.wikipedia.org/wiki/Tarjan%27s_strongly_connected_components_algorithm
        let mut tarjan = Tarjan::new(self.edges.len());
        for v in 0..self.edges.len() {
            if tarjan.indices[v].is_none() {
                tarjan.strongconnect(v, &self.edges);
            }
        }

        let mut v_to_scc: Vec<usize> = vec![0; self.edges.len()];
        for (i, scc) in tarjan.result.iter().enumerate() {
            for v in scc {
                v_to_scc[*v] = i;
            }
        }
        let mut result_graph = Graph::with_nodes(tarjan.result.len());
        for (v, ws) in self.edges.iter().enumerate() {
            for w in ws {
                if v_to_scc[v] != v_to_scc[*w] {
                    result_graph.add_edge_unique(v_to_scc[v], v_to_scc[*w]);
                }
            }
        }
        (result_graph, v_to_scc)
    }

    /// Find an ordering of the vertices,
    /// such that if there's an edge from V to W,
    /// then W comes before V in the ordering.
    /// Returns a vertex on a cycle if there are loops in the graph.
    pub fn inverse_topsort(&self) -> Result<Vec<usize>, usize> {
        let n = self.edges.len();
        let mut result: Vec<usize> = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut on_path = vec![false; n];

        fn dfs(
            v: usize,
            edges: &[Vec<usize>],
            visited: &mut [bool],
            on_path: &mut [bool],
            result: &mut Vec<usize>,
        ) -> Result<(), usize> {
            if visited[v] {
                return Ok(());
            }
            if on_path[v] {
                return Err(v);
            }
            on_path[v] = true;
            for w in edges[v].iter() {
                dfs(*w, edges, visited, on_path, result)?;
            }
            on_path[v] = false;
            visited[v] = true;
            result.push(v);
            Ok(())
        }

        for i in 0..n {
            dfs(i, &self.edges, &mut visited, &mut on_path, &mut result)?;
        }
        Ok(result)
    }
}

/// Per-run state of Tarjan's algorithm.
struct Tarjan {
    stack: Vec<usize>,
    indices: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    index: usize,
    result: Vec<Vec<usize>>,
}

impl Tarjan {
    fn new(n: usize) -> Self {
        Self {
            stack: Vec::new(),
            indices: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            index: 0,
            result: Vec::new(),
        }
    }

    fn strongconnect(&mut self, v: usize, edges: &[Vec<usize>]) {
        self.indices[v] = Some(self.index);
        self.lowlink[v] = self.index;
        self.index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
        for w in edges[v].iter().copied() {
            match self.indices[w] {
                None => {
                    self.strongconnect(w, edges);
                    self.lowlink[v] = cmp::min(self.lowlink[v], self.lowlink[w]);
                }
                // w is on the stack and hence in the current SCC.
                // Otherwise (v, w) points to an SCC already found and is ignored.
                Some(w_index) if self.on_stack[w] => {
                    self.lowlink[v] = cmp::min(self.lowlink[v], w_index);
                }
                Some(_) => (),
            }
        }
        if Some(self.lowlink[v]) == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            self.result.push(scc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scc() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(3, 4);
        g.add_edge(4, 0);
        g.add_edge(6, 7);
        g.add_edge(6, 8);
        let (scc, m) = g.find_strongly_connected();
        assert_eq!(scc.get_node_count(), 5);
        for v in 1..5 {
            assert_eq!(m[0], m[v]);
        }
        for v in 5..9 {
            for w in (v + 1)..9 {
                assert_ne!(m[v], m[w]);
            }
            assert_ne!(m[v], m[0]);
        }
        assert!(!scc.edges[m[0]].contains(&m[0]));
        assert!(scc.edges[m[6]].contains(&m[7]));
        assert!(scc.edges[m[6]].contains(&m[8]));
        assert!(!scc.edges[m[7]].contains(&m[6]));
    }

    #[test]
    fn test_scc_empty() {
        let g = Graph::new();
        let (scc, m) = g.find_strongly_connected();
        assert_eq!(scc.get_node_count(), 0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_topsort_fail() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 0);
        assert!(g.inverse_topsort().is_err());
    }

    fn pos(v: &[usize], x: usize) -> usize {
        v.iter().position(|y| *y == x).unwrap()
    }

    #[test]
    fn test_topsort() {
        let mut g = Graph::new();
        g.add_edge(0, 4);
        g.add_edge(1, 2);
        g.add_edge(1, 3);
        g.add_edge(4, 3);
        g.add_edge(4, 1);
        let r = g.inverse_topsort().unwrap();
        assert_eq!(r.len(), 5);
        assert!(pos(&r, 0) > pos(&r, 4));
        assert!(pos(&r, 1) > pos(&r, 2));
        assert!(pos(&r, 1) > pos(&r, 3));
        assert!(pos(&r, 4) > pos(&r, 3));
        assert!(pos(&r, 4) > pos(&r, 1));
    }

    #[test]
    fn test_object_graph_components() {
        let mut g = ObjectGraph::new();
        g.add_edge(&"a", &"b");
        g.add_edge(&"b", &"a");
        g.add_edge(&"c", &"a");
        let scc = g.find_strongly_connected();
        assert_eq!(scc.g.get_node_count(), 2);
        let order = scc.inverse_topsort().unwrap();
        // the {a, b} cycle has to come before c which points into it
        assert_eq!(order.len(), 2);
        assert_eq!(order[1], vec!["c"]);
        let c = g.get_node_index(&"c").unwrap();
        let succs: Vec<_> = g.get_edges_from_index(c).collect();
        assert_eq!(succs, vec![g.get_node_index(&"a").unwrap()]);
    }
}
