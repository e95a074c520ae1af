use crate::descriptor::InjectDescriptor;
use crate::type_ref::TypeRef;
use std::collections::{BTreeMap, BTreeSet};

/// Static view of the injectable graph.
///
/// Edges point from a target to its constructor parameters. Only used for
/// reporting; the generated resolver never consults it.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<TypeRef, Vec<TypeRef>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    pub fn new<'a>(descriptors: impl IntoIterator<Item = &'a InjectDescriptor>) -> Self {
        let edges = descriptors
            .into_iter()
            .map(|d| (d.target.clone(), d.parameters.clone()))
            .collect();
        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Dependencies no descriptor constructs. They have to be bound on the
    /// resolver before anything needing them is injected.
    pub fn unbound(&self) -> Vec<TypeRef> {
        let unbound: BTreeSet<&TypeRef> = self
            .edges
            .values()
            .flatten()
            .filter(|dep| !self.edges.contains_key(*dep))
            .collect();
        unbound.into_iter().cloned().collect()
    }

    /// First cycle found, as the path `A, B, ..., A`.
    ///
    /// Traversal follows target order and then parameter order, so the
    /// reported cycle is stable for a given descriptor set.
    pub fn find_cycle(&self) -> Option<Vec<TypeRef>> {
        let mut marks: BTreeMap<&TypeRef, Mark> = BTreeMap::new();
        let mut path: Vec<&TypeRef> = Vec::new();
        for start in self.edges.keys() {
            if marks.contains_key(start) {
                continue;
            }
            if let Some(cycle) = self.visit(start, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        node: &'a TypeRef,
        marks: &mut BTreeMap<&'a TypeRef, Mark>,
        path: &mut Vec<&'a TypeRef>,
    ) -> Option<Vec<TypeRef>> {
        marks.insert(node, Mark::Visiting);
        path.push(node);

        for dep in self.edges.get(node).into_iter().flatten() {
            match marks.get(dep) {
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle: Vec<TypeRef> = path[start..].iter().map(|n| (*n).clone()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(cycle) = self.visit(dep, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        marks.insert(node, Mark::Done);
        None
    }
}

/// `A -> B -> A`
pub fn format_cycle(cycle: &[TypeRef]) -> String {
    cycle
        .iter()
        .map(TypeRef::qualified)
        .collect::<Vec<_>>()
        .join(" -> ")
}
