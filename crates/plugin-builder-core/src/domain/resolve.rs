//! Inheritance ordering for records.
//!
//! Kahn's algorithm over an index-based adjacency list. Nodes with no
//! pending parents are processed first-in first-out, so among independent
//! records the input order is kept.

use std::collections::{HashMap, VecDeque};

use crate::domain::{entities::RecordDefinition, error::DomainError};

/// Orders `graph` so that every node comes after all of its parents.
///
/// `graph` lists `(node, parents)` in insertion order. Zero in-degree nodes
/// are enqueued in that order; when a node is emitted its children are
/// released in the order their edges were first recorded. Repeated parent
/// names count once.
pub fn topological_sort(graph: &[(String, Vec<String>)]) -> Result<Vec<String>, DomainError> {
    let n = graph.len();
    let index: HashMap<&str, usize> = graph
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    // children[p] = nodes that must come after p
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree: Vec<usize> = vec![0; n];

    for (idx, (name, parents)) in graph.iter().enumerate() {
        for parent in parents {
            let &parent_idx = index
                .get(parent.as_str())
                .ok_or_else(|| DomainError::UnknownParent {
                    record: name.clone(),
                    parent: parent.clone(),
                })?;
            if !children[parent_idx].contains(&idx) {
                children[parent_idx].push(idx);
                in_degree[idx] += 1;
            }
        }
    }

    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut sorted: Vec<usize> = Vec::with_capacity(n);
    while let Some(idx) = queue.pop_front() {
        sorted.push(idx);
        for &child in &children[idx] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    if sorted.len() != n {
        return Err(DomainError::CycleDetected {
            graph: describe(graph),
        });
    }

    Ok(sorted.into_iter().map(|i| graph[i].0.clone()).collect())
}

/// Records in inheritance order with ancestor lookup.
#[derive(Debug)]
pub struct RecordGraph<'a> {
    ordered: Vec<&'a RecordDefinition>,
    position: HashMap<&'a str, usize>,
}

impl<'a> RecordGraph<'a> {
    /// Orders `records` (given in discovery order) parents-first.
    pub fn resolve(records: &'a [RecordDefinition]) -> Result<Self, DomainError> {
        let graph: Vec<(String, Vec<String>)> = records
            .iter()
            .map(|r| (r.name().to_string(), r.extends.clone()))
            .collect();
        let order = topological_sort(&graph)?;

        let by_name: HashMap<&str, &RecordDefinition> =
            records.iter().map(|r| (r.name(), r)).collect();
        let ordered: Vec<&RecordDefinition> = order
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).copied())
            .collect();
        let position = ordered
            .iter()
            .enumerate()
            .map(|(i, &r)| (r.name(), i))
            .collect();
        Ok(Self { ordered, position })
    }

    pub fn ordered(&self) -> &[&'a RecordDefinition] {
        &self.ordered
    }

    pub fn get(&self, name: &str) -> Option<&'a RecordDefinition> {
        self.position.get(name).map(|&i| self.ordered[i])
    }

    /// Every transitive ancestor of `record`, in resolved order.
    pub fn ancestors(&self, record: &RecordDefinition) -> Vec<&'a RecordDefinition> {
        let mut seen: Vec<usize> = Vec::new();
        let mut pending: Vec<&str> = record.extends.iter().map(String::as_str).collect();
        while let Some(name) = pending.pop() {
            if let Some(&i) = self.position.get(name) {
                if !seen.contains(&i) {
                    seen.push(i);
                    pending.extend(self.ordered[i].extends.iter().map(String::as_str));
                }
            }
        }
        seen.sort_unstable();
        seen.into_iter().map(|i| self.ordered[i]).collect()
    }
}

/// `{'A': ['B'], 'B': []}`
fn describe(graph: &[(String, Vec<String>)]) -> String {
    let entries: Vec<String> = graph
        .iter()
        .map(|(name, parents)| {
            let parents: Vec<String> = parents.iter().map(|p| format!("'{p}'")).collect();
            format!("'{name}': [{}]", parents.join(", "))
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(items: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        items
            .iter()
            .map(|(name, parents)| {
                (
                    (*name).to_string(),
                    parents.iter().map(|p| (*p).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn orders_independent_roots_first() {
        let g = graph(&[
            ("A", &[]),
            ("B", &[]),
            ("C", &["F"]),
            ("D", &["F"]),
            ("E", &[]),
            ("F", &[]),
        ]);
        assert_eq!(
            topological_sort(&g).unwrap(),
            vec!["A", "B", "E", "F", "C", "D"]
        );
    }

    #[test]
    fn follows_edge_insertion_order() {
        let g = graph(&[
            ("A", &["D"]),
            ("B", &["A"]),
            ("C", &["A"]),
            ("D", &[]),
            ("E", &["B", "C"]),
            ("F", &["A"]),
        ]);
        assert_eq!(
            topological_sort(&g).unwrap(),
            vec!["D", "A", "B", "C", "F", "E"]
        );
    }

    #[test]
    fn cycle_is_reported_with_graph() {
        let g = graph(&[("A", &["B"]), ("B", &["A"]), ("C", &[])]);
        let err = topological_sort(&g).unwrap_err();
        assert_eq!(
            err,
            DomainError::CycleDetected {
                graph: "{'A': ['B'], 'B': ['A'], 'C': []}".into()
            }
        );
    }

    #[test]
    fn unknown_parent_is_a_reference_error() {
        let g = graph(&[("A", &["Missing"])]);
        assert_eq!(
            topological_sort(&g).unwrap_err(),
            DomainError::UnknownParent {
                record: "A".into(),
                parent: "Missing".into()
            }
        );
    }

    #[test]
    fn repeated_parent_counts_once() {
        let g = graph(&[("A", &[]), ("B", &["A", "A"])]);
        assert_eq!(topological_sort(&g).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let g = graph(&[("A", &["A"])]);
        assert!(matches!(
            topological_sort(&g),
            Err(DomainError::CycleDetected { .. })
        ));
    }

    #[test]
    fn empty_graph() {
        assert!(topological_sort(&[]).unwrap().is_empty());
    }
}
