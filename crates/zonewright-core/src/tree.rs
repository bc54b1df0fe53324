// ── Delegation forest ──
//
// Turns the flat domain list into an index-based forest keyed by the
// delegated-parent reference. Links are validated once, here, so the
// recursive walk never follows an untrusted pointer: a parent that does
// not exist, or a link that would close a cycle, is logged and dropped
// and the child becomes a root of its own.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, error, warn};

use crate::model::{Domain, DomainId};

/// A delegation link that was rejected while building the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAnomaly {
    /// The referenced parent is not among the loaded domains.
    Dangling {
        child: DomainId,
        name: String,
        parent: u64,
    },
    /// Accepting the link would make the domain its own ancestor.
    Cycle {
        child: DomainId,
        name: String,
        parent: u64,
    },
}

impl fmt::Display for LinkAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangling {
                child,
                name,
                parent,
            } => write!(
                f,
                "domain {name} (#{child}) is delegated to non-existent domain #{parent}"
            ),
            Self::Cycle {
                child,
                name,
                parent,
            } => write!(
                f,
                "domain {name} (#{child}) delegated to #{parent} would form a cycle"
            ),
        }
    }
}

#[derive(Debug)]
struct Node {
    domain: Domain,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Domains of one run with their validated delegation links.
///
/// Nodes are addressed by index. Indices are stable for the lifetime of
/// the forest and follow input order, platform entry first.
#[derive(Debug)]
pub struct DomainForest {
    nodes: Vec<Node>,
    index: HashMap<DomainId, usize>,
    anomalies: Vec<LinkAnomaly>,
}

impl DomainForest {
    /// Build the forest from store rows, prepending the platform entry if any.
    pub fn build(domains: Vec<Domain>, platform: Option<Domain>) -> Self {
        let mut nodes = Vec::with_capacity(domains.len() + 1);
        let mut index = HashMap::with_capacity(domains.len() + 1);

        for domain in platform.into_iter().chain(domains) {
            if index.contains_key(&domain.id) {
                warn!(id = %domain.id, domain = %domain.name, "duplicate domain id, keeping the first row");
                continue;
            }
            index.insert(domain.id, nodes.len());
            nodes.push(Node {
                domain,
                parent: None,
                children: Vec::new(),
            });
        }

        let mut forest = Self {
            nodes,
            index,
            anomalies: Vec::new(),
        };
        forest.link();
        forest.log_topology();
        forest
    }

    fn link(&mut self) {
        for child in 0..self.nodes.len() {
            let Some(parent_id) = self.nodes[child].domain.delegated_parent_id else {
                continue;
            };
            let domain = &self.nodes[child].domain;

            let Some(&parent) = self.index.get(&DomainId::Stored(parent_id)) else {
                error!(
                    domain = %domain.name,
                    id = %domain.id,
                    parent = parent_id,
                    "database inconsistency: delegated to a non-existent domain, treating it as top-level"
                );
                self.anomalies.push(LinkAnomaly::Dangling {
                    child: domain.id,
                    name: domain.name.clone(),
                    parent: parent_id,
                });
                continue;
            };

            if self.is_ancestor_or_self(child, parent) {
                error!(
                    domain = %domain.name,
                    id = %domain.id,
                    parent = parent_id,
                    "delegation cycle detected, treating the domain as top-level"
                );
                self.anomalies.push(LinkAnomaly::Cycle {
                    child: domain.id,
                    name: domain.name.clone(),
                    parent: parent_id,
                });
                continue;
            }

            self.nodes[child].parent = Some(parent);
            self.nodes[parent].children.push(child);
        }
    }

    /// Whether `candidate` is `start` or one of its accepted ancestors.
    ///
    /// Terminates because accepted links never form a cycle.
    fn is_ancestor_or_self(&self, candidate: usize, start: usize) -> bool {
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.nodes[current].parent;
        }
        false
    }

    fn log_topology(&self) {
        debug!(
            "{:<9}{:<40}{:<15}{:<40}children",
            "id", "domain", "delegated to", "parent domain"
        );
        for node in &self.nodes {
            let parent_name = node
                .parent
                .map_or("-", |p| self.nodes[p].domain.name.as_str());
            let delegated = node
                .domain
                .delegated_parent_id
                .map_or_else(|| "-".to_owned(), |p| p.to_string());
            let children = node
                .children
                .iter()
                .map(|&c| self.nodes[c].domain.id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            debug!(
                "{:<9}{:<40}{:<15}{:<40}{}",
                node.domain.id.to_string(),
                node.domain.name,
                delegated,
                parent_name,
                children
            );
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Indices of domains without an accepted parent, in input order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn domain(&self, idx: usize) -> &Domain {
        &self.nodes[idx].domain
    }

    /// Direct children in input order.
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.nodes[idx].children
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].parent
    }

    /// True when the domain is folded into an ancestor's zone file.
    pub fn is_delegated(&self, idx: usize) -> bool {
        self.nodes[idx].parent.is_some()
    }

    pub fn index_of(&self, id: DomainId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Ids of the direct children of `id`, empty if `id` is unknown.
    pub fn children_of(&self, id: DomainId) -> Vec<DomainId> {
        self.index_of(id)
            .map(|idx| {
                self.children(idx)
                    .iter()
                    .map(|&c| self.nodes[c].domain.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.nodes.iter().map(|node| &node.domain)
    }

    /// Every delegation link rejected during construction.
    pub fn anomalies(&self) -> &[LinkAnomaly] {
        &self.anomalies
    }
}
