//! Account tree arena built from a flat chart of accounts

use lra_config::{MalformedPolicy, ReportConfig};
use lra_parser::{code_segments, is_within, normalize_code, parent_code, ChartRow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::types::{AccountClass, Category};

/// Index of a node in the tree arena
pub type NodeId = usize;

/// One chart of accounts entry placed in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    pub code: String,
    pub name: String,
    pub level: u32,
    pub category: Category,
    /// Bound to ledger postings
    pub is_leaf: bool,
}

/// Why a chart row was left out of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedReason {
    InvalidLevel,
    InvalidCode,
    SegmentMismatch { expected: i64, found: usize },
    MissingParent { parent: String },
    Duplicate,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::InvalidLevel => write!(f, "level must be at least 1"),
            MalformedReason::InvalidCode => write!(f, "code has empty or non-alphanumeric segments"),
            MalformedReason::SegmentMismatch { expected, found } => {
                write!(f, "expected {} segments, found {}", expected, found)
            }
            MalformedReason::MissingParent { parent } => write!(f, "parent {:?} is not in the tree", parent),
            MalformedReason::Duplicate => write!(f, "duplicate code"),
        }
    }
}

/// A chart row skipped while building the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalformedAccount {
    pub code: String,
    pub level: i64,
    pub reason: MalformedReason,
}

impl MalformedAccount {
    pub fn to_error(&self) -> CoreError {
        CoreError::MalformedAccountCode {
            code: self.code.clone(),
            level: self.level,
            reason: self.reason.to_string(),
        }
    }
}

/// Tree plus everything that was left out of it
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub tree: AccountTree,
    pub malformed: Vec<MalformedAccount>,
    /// Well-formed nodes deeper than their leaf level
    pub below_leaf: usize,
}

/// Chart of accounts as an arena
///
/// Nodes are stored parents-first (ordered by level, chart order within a
/// level), so every child has a larger id than its parent.
#[derive(Debug, Clone, Default)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
    by_code: HashMap<String, NodeId>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl AccountTree {
    /// Build the report tree, bounded by the configured leaf levels
    pub fn build(rows: &[ChartRow], config: &ReportConfig) -> CoreResult<TreeBuild> {
        Self::build_with(rows, config.malformed_policy, |code| config.leaf_level_for(code))
    }

    /// Build a tree holding every well-formed chart row, with no leaf bound
    pub fn catalog(rows: &[ChartRow], policy: MalformedPolicy) -> CoreResult<TreeBuild> {
        Self::build_with(rows, policy, |_| u32::MAX)
    }

    /// Build a tree with a custom leaf level per code
    pub fn build_with<F>(rows: &[ChartRow], policy: MalformedPolicy, leaf_level: F) -> CoreResult<TreeBuild>
    where
        F: Fn(&str) -> u32,
    {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&i| rows[i].level);

        let mut tree = AccountTree::default();
        let mut malformed = Vec::new();
        let mut below_leaf = 0usize;
        let mut deep: HashSet<String> = HashSet::new();
        let logger = DefaultErrorLogger;

        for i in order {
            let row = &rows[i];
            let code = normalize_code(&row.code);

            let placement = match tree.place(&code, row.level) {
                Ok(placement) => placement,
                Err(MalformedReason::MissingParent { parent }) if deep.contains(&parent) => {
                    below_leaf += 1;
                    deep.insert(code);
                    continue;
                }
                Err(reason) => {
                    let skipped = MalformedAccount {
                        code,
                        level: row.level,
                        reason,
                    };
                    let error = skipped.to_error();
                    if policy == MalformedPolicy::Abort {
                        return Err(error);
                    }
                    logger.log_error(&error, &ErrorContext::new("build_account_tree"));
                    malformed.push(skipped);
                    continue;
                }
            };

            let level = placement.level;
            let parent = match placement.parent {
                Some(parent) if tree.nodes[parent].is_leaf => {
                    below_leaf += 1;
                    deep.insert(code);
                    continue;
                }
                other => other,
            };
            let bound = leaf_level(&code);
            if level > bound {
                below_leaf += 1;
                deep.insert(code);
                continue;
            }

            let id = tree.nodes.len();
            tree.nodes.push(AccountNode {
                category: Category::from_code(&code),
                code: code.clone(),
                name: row.name.trim().to_string(),
                level,
                is_leaf: level == bound,
            });
            tree.by_code.insert(code, id);
            tree.parents.push(parent);
            tree.children.push(Vec::new());
            match parent {
                Some(parent) => tree.children[parent].push(id),
                None => tree.roots.push(id),
            }
        }

        if below_leaf > 0 {
            log::debug!(target: "lra::core", "{} chart nodes lie below the leaf level", below_leaf);
        }
        log::debug!(
            target: "lra::core",
            "Account tree: {} nodes, {} roots, {} skipped",
            tree.nodes.len(),
            tree.roots.len(),
            malformed.len()
        );

        Ok(TreeBuild {
            tree,
            malformed,
            below_leaf,
        })
    }

    /// Validate a code against its level and find its parent.
    ///
    /// A parent that was itself skipped is missing, so a bad node takes its
    /// whole branch with it.
    fn place(&self, code: &str, level: i64) -> Result<Placement, MalformedReason> {
        if level < 1 {
            return Err(MalformedReason::InvalidLevel);
        }
        let segments = code_segments(code).ok_or(MalformedReason::InvalidCode)?;
        if i64::try_from(segments.len()).ok() != Some(level) {
            return Err(MalformedReason::SegmentMismatch {
                expected: level,
                found: segments.len(),
            });
        }
        let level = u32::try_from(level).map_err(|_| MalformedReason::InvalidLevel)?;
        if self.by_code.contains_key(code) {
            return Err(MalformedReason::Duplicate);
        }
        let parent = match parent_code(code) {
            Some(parent) => Some(*self.by_code.get(parent).ok_or_else(|| MalformedReason::MissingParent {
                parent: parent.to_string(),
            })?),
            None => None,
        };
        Ok(Placement { level, parent })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AccountNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[AccountNode] {
        &self.nodes
    }

    /// Look up a node id by normalized code
    pub fn id(&self, code: &str) -> Option<NodeId> {
        self.by_code.get(code).copied()
    }

    /// Look up a node by exact code
    pub fn get(&self, code: &str) -> Option<&AccountNode> {
        self.id(code).map(|id| &self.nodes[id])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id]
    }

    /// Direct children, in chart order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    /// Direct children of a code
    pub fn children_of(&self, code: &str) -> Vec<&AccountNode> {
        self.id(code)
            .map(|id| self.children[id].iter().map(|&c| &self.nodes[c]).collect())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root categories of a report class
    pub fn roots_of_class(&self, class: AccountClass) -> Vec<&AccountNode> {
        self.roots
            .iter()
            .map(|&id| &self.nodes[id])
            .filter(|node| AccountClass::from_code(&node.code) == Some(class))
            .collect()
    }

    /// Depth-first walk (pre-order) from a node
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children[current].iter().rev());
        }
        out
    }

    /// Nodes at `level` that lie below (or at) `code`, in depth-first order
    pub fn descendants_at_level(&self, code: &str, level: u32) -> Vec<&AccountNode> {
        match self.id(code) {
            Some(id) => self
                .walk(id)
                .into_iter()
                .map(|id| &self.nodes[id])
                .filter(|node| node.level == level)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ids of the nodes within a code prefix whose parent lies outside it
    pub fn tops_within(&self, prefix: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&id| is_within(&self.nodes[id].code, prefix))
            .filter(|&id| match self.parents[id] {
                Some(parent) => !is_within(&self.nodes[parent].code, prefix),
                None => true,
            })
            .collect()
    }

    /// Ids of the leaves within a code prefix
    pub fn leaves_within(&self, prefix: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&id| self.nodes[id].is_leaf && is_within(&self.nodes[id].code, prefix))
            .collect()
    }

    /// Leaf for an exact ledger code
    pub fn leaf_exact(&self, code: &str) -> Option<NodeId> {
        self.id(code).filter(|&id| self.nodes[id].is_leaf)
    }

    /// Leaf whose code is the longest segment prefix of a ledger code
    pub fn leaf_by_prefix(&self, code: &str) -> Option<NodeId> {
        let mut candidate = Some(code);
        while let Some(current) = candidate {
            if let Some(id) = self.leaf_exact(current) {
                return Some(id);
            }
            candidate = parent_code(current);
        }
        None
    }
}

struct Placement {
    level: u32,
    parent: Option<NodeId>,
}
