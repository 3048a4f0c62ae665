//! Hierarchical balances over the account tree

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::index::LeafPostings;
use crate::tree::{AccountTree, NodeId};
use crate::types::add_amount;

/// Rolled-up totals of one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeBalance {
    pub debit: Decimal,
    pub credit: Decimal,
    /// Sign-adjusted by the category of each contributing leaf
    pub balance: Decimal,
}

impl NodeBalance {
    fn add(&mut self, other: &NodeBalance, account: &str) -> CoreResult<()> {
        self.debit = add_amount(self.debit, other.debit, account)?;
        self.credit = add_amount(self.credit, other.credit, account)?;
        self.balance = add_amount(self.balance, other.balance, account)?;
        Ok(())
    }
}

/// Balances of every tree node, indexed by `NodeId`
#[derive(Debug, Clone, Default)]
pub struct Balances {
    values: Vec<NodeBalance>,
}

impl Balances {
    /// Compute every balance in one bottom-up pass.
    ///
    /// The arena stores parents before children, so a reverse scan finishes
    /// every child before its parent is summed.
    pub fn compute(tree: &AccountTree, postings: &LeafPostings) -> CoreResult<Self> {
        let mut values = vec![NodeBalance::default(); tree.len()];

        for id in (0..tree.len()).rev() {
            let node = tree.node(id);
            let value = if node.is_leaf {
                let sums = postings.per_node.get(id).copied().unwrap_or_default();
                NodeBalance {
                    debit: sums.debit,
                    credit: sums.credit,
                    balance: node.category.checked_balance(sums.debit, sums.credit, &node.code)?,
                }
            } else {
                let mut total = NodeBalance::default();
                for &child in tree.children(id) {
                    total.add(&values[child], &node.code)?;
                }
                total
            };
            log::debug!(target: "lra::core", "Balance {} = {}", node.code, value.balance);
            values[id] = value;
        }

        Ok(Balances { values })
    }

    pub fn get(&self, id: NodeId) -> &NodeBalance {
        &self.values[id]
    }

    /// Balance of a node by exact code
    pub fn by_code(&self, tree: &AccountTree, code: &str) -> Option<Decimal> {
        tree.id(code).map(|id| self.values[id].balance)
    }

    /// Sum over a set of nodes; `account` names the total on overflow
    pub fn sum(&self, ids: &[NodeId], account: &str) -> CoreResult<NodeBalance> {
        let mut total = NodeBalance::default();
        for &id in ids {
            total.add(&self.values[id], account)?;
        }
        Ok(total)
    }
}
