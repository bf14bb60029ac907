//! Quorum plan
//!
//! Computed once per query from the node count and the requested quorum and
//! handed to the coordinator by value.

use crate::error::GrepError;

/// How many successful replies a query needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumPlan {
    total_nodes: usize,
    required: usize,
}

impl QuorumPlan {
    /// Build a plan for `total_nodes` participants
    ///
    /// `requested` of `None` or `Some(0)` selects a simple majority
    /// (`total_nodes / 2 + 1`). A quorum larger than the node count is
    /// rejected.
    pub fn new(total_nodes: usize, requested: Option<usize>) -> Result<Self, GrepError> {
        let total_nodes = total_nodes.max(1);
        let required = match requested {
            Some(q) if q > 0 => q,
            _ => majority(total_nodes),
        };
        if required > total_nodes {
            return Err(GrepError::InvalidQuorum {
                required,
                total: total_nodes,
            });
        }
        Ok(Self { total_nodes, required })
    }

    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn required(&self) -> usize {
        self.required
    }
}

/// Simple majority of `n`
pub fn majority(n: usize) -> usize {
    n / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_majority() {
        assert_eq!(QuorumPlan::new(5, None).unwrap().required(), 3);
        assert_eq!(QuorumPlan::new(3, None).unwrap().required(), 2);
        assert_eq!(QuorumPlan::new(2, None).unwrap().required(), 2);
        assert_eq!(QuorumPlan::new(1, None).unwrap().required(), 1);
    }

    #[test]
    fn test_zero_means_default() {
        assert_eq!(QuorumPlan::new(4, Some(0)).unwrap().required(), 3);
    }

    #[test]
    fn test_explicit_quorum() {
        let plan = QuorumPlan::new(5, Some(1)).unwrap();
        assert_eq!(plan.required(), 1);
        assert_eq!(plan.total_nodes(), 5);
        assert_eq!(QuorumPlan::new(5, Some(5)).unwrap().required(), 5);
    }

    #[test]
    fn test_quorum_above_node_count_rejected() {
        let err = QuorumPlan::new(5, Some(6)).unwrap_err();
        assert!(matches!(err, GrepError::InvalidQuorum { required: 6, total: 5 }));
    }
}
