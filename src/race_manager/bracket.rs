//! Bracket - Single-elimination tournament tree
//!
//! Nodes live in an arena and refer to their children by index. Leaves hold
//! a driver from the start; internal nodes are TBD until a winner is picked
//! for the match they represent, at which point they take that driver and the
//! parent match sees them in its slot.
//!
//! Two traversals are exposed and they are kept separate: rendering
//! walks right, node, left so the tree reads top to bottom; match numbering is
//! pre-order, node then left then right.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::race_manager::driver::DriverId;
use crate::race_manager::error::{Error, Result};

/// Indentation per bracket depth level
const INDENT: &str = "       ";

/// Index of a node in the bracket arena
pub type NodeIndex = usize;

/// One slot in the bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketNode {
    /// Decided driver, `None` while TBD
    pub driver: Option<DriverId>,
    pub left: Option<NodeIndex>,
    pub right: Option<NodeIndex>,
}

impl BracketNode {
    fn leaf(driver: DriverId) -> Self {
        Self {
            driver: Some(driver),
            left: None,
            right: None,
        }
    }

    fn pairing(left: NodeIndex, right: NodeIndex) -> Self {
        Self {
            driver: None,
            left: Some(left),
            right: Some(right),
        }
    }
}

/// Which slot of a match wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Map a menu choice (1 = left, 2 = right)
    pub fn from_choice(choice: i64) -> Result<Self> {
        match choice {
            1 => Ok(Side::Left),
            2 => Ok(Side::Right),
            other => Err(Error::InvalidSide(other)),
        }
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Drivers placed in the bracket
    pub leaf_count: usize,
    /// Trailing drivers that did not fit, in input order
    pub excluded: Vec<DriverId>,
}

/// A numbered pairing between two bracket slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// 1-based match number
    pub number: usize,
    pub node: NodeIndex,
    pub left: Option<DriverId>,
    pub right: Option<DriverId>,
    /// Winner already advanced out of this match
    pub winner: Option<DriverId>,
}

/// Tournament bracket arena
///
/// Deserialized brackets are checked to be a single tree over the arena
/// before they are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TournamentParts")]
pub struct Tournament {
    nodes: Vec<BracketNode>,
    root: Option<NodeIndex>,
    leaf_count: usize,
}

/// Unchecked wire form of `Tournament`
#[derive(Deserialize)]
struct TournamentParts {
    nodes: Vec<BracketNode>,
    root: Option<NodeIndex>,
    leaf_count: usize,
}

impl TryFrom<TournamentParts> for Tournament {
    type Error = Error;

    fn try_from(parts: TournamentParts) -> Result<Self> {
        let TournamentParts {
            nodes,
            root,
            leaf_count,
        } = parts;
        let invalid = |reason: String| Err(Error::InvalidBracket(reason));

        let Some(root) = root else {
            if nodes.is_empty() && leaf_count == 0 {
                return Ok(Self::default());
            }
            return invalid("nodes without a root".to_string());
        };
        if root >= nodes.len() {
            return invalid(format!("root {} outside {} nodes", root, nodes.len()));
        }

        let mut parents = vec![0usize; nodes.len()];
        let mut leaves = 0;
        for (index, node) in nodes.iter().enumerate() {
            match (node.left, node.right) {
                (None, None) => {
                    if node.driver.is_none() {
                        return invalid(format!("leaf {} has no driver", index));
                    }
                    leaves += 1;
                }
                (Some(left), Some(right)) => {
                    for child in [left, right] {
                        if child >= nodes.len() {
                            return invalid(format!("node {} links to missing {}", index, child));
                        }
                        parents[child] += 1;
                    }
                }
                _ => return invalid(format!("node {} has a single child", index)),
            }
        }

        if parents[root] != 0 {
            return invalid(format!("root {} has a parent", root));
        }
        if let Some(index) = (0..nodes.len()).find(|&i| i != root && parents[i] != 1) {
            return invalid(format!("node {} has {} parents", index, parents[index]));
        }

        // Single parent everywhere plus full reachability rules out cycles.
        let mut reached = 0;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            reached += 1;
            if reached > nodes.len() {
                break;
            }
            stack.extend(nodes[index].left);
            stack.extend(nodes[index].right);
        }
        if reached != nodes.len() {
            return invalid("nodes unreachable from root".to_string());
        }
        if leaves != leaf_count {
            return invalid(format!("{} leaves, expected {}", leaves, leaf_count));
        }

        Ok(Self {
            nodes,
            root: Some(root),
            leaf_count,
        })
    }
}

impl Tournament {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the bracket from competitors in seeding order.
    ///
    /// Only the largest power of two that fits is used; the rest are
    /// reported in `BuildReport::excluded`.
    pub fn build(&mut self, ids: &[DriverId]) -> Result<BuildReport> {
        self.nodes.clear();
        self.root = None;
        self.leaf_count = 0;

        if ids.is_empty() {
            log::warn!("No drivers available for bracket");
            return Err(Error::NoCompetitors);
        }

        let leaf_count = largest_power_of_two(ids.len());
        let excluded = ids[leaf_count..].to_vec();
        if !excluded.is_empty() {
            log::warn!(
                "Bracket can only include {} drivers, excluding {:?}",
                leaf_count,
                excluded
            );
        }

        self.nodes.reserve(2 * leaf_count - 1);
        let mut level: Vec<NodeIndex> = ids[..leaf_count]
            .iter()
            .map(|&id| self.push(BracketNode::leaf(id)))
            .collect();

        while level.len() > 1 {
            level = level
                .chunks_exact(2)
                .map(|pair| self.push(BracketNode::pairing(pair[0], pair[1])))
                .collect();
        }

        self.root = level.first().copied();
        self.leaf_count = leaf_count;
        log::info!("Bracket built with {} drivers", leaf_count);

        Ok(BuildReport {
            leaf_count,
            excluded,
        })
    }

    pub fn has_bracket(&self) -> bool {
        self.root.is_some()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Champion, once the final has been decided
    pub fn root_driver(&self) -> Option<DriverId> {
        self.root.and_then(|r| self.nodes[r].driver)
    }

    /// Every internal node in pre-order (node, left, right), numbered from 1.
    ///
    /// Already decided matches stay in the list.
    pub fn matches(&self) -> Result<Vec<Match>> {
        let root = self.root.ok_or(Error::NoBracket)?;

        let mut found = Vec::with_capacity(self.leaf_count.saturating_sub(1));
        self.collect_matches(Some(root), &mut found);

        Ok(found
            .into_iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let n = &self.nodes[node];
                let (left, right) = (n.left?, n.right?);
                Some(Match {
                    number: i + 1,
                    node,
                    left: self.nodes[left].driver,
                    right: self.nodes[right].driver,
                    winner: n.driver,
                })
            })
            .collect())
    }

    /// Advance the chosen side of a match, returning the advanced driver.
    ///
    /// Nothing changes on failure.
    pub fn set_winner(&mut self, match_number: usize, side: Side) -> Result<DriverId> {
        let matches = self.matches()?;
        let count = matches.len();
        let m = match_number
            .checked_sub(1)
            .and_then(|i| matches.get(i))
            .ok_or(Error::MatchOutOfRange {
                index: match_number,
                count,
            })?;

        let chosen = match side {
            Side::Left => m.left,
            Side::Right => m.right,
        }
        .ok_or(Error::UndecidedSlot { match_number })?;

        self.nodes[m.node].driver = Some(chosen);
        log::info!("Match {}: driver {} advanced", match_number, chosen);
        Ok(chosen)
    }

    /// Indented tree, right branch above left
    pub fn render(&self, names: &HashMap<DriverId, String>) -> String {
        let mut out = String::from("Tournament Bracket (Tree):\n");
        match self.root {
            Some(root) => self.render_node(Some(root), 0, names, &mut out),
            None => out.push_str(" (no bracket built yet)\n"),
        }
        out
    }

    /// Numbered match listing
    pub fn render_matches(&self, names: &HashMap<DriverId, String>) -> String {
        let Ok(matches) = self.matches() else {
            return " (no bracket built yet)\n".to_string();
        };

        let mut out = String::new();
        for m in matches {
            let _ = writeln!(out, "Match {}:", m.number);
            let _ = writeln!(out, "  1. {}", slot_label(m.left, names));
            let _ = writeln!(out, "  2. {}", slot_label(m.right, names));
        }
        out
    }

    fn push(&mut self, node: BracketNode) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn collect_matches(&self, node: Option<NodeIndex>, found: &mut Vec<NodeIndex>) {
        let Some(index) = node else { return };
        let n = &self.nodes[index];
        if n.left.is_some() && n.right.is_some() {
            found.push(index);
        }
        self.collect_matches(n.left, found);
        self.collect_matches(n.right, found);
    }

    fn render_node(
        &self,
        node: Option<NodeIndex>,
        depth: usize,
        names: &HashMap<DriverId, String>,
        out: &mut String,
    ) {
        let Some(index) = node else { return };
        let n = &self.nodes[index];

        self.render_node(n.right, depth + 1, names, out);
        out.push_str(&INDENT.repeat(depth));
        out.push_str(&slot_label(n.driver, names));
        out.push('\n');
        self.render_node(n.left, depth + 1, names, out);
    }
}

/// Largest power of two not above `n` (0 for 0)
fn largest_power_of_two(n: usize) -> usize {
    match n {
        0 => 0,
        _ => 1 << (usize::BITS - 1 - n.leading_zeros()),
    }
}

fn slot_label(driver: Option<DriverId>, names: &HashMap<DriverId, String>) -> String {
    match driver {
        None => "[TBD]".to_string(),
        Some(id) => names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Driver {}", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn names() -> HashMap<DriverId, String> {
        [(1, "Alice"), (2, "Bob"), (3, "Charlie"), (4, "Diana")]
            .into_iter()
            .map(|(id, n)| (id, n.to_string()))
            .collect()
    }

    #[test]
    fn test_largest_power_of_two() {
        let cases = [(0, 0), (1, 1), (2, 2), (3, 2), (5, 4), (8, 8), (15, 8), (16, 16)];
        for (n, expected) in cases {
            assert_eq!(largest_power_of_two(n), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_build_five_excludes_tail() {
        let mut t = Tournament::new();
        let report = t.build(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(report.leaf_count, 4);
        assert_eq!(report.excluded, vec![5]);
        assert!(t.has_bracket());
        assert_eq!(t.matches().unwrap().len(), 3);
    }

    #[test]
    fn test_build_empty_has_no_bracket() {
        let mut t = Tournament::new();
        t.build(&[1, 2]).unwrap();
        assert!(matches!(t.build(&[]), Err(Error::NoCompetitors)));
        assert!(!t.has_bracket());
        assert_eq!(t.leaf_count(), 0);
        assert!(matches!(t.matches(), Err(Error::NoBracket)));
        assert!(matches!(t.set_winner(1, Side::Left), Err(Error::NoBracket)));
    }

    #[test]
    fn test_single_driver_has_no_matches() {
        let mut t = Tournament::new();
        let report = t.build(&[9]).unwrap();
        assert_eq!(report.leaf_count, 1);
        assert!(t.has_bracket());
        assert!(t.matches().unwrap().is_empty());
        assert_eq!(t.root_driver(), Some(9));
    }

    #[test]
    fn test_match_numbering_is_preorder() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        let slots: Vec<_> = t
            .matches()
            .unwrap()
            .iter()
            .map(|m| (m.number, m.left, m.right))
            .collect();
        assert_eq!(
            slots,
            vec![
                (1, None, None),
                (2, Some(1), Some(2)),
                (3, Some(3), Some(4)),
            ]
        );
    }

    #[test]
    fn test_winner_propagates_one_level() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(t.set_winner(2, Side::Left).unwrap(), 1);
        let matches = t.matches().unwrap();
        assert_eq!(matches[1].winner, Some(1));
        assert_eq!(matches[0].left, Some(1));
        assert_eq!(matches[0].right, None);
        assert_eq!(matches[0].winner, None);
        assert_eq!(t.root_driver(), None);
    }

    #[test]
    fn test_full_run_crowns_champion() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        t.set_winner(2, Side::Right).unwrap();
        t.set_winner(3, Side::Left).unwrap();
        assert_eq!(t.set_winner(1, Side::Right).unwrap(), 3);
        assert_eq!(t.root_driver(), Some(3));
    }

    #[test]
    fn test_tbd_side_is_rejected_without_mutation() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        t.set_winner(2, Side::Left).unwrap();

        assert!(matches!(
            t.set_winner(1, Side::Right),
            Err(Error::UndecidedSlot { match_number: 1 })
        ));
        assert_eq!(t.matches().unwrap()[0].winner, None);
    }

    #[test]
    fn test_match_index_out_of_range() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        for index in [0, 4, 100] {
            assert!(matches!(
                t.set_winner(index, Side::Left),
                Err(Error::MatchOutOfRange { count: 3, .. })
            ));
        }
    }

    #[test]
    fn test_decided_match_can_be_reassigned_between_slots() {
        let mut t = Tournament::new();
        t.build(&[1, 2]).unwrap();
        t.set_winner(1, Side::Left).unwrap();
        t.set_winner(1, Side::Right).unwrap();
        assert_eq!(t.root_driver(), Some(2));
    }

    #[test]
    fn test_side_from_choice() {
        assert_eq!(Side::from_choice(1).unwrap(), Side::Left);
        assert_eq!(Side::from_choice(2).unwrap(), Side::Right);
        assert!(matches!(Side::from_choice(3), Err(Error::InvalidSide(3))));
        assert!(matches!(Side::from_choice(0), Err(Error::InvalidSide(0))));
    }

    #[test]
    fn test_render_right_before_left() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        t.set_winner(3, Side::Right).unwrap();

        let expected = "Tournament Bracket (Tree):\n\
                        \x20             Driver 4\n\
                        \x20      Driver 4\n\
                        \x20             Charlie\n\
                        [TBD]\n\
                        \x20             Bob\n\
                        \x20      [TBD]\n\
                        \x20             Alice\n";
        let mut lookup = names();
        lookup.remove(&4);
        assert_eq!(t.render(&lookup), expected);
    }

    #[test]
    fn test_render_without_bracket() {
        assert_eq!(
            Tournament::new().render(&names()),
            "Tournament Bracket (Tree):\n (no bracket built yet)\n"
        );
        assert_eq!(
            Tournament::new().render_matches(&names()),
            " (no bracket built yet)\n"
        );
    }

    #[test]
    fn test_render_matches() {
        let mut t = Tournament::new();
        t.build(&[1, 2]).unwrap();
        assert_eq!(
            t.render_matches(&names()),
            "Match 1:\n  1. Alice\n  2. Bob\n"
        );
    }

    #[test]
    fn test_serde_keeps_bracket_state() {
        let mut t = Tournament::new();
        t.build(&[1, 2, 3, 4]).unwrap();
        t.set_winner(3, Side::Left).unwrap();

        let json = serde_json::to_string(&t).unwrap();
        let restored: Tournament = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.leaf_count(), 4);
        assert_eq!(restored.matches().unwrap(), t.matches().unwrap());
        assert_eq!(restored.render(&names()), t.render(&names()));

        let empty: Tournament = serde_json::from_str(r#"{"nodes":[],"root":null,"leaf_count":0}"#).unwrap();
        assert!(!empty.has_bracket());
    }

    #[test]
    fn test_deserialize_rejects_broken_arenas() {
        let leaf = |id: u32| format!(r#"{{"driver":{},"left":null,"right":null}}"#, id);
        let pair = |l: usize, r: usize| format!(r#"{{"driver":null,"left":{},"right":{}}}"#, l, r);
        let arena = |nodes: Vec<String>, root: &str, leaves: usize| {
            format!(
                r#"{{"nodes":[{}],"root":{},"leaf_count":{}}}"#,
                nodes.join(","),
                root,
                leaves
            )
        };

        let cases = [
            arena(vec![], "0", 1),
            arena(vec![pair(5, 6)], "0", 2),
            arena(vec![leaf(1), leaf(2)], "null", 2),
            // cycle: 0 -> (1, 2), 1 -> (0, 2)
            arena(vec![pair(1, 2), pair(0, 2), leaf(3)], "0", 1),
            // shared child
            arena(vec![pair(1, 1), leaf(1)], "0", 1),
            // single-parent cycle unreachable from the root
            arena(vec![leaf(1), pair(2, 3), pair(1, 4), leaf(3), leaf(4)], "0", 3),
            arena(vec![pair(1, 2), leaf(1), leaf(2)], "0", 4),
            arena(
                vec![r#"{"driver":null,"left":null,"right":null}"#.to_string()],
                "0",
                1,
            ),
        ];
        for json in cases {
            let err = serde_json::from_str::<Tournament>(&json).unwrap_err();
            assert!(err.to_string().contains("invalid bracket"), "{}: {}", json, err);
        }
    }

    #[test]
    fn test_random_sizes_follow_power_of_two() {
        let mut rng = rand::thread_rng();
        let mut t = Tournament::new();
        for _ in 0..50 {
            let n = rng.gen_range(1..70u32);
            let ids: Vec<DriverId> = (1..=n).collect();
            let report = t.build(&ids).unwrap();

            let leaves = report.leaf_count;
            assert!(leaves.is_power_of_two());
            assert!(leaves <= n as usize && (n as usize) < leaves * 2);
            assert_eq!(report.excluded, ids[leaves..].to_vec());
            assert_eq!(t.matches().unwrap().len(), leaves - 1);
        }
    }
}
