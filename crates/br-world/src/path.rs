//! Paths and the straight-line planner used by [`FlatWorld`][crate::FlatWorld].
//!
//! The planner walks a horizontal staircase from the start cell toward the
//! target, one block per step along whichever axis has further to go.  It
//! stops early once within `tolerance` blocks (Manhattan) of the target, or
//! at the last free cell before an obstacle.  A path that stops at an
//! obstacle is still returned, flagged `reachable == false`, so callers can
//! walk as close as possible and record that the target is out of reach.

use br_core::BlockPos;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Path {
    /// Cells to visit in order, excluding the start cell.
    pub nodes:     Vec<BlockPos>,
    pub target:    BlockPos,
    /// `false` if the path ends short of the target's tolerance radius.
    pub reachable: bool,
}

impl Path {
    #[inline]
    pub fn can_reach(&self) -> bool {
        self.reachable
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn end_node(&self) -> Option<BlockPos> {
        self.nodes.last().copied()
    }
}

fn horizontal_manhattan(a: BlockPos, b: BlockPos) -> u32 {
    a.x.abs_diff(b.x) + a.z.abs_diff(b.z)
}

/// Plan a staircase path from `start` to `target`.
///
/// Returns `None` when the target is more than `max_len` steps away.
pub fn plan_straight(
    start:      BlockPos,
    target:     BlockPos,
    tolerance:  u32,
    max_len:    u32,
    is_blocked: impl Fn(BlockPos) -> bool,
) -> Option<Path> {
    if horizontal_manhattan(start, target) > max_len {
        return None;
    }

    let mut nodes = Vec::new();
    let mut cur = start;
    while horizontal_manhattan(cur, target) > tolerance {
        let dx = target.x - cur.x;
        let dz = target.z - cur.z;
        let next = if dx.abs() >= dz.abs() {
            cur.offset(dx.signum(), 0, 0)
        } else {
            cur.offset(0, 0, dz.signum())
        };
        if is_blocked(next) {
            break;
        }
        nodes.push(next);
        cur = next;
    }

    let reachable = horizontal_manhattan(cur, target) <= tolerance;
    Some(Path { nodes, target, reachable })
}
