//! Gathering the four corners of C on the coordinator.
//!
//! Each corner is either read locally by the coordinator, or sent by its
//! owner and received exactly once. The coordinator never posts a receive
//! for a corner it owns, so it cannot wait on a message nobody sends.

use tracing::debug;

use crate::comm::GroupComm;
use crate::corners::{BoundaryCorners, Corner, CornerSlots};
use crate::error::{Error, Result};
use crate::partition::{owner_of_row, RankContext, COORDINATOR};

/// What one rank does for one corner during collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerAction {
    /// Coordinator owns the corner and reads its own value.
    ReadLocal,
    /// Coordinator blocks on a message from the owner.
    Receive { from: usize },
    /// Non-coordinator owner ships its value to the coordinator.
    Send { to: usize },
    /// Neither owner nor coordinator.
    Idle,
}

/// The role `ctx` plays for `corner` of an `n x n` product. `n` must be at
/// least 1.
pub fn corner_action(ctx: &RankContext, n: usize, corner: Corner) -> CornerAction {
    let owner = owner_of_row(n, ctx.size, corner.row(n));
    match (ctx.is_coordinator(), owner == ctx.rank) {
        (true, true) => CornerAction::ReadLocal,
        (true, false) => CornerAction::Receive { from: owner },
        (false, true) => CornerAction::Send { to: COORDINATOR },
        (false, false) => CornerAction::Idle,
    }
}

/// Run the collection protocol for this rank.
///
/// `owned` holds the corners this rank computed. Returns the four corners on
/// the coordinator and `None` everywhere else. `n == 0` is rejected before
/// anything is sent.
pub fn collect_corners<C: GroupComm>(
    comm: &C,
    ctx: &RankContext,
    n: usize,
    owned: &CornerSlots,
) -> Result<Option<BoundaryCorners>> {
    if n == 0 {
        return Err(Error::InvalidDimension(n));
    }
    let mut gathered = CornerSlots::default();

    for corner in Corner::ALL {
        let local = || {
            owned.get(corner).ok_or(Error::MissingCorner {
                corner,
                rank: ctx.rank,
            })
        };
        match corner_action(ctx, n, corner) {
            CornerAction::ReadLocal => gathered.set(corner, local()?),
            CornerAction::Receive { from } => {
                let value = comm.receive_corner(from, corner)?;
                debug!(%corner, from, value, "received corner");
                gathered.set(corner, value);
            }
            CornerAction::Send { to } => {
                comm.send_corner(to, corner, local()?)?;
                debug!(%corner, to, "sent corner");
            }
            CornerAction::Idle => {}
        }
    }

    if !ctx.is_coordinator() {
        return Ok(None);
    }
    match gathered.complete() {
        Some(corners) => Ok(Some(corners)),
        None => Err(Error::Communication(
            "coordinator finished collection with corners missing".to_string(),
        )),
    }
}
