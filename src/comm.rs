//! Process-group communication used by the benchmark.
//!
//! Everything the driver and the corner collector need from the group goes
//! through [`GroupComm`]; the MPI implementation lives behind the `mpi`
//! feature.

use crate::corners::Corner;
use crate::error::Result;
use crate::partition::RankContext;

// Wire tags for the four corner messages
pub const TAG_TOP_LEFT: i32 = 101;
pub const TAG_TOP_RIGHT: i32 = 102;
pub const TAG_BOTTOM_LEFT: i32 = 103;
pub const TAG_BOTTOM_RIGHT: i32 = 104;

/// Message tag carrying `corner`. Distinct per corner so a rank that owns
/// several corners can send them back to back without cross-talk.
pub fn corner_tag(corner: Corner) -> i32 {
    match corner {
        Corner::TopLeft => TAG_TOP_LEFT,
        Corner::TopRight => TAG_TOP_RIGHT,
        Corner::BottomLeft => TAG_BOTTOM_LEFT,
        Corner::BottomRight => TAG_BOTTOM_RIGHT,
    }
}

/// Blocking collectives and point-to-point messaging across the group.
///
/// Every call may suspend the caller until its peers arrive. An `Err` from
/// any of them leaves the group in an unknown state and must be treated as
/// fatal.
pub trait GroupComm {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Replicate `buf` from `root` into every rank's `buf`.
    fn broadcast(&self, root: usize, buf: &mut [f64]) -> Result<()>;

    fn barrier(&self) -> Result<()>;

    fn send_corner(&self, dest: usize, corner: Corner, value: f64) -> Result<()>;

    fn receive_corner(&self, source: usize, corner: Corner) -> Result<f64>;

    /// Tear down every process in the group.
    fn abort(&self, code: i32) -> !;

    fn context(&self) -> Result<RankContext> {
        RankContext::new(self.rank(), self.size())
    }
}

#[cfg(feature = "mpi")]
pub use self::mpi_comm::MpiComm;

#[cfg(feature = "mpi")]
mod mpi_comm {
    use mpi::traits::*;
    use mpi::topology::Rank;

    use super::{corner_tag, GroupComm};
    use crate::corners::Corner;
    use crate::error::{Error, Result};

    /// [`GroupComm`] over an MPI communicator.
    ///
    /// Uses the communicator's default error handler, under which a failed
    /// MPI call aborts the job instead of returning.
    pub struct MpiComm<C: Communicator> {
        world: C,
    }

    impl<C: Communicator> MpiComm<C> {
        pub fn new(world: C) -> Self {
            MpiComm { world }
        }

        fn peer(&self, rank: usize) -> Result<Rank> {
            let size = self.size();
            if rank >= size {
                return Err(Error::Communication(format!(
                    "peer rank {} outside a group of {}",
                    rank, size
                )));
            }
            Rank::try_from(rank)
                .map_err(|_| Error::Communication(format!("rank {} overflows an MPI rank", rank)))
        }
    }

    impl<C: Communicator> GroupComm for MpiComm<C> {
        fn rank(&self) -> usize {
            self.world.rank() as usize
        }

        fn size(&self) -> usize {
            self.world.size() as usize
        }

        fn broadcast(&self, root: usize, buf: &mut [f64]) -> Result<()> {
            let root_process = self.world.process_at_rank(self.peer(root)?);
            root_process.broadcast_into(buf);
            Ok(())
        }

        fn barrier(&self) -> Result<()> {
            self.world.barrier();
            Ok(())
        }

        fn send_corner(&self, dest: usize, corner: Corner, value: f64) -> Result<()> {
            let dest_process = self.world.process_at_rank(self.peer(dest)?);
            dest_process.send_with_tag(&value, corner_tag(corner));
            Ok(())
        }

        fn receive_corner(&self, source: usize, corner: Corner) -> Result<f64> {
            let source_process = self.world.process_at_rank(self.peer(source)?);
            let (value, _status) = source_process.receive_with_tag::<f64>(corner_tag(corner));
            Ok(value)
        }

        fn abort(&self, code: i32) -> ! {
            self.world.abort(code)
        }
    }
}
