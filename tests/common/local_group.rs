use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Barrier, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rowblock_gemm::comm::corner_tag;
use rowblock_gemm::{Corner, Error, GroupComm, Result};

/// Tag used internally for broadcast payloads; never collides with corner tags.
const TAG_BROADCAST: i32 = -1;

/// How long a receive waits before the test is declared deadlocked.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

type MailboxKey = (usize, usize, i32);

/// Message store shared by all ranks of a simulated group.
#[derive(Default)]
struct Mailboxes {
    messages: Mutex<HashMap<MailboxKey, VecDeque<Vec<f64>>>>,
    arrived: Condvar,
    sent: Mutex<Vec<(usize, usize, i32)>>,
}

impl Mailboxes {
    fn post(&self, from: usize, to: usize, tag: i32, data: Vec<f64>) {
        let mut msgs = self.messages.lock().unwrap();
        msgs.entry((from, to, tag)).or_default().push_back(data);
        self.sent.lock().unwrap().push((from, to, tag));
        self.arrived.notify_all();
    }

    fn take(&self, from: usize, to: usize, tag: i32) -> Result<Vec<f64>> {
        let deadline = Instant::now() + RECV_TIMEOUT;
        let mut msgs = self.messages.lock().unwrap();
        loop {
            if let Some(msg) = msgs.get_mut(&(from, to, tag)).and_then(|q| q.pop_front()) {
                return Ok(msg);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Communication(format!(
                    "rank {} timed out waiting for tag {} from rank {}",
                    to, tag, from
                )));
            }
            msgs = self.arrived.wait_timeout(msgs, deadline - now).unwrap().0;
        }
    }

    fn pending(&self) -> usize {
        self.messages.lock().unwrap().values().map(|q| q.len()).sum()
    }
}

/// One rank of an in-process group; each rank runs on its own thread.
pub struct LocalComm {
    rank: usize,
    size: usize,
    mailboxes: Arc<Mailboxes>,
    barrier: Arc<Barrier>,
}

impl GroupComm for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast(&self, root: usize, buf: &mut [f64]) -> Result<()> {
        if self.rank == root {
            for peer in (0..self.size).filter(|&p| p != root) {
                self.mailboxes.post(root, peer, TAG_BROADCAST, buf.to_vec());
            }
        } else {
            let data = self.mailboxes.take(root, self.rank, TAG_BROADCAST)?;
            if data.len() != buf.len() {
                return Err(Error::Communication(format!(
                    "broadcast length mismatch: got {}, expected {}",
                    data.len(),
                    buf.len()
                )));
            }
            buf.copy_from_slice(&data);
        }
        Ok(())
    }

    fn barrier(&self) -> Result<()> {
        self.barrier.wait();
        Ok(())
    }

    fn send_corner(&self, dest: usize, corner: Corner, value: f64) -> Result<()> {
        self.mailboxes
            .post(self.rank, dest, corner_tag(corner), vec![value]);
        Ok(())
    }

    fn receive_corner(&self, source: usize, corner: Corner) -> Result<f64> {
        let msg = self.mailboxes.take(source, self.rank, corner_tag(corner))?;
        Ok(msg[0])
    }

    fn abort(&self, code: i32) -> ! {
        panic!("rank {} aborted the group with code {}", self.rank, code)
    }
}

/// Results of running a closure on every rank of a simulated group.
pub struct GroupRun<T> {
    /// Per-rank results, indexed by rank.
    pub results: Vec<T>,
    /// Messages posted but never received.
    pub pending: usize,
    /// Every corner message `(from, to, tag)` in posting order.
    pub corner_messages: Vec<(usize, usize, i32)>,
}

/// Run `body` on `size` threads, one per rank, and wait for all of them.
pub fn run_group<T, F>(size: usize, body: F) -> GroupRun<T>
where
    T: Send,
    F: Fn(&LocalComm) -> T + Sync,
{
    let mailboxes = Arc::new(Mailboxes::default());
    let barrier = Arc::new(Barrier::new(size));

    let results: Vec<T> = thread::scope(|scope| {
        let handles: Vec<_> = (0..size)
            .map(|rank| {
                let comm = LocalComm {
                    rank,
                    size,
                    mailboxes: Arc::clone(&mailboxes),
                    barrier: Arc::clone(&barrier),
                };
                let body = &body;
                scope.spawn(move || body(&comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    });

    let corner_messages = mailboxes
        .sent
        .lock()
        .unwrap()
        .iter()
        .copied()
        .filter(|&(_, _, tag)| tag != TAG_BROADCAST)
        .collect();

    GroupRun {
        results,
        pending: mailboxes.pending(),
        corner_messages,
    }
}
