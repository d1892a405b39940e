use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use num_complex::Complex64;
use tracing::{debug, error};

use super::id::SimulationId;
use super::simulator::ChannelSimulator;
use crate::entity::Pose;
use crate::error::{Result, SimulatorError};

enum Request {
    Transmitter(Pose),
    Receiver(Pose),
    Simulate(SimulationId),
}

type Reply = std::result::Result<Option<Complex64>, SimulatorError>;

// ---------------------------------------------------------------------------
// DeadlineSimulator: bounds every call to a blocking backend
// ---------------------------------------------------------------------------

/// Runs a simulator on its own worker thread and gives up on any call that
/// does not answer within `timeout`.
///
/// After a timeout the wrapper is poisoned: a late reply could otherwise be
/// mistaken for the answer to the next request, so every further call fails
/// with [`SimulatorError::Unavailable`].
pub struct DeadlineSimulator {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    timeout: Duration,
    name: String,
    poisoned: bool,
}

impl DeadlineSimulator {
    pub fn spawn<S>(mut inner: S, timeout: Duration) -> Result<Self>
    where
        S: ChannelSimulator + Send + 'static,
    {
        let name = inner.name().to_string();
        let (requests, request_rx) = mpsc::channel::<Request>();
        let (reply_tx, replies) = mpsc::channel::<Reply>();

        thread::Builder::new()
            .name(format!("channel-{}", name))
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let reply = match request {
                        Request::Transmitter(p) => inner.set_transmitter_pose(&p).map(|_| None),
                        Request::Receiver(p) => inner.set_receiver_pose(&p).map(|_| None),
                        Request::Simulate(id) => inner.simulate(&id).map(Some),
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                debug!("channel simulator worker exiting");
            })?;

        Ok(Self { requests, replies, timeout, name, poisoned: false })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn call(&mut self, request: Request) -> Reply {
        if self.poisoned {
            return Err(SimulatorError::Unavailable);
        }
        self.requests
            .send(request)
            .map_err(|_| SimulatorError::Unavailable)?;

        match self.replies.recv_timeout(self.timeout) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => {
                self.poisoned = true;
                let millis = self.timeout.as_millis() as u64;
                error!(simulator = %self.name, millis, "channel simulator call timed out");
                Err(SimulatorError::Timeout { millis })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.poisoned = true;
                Err(SimulatorError::Unavailable)
            }
        }
    }
}

impl ChannelSimulator for DeadlineSimulator {
    fn set_transmitter_pose(&mut self, pose: &Pose) -> std::result::Result<(), SimulatorError> {
        self.call(Request::Transmitter(*pose)).map(|_| ())
    }

    fn set_receiver_pose(&mut self, pose: &Pose) -> std::result::Result<(), SimulatorError> {
        self.call(Request::Receiver(*pose)).map(|_| ())
    }

    fn simulate(&mut self, id: &SimulationId) -> std::result::Result<Complex64, SimulatorError> {
        self.call(Request::Simulate(*id))?
            .ok_or_else(|| SimulatorError::Backend("worker answered a sample request without a sample".into()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
