//! Fan-out of events to waiting sessions.

use irssi_varlink_types::Reply;
use tracing::debug;

use crate::event::Event;
use crate::health::HealthReporter;
use crate::transport::{SessionId, SessionRegistry, WaitMode};

const BROADCAST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::broadcast");

/// Outcome of one [`publish`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sessions that received the event.
    pub delivered: Vec<SessionId>,
    /// Sessions whose write failed for a reason other than a hang-up.
    pub failed: Vec<SessionId>,
    /// Sessions whose peer had hung up; the caller tears them down.
    pub disconnected: Vec<SessionId>,
}

impl DeliveryReport {
    /// Number of sessions the event was offered to.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len() + self.disconnected.len()
    }
}

/// Writes `event` to every session waiting at the moment of the call.
///
/// The waiting set is snapshotted first, in session order. Streaming
/// sessions get the reply with `continues` set and stay subscribed; single
/// sessions revert to idle whether or not the write succeeded. A failed
/// write does not stop delivery to the others. Hang-ups are only collected
/// in [`DeliveryReport::disconnected`]; other failures are reported.
pub(crate) fn publish(
    sessions: &mut SessionRegistry,
    event: &Event,
    reporter: &dyn HealthReporter,
) -> DeliveryReport {
    let snapshot = sessions.waiting();
    let parameters = event.to_parameters();
    let mut report = DeliveryReport::default();

    for (id, mode) in snapshot {
        let Some(session) = sessions.get_mut(id) else {
            continue;
        };
        let reply = Reply::success(parameters.clone()).continuing(mode == WaitMode::Streaming);
        if mode == WaitMode::Single {
            session.set_mode(WaitMode::Idle);
        }
        match session.write_reply(&reply) {
            Ok(()) => report.delivered.push(id),
            Err(error) if error.is_disconnect() => report.disconnected.push(id),
            Err(error) => {
                reporter.delivery_failed(id, &error);
                report.failed.push(id);
            }
        }
    }

    debug!(
        target: BROADCAST_TARGET,
        subtype = %event.subtype,
        server = %event.server,
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        disconnected = report.disconnected.len(),
        "event published"
    );
    report
}
