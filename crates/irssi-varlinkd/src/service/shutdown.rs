//! The shutdown handshake.

use tracing::debug;

use crate::dispatch::VarlinkError;
use crate::health::HealthReporter;
use crate::reactor::{Readiness, Token};
use crate::transport::{LISTENER_TARGET, SessionRegistry};

/// Ends every live session with a `ServiceShutdown` error.
///
/// Each session stops being watched for input, receives the terminal error,
/// has its write direction half-closed so the peer reads end of stream, and
/// is then dropped. Write failures are reported and do not stop the others.
/// Returns the number of sessions that were closed.
pub(crate) fn close_sessions(
    sessions: &mut SessionRegistry,
    readiness: &mut dyn Readiness,
    reporter: &dyn HealthReporter,
) -> usize {
    let reply = VarlinkError::ServiceShutdown.to_reply();
    let drained = sessions.drain();
    let count = drained.len();

    for mut session in drained {
        let id = session.id();
        readiness.unregister(Token::Session(id));
        if let Err(error) = session.write_reply(&reply) {
            reporter.delivery_failed(id, &error);
        }
        if let Err(error) = session.close_write() {
            debug!(
                target: LISTENER_TARGET,
                session = %id,
                error = %error,
                "half-close failed"
            );
        }
    }
    count
}
