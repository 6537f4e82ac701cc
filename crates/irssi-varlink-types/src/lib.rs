//! Wire types shared by the irssi varlink daemon and its command-line client.
//!
//! Every message on the socket is a UTF-8 JSON document followed by a single
//! NUL byte. [`FrameDecoder`] splits an inbound byte stream into complete
//! documents and [`encode_frame`] produces the outbound form. The request and
//! reply envelopes ([`CallRequest`], [`Reply`]) and the catalogue of method
//! and error names live here so both ends agree on the exact spelling.

mod envelope;
mod frame;
pub mod names;

pub use envelope::{CallRequest, Reply};
pub use frame::{FrameDecoder, FrameError, MAX_FRAME_BYTES, TERMINATOR, encode_frame};
