// Live Update Channel
//
// Server-push subscription with an always-retry reconnect loop.

mod channel;
mod transport;

pub use channel::{decode_event, ChannelState, LiveChannel, Subscription};
pub use transport::{EventTransport, MessageStream, SseTransport, STREAM_PATH};
