//! GitHub webhook intake: signature verification and payload parsing.

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{PrAction, PullRequestEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, decode_signature_header, sign_payload, verify_signature};
