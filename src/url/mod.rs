pub mod glob;
pub mod parser;
pub mod protocol;

pub use parser::{UrlParts, parse_url};
pub use protocol::Scheme;
