use thiserror::Error;

/// Input that is not a results page at all.
///
/// Markup that merely fails to match a known shape is not an error; it yields
/// an empty record list.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page content is empty")]
    Empty,

    #[error("page content is binary ({0}), not HTML or text")]
    Binary(&'static str),

    #[error("page content is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("invalid marker selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}
