use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("{channel} content is {actual} characters, limit is {limit}")]
    ContentTooLong {
        channel: &'static str,
        limit: usize,
        actual: usize,
    },
}
