#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("container id must not be empty")]
    EmptyContainerID,
    #[error("container id exceeds {max} bytes: {id}")]
    ContainerIDTooLong { id: String, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
