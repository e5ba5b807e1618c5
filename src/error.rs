/// Logs the error of a [`Result`] and turns it into an [`Option`].
pub trait ResultOkLogExt<T> {
    /// Logs an error at `level`.
    fn ok_log_at(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log_at(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}
