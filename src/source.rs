use crate::error::SourceError;
use crate::types::RawValue;

/// A query that has started executing and can hand back its rows one at a time.
///
/// Implementations wrap a driver's live result handle. The cursor that owns a source is the
/// only thing that calls into it, and it calls [`release`](RowSource::release) at most once.
pub trait RowSource {
    /// Fetch the next row as driver-native values, or `None` once the result is drained.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` on connectivity, protocol or driver-side failures.
    fn fetch_next_row(&mut self) -> Result<Option<Vec<RawValue>>, SourceError>;

    /// Release the execution handle and anything tied to it (statement, portal, buffers).
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the driver reports a failure while tearing down. The cursor
    /// logs it and carries on.
    fn release(&mut self) -> Result<(), SourceError>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn fetch_next_row(&mut self) -> Result<Option<Vec<RawValue>>, SourceError> {
        (**self).fetch_next_row()
    }

    fn release(&mut self) -> Result<(), SourceError> {
        (**self).release()
    }
}
