/// Lifecycle of a stream pipeline.
///
/// `Receiving` is entered on the first chunk or message. `Closed` is
/// terminal (explicit cancellation or transport failure); `Idle` may be
/// re-entered between sessions after a stream ends normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Receiving,
    Closed,
}
