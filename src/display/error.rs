// Display errors

/// Errors reported by the surface simulator
///
/// Out-of-bounds point writes are not errors; they are ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// Bad dimensions or frame data supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The pixel buffer or the presentation binding could not be created
    #[error("Allocation failed: {0}")]
    AllocationError(String),

    /// The surface was torn down and cannot be recreated
    #[error("Surface is closed")]
    Closed,

    /// The presentation backend failed to redraw
    #[error("Render error: {0}")]
    Render(String),
}
