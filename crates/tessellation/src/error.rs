use core::fmt;

/// The fallible part of a draw call.
///
/// A failed draw call is a no-op: the buffer store is left exactly as it
/// was, no partial geometry is ever committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TessellationError {
    /// A polyline tessellator was handed fewer points than it can make
    /// geometry out of.
    TooFewPoints { expected: u32, got: u32 },
    /// A plain-bitmap font was drawn through the SDF entry point or the
    /// other way around.
    MismatchedFontKind,
}

impl fmt::Display for TessellationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TessellationError::TooFewPoints { expected, got } => write!(
                f,
                "Need at least {} points to tessellate, got {}.",
                expected, got
            ),
            TessellationError::MismatchedFontKind => {
                write!(f, "The font kind does not match the draw call.")
            }
        }
    }
}

impl std::error::Error for TessellationError {}

/// Alias for `Result<(), TessellationError>`.
pub type TessellationResult = Result<(), TessellationError>;
