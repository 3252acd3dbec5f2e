use std::error::Error;
use std::fmt;

/// Ways a structural mutation can hit a dead end.
///
/// These never surface to callers: the mutation operator maps
/// them to a no-op, returning the parent's clone unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MutationError {
    /// The genome has no connections to split or toggle.
    EmptyGenome,
    /// No pair of neurons admits a new feed-forward connection.
    NoViablePair,
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::EmptyGenome => {
                write!(f, "genome has no connection genes to operate on")
            }
            MutationError::NoViablePair => {
                write!(f, "no viable neuron pair for a new connection")
            }
        }
    }
}

impl Error for MutationError {}
