use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by simlab
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a numeric parameter outside of its valid domain
    #[error("Invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    /// Represents a range expression token that is neither an integer nor an `a-b` pair
    #[error("Invalid range syntax in token `{0}`")]
    InvalidRangeSyntax(String),

    /// Represents paired uniform selections (U1, U2) of unequal length
    #[error("Paired selections must have the same length, found {first} and {second}")]
    MismatchedPairing { first: usize, second: usize },

    /// Represents a transformation requested over zero uniform values
    #[error("No uniform values were selected")]
    EmptySelection,

    /// Represents a variable requested before any uniform numbers were generated
    #[error("No uniform numbers have been generated in this session")]
    NoUniformNumbers,

    /// Represents an operation requested on a variable that does not exist
    #[error("Variable `{0}` cannot be found in the session")]
    VariableNotFound(String),

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),
}

impl SimulationError {
    pub(crate) fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}
