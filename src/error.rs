use crate::{
    network_shapley::NetworkShapleyBuilderError,
    types::{DemandBuilderError, LinkBuilderError},
};
use thiserror::Error;

/// Error types for the Shapley computation system
#[derive(Debug, Error)]
pub enum ShapleyError {
    /// Missing required columns in link data
    #[error("Missing required columns for {link_type} links: {columns:?}")]
    MissingColumns {
        link_type: String,
        columns: Vec<String>,
    },

    /// Invalid switch naming (missing digits)
    #[error(
        "Switches are not labeled correctly in {link_type} links; they should be denoted with an integer."
    )]
    InvalidSwitchNaming { link_type: String },

    /// Invalid endpoint naming (has digits)
    #[error(
        "Endpoints are not labeled correctly in the demand matrix; they should not have an integer."
    )]
    InvalidEndpointNaming,

    /// Multiple sources for single traffic type
    #[error("All traffic of a single type must have a single source.")]
    MultipleTrafficSources,

    /// Incomplete public pathway coverage
    #[error("The public pathway is not fully specified for {location}. Missing: {missing:?}")]
    IncompletePublicPathway {
        location: String,
        missing: Vec<String>,
    },

    /// Reserved operator name
    #[error("0 is a protected keyword for operator names; choose another.")]
    ReservedOperatorName,

    /// Too many operators
    #[error("There are too many operators; we limit to 20 to prevent the program from crashing.")]
    TooManyOperators,

    /// Empty links
    #[error("There must be at least one {link_type} link.")]
    EmptyLinks { link_type: String },

    /// Linear programming solver failure
    #[error("Linear programming failed: {reason}")]
    LPSolveFailed { reason: String },

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(#[from] rust_decimal::Error),

    #[error("NetworkShapley configuration build error: {0}")]
    NetworkShapleyBuild(#[from] NetworkShapleyBuilderError),

    #[error("Link configuration build error: {0}")]
    LinkBuild(#[from] LinkBuilderError),

    #[error("Demand configuration build error: {0}")]
    DemandBuild(#[from] DemandBuilderError),

    /// Generic computation error
    #[error("Computation error: {0}")]
    ComputationError(String),
}

/// Result type alias for Shapley operations
pub type Result<T> = std::result::Result<T, ShapleyError>;
