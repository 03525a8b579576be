/// Error type for sketch_nn
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Indicates some dimension is incorrect in a Matrix operation.
    #[error("matrix dimensions are incompatible")]
    DimensionErr,
    /// An element access outside of the matrix.
    #[error("position ({row}, {col}) is outside of a matrix with dimensions {dim:?}")]
    IndexErr {
        row: usize,
        col: usize,
        dim: (usize, usize),
    },
    /// Every layer of a network needs at least one neuron.
    #[error("invalid network layout ({input}, {hidden}, {output})")]
    LayoutErr {
        input: usize,
        hidden: usize,
        output: usize,
    },
    #[error("sample has no target outputs")]
    MissingTarget,
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed parameter dump: {0}")]
    ParamFormat(String),
    #[error("plot window failed: {0}")]
    Gui(String),
}

pub type Result<T> = std::result::Result<T, Error>;
