use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// `split_and_place` was called on a node that is not an empty leaf.
    #[error("Attempted to place an image in a node that is not an empty leaf")]
    NotALeaf,
    /// `split_and_place` was called on a leaf too small for the image.
    #[error("Image {id} ({width}x{height}) does not fit in a {node_width}x{node_height} node")]
    DoesNotFit {
        id: String,
        width: u32,
        height: u32,
        node_width: u32,
        node_height: u32,
    },
    /// Growth was requested on a tree that holds no image yet.
    #[error("Attempted to grow an empty leaf")]
    GrowEmptyLeaf,

    #[error("Can't pack images into a {width} by {height} rectangle")]
    FixedBinOverflow { width: u32, height: u32 },
    #[error(
        "Unable to grow a {canvas_width}x{canvas_height} canvas along one axis to fit a {width}x{height} image"
    )]
    CannotGrow {
        canvas_width: u32,
        canvas_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid dimensions for image {id}: {width}x{height} (must be > 0)")]
    InvalidDimensions { id: String, width: u32, height: u32 },
    #[error("Invalid bin dimensions: {width}x{height} (must be > 0)")]
    InvalidBin { width: u32, height: u32 },
    #[error("Duplicate image id: {0}")]
    DuplicateId(String),
    #[error("Nothing to pack")]
    Empty,
}

impl PackError {
    /// True for errors that indicate a broken engine precondition rather than
    /// a property of the input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            PackError::NotALeaf | PackError::DoesNotFit { .. } | PackError::GrowEmptyLeaf
        )
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
