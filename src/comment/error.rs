use crate::utils::error::{CustomError, StoreError};
use thiserror::Error;

/// Failure kinds reported by the comment service and tree assembler.
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("{0}")]
    Validation(String),

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Comment is not a child of post")]
    CommentNotChild,

    #[error("Invalid parent, couldn't create comment")]
    InvalidParent,

    #[error("Parent is locked, comments are not allowed")]
    ParentLocked,

    #[error("User must be author")]
    NotAuthor,

    #[error("Action already performed")]
    AlreadyPerformed,

    #[error("Vote changed concurrently, try again")]
    VoteConflict,

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl From<CommentError> for CustomError {
    fn from(err: CommentError) -> Self {
        let message = err.to_string();
        match err {
            CommentError::Validation(_) => CustomError::ValidationError(message),
            CommentError::PostNotFound
            | CommentError::CommentNotFound
            | CommentError::InvalidParent => CustomError::NotFoundError(message),
            CommentError::CommentNotChild => CustomError::BadRequestError(message),
            CommentError::ParentLocked
            | CommentError::AlreadyPerformed
            | CommentError::VoteConflict => CustomError::ConflictError(message),
            CommentError::NotAuthor => CustomError::UnauthorizedError(message),
            CommentError::Store(err) => err.into(),
        }
    }
}
