mod comment;

pub use comment::{Comment, CommentView};
