mod comment_form;

pub use comment_form::CommentForm;
