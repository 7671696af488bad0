pub mod post_handler;

pub use post_handler::PostsState;
