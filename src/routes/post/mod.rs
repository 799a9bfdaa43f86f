mod handler;
mod model;

pub use handler::{
    add_comment, create_post, delete_post, get_post, latest_posts, list_comments, my_posts,
    public_posts, toggle_like, update_post,
};
