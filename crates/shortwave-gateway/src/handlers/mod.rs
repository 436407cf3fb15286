mod health;
mod url;

pub use health::ping_handler;
pub use url::{
    create_batch_handler, create_handler, create_json_handler, delete_batch_handler,
    list_handler, resolve_handler,
};
