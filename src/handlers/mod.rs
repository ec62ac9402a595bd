pub mod items;

pub use items::{create_item, delete_item, get_item, list_items, update_item, Handler, HandlerResult};
