pub mod board;
pub mod todo;
pub mod user;

pub use board::Board;
pub use todo::{Todo, TodoStatus};
pub use user::User;
