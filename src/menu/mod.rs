pub mod handlers;
pub mod main_menu;
mod prompt;

pub use main_menu::show_main_menu;
