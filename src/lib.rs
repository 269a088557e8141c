// basic
pub mod config;
pub mod catalogue;
pub mod rate;

// menus and callback data
pub mod callback;
pub mod menu;

// persistence
pub mod registry;

// telegram side
pub mod bot;
pub mod broadcast;
