pub mod albums;
pub mod cache;
pub mod events;
pub mod export;
pub mod folder;
pub mod logging;
pub mod roots;
pub mod view;
