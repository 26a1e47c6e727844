pub mod breadcrumbs;
pub mod compression_service;
pub mod core_config;
pub mod drive_node;
pub mod errors;
pub mod filename;
pub mod image;
pub mod pagination;
pub mod project;
pub mod tree_like;
