pub mod app;
pub use app::Schema;

pub mod db;

pub mod mapping;
