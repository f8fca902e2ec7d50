pub mod breeds;
pub mod health;
pub mod images;
pub mod sync;
