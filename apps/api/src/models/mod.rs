pub mod adaptation;
pub mod profile;
pub mod questions;
pub mod roadmap;
pub mod scores;
