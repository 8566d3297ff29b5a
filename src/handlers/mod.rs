pub mod entries;
pub mod health;
pub mod options;
pub mod trends;
