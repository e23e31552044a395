pub mod bounce;
pub mod identifier;
pub mod pattern;
pub mod settings;
pub mod tip;
