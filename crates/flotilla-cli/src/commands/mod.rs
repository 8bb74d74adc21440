pub mod show;
pub mod validate;
