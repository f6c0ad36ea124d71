pub mod mix;
pub mod source_type;
pub mod window;
