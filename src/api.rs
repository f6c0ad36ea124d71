pub mod ned;
