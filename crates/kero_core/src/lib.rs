pub mod animation;
pub mod hash;
pub mod input;
pub mod time;
