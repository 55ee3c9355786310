pub mod id;
pub mod sensitive;

pub use sensitive::Sensitive;
