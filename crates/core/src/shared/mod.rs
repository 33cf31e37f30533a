pub mod error;
pub mod typeinfo;
