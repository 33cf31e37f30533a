pub mod iterator;
pub mod metadata;
pub mod probe;
pub mod reader;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
