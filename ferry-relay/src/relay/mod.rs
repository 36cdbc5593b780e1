pub mod builder;
pub mod chain;
pub mod client;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod testing;
