pub mod configuration;
pub mod dal;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
