//! Spatial world model for a mobile manipulation simulator.

#[cfg(test)]
mod tests;

pub mod domain;
