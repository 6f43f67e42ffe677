pub mod aggregator;
pub mod error;
pub mod repository;
pub mod service;
