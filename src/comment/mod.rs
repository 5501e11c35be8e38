pub mod controller;
pub mod error;
pub mod index;
pub mod model;
pub mod repository;
pub mod service;
pub mod sort;
pub mod tree;
