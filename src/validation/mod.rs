// src/validation/mod.rs

pub mod order;
