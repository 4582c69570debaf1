// src/core/mod.rs

pub mod confidence;
pub mod engine;
pub mod frequency;
pub mod scanner;
pub mod tokenizer;
pub mod types;
pub mod vocab;
