pub mod artifact;
pub mod handlers;
pub mod ml_ranker;
pub mod rule_ranker;
pub mod service;
pub mod similarity;
