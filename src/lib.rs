pub mod cities;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
