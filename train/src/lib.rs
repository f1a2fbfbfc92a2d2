mod corpus;
mod writer;

pub use corpus::corpus_jobs;
pub use writer::write_models;
