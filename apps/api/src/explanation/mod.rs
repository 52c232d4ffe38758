// Candidate-similarity explanations.
// Implements: skill list normalization, analysis report parsing, name matching,
// and the four-line explanation shown on each recommendation card.
// Pure and synchronous below `handlers`; nothing here calls out to a model.

pub mod batch;
pub mod cleanup;
pub mod dialect;
pub mod handlers;
pub mod matcher;
pub mod report_parser;
pub mod skills;
pub mod synthesizer;
