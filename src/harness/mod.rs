//! Collaborators around the core verifier: invoking the external archiver
//! and generating source corpora with known expected contents.

pub mod corpus;
pub mod tool;

pub use corpus::{SAMPLE_NAME, sample_payload, single_file_corpus, tree_corpus};
pub use tool::ZipTool;
