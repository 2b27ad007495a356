pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod fhir;
pub mod normalize;
pub mod ontology;
pub mod output;
pub mod pipeline;
pub mod project;
pub mod table;
pub mod tree;
pub mod vocab;
