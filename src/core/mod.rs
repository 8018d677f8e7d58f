// Core modules implementing decoding, normalization, the report model, and errors.
pub mod decode;
pub mod envelope;
pub mod error;
pub mod model;
pub mod node;
pub mod normalize;
pub mod pipeline;
