pub mod pipeline;
pub mod similarity;
pub mod summarizer;

#[cfg(feature = "ml-features")]
pub mod bart;
#[cfg(feature = "ml-features")]
pub mod embeddings;
#[cfg(feature = "ml-features")]
pub mod lancedb;
#[cfg(feature = "ml-features")]
pub mod onnx;
