// Upload staging and text extraction

pub mod extractor;
pub mod staging;

pub use extractor::*;
pub use staging::*;
