pub mod aggregate;
pub mod cv_pdf;
pub mod export;
pub mod scoring;
pub mod visibility;
