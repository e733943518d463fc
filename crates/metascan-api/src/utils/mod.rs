pub mod upload;

pub use upload::extract_multipart_file;
