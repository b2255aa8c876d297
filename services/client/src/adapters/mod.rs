pub mod http_store;
pub mod username_file;

pub use http_store::HttpProgressStore;
pub use username_file::FileUsernameStore;
