pub mod init;
pub mod lists;
pub mod plan;
pub mod sync;
