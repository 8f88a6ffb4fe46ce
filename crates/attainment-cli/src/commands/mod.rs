pub mod compare;
pub mod compute;
pub mod init;
pub mod validate;
