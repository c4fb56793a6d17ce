pub mod device;
pub mod markdown;
pub mod upload;
pub mod visitor;
