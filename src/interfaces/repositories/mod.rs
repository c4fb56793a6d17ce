pub mod cache;
pub mod gateway;
pub mod memory;
pub mod rest;
