pub mod archive;
pub mod backend_config;
pub mod factory;
pub mod ports;
pub mod storage_service;
