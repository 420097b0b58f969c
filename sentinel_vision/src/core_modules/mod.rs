pub mod background_model;
pub mod blob;
pub mod blob_extractor;
pub mod event_controller;
pub mod frame;
pub mod mask_filter;
