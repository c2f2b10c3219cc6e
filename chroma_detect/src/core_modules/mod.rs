pub mod blob_detector;
pub mod bounding_box;
pub mod frame;
pub mod histogram;
pub mod likelihood;
pub mod morphology;
pub mod pixel;
