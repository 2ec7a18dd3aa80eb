pub mod cluster;
pub mod cluster_finder;
pub mod mask;
pub mod mask_builder;
pub mod pixel;
pub mod pixel_grid;
pub mod recolorer;
pub mod utils;
