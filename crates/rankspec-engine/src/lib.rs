pub mod eigenspace;
pub mod johnson;
pub mod jucys_murphy;
pub mod pipeline;
pub mod radon;
pub mod sorting;

pub use eigenspace::{eigenspace_projections, EigenProjection};
pub use johnson::{JohnsonCache, JohnsonGraph};
pub use jucys_murphy::{jucys_murphy, jucys_murphy_sum};
pub use pipeline::{final_decomposition, ranked_table, Component, Decomposition};
pub use radon::{apply_radon, radon, radon_chain};
pub use sorting::{raw_data_sorting, Cell, SortedData};
