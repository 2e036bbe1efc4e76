pub mod dist;
pub mod registry;
pub mod univariate;
