pub mod adjustments;
pub mod histogram;
pub mod text;
pub mod transform;
