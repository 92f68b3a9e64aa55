//! WebGPU presentation of the drawing surface
//!
//! Draw commands are triangulated on the CPU and drawn as one flat-colored
//! triangle list per frame.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::tessellate;
pub use vertex::Vertex;
