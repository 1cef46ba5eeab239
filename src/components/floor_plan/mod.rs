mod camera;
mod component;
mod graph;
mod highlight;
mod markers;
mod popup;
mod render;
mod scene;
mod types;

pub use component::FloorPlanCanvas;
pub use graph::FloorGraph;
pub use scene::SceneHandle;
pub use types::{Booth, BoothRecord, GraphData, NodeDetails, ShapeType};
