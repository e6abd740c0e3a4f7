pub mod bsp;
mod builder;
mod camera;
mod geometry;
pub mod maps;
mod texture;
mod things;

pub use geometry::{
    Aabb, Level, Linedef, LinedefFlags, LinedefId, Node, NodeId, Sector, SectorId, Seg, SegSides,
    SegmentId, Sidedef, SidedefId, Subsector, SubsectorId, Vertex, VertexId,
};

pub use builder::{LevelBuilder, LevelError, SideTextures};

pub use camera::Camera;

pub use texture::{NO_TEXTURE, TRANSPARENT_PIXEL, Texture, TextureBank, TextureError, TextureId};

pub use things::{
    MapObject, MobjFlags, SpriteBank, SpriteFrame, SpriteFrameId, ThingId, ThingList,
};
