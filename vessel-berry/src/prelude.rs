//! 🩻欢迎光临🫀
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, MmVec};

pub use crate::consts::huv::{HUV_MAX, HUV_MIN};

pub use crate::{ClippedMask, Corridor, HuvRangeMask, VolumeMask, VoxelGate};
pub use crate::{CtVolume, Line};
pub use crate::{GrownRegions, RegionGrowing};
pub use crate::{NodeId, SkeletonGraph, VesselGraph};
pub use crate::{NotYetSegmented, ResultSet, SegmentMask};

pub use crate::segment::{
    CancelToken, ProgressSink, RunState, SegmentParams, SilentProgress, VesselSegmenter,
};
