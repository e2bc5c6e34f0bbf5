//! BIFF8 record iteration and `MsoDrawingGroup` reassembly: component D of the
//! extraction pipeline.

mod scanner;

pub use scanner::drawing_group_blobs;
