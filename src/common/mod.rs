//! Bounds-checked byte-slice reading shared by the CFB, BIFF8, and image stages.

pub mod binary;
