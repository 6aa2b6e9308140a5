#![allow(dead_code)]

pub mod waveview_env;
pub mod wav;
