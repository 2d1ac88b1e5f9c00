pub mod scan;
pub mod synth;
