pub(crate) mod noise;
pub(crate) mod particles;
pub(crate) mod starfield;
pub(crate) mod tumble;
pub(crate) mod wave;
