pub(crate) mod randomrange;
pub(crate) mod randomsample;
pub(crate) mod precomputed;
