use num::{Float, NumCast, Zero};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
};

/// Floating point type the calculations are carried out in.
pub trait Primitive: AddAssign + SubAssign + Sum + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + LowerExp + 'static {}
impl Primitive for f32 {}
impl Primitive for f64 {}
