mod bias;
mod engine;

pub use bias::BiasState;
pub use engine::{
    compute_angle, BalanceEngine, BalanceReading, Tilt, ANGLE_SCALE, BIAS_DISCOUNT, MAX_TILT,
};
