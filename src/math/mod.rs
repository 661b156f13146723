pub mod slippage;
pub mod tick_math;
