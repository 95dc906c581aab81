mod builder;
mod call_loop;

pub use builder::CallLoopBuilder;
pub use call_loop::CallLoop;
