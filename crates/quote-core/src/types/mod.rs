//! 게이트웨이 전반에서 사용되는 공통 타입.

mod batch;
mod symbol;

pub use batch::*;
pub use symbol::*;
