//! Station queue view
//!
//! 出品站（厨房 / 吧台）只读投影：拉取式，收到房间事件后由客户端重新查询。

mod queue;

pub use queue::StationQueue;
