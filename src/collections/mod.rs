//! Hand-built containers the schedulers are composed from.
//!
//! None of these depend on each other. The linked structures share the
//! private [`arena`] so nodes are addressed by index rather than pointer.

mod arena;
mod array;
mod hash_map;
mod heap;
mod list;
mod queue;

pub use array::GrowableArray;
pub use hash_map::ChainedHashMap;
pub use heap::{sort_by_extraction, MaxHeap};
pub use list::SinglyLinkedSequence;
pub use queue::FifoQueue;
