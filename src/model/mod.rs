pub mod task;
pub mod timeline;

pub use task::{compare_items, day_end, day_start, Person, Task, TaskStyle, TimelineItem};
pub use timeline::{sort_items, FilteredView, TimelineModel};
