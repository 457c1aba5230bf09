mod add;
mod process_data;
mod summarize;

pub use add::Add;
pub use process_data::ProcessData;
pub use summarize::{Summarize, Summary, SummaryRequest};
