//! Client-side state of one quiz attempt: navigation, paging, countdown and
//! validated submission.

mod paging;
mod state;
mod timer;

pub use paging::Pager;
pub use state::{QuizAttempt, SubmitReceipt, TickOutcome};
pub use timer::{Countdown, format_time};
