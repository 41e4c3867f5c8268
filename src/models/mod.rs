pub mod activity;
pub mod intent;
pub mod knowledge;
pub mod reply;
pub mod understanding;

pub use activity::{Activity, ActivityKind, ChannelAccount, ConversationAccount};
pub use intent::{Intent, SelectedIntent, CONFIDENCE_THRESHOLD};
pub use knowledge::KnowledgeAnswer;
pub use reply::{Reply, ReplyKind, HELP_TEXT, TIME_PROMPT, WELCOME_TEXT};
pub use understanding::{EntitySpan, UnderstandingResult, APPOINTMENT_TIME_ENTITY};
