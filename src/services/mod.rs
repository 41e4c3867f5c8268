pub mod conversation;
pub mod dispatch;
pub mod knowledge;
pub mod messaging;
pub mod scheduler;
pub mod understanding;
