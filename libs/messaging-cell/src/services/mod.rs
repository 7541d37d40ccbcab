pub mod conversations;
pub mod messages;

pub use conversations::ConversationService;
pub use messages::MessageService;
