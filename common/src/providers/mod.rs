pub mod groq;

pub use self::groq::{
    ChatMessage,
    Client as GroqClient,
    GroqCompletionModel,
    LLAMA3_70B,
    LLAMA3_8B,
};
