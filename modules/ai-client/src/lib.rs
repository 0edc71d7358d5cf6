pub mod error;
pub mod openai;
pub mod retry;
pub mod traits;
pub mod util;

pub use error::{message_signals_rate_limit, AiError};
pub use openai::{OpenAi, StructuredOutput};
pub use retry::RetryPolicy;
pub use traits::{GenerationRequest, StructuredGenerator};
pub use util::{strip_code_fences, truncate_to_char_boundary};
