pub mod envelope;
pub mod outcome;
pub mod token;

pub use envelope::Envelope;
pub use outcome::RequestOutcome;
pub use token::AuthToken;
